use crate::domain::model::{FetchOutcome, Matrix};
use crate::utils::error::Result;
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_ACTOR_HEADER: &str = "Actor";

/// Pivots outcomes into actors × locations.
///
/// Names are sorted. Every name seen in an outcome gets a row or column,
/// including names whose only outcomes failed. A successful outcome always
/// writes its cell (blank when the duration did not parse), so the last one
/// processed for a repeated pair wins. Failures never write a cell.
pub fn aggregate(outcomes: &[FetchOutcome], actor_header: &str) -> Matrix {
    let mut actors = BTreeSet::new();
    let mut locations = BTreeSet::new();
    for outcome in outcomes {
        let pair = match outcome {
            Ok(enriched) => &enriched.pair,
            Err(failure) => &failure.pair,
        };
        actors.insert(pair.actor.name.as_str());
        locations.insert(pair.location.name.as_str());
    }

    let mut cells: BTreeMap<(&str, &str), String> = actors
        .iter()
        .flat_map(|a| locations.iter().map(move |l| ((*a, *l), String::new())))
        .collect();

    for enriched in outcomes.iter().filter_map(|o| o.as_ref().ok()) {
        let key = (
            enriched.pair.actor.name.as_str(),
            enriched.pair.location.name.as_str(),
        );
        let rendered = enriched
            .duration
            .map(|d| d.to_string())
            .unwrap_or_default();
        cells.insert(key, rendered);
    }

    let mut header = Vec::with_capacity(locations.len() + 1);
    header.push(actor_header.to_string());
    header.extend(locations.iter().map(|l| l.to_string()));

    let rows = actors
        .iter()
        .map(|actor| {
            let mut row = Vec::with_capacity(locations.len() + 1);
            row.push(actor.to_string());
            for location in &locations {
                row.push(cells.remove(&(*actor, *location)).unwrap_or_default());
            }
            row
        })
        .collect();

    Matrix { header, rows }
}

impl Matrix {
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| crate::utils::error::EtlError::IoError(e.into_error()))
    }

    #[cfg(test)]
    fn cell(&self, actor: &str, location: &str) -> Option<&str> {
        let col = self.header.iter().skip(1).position(|h| h == location)?;
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(actor))
            .and_then(|row| row.get(col + 1))
            .map(String::as_str)
    }
}
