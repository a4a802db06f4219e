use crate::domain::model::FetchOutcome;
use crate::utils::error::{EtlError, Result};

const DETAIL_HEADER: [&str; 5] = ["actor", "location", "arrival_time", "duration", "error"];

/// One line per outcome in submission order, keeping the arrival time and
/// failure message that the matrix drops.
pub fn details_csv(outcomes: &[FetchOutcome]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(DETAIL_HEADER)?;

    for outcome in outcomes {
        match outcome {
            Ok(enriched) => {
                let duration = enriched
                    .duration
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                writer.write_record([
                    enriched.pair.actor.name.as_str(),
                    enriched.pair.location.name.as_str(),
                    enriched.arrival_time.as_str(),
                    duration.as_str(),
                    "",
                ])?;
            }
            Err(failure) => {
                writer.write_record([
                    failure.pair.actor.name.as_str(),
                    failure.pair.location.name.as_str(),
                    "",
                    "",
                    failure.message.as_str(),
                ])?;
            }
        }
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EnrichedPair, Entity, FetchFailure, Pair, TravelDuration};

    fn pair(a: &str, l: &str) -> Pair {
        Pair {
            actor: Entity::new(a, "x"),
            location: Entity::new(l, "y"),
        }
    }

    #[test]
    fn test_details_keep_order_and_messages() {
        let outcomes: Vec<FetchOutcome> = vec![
            Ok(EnrichedPair {
                pair: pair("A2", "L1"),
                arrival_time: "09:32着".to_string(),
                duration: Some(TravelDuration::new(1, 30)),
            }),
            Err(FetchFailure {
                url: "http://x".to_string(),
                pair: pair("A1", "L1"),
                message: "HTTP 500 from http://x".to_string(),
            }),
        ];

        let csv = String::from_utf8(details_csv(&outcomes).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "actor,location,arrival_time,duration,error");
        assert_eq!(lines[1], "A2,L1,09:32着,1:30,");
        assert_eq!(lines[2], "A1,L1,,,HTTP 500 from http://x");
    }
}
