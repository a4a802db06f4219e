use crate::domain::model::{Entity, RawRow};
use crate::domain::ports::UnmatchedRowPolicy;
use crate::utils::error::{EtlError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub actors: Vec<Entity>,
    pub locations: Vec<Entity>,
    pub dropped: usize,
}

/// Splits rows into actors and locations by a substring of the first field.
#[derive(Debug, Clone)]
pub struct RowClassifier {
    actor_tag: String,
    location_tag: String,
    policy: UnmatchedRowPolicy,
}

impl RowClassifier {
    pub fn new(
        actor_tag: impl Into<String>,
        location_tag: impl Into<String>,
        policy: UnmatchedRowPolicy,
    ) -> Self {
        Self {
            actor_tag: actor_tag.into(),
            location_tag: location_tag.into(),
            policy,
        }
    }

    pub fn classify(&self, rows: impl IntoIterator<Item = RawRow>) -> Result<Classified> {
        let mut out = Classified::default();

        for row in rows {
            let tag = row.tag().unwrap_or_default();
            // 先判斷 actor，再判斷 location
            let bucket = if tag.contains(&self.actor_tag) {
                Some(&mut out.actors)
            } else if tag.contains(&self.location_tag) {
                Some(&mut out.locations)
            } else {
                None
            };

            match (bucket, row.to_entity()) {
                (Some(bucket), Some(entity)) => bucket.push(entity),
                _ => {
                    self.reject(&row)?;
                    out.dropped += 1;
                }
            }
        }

        Ok(out)
    }

    fn reject(&self, row: &RawRow) -> Result<()> {
        match self.policy {
            UnmatchedRowPolicy::Skip => Ok(()),
            UnmatchedRowPolicy::Warn => {
                tracing::warn!("⚠️ Dropping input row {}: {:?}", row.line, row.fields);
                Ok(())
            }
            UnmatchedRowPolicy::Fail => Err(EtlError::UnmatchedRowError {
                line: row.line,
                row: row.fields.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: usize, fields: &[&str]) -> RawRow {
        RawRow::new(line, fields.iter().map(|f| f.to_string()).collect())
    }

    fn sample() -> Vec<RawRow> {
        vec![
            row(2, &["Teacher (full time)", "Sato", "Shinjuku"]),
            row(3, &["School", "North High", "Ikebukuro"]),
            row(4, &["Office", "HQ", "Tokyo"]),
            row(5, &["Teacher", "Suzuki", "Ueno"]),
            row(6, &["School"]),
        ]
    }

    #[test]
    fn test_classify_partitions_by_tag_substring() {
        let classifier = RowClassifier::new("Teacher", "School", UnmatchedRowPolicy::Skip);
        let out = classifier.classify(sample()).unwrap();

        assert_eq!(
            out.actors,
            vec![Entity::new("Sato", "Shinjuku"), Entity::new("Suzuki", "Ueno")]
        );
        assert_eq!(out.locations, vec![Entity::new("North High", "Ikebukuro")]);
        assert_eq!(out.dropped, 2);
    }

    #[test]
    fn test_classify_warn_policy_still_drops() {
        let classifier = RowClassifier::new("Teacher", "School", UnmatchedRowPolicy::Warn);
        let out = classifier.classify(sample()).unwrap();
        assert_eq!(out.dropped, 2);
    }

    #[test]
    fn test_classify_fail_policy_names_the_row() {
        let classifier = RowClassifier::new("Teacher", "School", UnmatchedRowPolicy::Fail);
        match classifier.classify(sample()) {
            Err(EtlError::UnmatchedRowError { line, row }) => {
                assert_eq!(line, 4);
                assert_eq!(row[0], "Office");
            }
            other => panic!("expected UnmatchedRowError, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_empty_input() {
        let classifier = RowClassifier::new("Teacher", "School", UnmatchedRowPolicy::Fail);
        let out = classifier.classify(Vec::new()).unwrap();
        assert!(out.actors.is_empty());
        assert!(out.locations.is_empty());
    }
}
