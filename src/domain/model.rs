use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One input CSV record, header excluded. Field 0 is the tag, 1 the name, 2 the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    pub fn tag(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    /// Drops the tag; `None` when the name or address column is missing.
    pub fn to_entity(&self) -> Option<Entity> {
        match (self.fields.get(1), self.fields.get(2)) {
            (Some(name), Some(address)) => Some(Entity::new(name.trim(), address.trim())),
            _ => None,
        }
    }
}

/// A teacher (origin) or school (destination).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub address: String,
}

impl Entity {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    pub actor: Entity,
    pub location: Entity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub pair: Pair,
}

/// Travel time as hours and minutes. Minutes are always below 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TravelDuration {
    hours: u32,
    minutes: u32,
}

impl TravelDuration {
    /// Saturates at `u32::MAX` total minutes.
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self::from_total_minutes(hours.saturating_mul(60).saturating_add(minutes))
    }

    pub fn from_total_minutes(total: u32) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

/// Renders as `H:MM`, the matrix cell format.
impl fmt::Display for TravelDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hours, self.minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTravelDurationError(String);

impl fmt::Display for ParseTravelDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid duration '{}', expected H:MM", self.0)
    }
}

impl std::error::Error for ParseTravelDurationError {}

impl FromStr for TravelDuration {
    type Err = ParseTravelDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTravelDurationError(s.to_string());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(err)?;
        if minutes.len() != 2 {
            return Err(err());
        }
        let hours: u32 = hours.parse().map_err(|_| err())?;
        let minutes: u32 = minutes.parse().map_err(|_| err())?;
        if minutes >= 60 {
            return Err(err());
        }
        hours
            .checked_mul(60)
            .and_then(|h| h.checked_add(minutes))
            .map(Self::from_total_minutes)
            .ok_or_else(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedPair {
    pub pair: Pair,
    pub arrival_time: String,
    /// `None` when the page's duration text could not be parsed.
    pub duration: Option<TravelDuration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub url: String,
    pub pair: Pair,
    pub message: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error occurred while downloading {}: {}", self.url, self.message)
    }
}

/// One result per request descriptor, in submission order.
pub type FetchOutcome = std::result::Result<EnrichedPair, FetchFailure>;

/// The two text fragments read off a route result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    pub duration_text: String,
    pub arrival_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub outcomes: Vec<FetchOutcome>,
}

impl TransformResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_normalizes_minutes() {
        let d = TravelDuration::new(1, 75);
        assert_eq!(d.hours(), 2);
        assert_eq!(d.minutes(), 15);
        assert_eq!(d.total_minutes(), 135);
    }

    #[test]
    fn test_duration_new_saturates() {
        let d = TravelDuration::new(u32::MAX, 59);
        assert_eq!(d.total_minutes(), u32::MAX);
        assert_eq!(d.minutes(), u32::MAX % 60);
        assert_eq!(TravelDuration::new(0, u32::MAX).total_minutes(), u32::MAX);
    }

    #[test]
    fn test_duration_display_round_trips() {
        for (h, m) in [(0, 0), (0, 45), (1, 30), (2, 0), (12, 59)] {
            let d = TravelDuration::new(h, m);
            let rendered = d.to_string();
            assert_eq!(rendered.parse::<TravelDuration>().unwrap(), d);
        }
        assert_eq!(TravelDuration::new(0, 5).to_string(), "0:05");
    }

    #[test]
    fn test_duration_from_str_rejects_garbage() {
        assert!("".parse::<TravelDuration>().is_err());
        assert!("1:5".parse::<TravelDuration>().is_err());
        assert!("1:75".parse::<TravelDuration>().is_err());
        assert!("a:00".parse::<TravelDuration>().is_err());
    }

    #[test]
    fn test_raw_row_to_entity() {
        let row = RawRow::new(2, vec!["Teacher".into(), " Sato ".into(), "Shibuya".into()]);
        assert_eq!(row.to_entity(), Some(Entity::new("Sato", "Shibuya")));
        let short = RawRow::new(3, vec!["School".into(), "North".into()]);
        assert_eq!(short.to_entity(), None);
    }
}
