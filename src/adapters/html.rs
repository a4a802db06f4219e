use crate::domain::model::RouteSummary;
use crate::domain::ports::RouteExtractor;
use crate::utils::error::{EtlError, Result};
use scraper::{ElementRef, Html, Selector};

pub const DEFAULT_ENTRY_SELECTOR: &str = "li.time";
pub const DEFAULT_TEXT_SELECTOR: &str = "span.small";

// Positions within the list of time entries on the first route.
const DURATION_INDEX: usize = 1;
const ARRIVAL_INDEX: usize = 2;

/// Reads the first route's duration and arrival time from a transit search result page.
///
/// The page lists `li.time` entries for the top route; entry 1 holds the
/// travel time and entry 2 the arrival time, each inside a `span.small`.
#[derive(Debug, Clone)]
pub struct TransitPageExtractor {
    entry_selector: String,
    text_selector: String,
}

impl TransitPageExtractor {
    pub fn new() -> Self {
        Self {
            entry_selector: DEFAULT_ENTRY_SELECTOR.to_string(),
            text_selector: DEFAULT_TEXT_SELECTOR.to_string(),
        }
    }

    #[cfg(test)]
    fn with_selectors(entry: &str, text: &str) -> Result<Self> {
        parse_selector(entry)?;
        parse_selector(text)?;
        Ok(Self {
            entry_selector: entry.to_string(),
            text_selector: text.to_string(),
        })
    }
}

impl Default for TransitPageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::ExtractionError {
        message: format!("invalid CSS selector '{}': {:?}", css, e),
    })
}

fn inner_text(entry: &ElementRef<'_>, text_sel: &Selector, label: &str) -> Result<String> {
    entry
        .select(text_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or_else(|| EtlError::ExtractionError {
            message: format!("{} entry has no text element", label),
        })
}

impl RouteExtractor for TransitPageExtractor {
    fn extract(&self, html: &str) -> Result<RouteSummary> {
        let entry_sel = parse_selector(&self.entry_selector)?;
        let text_sel = parse_selector(&self.text_selector)?;

        let document = Html::parse_document(html);
        let entries: Vec<ElementRef<'_>> = document.select(&entry_sel).collect();
        if entries.len() <= ARRIVAL_INDEX {
            return Err(EtlError::ExtractionError {
                message: format!(
                    "expected at least {} '{}' elements, found {}",
                    ARRIVAL_INDEX + 1,
                    self.entry_selector,
                    entries.len()
                ),
            });
        }

        let duration_text = inner_text(&entries[DURATION_INDEX], &text_sel, "duration")?;
        let arrival_time = inner_text(&entries[ARRIVAL_INDEX], &text_sel, "arrival")?;

        Ok(RouteSummary {
            duration_text,
            arrival_time,
        })
    }
}
