use crate::domain::model::RawRow;
use crate::utils::error::Result;

/// Reads CSV bytes into rows, skipping the header. Rows may be ragged.
pub fn parse_rows(data: &[u8]) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        rows.push(RawRow::new(
            line,
            record.iter().map(str::to_string).collect(),
        ));
    }
    Ok(rows)
}
