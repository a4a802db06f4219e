use crate::domain::model::TravelDuration;

const HOURS_MARK: &str = "時間";
const MINUTES_MARK: &str = "分";

/// Parses `"1時間30分"` or `"45分"`. Anything after the first `分` is ignored.
/// Returns `None` for any other shape, never panics.
pub fn parse_duration_text(text: &str) -> Option<TravelDuration> {
    let (hours_part, rest) = match text.split_once(HOURS_MARK) {
        Some((hours, rest)) => (Some(hours), rest),
        None => (None, text),
    };
    let (minutes_part, _) = rest.split_once(MINUTES_MARK)?;

    let hours = match hours_part {
        Some(h) => parse_segment(h)?,
        None => 0,
    };
    let minutes = parse_segment(minutes_part)?;

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .map(TravelDuration::from_total_minutes)
}

fn parse_segment(segment: &str) -> Option<u32> {
    let segment = segment.trim();
    if segment.is_empty() || !segment.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Inverse of [`parse_duration_text`], in the page's own notation.
pub fn format_duration_text(duration: &TravelDuration) -> String {
    if duration.hours() == 0 {
        format!("{}{}", duration.minutes(), MINUTES_MARK)
    } else {
        format!(
            "{}{}{}{}",
            duration.hours(),
            HOURS_MARK,
            duration.minutes(),
            MINUTES_MARK
        )
    }
}
