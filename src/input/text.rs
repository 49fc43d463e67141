use crate::viewport::{format_rotation, ViewId, ViewportStore};

/// Parses a typed angle such as `"45"`, `" -12.5 "` or `"90°"`.
pub fn parse_angle_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('°').unwrap_or(trimmed).trim_end();
    number.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Parses a typed scale: plain factors (`"1.5"`) or percentages (`"150%"`).
/// Only finite, positive results are accepted.
pub fn parse_scale_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let value = match trimmed.strip_suffix('%') {
        Some(percent) => percent.trim_end().parse::<f64>().ok()? / 100.0,
        None => trimmed.parse::<f64>().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

pub fn format_scale(scale: f64) -> String {
    format!("{:.0}%", scale * 100.0)
}

/// Commits a typed rotation for `view` when it parses, and returns the text
/// the input should show afterwards: always the stored angle, so invalid input
/// reverts to the last committed value.
pub fn commit_rotation_text(store: &mut ViewportStore, view: ViewId, text: &str) -> String {
    match parse_angle_text(text) {
        Some(degrees) => {
            store.set_pinpoint_rotation(view, degrees);
        }
        None => {
            tracing::warn!(%view, input = text, "rejected rotation input");
        }
    }
    format_rotation(store.pinpoint_rotation(view))
}

/// Same contract as [`commit_rotation_text`] for the individual pinpoint scale.
pub fn commit_scale_text(store: &mut ViewportStore, view: ViewId, text: &str) -> String {
    match parse_scale_text(text) {
        Some(scale) => {
            store.set_pinpoint_scale(view, scale);
        }
        None => {
            tracing::warn!(%view, input = text, "rejected scale input");
        }
    }
    format_scale(store.pinpoint_scale(view))
}
