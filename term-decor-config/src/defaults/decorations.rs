//! Default values for shell integration command decorations.

use crate::types::PlaceholderStrategy;

pub fn decorations_enabled() -> bool {
    true
}

/// Icon for commands whose exit status is not known yet.
pub fn decoration_icon() -> String {
    "circle-outline".to_string()
}

pub fn decoration_icon_success() -> String {
    "primitive-dot".to_string()
}

pub fn decoration_icon_error() -> String {
    "error-small".to_string()
}

pub fn placeholder_strategy() -> PlaceholderStrategy {
    PlaceholderStrategy::Retain
}
