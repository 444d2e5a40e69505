//! Shell integration decoration types.

use serde::{Deserialize, Serialize};

/// What happens to the previous placeholder decoration when a newer command
/// starts before the earlier one finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStrategy {
    /// Replace the placeholder reference and leave the old decoration alone.
    /// Its disposal is owned by the finish handler (or a full teardown).
    #[default]
    Retain,
    /// Dispose the old placeholder decoration and its marker before storing
    /// the new one.
    DisposePrevious,
}

impl PlaceholderStrategy {
    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaceholderStrategy::Retain => "Retain previous",
            PlaceholderStrategy::DisposePrevious => "Dispose previous",
        }
    }
}
