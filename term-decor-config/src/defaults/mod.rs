//! Default value functions for configuration.
//!
//! Each sub-module groups related free functions used as
//! `#[serde(default = "crate::defaults::...")]` attributes on `Config` fields.

mod decorations;
mod font;
mod misc;

// ── Font & line metrics ────────────────────────────────────────────────────
pub use font::{font_size, line_height};

// ── Shell integration decorations ──────────────────────────────────────────
pub use decorations::{
    decoration_icon, decoration_icon_error, decoration_icon_success, decorations_enabled,
    placeholder_strategy,
};

// ── Miscellaneous ──────────────────────────────────────────────────────────
pub use misc::{hover_delay_ms, log_level};
