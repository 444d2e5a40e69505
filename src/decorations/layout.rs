//! Decoration sizing and class computation.
//!
//! Both are pure functions of their inputs so they can be re-applied
//! whenever font or icon settings change without accumulating state.

use crate::config::Config;
use term_decor_terminal::{DecorationElement, InlineStyle};

/// Base edge length of a decoration at the default font size, in px.
pub const DEFAULT_DIMENSION: f32 = 16.0;
/// Left margin in the first split pane, which has more gutter room.
pub const MARGIN_LEFT_FIRST_SPLIT: f32 = -17.0;
pub const MARGIN_LEFT: f32 = -12.0;

/// CSS-style class names applied to decoration elements.
pub mod class {
    pub const COMMAND_DECORATION: &str = "terminal-command-decoration";
    pub const CODICON: &str = "codicon";
    pub const XTERM_DECORATION: &str = "xterm-decoration";
    pub const DEFAULT: &str = "default";
    pub const ERROR: &str = "error";
    pub const SUCCESS: &str = "success";
}

/// Exit status as shown by a decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationStatus {
    /// Running, or the shell did not report an exit code
    Unknown,
    Success,
    Error,
}

impl DecorationStatus {
    pub fn from_exit_code(exit_code: Option<i32>) -> Self {
        match exit_code {
            None => DecorationStatus::Unknown,
            Some(0) => DecorationStatus::Success,
            Some(_) => DecorationStatus::Error,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            DecorationStatus::Unknown => class::DEFAULT,
            DecorationStatus::Success => class::SUCCESS,
            DecorationStatus::Error => class::ERROR,
        }
    }
}

/// Icon names per status, taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationIcons {
    pub unknown: String,
    pub success: String,
    pub error: String,
}

impl DecorationIcons {
    pub fn from_config(config: &Config) -> Self {
        Self {
            unknown: config.decoration_icon.clone(),
            success: config.decoration_icon_success.clone(),
            error: config.decoration_icon_error.clone(),
        }
    }

    pub fn icon(&self, status: DecorationStatus) -> &str {
        match status {
            DecorationStatus::Unknown => &self.unknown,
            DecorationStatus::Success => &self.success,
            DecorationStatus::Error => &self.error,
        }
    }
}

/// Inline sizing for a decoration.
///
/// Decorations shrink with the font but never grow past
/// [`DEFAULT_DIMENSION`].
pub fn decoration_layout(
    font_size: f32,
    default_font_size: f32,
    in_first_split: bool,
) -> InlineStyle {
    let scalar = if default_font_size > 0.0 && font_size.is_finite() {
        (font_size / default_font_size).min(1.0)
    } else {
        1.0
    };
    let dimension = scalar * DEFAULT_DIMENSION;
    let margin = if in_first_split {
        MARGIN_LEFT_FIRST_SPLIT
    } else {
        MARGIN_LEFT
    };
    InlineStyle {
        width: Some(dimension),
        height: Some(dimension),
        font_size: Some(dimension),
        margin_left: Some(scalar * margin),
    }
}

/// Full class list for a decoration with the given exit code.
pub fn decoration_classes(exit_code: Option<i32>, icons: &DecorationIcons) -> Vec<String> {
    let status = DecorationStatus::from_exit_code(exit_code);
    vec![
        class::COMMAND_DECORATION.to_string(),
        class::CODICON.to_string(),
        class::XTERM_DECORATION.to_string(),
        status.class().to_string(),
        format!("codicon-{}", icons.icon(status)),
    ]
}

/// Returns `true` once classes were applied to `element`.
pub fn is_styled(element: &DecorationElement) -> bool {
    element.has_class(class::CODICON)
}

pub fn apply_layout(element: &DecorationElement, font_size: f32, default_font_size: f32) {
    element.set_style(decoration_layout(
        font_size,
        default_font_size,
        element.is_in_first_split(),
    ));
}

pub fn apply_classes(element: &DecorationElement, exit_code: Option<i32>, icons: &DecorationIcons) {
    element.set_classes(decoration_classes(exit_code, icons));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icons() -> DecorationIcons {
        DecorationIcons::from_config(&Config::default())
    }

    #[test]
    fn test_layout_at_default_font_size() {
        let style = decoration_layout(14.0, 14.0, false);
        assert_eq!(style.width, Some(16.0));
        assert_eq!(style.height, Some(16.0));
        assert_eq!(style.font_size, Some(16.0));
        assert_eq!(style.margin_left, Some(-12.0));
    }

    #[test]
    fn test_layout_scales_down_but_not_up() {
        let small = decoration_layout(7.0, 14.0, true);
        assert_eq!(small.width, Some(8.0));
        assert_eq!(small.margin_left, Some(-8.5));

        let large = decoration_layout(28.0, 14.0, true);
        assert_eq!(large.width, Some(16.0));
        assert_eq!(large.margin_left, Some(-17.0));
    }

    #[test]
    fn test_layout_with_degenerate_default() {
        assert_eq!(decoration_layout(10.0, 0.0, false).width, Some(16.0));
    }

    #[test]
    fn test_classes_per_status() {
        let icons = icons();
        assert_eq!(
            decoration_classes(None, &icons),
            vec![
                "terminal-command-decoration",
                "codicon",
                "xterm-decoration",
                "default",
                "codicon-circle-outline"
            ]
        );
        let success = decoration_classes(Some(0), &icons);
        assert!(success.contains(&"success".to_string()));
        assert!(success.contains(&"codicon-primitive-dot".to_string()));

        let error = decoration_classes(Some(130), &icons);
        assert!(error.contains(&"error".to_string()));
        assert!(error.contains(&"codicon-error-small".to_string()));
    }

    #[test]
    fn test_apply_replaces_existing_classes() {
        let element = DecorationElement::new(false);
        element.set_classes(vec!["stale".to_string()]);
        assert!(!is_styled(&element));

        apply_classes(&element, Some(1), &icons());
        assert!(is_styled(&element));
        assert!(!element.has_class("stale"));
        assert_eq!(element.classes().len(), 5);
    }
}
