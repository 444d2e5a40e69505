//! Default values for font and line metrics.

pub fn font_size() -> f32 {
    14.0
}

pub fn line_height() -> f32 {
    1.0 // Line height multiplier
}
