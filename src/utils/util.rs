//! # Utility Module
//!
//! Small helpers shared by the editor core and the desktop frontend.
//!
//! ## Example Function: `format_length`
//!
//! Every length shown to the user (wall labels, the transient draw readout,
//! the details panel) goes through `format_length`, so they all agree on two
//! decimal places followed by the length unit.

/// Formats a length with two decimals and a trailing unit.
///
/// # Examples
///
/// ```
/// use floor_ed::utils::util::format_length;
///
/// assert_eq!(format_length(10.0, "m"), "10.00 m");
/// assert_eq!(format_length(2.345, "ft"), "2.35 ft");
/// ```
pub fn format_length(length: f32, unit: &str) -> String {
    format!("{:.2} {}", length, unit)
}

/// Width over height, guarding against a collapsed container.
pub fn aspect_ratio(width: f32, height: f32) -> f32 {
    if height <= 0.0 || width <= 0.0 {
        1.0
    } else {
        width / height
    }
}
