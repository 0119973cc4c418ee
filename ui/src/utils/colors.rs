//! Shared color constants for the UI.

use egui::Color32;

/// Red color for failed loads, creates and deletes.
pub const COLOR_RED: Color32 = Color32::from_rgb(220, 53, 69);

/// Amber color for requests still in flight.
pub const COLOR_AMBER: Color32 = Color32::from_rgb(255, 193, 7);

/// Subtle gray around the table and its cells.
pub const TABLE_BORDER_COLOR: Color32 = Color32::from_rgb(200, 200, 200);

/// Light gray behind header cells.
pub const HEADER_BG_COLOR: Color32 = Color32::from_rgb(245, 245, 245);
