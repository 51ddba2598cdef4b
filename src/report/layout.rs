//! Fixed page geometry and colours of the report.
//!
//! Distances are in millimetres measured from the top-left corner of an A4
//! portrait page. The renderer converts them to PDF points.

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;

pub const MARGIN_X: f32 = 15.0;

pub const HEADER_HEIGHT: f32 = 35.0;
pub const TITLE_BASELINE: f32 = 17.0;
pub const SUBTITLE_BASELINE: f32 = 27.0;
pub const TITLE_SIZE: f32 = 20.0;
pub const SUBTITLE_SIZE: f32 = 12.0;
pub const SUBTITLE: &str = "Student Information Report";

pub const TABLE_TOP: f32 = 50.0;
pub const LABEL_WIDTH: f32 = 60.0;
pub const VALUE_WIDTH: f32 = 120.0;
pub const ROW_HEIGHT: f32 = 8.0;
pub const CELL_PADDING: f32 = 2.0;
/// Distance from a row's bottom edge up to the text baseline.
pub const CELL_BASELINE_OFFSET: f32 = 2.6;
pub const CELL_TEXT_SIZE: f32 = 10.0;
pub const BORDER_WIDTH: f32 = 0.2;

pub const LABEL_HEADING: &str = "Field";
pub const VALUE_HEADING: &str = "Value";

/// Top of the footer band. Assumes the table ends above it.
pub const FOOTER_TOP: f32 = 280.0;
pub const FOOTER_BASELINE: f32 = 287.0;
pub const FOOTER_TEXT_SIZE: f32 = 9.0;
/// Minimum clearance between the last table row and the footer band.
pub const FOOTER_GAP: f32 = 5.0;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

pub const HEADER_FILL: Rgb = Rgb(0.16, 0.33, 0.55);
pub const HEADER_TEXT: Rgb = Rgb(1.0, 1.0, 1.0);
pub const HEADING_ROW_FILL: Rgb = Rgb(0.27, 0.27, 0.27);
pub const HEADING_ROW_TEXT: Rgb = Rgb(1.0, 1.0, 1.0);
pub const DATA_ROW_FILL: Rgb = Rgb(0.94, 0.94, 0.94);
pub const DATA_ROW_TEXT: Rgb = Rgb(0.0, 0.0, 0.0);
pub const BORDER: Rgb = Rgb(0.0, 0.0, 0.0);
pub const FOOTER_TEXT: Rgb = Rgb(0.4, 0.4, 0.4);

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Page width and height in points.
pub fn page_size_pt() -> (f32, f32) {
    (mm_to_pt(PAGE_WIDTH), mm_to_pt(PAGE_HEIGHT))
}

/// Top edge of the data row at `index` (0-based, below the heading row).
pub fn data_row_top(index: usize) -> f32 {
    TABLE_TOP + ROW_HEIGHT * (index as f32 + 1.0)
}

/// How many data rows fit between the heading row and the footer band.
pub fn row_capacity() -> usize {
    let available = FOOTER_TOP - FOOTER_GAP - data_row_top(0);
    (available / ROW_HEIGHT).floor() as usize
}
