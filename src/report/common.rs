//! Shared helpers for report naming, timestamps and text encoding.

use chrono::{DateTime, Local};

pub const PDF_EXTENSION: &str = "pdf";

/// `student_<id>_report_<YYYYMMDD_HHMMSS>`
pub fn report_file_stem(student_id: u64, at: &DateTime<Local>) -> String {
    format!("student_{}_report_{}", student_id, at.format("%Y%m%d_%H%M%S"))
}

/// Filename for the given attempt; attempt 0 has no collision suffix.
pub fn report_filename(student_id: u64, at: &DateTime<Local>, attempt: u32) -> String {
    let stem = report_file_stem(student_id, at);
    if attempt == 0 {
        format!("{}.{}", stem, PDF_EXTENSION)
    } else {
        format!("{}_{}.{}", stem, attempt, PDF_EXTENSION)
    }
}

/// Human readable timestamp used in the footer and JSON metadata.
pub fn format_generated_at(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Encode text for a base-14 font with WinAnsiEncoding.
///
/// Latin-1 printable characters map to themselves and the extra WinAnsi
/// glyphs map to their 0x80-0x9F slot. Anything else, including control
/// characters, becomes `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => win_ansi_extra(c).unwrap_or(b'?'),
        })
        .collect()
}

fn win_ansi_extra(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Structural check for a complete PDF: `%PDF` header and `%%EOF` trailer.
pub fn looks_like_pdf(data: &[u8]) -> bool {
    if !data.starts_with(b"%PDF") {
        return false;
    }
    let tail_start = data.len().saturating_sub(32);
    data[tail_start..].windows(5).any(|w| w == b"%%EOF")
}
