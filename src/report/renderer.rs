//! PDF renderer for [`ReportDocument`]s.
//!
//! Builds a single A4 page with `lopdf`: a coloured header band, a bordered
//! two-column table and a footer band. Row height and column widths are fixed,
//! so long values are clipped at the cell edge instead of wrapping.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::common::{format_generated_at, report_filename, to_win_ansi};
use super::document::ReportDocument;
use super::layout::{self, Rgb};
use crate::config::ReportConfig;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const FONT_OBLIQUE: &str = "F3";

/// Upper bound on collision suffixes tried for one timestamp.
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write report file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("report has {rows} rows but a page holds at most {capacity}")]
    PageOverflow { rows: usize, capacity: usize },
    #[error("failed to encode PDF: {0}")]
    Encode(String),
}

impl RenderError {
    /// True for failures of the local filesystem.
    pub fn is_io(&self) -> bool {
        matches!(self, RenderError::CreateDir { .. } | RenderError::Write { .. })
    }
}

/// A report file that has been fully written to disk.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    pub generated_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    title: String,
    output_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            output_dir: config.output_dir.clone(),
        }
    }

    /// Render `doc` and write it under the output directory.
    pub fn render(&self, doc: &ReportDocument) -> Result<ReportArtifact, RenderError> {
        self.render_at(doc, Local::now())
    }

    /// Render with an explicit generation time (used for the name and footer).
    pub fn render_at(
        &self,
        doc: &ReportDocument,
        at: DateTime<Local>,
    ) -> Result<ReportArtifact, RenderError> {
        let bytes = self.encode(doc, &at)?;
        let artifact = self.write_artifact(doc.student_id, &bytes, at)?;

        log::info!(
            "PDF report generated successfully: {} ({} bytes)",
            artifact.path.display(),
            artifact.size_bytes
        );
        Ok(artifact)
    }

    /// Produce the PDF bytes without touching the filesystem.
    pub fn encode(&self, doc: &ReportDocument, at: &DateTime<Local>) -> Result<Vec<u8>, RenderError> {
        let capacity = layout::row_capacity();
        if doc.len() > capacity {
            return Err(RenderError::PageOverflow {
                rows: doc.len(),
                capacity,
            });
        }

        let (_, page_height) = layout::page_size_pt();
        let mut canvas = Canvas::new(page_height);
        self.draw_header(&mut canvas);
        draw_table(&mut canvas, doc);
        draw_footer(&mut canvas, at);

        build_pdf(&self.title, canvas.finish())
    }

    fn draw_header(&self, canvas: &mut Canvas) {
        canvas.fill_rect(
            0.0,
            0.0,
            layout::PAGE_WIDTH,
            layout::HEADER_HEIGHT,
            layout::HEADER_FILL,
        );
        canvas.text(
            FONT_BOLD,
            layout::TITLE_SIZE,
            layout::HEADER_TEXT,
            layout::MARGIN_X,
            layout::TITLE_BASELINE,
            &self.title,
        );
        canvas.text(
            FONT_OBLIQUE,
            layout::SUBTITLE_SIZE,
            layout::HEADER_TEXT,
            layout::MARGIN_X,
            layout::SUBTITLE_BASELINE,
            layout::SUBTITLE,
        );
    }

    fn write_artifact(
        &self,
        student_id: u64,
        bytes: &[u8],
        at: DateTime<Local>,
    ) -> Result<ReportArtifact, RenderError> {
        let dir = &self.output_dir;
        fs::create_dir_all(dir).map_err(|source| RenderError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let write_err = |source| RenderError::Write {
            path: dir.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(bytes).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;

        // Publish under the first free name; existing reports are never replaced.
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = report_filename(student_id, &at, attempt);
            let path = dir.join(&file_name);
            match staged.persist_noclobber(&path) {
                Ok(file) => {
                    let size_bytes = file
                        .metadata()
                        .map_err(|source| RenderError::Write {
                            path: path.clone(),
                            source,
                        })?
                        .len();
                    return Ok(ReportArtifact {
                        path,
                        file_name,
                        size_bytes,
                        generated_at: at,
                    });
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    log::debug!("Report name {} taken, trying next suffix", file_name);
                    staged = e.file;
                }
                Err(e) => return Err(RenderError::Write { path, source: e.error }),
            }
        }

        Err(RenderError::Write {
            path: dir.clone(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "no free report filename for this timestamp",
            ),
        })
    }
}

fn draw_table(canvas: &mut Canvas, doc: &ReportDocument) {
    let label_x = layout::MARGIN_X;
    let value_x = layout::MARGIN_X + layout::LABEL_WIDTH;

    let heading = CellStyle {
        fill: layout::HEADING_ROW_FILL,
        text: layout::HEADING_ROW_TEXT,
    };
    canvas.cell(label_x, layout::TABLE_TOP, layout::LABEL_WIDTH, heading, FONT_BOLD, layout::LABEL_HEADING);
    canvas.cell(value_x, layout::TABLE_TOP, layout::VALUE_WIDTH, heading, FONT_BOLD, layout::VALUE_HEADING);

    let data = CellStyle {
        fill: layout::DATA_ROW_FILL,
        text: layout::DATA_ROW_TEXT,
    };
    for (index, row) in doc.rows.iter().enumerate() {
        let top = layout::data_row_top(index);
        let value_font = if row.emphasis { FONT_BOLD } else { FONT_REGULAR };
        canvas.cell(label_x, top, layout::LABEL_WIDTH, data, FONT_BOLD, row.label);
        canvas.cell(value_x, top, layout::VALUE_WIDTH, data, value_font, &row.value);
    }
}

fn draw_footer(canvas: &mut Canvas, at: &DateTime<Local>) {
    canvas.line(
        layout::MARGIN_X,
        layout::FOOTER_TOP,
        layout::PAGE_WIDTH - layout::MARGIN_X,
        layout::FOOTER_TOP,
        layout::FOOTER_TEXT,
    );
    canvas.text(
        FONT_OBLIQUE,
        layout::FOOTER_TEXT_SIZE,
        layout::FOOTER_TEXT,
        layout::MARGIN_X,
        layout::FOOTER_BASELINE,
        &format!("Generated on: {}", format_generated_at(at)),
    );
    canvas.text(
        FONT_OBLIQUE,
        layout::FOOTER_TEXT_SIZE,
        layout::FOOTER_TEXT,
        layout::PAGE_WIDTH - layout::MARGIN_X - 20.0,
        layout::FOOTER_BASELINE,
        "Page 1 of 1",
    );
}

#[derive(Clone, Copy)]
struct CellStyle {
    fill: Rgb,
    text: Rgb,
}

/// Accumulates content-stream operations, taking millimetre coordinates
/// measured from the top of the page.
struct Canvas {
    page_height: f32,
    operations: Vec<Operation>,
}

impl Canvas {
    fn new(page_height: f32) -> Self {
        Self {
            page_height,
            operations: Vec::new(),
        }
    }

    fn finish(self) -> Content {
        Content {
            operations: self.operations,
        }
    }

    fn x(&self, mm: f32) -> Object {
        layout::mm_to_pt(mm).into()
    }

    fn y(&self, mm: f32) -> Object {
        (self.page_height - layout::mm_to_pt(mm)).into()
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    fn fill_color(&mut self, c: Rgb) {
        self.op("rg", vec![c.0.into(), c.1.into(), c.2.into()]);
    }

    fn stroke_color(&mut self, c: Rgb) {
        self.op("RG", vec![c.0.into(), c.1.into(), c.2.into()]);
    }

    fn rect_path(&mut self, x: f32, top: f32, width: f32, height: f32) {
        let operands = vec![
            self.x(x),
            self.y(top + height),
            layout::mm_to_pt(width).into(),
            layout::mm_to_pt(height).into(),
        ];
        self.op("re", operands);
    }

    fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, color: Rgb) {
        self.fill_color(color);
        self.rect_path(x, top, width, height);
        self.op("f", vec![]);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb) {
        self.stroke_color(color);
        self.op("w", vec![layout::mm_to_pt(layout::BORDER_WIDTH).into()]);
        let start = vec![self.x(x1), self.y(y1)];
        self.op("m", start);
        let end = vec![self.x(x2), self.y(y2)];
        self.op("l", end);
        self.op("S", vec![]);
    }

    fn text(&mut self, font: &str, size: f32, color: Rgb, x: f32, baseline: f32, text: &str) {
        self.fill_color(color);
        self.op("BT", vec![]);
        self.op("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]);
        let origin = vec![self.x(x), self.y(baseline)];
        self.op("Td", origin);
        self.op(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
    }

    /// One bordered, filled table cell of row height with clipped left-aligned text.
    fn cell(&mut self, x: f32, top: f32, width: f32, style: CellStyle, font: &str, text: &str) {
        let height = layout::ROW_HEIGHT;

        self.fill_color(style.fill);
        self.stroke_color(layout::BORDER);
        self.op("w", vec![layout::mm_to_pt(layout::BORDER_WIDTH).into()]);
        self.rect_path(x, top, width, height);
        self.op("B", vec![]);

        self.op("q", vec![]);
        self.rect_path(x, top, width, height);
        self.op("W", vec![]);
        self.op("n", vec![]);
        self.text(
            font,
            layout::CELL_TEXT_SIZE,
            style.text,
            x + layout::CELL_PADDING,
            top + height - layout::CELL_BASELINE_OFFSET,
            text,
        );
        self.op("Q", vec![]);
    }
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn build_pdf(title: &str, content: Content) -> Result<Vec<u8>, RenderError> {
    let mut document = Document::with_version("1.5");
    let pages_id: ObjectId = document.new_object_id();

    let regular_id = document.add_object(font_dictionary("Helvetica"));
    let bold_id = document.add_object(font_dictionary("Helvetica-Bold"));
    let oblique_id = document.add_object(font_dictionary("Helvetica-Oblique"));
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
            FONT_OBLIQUE => oblique_id,
        },
    });

    let encoded = content
        .encode()
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    let content_id = document.add_object(Stream::new(dictionary! {}, encoded));

    let (width, height) = layout::page_size_pt();
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        "Contents" => content_id,
        "Resources" => resources_id,
    });

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = document.add_object(dictionary! {
        "Title" => Object::String(to_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("student-report-service ", env!("CARGO_PKG_VERSION"))),
    });
    document.trailer.set("Root", catalog_id);
    document.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::common::looks_like_pdf;
    use crate::report::document::{build_rows, Row, Section};
    use crate::student::StudentRecord;
    use chrono::TimeZone;
    use std::path::Path;
    use tempfile::TempDir;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    fn renderer(dir: &Path) -> PdfRenderer {
        PdfRenderer::new(&ReportConfig {
            output_dir: dir.to_path_buf(),
            title: "Test Student Report".to_string(),
        })
    }

    fn sample_doc() -> ReportDocument {
        build_rows(&StudentRecord {
            id: 123,
            name: "Quality Test Student".to_string(),
            email: "quality.test@example.com".to_string(),
            system_access: true,
            current_address: "789 Quality Lane".to_string(),
            permanent_address: "456 Testing Blvd".to_string(),
            guardian_name: "Quality Guardian".to_string(),
            relation_of_guardian: "Uncle".to_string(),
            reporter_name: "QA Admin".to_string(),
            ..Default::default()
        })
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_encode_structure_and_content() {
        let tmp = TempDir::new().unwrap();
        let bytes = renderer(tmp.path()).encode(&sample_doc(), &fixed_time()).unwrap();

        assert!(looks_like_pdf(&bytes));
        assert!(contains(&bytes, "(Test Student Report) Tj"));
        assert!(contains(&bytes, "(Student Information Report) Tj"));
        assert!(contains(&bytes, "(Field) Tj"));
        assert!(contains(&bytes, "(Enabled) Tj"));
        assert!(contains(&bytes, "(Permanent Address) Tj"));
        assert!(contains(&bytes, "(Guardian Relation) Tj"));
        assert!(contains(&bytes, "(Page 1 of 1) Tj"));
        assert!(contains(&bytes, "(Generated on: 2024-01-15 09:30:00) Tj"));
        assert!(contains(&bytes, "/Helvetica-Bold"));
    }

    #[test]
    fn test_encode_is_deterministic_for_same_time() {
        let tmp = TempDir::new().unwrap();
        let r = renderer(tmp.path());
        let a = r.encode(&sample_doc(), &fixed_time()).unwrap();
        let b = r.encode(&sample_doc(), &fixed_time()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("reports");
        let artifact = renderer(&out).render_at(&sample_doc(), fixed_time()).unwrap();

        assert_eq!(artifact.file_name, "student_123_report_20240115_093000.pdf");
        assert_eq!(artifact.path, out.join(&artifact.file_name));
        let written = fs::read(&artifact.path).unwrap();
        assert_eq!(written.len() as u64, artifact.size_bytes);
        assert!(looks_like_pdf(&written));
    }

    #[test]
    fn test_same_second_renders_do_not_overwrite() {
        let tmp = TempDir::new().unwrap();
        let r = renderer(tmp.path());
        let first = r.render_at(&sample_doc(), fixed_time()).unwrap();
        let second = r.render_at(&sample_doc(), fixed_time()).unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(second.file_name, "student_123_report_20240115_093000_1.pdf");
        assert!(first.path.exists());
        assert!(second.path.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_page_overflow_fails_before_writing() {
        let tmp = TempDir::new().unwrap();
        let capacity = layout::row_capacity();
        let doc = ReportDocument {
            student_id: 5,
            rows: (0..=capacity)
                .map(|_| Row {
                    section: Section::Personal,
                    label: "Filler",
                    value: "x".to_string(),
                    emphasis: false,
                })
                .collect(),
        };

        let err = renderer(tmp.path()).render(&doc).unwrap_err();
        assert!(matches!(err, RenderError::PageOverflow { rows, .. } if rows == capacity + 1));
        assert!(!err.is_io());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unusable_output_dir_is_io_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, b"plain file").unwrap();

        let err = renderer(&blocker.join("reports")).render(&sample_doc()).unwrap_err();
        assert!(err.is_io());
        assert!(matches!(err, RenderError::CreateDir { .. }));
    }

    #[test]
    fn test_long_values_keep_row_count() {
        let tmp = TempDir::new().unwrap();
        let mut doc = sample_doc();
        doc.rows[1].value = "N".repeat(500);
        let bytes = renderer(tmp.path()).encode(&doc, &fixed_time()).unwrap();
        assert!(looks_like_pdf(&bytes));
        // Each cell is clipped by its own W operator.
        let clips = bytes.windows(3).filter(|w| w == b"\nW\n").count();
        assert_eq!(clips, (doc.len() + 1) * 2);
    }
}
