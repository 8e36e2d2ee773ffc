//! The audit trail page appended to every composed document.
//!
//! Layout and drawing are separate steps: [`AuditTrail::layout`] produces the
//! positioned lines, [`PdfCompositingDocument::append_audit_page`] draws them on
//! a fresh A4 page. The vertical position is an [`AuditCursor`] value passed
//! from one call to the next.
//!
//! The page never spills over. No list item, section or disclaimer is started
//! once the cursor is below [`OVERFLOW_FLOOR`], and wrapped continuation lines
//! stop at the bottom margin.

use crate::fonts::FontFace;
use crate::geometry::PageGeometry;
use crate::page_content::{Color, ContentBuilder};
use crate::signing_request::{SignaturePlacement, Signer, SigningRequest, TextPlacement};
use crate::text_wrap::wrap_text;
use crate::{Error, PdfCompositingDocument};
use chrono::{DateTime, SecondsFormat, Utc};
use lopdf::ObjectId;
use std::collections::HashSet;

/// ISO A4 in points.
pub const AUDIT_PAGE_WIDTH: f32 = 595.28;
pub const AUDIT_PAGE_HEIGHT: f32 = 841.89;
pub const AUDIT_MARGIN: f32 = 48.0;
/// Lists stop once the cursor is below this height.
pub const OVERFLOW_FLOOR: f32 = 80.0;
/// Added to the font size to get the line advance.
pub const LINE_GAP: f32 = 7.0;
pub const MAX_FIELD_LINES: usize = 60;
pub const MAX_LISTED_PLACEMENTS: usize = 25;

const AUDIT_TEXT_COLOR: Color = Color::gray(0.08);
const DISCLAIMER: &str =
    "Note: This audit trail is an informational record and does not replace a digital certificate.";

/// Vertical drawing position on the audit page, measured from the page bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditCursor {
    y: f32,
}

impl AuditCursor {
    pub fn top_of_page() -> Self {
        AuditCursor {
            y: AUDIT_PAGE_HEIGHT - AUDIT_MARGIN,
        }
    }

    pub fn at(y: f32) -> Self {
        AuditCursor { y }
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Move past one line of text of `font_size`.
    pub fn next_line(self, font_size: f32) -> Self {
        AuditCursor {
            y: self.y - (font_size + LINE_GAP),
        }
    }

    /// Move down by an extra `gap`.
    pub fn skip(self, gap: f32) -> Self {
        AuditCursor { y: self.y - gap }
    }

    pub fn is_exhausted(self) -> bool {
        self.y < OVERFLOW_FLOOR
    }
}

/// Which page is composed: the trail appended to a document or a standalone certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditKind {
    Trail,
    Certificate,
}

impl AuditKind {
    fn title(self) -> &'static str {
        match self {
            AuditKind::Trail => "Audit Trail",
            AuditKind::Certificate => "Signing Certificate",
        }
    }
}

/// A positioned line of the audit page.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLine {
    pub text: String,
    pub size: f32,
    pub face: FontFace,
    pub y: f32,
}

/// Everything written on the audit page.
#[derive(Debug, Clone)]
pub struct AuditTrail<'a> {
    pub kind: AuditKind,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub original_hash: &'a str,
    pub signers: Vec<&'a Signer>,
    /// At least one placement has no signer.
    pub legacy_used: bool,
    pub field_lines: &'a [String],
    pub placements: &'a [SignaturePlacement],
    /// Listed after the signature placements. Only certificates carry them.
    pub text_placements: &'a [TextPlacement],
    pub client_stamp: Option<&'a str>,
    pub wrap_width: usize,
}

impl<'a> AuditTrail<'a> {
    /// The trail appended to a composed document lists the signers that were placed.
    /// A certificate lists every signer of the request and its text stamps too.
    pub fn for_request(
        kind: AuditKind,
        request: &'a SigningRequest,
        original_hash: &'a str,
        generated_at: DateTime<Utc>,
        wrap_width: usize,
    ) -> Self {
        let signers = match kind {
            AuditKind::Trail => used_signers(&request.signers, &request.placements),
            AuditKind::Certificate => request.signers.iter().collect(),
        };
        let text_placements: &[TextPlacement] = match kind {
            AuditKind::Trail => &[],
            AuditKind::Certificate => &request.text_placements,
        };
        AuditTrail {
            kind,
            generated_at,
            original_hash,
            signers,
            legacy_used: request.placements.iter().any(|p| p.signer_id.is_none()),
            field_lines: &request.audit_field_lines,
            placements: &request.placements,
            text_placements,
            client_stamp: request.client_stamp.as_deref(),
            wrap_width,
        }
    }

    /// Position every line of the page.
    pub fn layout(&self) -> Vec<AuditLine> {
        let mut writer = LineWriter {
            lines: Vec::new(),
            wrap_width: self.wrap_width,
        };
        let cursor = AuditCursor::top_of_page();
        let cursor = writer
            .write(cursor, self.kind.title(), 18.0, FontFace::Bold)
            .skip(8.0);
        let generated = format!(
            "Generated: {}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        let cursor = writer.write(cursor, &generated, 11.0, FontFace::Regular);
        let hash_line = format!("Original Document Hash (SHA-256): {}", self.original_hash);
        let mut cursor = writer.write(cursor, &hash_line, 10.0, FontFace::Regular);
        if self.kind == AuditKind::Certificate {
            let stamp_line = format!("Client Stamp: {}", self.client_stamp.unwrap_or("-"));
            cursor = writer.write(cursor, &stamp_line, 10.0, FontFace::Regular);
        }
        let cursor = self.write_signers(&mut writer, cursor.skip(10.0)).skip(8.0);
        let cursor = self.write_field_values(&mut writer, cursor).skip(8.0);
        let cursor = self.write_placements(&mut writer, cursor).skip(8.0);
        if !cursor.is_exhausted() {
            writer.write(cursor, DISCLAIMER, 9.0, FontFace::Regular);
        }
        writer.lines
    }

    fn write_signers(&self, writer: &mut LineWriter, cursor: AuditCursor) -> AuditCursor {
        let mut cursor = writer.write(cursor, "Signers:", 12.0, FontFace::Bold);
        if !self.signers.is_empty() {
            for (index, signer) in self.signers.iter().enumerate() {
                if cursor.is_exhausted() {
                    log::debug!("Audit page full after {} signer(s).", index);
                    break;
                }
                let name = signer
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Signer {}", index + 1));
                let email = signer.email.as_deref().unwrap_or("-");
                let method = signer.signature_method.as_deref().unwrap_or("unknown");
                let signed_at = signer.signed_at.as_deref().unwrap_or("-");
                cursor = writer.write(
                    cursor,
                    &format!("\u{2022} {} <{}>", name, email),
                    11.0,
                    FontFace::Regular,
                );
                cursor = writer.write(
                    cursor,
                    &format!("  Method: {} | Signed At: {}", method, signed_at),
                    10.0,
                    FontFace::Regular,
                );
            }
            cursor
        } else if self.legacy_used {
            writer.write(
                cursor,
                "\u{2022} Signature applied (legacy/single-signer mode).",
                11.0,
                FontFace::Regular,
            )
        } else {
            writer.write(
                cursor,
                "\u{2022} No signer metadata found.",
                11.0,
                FontFace::Regular,
            )
        }
    }

    fn write_field_values(&self, writer: &mut LineWriter, cursor: AuditCursor) -> AuditCursor {
        if cursor.is_exhausted() {
            return cursor;
        }
        let mut cursor = writer.write(cursor, "Field Values:", 12.0, FontFace::Bold);
        if self.field_lines.is_empty() {
            return writer.write(
                cursor,
                "\u{2022} No field values provided.",
                11.0,
                FontFace::Regular,
            );
        }
        for line in self.field_lines.iter().take(MAX_FIELD_LINES) {
            if cursor.is_exhausted() {
                break;
            }
            cursor = writer.write(cursor, &format!("\u{2022} {}", line), 10.0, FontFace::Regular);
        }
        cursor
    }

    fn write_placements(&self, writer: &mut LineWriter, cursor: AuditCursor) -> AuditCursor {
        if cursor.is_exhausted() {
            return cursor;
        }
        let mut cursor = writer.write(cursor, "Signature Placements:", 12.0, FontFace::Bold);
        if self.placements.is_empty() && self.text_placements.is_empty() {
            return writer.write(
                cursor,
                "\u{2022} No signature placements found.",
                11.0,
                FontFace::Regular,
            );
        }
        let listed = self
            .placements
            .iter()
            .map(placement_line)
            .chain(self.text_placements.iter().map(text_placement_line))
            .take(MAX_LISTED_PLACEMENTS);
        for line in listed {
            if cursor.is_exhausted() {
                break;
            }
            cursor = writer.write(cursor, &line, 10.0, FontFace::Regular);
        }
        cursor
    }
}

struct LineWriter {
    lines: Vec<AuditLine>,
    wrap_width: usize,
}

impl LineWriter {
    /// Write wrapped `text` starting at `cursor`, returning the position below it.
    /// Lines that would fall under the bottom margin are dropped.
    fn write(&mut self, mut cursor: AuditCursor, text: &str, size: f32, face: FontFace) -> AuditCursor {
        for line in wrap_text(text, self.wrap_width) {
            if cursor.y() < AUDIT_MARGIN {
                break;
            }
            self.lines.push(AuditLine {
                text: line,
                size,
                face,
                y: cursor.y(),
            });
            cursor = cursor.next_line(size);
        }
        cursor
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn placement_line(placement: &SignaturePlacement) -> String {
    format!(
        "\u{2022} Page {} | Signer: {} | xPct={:.4}, yPct={:.4}",
        page_number(placement.page_index),
        placement.signer_id.as_deref().unwrap_or("(legacy)"),
        finite_or_zero(placement.x_pct),
        finite_or_zero(placement.y_pct)
    )
}

fn text_placement_line(placement: &TextPlacement) -> String {
    format!(
        "\u{2022} Page {} | Text: {} | xPct={:.4}, yPct={:.4}",
        page_number(placement.page_index),
        placement.text,
        finite_or_zero(placement.x_pct),
        finite_or_zero(placement.y_pct)
    )
}

/// One-based page number as typed by the client, `NaN` included.
fn page_number(page_index: f64) -> String {
    let number = page_index + 1.0;
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Signers referenced by at least one placement, in metadata order.
pub fn used_signers<'a>(signers: &'a [Signer], placements: &[SignaturePlacement]) -> Vec<&'a Signer> {
    let used_ids = placements
        .iter()
        .filter_map(|placement| placement.signer_id.as_deref())
        .collect::<HashSet<&str>>();
    signers
        .iter()
        .filter(|signer| {
            signer
                .id
                .as_deref()
                .map_or(false, |id| used_ids.contains(id))
        })
        .collect()
}

impl PdfCompositingDocument {
    /// Append an A4 page holding the audit trail.
    pub fn append_audit_page(&mut self, trail: &AuditTrail) -> Result<ObjectId, Error> {
        let page_id = self.append_page(PageGeometry::new(AUDIT_PAGE_WIDTH, AUDIT_PAGE_HEIGHT))?;
        let mut builder = ContentBuilder::new();
        let lines = trail.layout();
        for line in &lines {
            builder.text(
                line.face,
                line.size,
                AUDIT_TEXT_COLOR,
                AUDIT_MARGIN,
                line.y,
                &line.text,
            );
        }
        self.draw(page_id, builder)?;
        log::debug!(
            "Audit page added with {} line(s), objId: `({},{})`.",
            lines.len(),
            page_id.0,
            page_id.1
        );
        Ok(page_id)
    }
}
