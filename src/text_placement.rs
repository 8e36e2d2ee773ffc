use crate::diagnostics::{Diagnostic, Diagnostics, SkipReason};
use crate::fonts::FontFace;
use crate::geometry::TEXT_ANCHOR_OFFSET;
use crate::page_content::{Color, ContentBuilder};
use crate::signing_request::TextPlacement;
use crate::{Error, PdfCompositingDocument};
use std::collections::BTreeMap;

pub const TEXT_STAMP_SIZE: f32 = 12.0;
pub const TEXT_STAMP_COLOR: Color = Color::gray(0.08);

impl PdfCompositingDocument {
    /// Draw every text stamp, in input order, on top of the signature placements.
    pub(crate) fn apply_text_placements(
        &mut self,
        text_placements: &[TextPlacement],
        diagnostics: &mut Diagnostics,
    ) -> Result<usize, Error> {
        let page_ids = self.page_ids();
        let mut pages: BTreeMap<usize, ContentBuilder> = BTreeMap::new();
        let mut drawn = 0;

        for (index, stamp) in text_placements.iter().enumerate() {
            let skip = |reason| Diagnostic::TextPlacementSkipped { index, reason };
            let page_slot = match stamp.page_slot(page_ids.len()) {
                Some(page_slot) => page_slot,
                None => {
                    diagnostics.push(skip(SkipReason::PageOutOfRange));
                    continue;
                }
            };
            let geometry = self.page_geometry(page_ids[page_slot])?;
            let (x, y) = match geometry.map_text_anchor(stamp.x_pct, stamp.y_pct) {
                Some(anchor) => anchor,
                None => {
                    diagnostics.push(skip(SkipReason::NonFiniteCoordinates));
                    continue;
                }
            };
            let lines = stamp_lines(&stamp.text);
            if lines.is_empty() {
                diagnostics.push(skip(SkipReason::EmptyText));
                continue;
            }

            let builder = pages.entry(page_slot).or_default();
            for (line_index, line) in lines.iter().enumerate() {
                let line_y = y - TEXT_ANCHOR_OFFSET * line_index as f32;
                builder.text(FontFace::Regular, TEXT_STAMP_SIZE, TEXT_STAMP_COLOR, x, line_y, line);
            }
            drawn += 1;
        }

        for (page_slot, builder) in pages {
            self.draw(page_ids[page_slot], builder)?;
        }
        Ok(drawn)
    }
}

/// Lines of a stamp. Empty when the stamp has no visible text.
fn stamp_lines(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageGeometry;
    use lopdf::content::Content;

    #[test]
    fn multi_line_stamps_step_down() {
        assert_eq!(stamp_lines("a\r\nb\n\nc"), vec!["a", "b", "", "c"]);
        assert!(stamp_lines("  \n ").is_empty());
    }

    #[test]
    fn stamps_are_anchored_below_the_point() {
        let mut document = PdfCompositingDocument::empty();
        let page_id = document.append_page(PageGeometry::new(600.0, 800.0)).unwrap();
        let stamps = vec![
            TextPlacement::new(0, 0.5, 0.25, "Alice\nGhent"),
            TextPlacement::new(0, 0.5, 0.25, ""),
            TextPlacement::new(3, 0.5, 0.25, "elsewhere"),
        ];
        let mut diagnostics = Diagnostics::new();
        let drawn = document.apply_text_placements(&stamps, &mut diagnostics).unwrap();
        assert_eq!(drawn, 1);
        assert_eq!(
            diagnostics.into_vec(),
            vec![
                Diagnostic::TextPlacementSkipped {
                    index: 1,
                    reason: SkipReason::EmptyText
                },
                Diagnostic::TextPlacementSkipped {
                    index: 2,
                    reason: SkipReason::PageOutOfRange
                },
            ]
        );

        let content = document
            .get_document_ref()
            .get_page_content(page_id)
            .unwrap();
        let positions = Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .filter(|op| op.operator == "Td")
            .map(|op| {
                (
                    op.operands[0].as_float().unwrap(),
                    op.operands[1].as_float().unwrap(),
                )
            })
            .collect::<Vec<_>>();
        // 800 - 200 - 14, then one line lower.
        assert_eq!(positions, vec![(300.0, 586.0), (300.0, 572.0)]);
    }
}
