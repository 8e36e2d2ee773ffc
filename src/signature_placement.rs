use crate::diagnostics::{Diagnostic, Diagnostics, SkipReason};
use crate::fonts::FontFace;
use crate::geometry::Rectangle;
use crate::page_content::{Color, ContentBuilder};
use crate::signature_image::ResolvedSignatures;
use crate::signing_request::SignaturePlacement;
use crate::{Error, PdfCompositingDocument};
use std::collections::BTreeMap;

pub const PLACEHOLDER_BORDER_COLOR: Color = Color(0.5, 0.2, 0.8);
pub const PLACEHOLDER_LABEL_COLOR: Color = Color(0.35, 0.12, 0.55);
pub const PLACEHOLDER_LABEL: &str = "SIGN";
const PLACEHOLDER_LABEL_SIZE: f32 = 12.0;

impl PdfCompositingDocument {
    /// Draw the signature image of every placement, in input order.
    ///
    /// Placements without a usable image get an outlined placeholder box.
    /// Returns the number of placements drawn.
    pub(crate) fn apply_signature_placements(
        &mut self,
        placements: &[SignaturePlacement],
        signatures: &ResolvedSignatures,
        diagnostics: &mut Diagnostics,
    ) -> Result<usize, Error> {
        let page_ids = self.page_ids();
        let mut pages: BTreeMap<usize, ContentBuilder> = BTreeMap::new();
        let mut drawn = 0;

        for (index, placement) in placements.iter().enumerate() {
            let page_slot = match placement.page_slot(page_ids.len()) {
                Some(page_slot) => page_slot,
                None => {
                    diagnostics.push(Diagnostic::PlacementSkipped {
                        index,
                        reason: SkipReason::PageOutOfRange,
                    });
                    continue;
                }
            };
            let geometry = self.page_geometry(page_ids[page_slot])?;
            let rect = match geometry.map_box(
                placement.x_pct,
                placement.y_pct,
                placement.w_pct,
                placement.h_pct,
            ) {
                Some(rect) => rect,
                None => {
                    diagnostics.push(Diagnostic::PlacementSkipped {
                        index,
                        reason: SkipReason::NonFiniteCoordinates,
                    });
                    continue;
                }
            };

            let builder = pages.entry(page_slot).or_default();
            match signatures.image_for(placement.signer_id.as_deref()) {
                Some(image) => {
                    log::trace!(
                        "Placement #{} on page {}: image `{}`.",
                        index,
                        page_slot + 1,
                        image.name
                    );
                    builder.image(&image.name, image.object_id, rect);
                }
                None => {
                    log::debug!(
                        "Placement #{} on page {}: no image for signer `{}`, drawing placeholder.",
                        index,
                        page_slot + 1,
                        placement.signer_id.as_deref().unwrap_or("-")
                    );
                    draw_placeholder(builder, rect);
                }
            }
            drawn += 1;
        }

        for (page_slot, builder) in pages {
            self.draw(page_ids[page_slot], builder)?;
        }
        Ok(drawn)
    }
}

fn draw_placeholder(builder: &mut ContentBuilder, rect: Rectangle) {
    builder.stroke_rect(rect, PLACEHOLDER_BORDER_COLOR, 1.0);
    builder.text(
        FontFace::Bold,
        PLACEHOLDER_LABEL_SIZE,
        PLACEHOLDER_LABEL_COLOR,
        rect.x + 6.0,
        rect.y + rect.height / 2.0 - 6.0,
        PLACEHOLDER_LABEL,
    );
}
