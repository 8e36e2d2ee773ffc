use crate::config::WatermarkConfig;
use crate::fonts::FontFace;
use crate::page_content::{Color, ContentBuilder};
use crate::signing_request::PlanTier;
use crate::{Error, PdfCompositingDocument};

const BRAND_SIZE: f32 = 42.0;
const BRAND_COLOR: Color = Color::gray(0.78);
const BRAND_OPACITY: f32 = 0.35;
const BRAND_X: f32 = 70.0;

const FOOTER_SIZE: f32 = 10.0;
const FOOTER_COLOR: Color = Color::gray(0.55);
const FOOTER_OPACITY: f32 = 0.9;
const FOOTER_POSITION: (f32, f32) = (48.0, 20.0);

impl PdfCompositingDocument {
    /// Stamp the brand mark and the upgrade footer on every page, unless the plan is `pro`.
    ///
    /// Must run after everything else was drawn. Returns the number of pages stamped.
    pub fn apply_watermark(
        &mut self,
        tier: PlanTier,
        config: &WatermarkConfig,
    ) -> Result<usize, Error> {
        if tier.is_pro() {
            log::debug!("Pro plan, no watermark.");
            return Ok(0);
        }
        let (brand_gs, brand_gs_id) = self.graphics_state(BRAND_OPACITY);
        let (footer_gs, footer_gs_id) = self.graphics_state(FOOTER_OPACITY);

        let page_ids = self.page_ids();
        for page_id in &page_ids {
            let geometry = self.page_geometry(*page_id)?;
            let mut builder = ContentBuilder::new();
            builder.with_graphics_state(&brand_gs, brand_gs_id, |builder| {
                builder.text(
                    FontFace::Bold,
                    BRAND_SIZE,
                    BRAND_COLOR,
                    geometry.origin_x + BRAND_X,
                    geometry.origin_y + geometry.height / 2.0,
                    &config.brand_text,
                );
            });
            builder.with_graphics_state(&footer_gs, footer_gs_id, |builder| {
                builder.text(
                    FontFace::Bold,
                    FOOTER_SIZE,
                    FOOTER_COLOR,
                    geometry.origin_x + FOOTER_POSITION.0,
                    geometry.origin_y + FOOTER_POSITION.1,
                    &config.footer_text,
                );
            });
            self.draw(*page_id, builder)?;
        }
        log::debug!("Watermarked {} page(s).", page_ids.len());
        Ok(page_ids.len())
    }
}
