use crate::audit_page::{AuditKind, AuditTrail};
use crate::config::CompositorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::signature_image::SignatureImages;
use crate::signing_request::{CompositeMode, PlanTier, RequestPayload, SigningRequest};
use crate::{Error, PdfCompositingDocument};
use sha2::{Digest, Sha256};

/// Hex encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Output of one compositing call.
#[derive(Debug, Clone)]
pub struct CompositingResult {
    pub pdf: Vec<u8>,
    /// SHA-256 of the uploaded bytes, before any change.
    pub original_hash: String,
    pub page_count: usize,
    /// Records that were skipped or fell back to a default.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs compositing requests. Requests share nothing but the configuration.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Compositor { config }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Parse the raw intake payload and composite it.
    pub fn composite_payload(
        &self,
        payload: RequestPayload,
        tier: PlanTier,
        mode: CompositeMode,
    ) -> Result<CompositingResult, Error> {
        let request = SigningRequest::from_payload(payload)?;
        self.composite(&request, tier, mode)
    }

    /// Produce the output PDF for `request`. Either all of it or an error.
    pub fn composite(
        &self,
        request: &SigningRequest,
        tier: PlanTier,
        mode: CompositeMode,
    ) -> Result<CompositingResult, Error> {
        match mode {
            CompositeMode::Full => self.composite_full(request, tier),
            CompositeMode::SummaryOnly => self.composite_summary(request, tier),
        }
    }

    fn composite_full(
        &self,
        request: &SigningRequest,
        tier: PlanTier,
    ) -> Result<CompositingResult, Error> {
        let original_hash = content_hash(&request.pdf);
        let mut diagnostics = Diagnostics::from(request.diagnostics.clone());

        let mut document = PdfCompositingDocument::load(&request.pdf)?;
        log::info!(
            "Loaded PDF with {} page(s), SHA-256 `{}`.",
            document.page_count(),
            original_hash
        );

        let images = SignatureImages::decode(
            &request.signature_images,
            request.legacy_signature.as_deref(),
            &mut diagnostics,
        );
        let signatures = document.embed_signatures(images);
        let placed =
            document.apply_signature_placements(&request.placements, &signatures, &mut diagnostics)?;
        let stamped = document.apply_text_placements(&request.text_placements, &mut diagnostics)?;
        log::debug!(
            "Drew {}/{} placement(s) and {}/{} text stamp(s).",
            placed,
            request.placements.len(),
            stamped,
            request.text_placements.len()
        );

        let trail = AuditTrail::for_request(
            AuditKind::Trail,
            request,
            &original_hash,
            self.config.generated_at(),
            self.config.wrap_width,
        );
        document.append_audit_page(&trail)?;
        document.apply_watermark(tier, &self.config.watermark)?;

        self.finish(document, original_hash, diagnostics)
    }

    /// Standalone certificate page. The upload is only hashed, never parsed or copied.
    fn composite_summary(
        &self,
        request: &SigningRequest,
        tier: PlanTier,
    ) -> Result<CompositingResult, Error> {
        if !tier.is_pro() {
            return Err(Error::ProRequired);
        }
        let original_hash = content_hash(&request.pdf);
        let diagnostics = Diagnostics::from(request.diagnostics.clone());

        let mut document = PdfCompositingDocument::empty();
        let trail = AuditTrail::for_request(
            AuditKind::Certificate,
            request,
            &original_hash,
            self.config.generated_at(),
            self.config.wrap_width,
        );
        document.append_audit_page(&trail)?;

        self.finish(document, original_hash, diagnostics)
    }

    fn finish(
        &self,
        document: PdfCompositingDocument,
        original_hash: String,
        diagnostics: Diagnostics,
    ) -> Result<CompositingResult, Error> {
        let page_count = document.page_count();
        let pdf = document.save(self.config.compress)?;
        log::info!(
            "Composed PDF with {} page(s), {} bytes, {} diagnostic(s).",
            page_count,
            pdf.len(),
            diagnostics.len()
        );
        Ok(CompositingResult {
            pdf,
            original_hash,
            page_count,
            diagnostics: diagnostics.into_vec(),
        })
    }
}
