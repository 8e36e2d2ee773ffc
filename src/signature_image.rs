use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::image_xobject::ImageXObject;
use crate::signing_request::SignatureImageMap;
use crate::{Error, PdfCompositingDocument};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use lopdf::ObjectId;
use std::collections::HashMap;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Browsers are not consistent about trailing `=`.
const DATA_URL_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extract the PNG bytes of a `data:image/png;base64,` URL.
///
/// Returns `None` for other media types, an empty payload or invalid base64.
/// The PNG itself is not validated here.
pub fn png_bytes_from_data_url(data_url: &str) -> Option<Vec<u8>> {
    let data_url = data_url.trim();
    let prefix = data_url.get(..PNG_DATA_URL_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PNG_DATA_URL_PREFIX) {
        return None;
    }
    let payload = data_url[PNG_DATA_URL_PREFIX.len()..]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>();
    if payload.is_empty() {
        return None;
    }
    DATA_URL_ENGINE.decode(payload).ok()
}

/// Decoded color image and optional alpha mask.
#[derive(Debug, Clone)]
struct DecodedImage {
    image: ImageXObject,
    mask: Option<ImageXObject>,
}

impl DecodedImage {
    fn from_png(png_bytes: &[u8]) -> Result<Self, Error> {
        let (image, mask) = ImageXObject::try_from(png::Decoder::new(png_bytes))?;
        Ok(DecodedImage { image, mask })
    }
}

/// Signature images of one request, decoded but not yet part of a document.
#[derive(Debug, Clone, Default)]
pub struct SignatureImages {
    by_signer: Vec<(String, DecodedImage)>,
    legacy: Option<DecodedImage>,
}

impl SignatureImages {
    /// Decode every usable entry. Unusable entries are reported and left out.
    pub(crate) fn decode(
        image_map: &SignatureImageMap,
        legacy_png: Option<&[u8]>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut by_signer: Vec<(String, DecodedImage)> = Vec::with_capacity(image_map.len());
        for (signer_id, data_url) in image_map {
            let png_bytes = match png_bytes_from_data_url(data_url) {
                Some(png_bytes) => png_bytes,
                None => {
                    diagnostics.push(Diagnostic::SignatureDropped {
                        signer_id: signer_id.clone(),
                        reason: "not a base64 PNG data URL".to_owned(),
                    });
                    continue;
                }
            };
            match DecodedImage::from_png(&png_bytes) {
                Ok(decoded) => {
                    // A repeated key replaces the earlier image.
                    by_signer.retain(|(id, _)| id != signer_id);
                    by_signer.push((signer_id.clone(), decoded));
                }
                Err(err) => diagnostics.push(Diagnostic::SignatureDropped {
                    signer_id: signer_id.clone(),
                    reason: err.to_string(),
                }),
            }
        }

        let legacy = legacy_png.and_then(|png_bytes| match DecodedImage::from_png(png_bytes) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                diagnostics.push(Diagnostic::LegacySignatureUnreadable {
                    reason: err.to_string(),
                });
                None
            }
        });

        log::debug!(
            "Decoded {} signer image(s), legacy image: {}.",
            by_signer.len(),
            legacy.is_some()
        );
        SignatureImages { by_signer, legacy }
    }

    pub fn len(&self) -> usize {
        self.by_signer.len() + usize::from(self.legacy.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An image XObject added to the document, with the resource name pages use for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub name: String,
    pub object_id: ObjectId,
}

/// Signer id to embedded image, for one compositing call.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSignatures {
    by_signer: HashMap<String, EmbeddedImage>,
    legacy: Option<EmbeddedImage>,
}

impl ResolvedSignatures {
    /// The image for a placement: the signer's own image, otherwise the legacy one.
    pub fn image_for(&self, signer_id: Option<&str>) -> Option<&EmbeddedImage> {
        signer_id
            .and_then(|signer_id| self.by_signer.get(signer_id))
            .or(self.legacy.as_ref())
    }
}

impl PdfCompositingDocument {
    /// Add every decoded image to the document once.
    pub fn embed_signatures(&mut self, images: SignatureImages) -> ResolvedSignatures {
        let mut by_signer = HashMap::with_capacity(images.by_signer.len());
        for (index, (signer_id, decoded)) in images.by_signer.into_iter().enumerate() {
            let image_name = format!("SignatureImage{}", index);
            let embedded = self.embed_image(decoded, image_name);
            log::debug!(
                "Embedded signature of `{}` objId: `({},{})`.",
                signer_id,
                embedded.object_id.0,
                embedded.object_id.1
            );
            by_signer.insert(signer_id, embedded);
        }
        let legacy = images
            .legacy
            .map(|decoded| self.embed_image(decoded, "LegacySignature".to_owned()));
        ResolvedSignatures { by_signer, legacy }
    }

    fn embed_image(&mut self, decoded: DecodedImage, image_name: String) -> EmbeddedImage {
        let DecodedImage { mut image, mask } = decoded;
        if let Some(mask) = mask {
            let mask_id = self.raw_document.add_object(mask);
            image.s_mask = Some(mask_id);
        }
        let object_id = self.raw_document.add_object(image);
        EmbeddedImage {
            name: image_name,
            object_id,
        }
    }
}
