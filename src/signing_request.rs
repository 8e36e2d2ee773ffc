//! The records a compositing request is made of, and their lenient parsing.
//!
//! The intake layer hands over JSON strings that were typed in a browser.
//! Nothing in here rejects a request for bad content: unparsable blobs fall
//! back to empty defaults and unusable values are coerced the way a number-like
//! form field would be.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Entitlement level of the requesting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    /// Anything but `"pro"` is treated as the free plan.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("pro") {
            PlanTier::Pro
        } else {
            PlanTier::Free
        }
    }

    pub fn is_pro(self) -> bool {
        self == PlanTier::Pro
    }
}

impl<'de> Deserialize<'de> for PlanTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(PlanTier::parse).unwrap_or_default())
    }
}

/// What the compositor produces for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Draw placements and stamps onto the upload, append the audit page and watermark.
    #[default]
    Full,
    /// Produce a standalone certificate page describing the upload.
    SummaryOnly,
}

/// Metadata of one person signing the document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signature_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signed_at: Option<String>,
}

/// Where a signature image goes, in normalized page coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePlacement {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signer_id: Option<String>,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub page_index: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub x_pct: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub y_pct: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub w_pct: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub h_pct: f64,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub locked: bool,
}

impl SignaturePlacement {
    pub fn new(page_index: usize, x_pct: f64, y_pct: f64, w_pct: f64, h_pct: f64) -> Self {
        SignaturePlacement {
            id: None,
            signer_id: None,
            page_index: page_index as f64,
            x_pct,
            y_pct,
            w_pct,
            h_pct,
            locked: false,
        }
    }

    pub fn with_signer(mut self, signer_id: &str) -> Self {
        self.signer_id = Some(signer_id.to_owned()).filter(|id| !id.is_empty());
        self
    }

    /// The page this placement targets, if it exists in a document of `page_count` pages.
    pub fn page_slot(&self, page_count: usize) -> Option<usize> {
        page_slot(self.page_index, page_count)
    }
}

/// A text stamp anchored at a normalized page position. The height is advisory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPlacement {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub page_index: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub x_pct: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub y_pct: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub w_pct: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_number")]
    pub h_pct: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub locked: bool,
}

impl TextPlacement {
    pub fn new(page_index: usize, x_pct: f64, y_pct: f64, text: &str) -> Self {
        TextPlacement {
            id: None,
            page_index: page_index as f64,
            x_pct,
            y_pct,
            w_pct: f64::NAN,
            h_pct: f64::NAN,
            text: text.to_owned(),
            locked: false,
        }
    }

    pub fn page_slot(&self, page_count: usize) -> Option<usize> {
        page_slot(self.page_index, page_count)
    }
}

/// Signer id to `data:` URL, in the order the client sent them.
pub type SignatureImageMap = Vec<(String, String)>;

/// The raw request as delivered by the upload intake.
#[derive(Debug, Clone, Default)]
pub struct RequestPayload {
    pub pdf: Option<Vec<u8>>,
    /// Optional single PNG applied to placements without a signer.
    pub legacy_signature: Option<Vec<u8>>,
    pub placements: Option<String>,
    pub text_placements: Option<String>,
    pub signer_meta_json: Option<String>,
    /// Older clients send the signer list under this name.
    pub signers: Option<String>,
    pub signatures_json: Option<String>,
    pub audit_field_lines: Option<String>,
    pub client_stamp: Option<String>,
}

/// A fully parsed compositing request.
#[derive(Debug, Clone, Default)]
pub struct SigningRequest {
    pub pdf: Vec<u8>,
    pub legacy_signature: Option<Vec<u8>>,
    pub placements: Vec<SignaturePlacement>,
    pub text_placements: Vec<TextPlacement>,
    pub signers: Vec<Signer>,
    pub signature_images: SignatureImageMap,
    pub audit_field_lines: Vec<String>,
    pub client_stamp: Option<String>,
    /// Fallbacks taken while parsing the payload.
    pub diagnostics: Vec<Diagnostic>,
}

impl SigningRequest {
    pub fn new(pdf: Vec<u8>) -> Self {
        SigningRequest {
            pdf,
            ..Default::default()
        }
    }

    /// Parse the intake payload. Only a missing PDF is an error.
    pub fn from_payload(payload: RequestPayload) -> Result<Self, Error> {
        let pdf = payload.pdf.ok_or(Error::MissingPdf)?;
        let mut diagnostics = Diagnostics::new();

        let placements = parse_record_list(
            payload.placements.as_deref(),
            "placements",
            &mut diagnostics,
        );
        let text_placements = parse_record_list(
            payload.text_placements.as_deref(),
            "textPlacements",
            &mut diagnostics,
        );
        let (signers_field, signers_raw) = match payload.signer_meta_json.as_deref() {
            Some(raw) => ("signerMetaJson", Some(raw)),
            None => ("signers", payload.signers.as_deref()),
        };
        let signers = parse_record_list(signers_raw, signers_field, &mut diagnostics);
        let signature_images =
            parse_signature_map(payload.signatures_json.as_deref(), &mut diagnostics);

        Ok(SigningRequest {
            pdf,
            legacy_signature: payload.legacy_signature.filter(|bytes| !bytes.is_empty()),
            placements,
            text_placements,
            signers,
            signature_images,
            audit_field_lines: parse_field_lines(payload.audit_field_lines.as_deref()),
            client_stamp: payload
                .client_stamp
                .filter(|stamp| !stamp.trim().is_empty()),
            diagnostics: diagnostics.into_vec(),
        })
    }
}

/// Parse a JSON array of records. Elements that do not describe a record are left out.
fn parse_record_list<T: DeserializeOwned>(
    raw: Option<&str>,
    field: &'static str,
    diagnostics: &mut Diagnostics,
) -> Vec<T> {
    let value = match parse_json_field(raw, field, diagnostics) {
        Some(value) => value,
        None => return Vec::new(),
    };
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    log::debug!("Ignoring entry of `{}`: {}", field, err);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_signature_map(raw: Option<&str>, diagnostics: &mut Diagnostics) -> SignatureImageMap {
    match parse_json_field(raw, "signaturesJson", diagnostics) {
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(signer_id, value)| (signer_id, value.as_str().unwrap_or_default().to_owned()))
            .collect(),
        _ => Vec::new(),
    }
}

/// `None` for absent, blank or unparsable input. Only the latter is reported.
fn parse_json_field(
    raw: Option<&str>,
    field: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<Value> {
    let raw = raw.filter(|raw| !raw.trim().is_empty())?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("`{}` parse error: {}", field, err);
            diagnostics.push(Diagnostic::MalformedJson { field });
            None
        }
    }
}

/// Split newline separated field values, dropping blank lines.
pub fn parse_field_lines(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn page_slot(page_index: f64, page_count: usize) -> Option<usize> {
    if !page_index.is_finite() || page_index.fract() != 0.0 || page_index < 0.0 {
        return None;
    }
    let index = page_index as usize;
    (index < page_count).then_some(index)
}

fn not_a_number() -> f64 {
    f64::NAN
}

/// Number-like coercion of a JSON value.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .unwrap_or(f64::NAN)
            }
        }
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// String coercion keeping only values that would read as "set".
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_owned()),
        _ => None,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(coerce_number(&Value::deserialize(deserializer)?))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(coerce_string(&Value::deserialize(deserializer)?))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(coerce_string(&Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => flag,
        Value::String(text) => text == "true",
        Value::Number(number) => number.as_f64().map_or(false, |n| n != 0.0),
        _ => false,
    })
}
