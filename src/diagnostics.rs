use std::fmt;

/// A record that was dropped without failing the request.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A JSON field of the request could not be parsed and fell back to its default.
    MalformedJson { field: &'static str },
    /// A signature placement was not drawn.
    PlacementSkipped { index: usize, reason: SkipReason },
    /// A text stamp was not drawn.
    TextPlacementSkipped { index: usize, reason: SkipReason },
    /// An entry of the signature image map could not be used.
    SignatureDropped { signer_id: String, reason: String },
    /// The legacy single signature upload is not a readable PNG.
    LegacySignatureUnreadable { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PageOutOfRange,
    NonFiniteCoordinates,
    EmptyText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PageOutOfRange => write!(f, "page index out of range"),
            SkipReason::NonFiniteCoordinates => write!(f, "non-finite coordinates"),
            SkipReason::EmptyText => write!(f, "empty text"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedJson { field } => {
                write!(f, "`{}` is not valid JSON, using the default", field)
            }
            Diagnostic::PlacementSkipped { index, reason } => {
                write!(f, "Signature placement #{} skipped: {}", index, reason)
            }
            Diagnostic::TextPlacementSkipped { index, reason } => {
                write!(f, "Text placement #{} skipped: {}", index, reason)
            }
            Diagnostic::SignatureDropped { signer_id, reason } => {
                write!(f, "Signature for signer `{}` dropped: {}", signer_id, reason)
            }
            Diagnostic::LegacySignatureUnreadable { reason } => {
                write!(f, "Legacy signature image ignored: {}", reason)
            }
        }
    }
}

/// Collects diagnostics for one request and mirrors each one to the log.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Continue a collection that was already logged, e.g. while parsing the request.
impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(entries: Vec<Diagnostic>) -> Self {
        Diagnostics { entries }
    }
}
