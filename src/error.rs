use std::fmt;

#[derive(Debug)]
pub enum Error {
    LoPdfError(lopdf::Error),
    PngDecodingError(png::DecodingError),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    /// The request did not carry the PDF upload.
    MissingPdf,
    /// The requested mode is only available on the `pro` plan.
    ProRequired,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::LoPdfError(err) => write!(f, "PDF error: {}", err),
            Error::PngDecodingError(err) => write!(f, "PNG decoding error: {}", err),
            Error::IoError(err) => write!(f, "IO error: {}", err),
            Error::JsonError(err) => write!(f, "JSON error: {}", err),
            Error::MissingPdf => write!(f, "No PDF uploaded"),
            Error::ProRequired => write!(f, "Upgrade to Pro to use this feature."),
            Error::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::LoPdfError(err) => Some(err),
            Error::PngDecodingError(err) => Some(err),
            Error::IoError(err) => Some(err),
            Error::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Self::LoPdfError(err)
    }
}

impl From<png::DecodingError> for Error {
    fn from(err: png::DecodingError) -> Self {
        Self::PngDecodingError(err)
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Self::Other(err.to_owned())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}
