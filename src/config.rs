use crate::text_wrap::DEFAULT_WRAP_WIDTH;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Settings shared by every compositing call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositorConfig {
    pub watermark: WatermarkConfig,
    /// Characters per line on the audit page.
    pub wrap_width: usize,
    /// Compress the content streams of the output.
    pub compress: bool,
    /// Timestamp written on the audit page. Defaults to the time of compositing.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        CompositorConfig {
            watermark: WatermarkConfig::default(),
            wrap_width: DEFAULT_WRAP_WIDTH,
            compress: true,
            generated_at: None,
        }
    }
}

impl CompositorConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        if config.wrap_width == 0 {
            return Err(Error::from("`wrapWidth` must be at least 1."));
        }
        Ok(config)
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at.unwrap_or_else(Utc::now)
    }
}

/// Texts stamped on the pages of free plan documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatermarkConfig {
    pub brand_text: String,
    pub footer_text: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        WatermarkConfig {
            brand_text: "SIGNFORGE FREE".to_owned(),
            footer_text: "Free version \u{2014} upgrade to remove watermark".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(CompositorConfig::from_json("{}").unwrap(), CompositorConfig::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = CompositorConfig::from_json(
            r#"{"watermark": {"brandText": "ACME DRAFT"}, "compress": false,
                "generatedAt": "2026-10-16T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(config.watermark.brand_text, "ACME DRAFT");
        assert_eq!(config.watermark.footer_text, WatermarkConfig::default().footer_text);
        assert!(!config.compress);
        assert_eq!(config.wrap_width, DEFAULT_WRAP_WIDTH);
        assert_eq!(
            config.generated_at(),
            Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(matches!(
            CompositorConfig::from_json("{\"wrapWidth\": \"wide\"}"),
            Err(Error::JsonError(_))
        ));
        assert!(matches!(
            CompositorConfig::from_json("{\"wrapWidth\": 0}"),
            Err(Error::Other(_))
        ));
    }
}
