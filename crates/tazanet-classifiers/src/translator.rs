//! Translation adapter
//!
//! The toxicity model only understands English, so queries are translated
//! before classification. Translation is best effort: callers fall back to
//! the original text on any error.

use crate::config::TranslatorConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tazanet_core::{Error, Result};
use url::Url;

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (`auto` to detect) into `target`
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Returns the input unchanged
#[derive(Debug, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Google Translate web endpoint (`translate_a/single`, `client=gtx`)
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: Url,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::config(format!("Invalid translator endpoint '{}': {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, text: &str, source: &str, target: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", source)
            .append_pair("tl", target)
            .append_pair("dt", "t")
            .append_pair("q", text);
        url
    }
}

/// Join the translated segments of a `translate_a/single` response:
/// `[[["<translated>", "<original>", ...], ...], ...]`
fn parse_segments(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::translation("Unexpected response shape"))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(Error::translation("Empty translation"));
    }

    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response = self
            .client
            .get(self.request_url(text, source, target))
            .send()
            .await
            .map_err(|e| Error::translation(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::translation(format!("Service returned {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::translation(format!("Invalid response body: {}", e)))?;

        parse_segments(&body)
    }
}

/// Build the translator for the configuration
pub fn translator_from_config(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    if !config.enabled {
        return Ok(Arc::new(PassthroughTranslator));
    }

    Ok(Arc::new(GoogleTranslator::new(
        &config.endpoint,
        Duration::from_millis(config.timeout_ms),
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_segments() {
        let body = json!([
            [
                ["I will kill ", "Я убью ", null, null, 10],
                ["you", "тебя", null, null, 10]
            ],
            null,
            "ru"
        ]);

        assert_eq!(parse_segments(&body).unwrap(), "I will kill you");
    }

    #[test]
    fn test_parse_segments_rejects_garbage() {
        assert!(parse_segments(&json!({"error": "quota"})).is_err());
        assert!(parse_segments(&json!([[]])).is_err());
    }

    #[test]
    fn test_request_url_encodes_query() {
        let translator =
            GoogleTranslator::new("https://translate.example.com/single", Duration::from_secs(1))
                .unwrap();

        let url = translator.request_url("кровь & сталь", "auto", "en");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("sl".to_string(), "auto".to_string())));
        assert!(pairs.contains(&("tl".to_string(), "en".to_string())));
        assert!(pairs.contains(&("q".to_string(), "кровь & сталь".to_string())));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(GoogleTranslator::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_disabled_translator_passes_through() {
        let config = TranslatorConfig {
            enabled: false,
            ..Default::default()
        };

        let translator = translator_from_config(&config).unwrap();
        let text = translator.translate("привет", "auto", "en").await.unwrap();
        assert_eq!(text, "привет");
    }
}
