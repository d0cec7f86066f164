// LogWarden - platform/detector.rs
//
// Azure OpenAI chat-completions client used as the anomaly detector.
//
// One blocking request per tick. The call runs inside the tick, so its
// latency pushes back the next scheduled fire; the request timeout bounds
// how far. No retry within a tick.

use crate::app::check::AnomalyDetector;
use crate::core::model::LogBatch;
use crate::core::prompt::build_prompt;
use crate::platform::config::DetectorConfig;
use crate::util::constants::MAX_ERROR_BODY_PREVIEW;
use crate::util::error::DetectorError;
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct AzureOpenAiDetector {
    client: Client,
    url: String,
    api_key: String,
    api_version: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
}

impl AzureOpenAiDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| DetectorError::Http { source })?;

        Ok(Self {
            client,
            url: completions_url(&config.endpoint, &config.deployment),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        })
    }
}

impl AnomalyDetector for AzureOpenAiDetector {
    fn analyze(&self, batch: &LogBatch) -> Result<String, DetectorError> {
        let body = json!({
            "messages": [
                { "role": "user", "content": build_prompt(batch) },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        tracing::debug!(url = %self.url, lines = batch.len(), "Detector request");

        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DetectorError::Api {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_PREVIEW),
            });
        }

        let value: Value = response.json().map_err(|e| {
            if e.is_timeout() {
                self.classify(e)
            } else {
                DetectorError::MalformedResponse {
                    reason: e.to_string(),
                }
            }
        })?;

        extract_findings(&value)
    }
}

impl AzureOpenAiDetector {
    fn classify(&self, source: reqwest::Error) -> DetectorError {
        if source.is_timeout() {
            DetectorError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            DetectorError::Http { source }
        }
    }
}

/// `{endpoint}/openai/deployments/{deployment}/chat/completions`
fn completions_url(endpoint: &str, deployment: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions",
        endpoint.trim_end_matches('/')
    )
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn extract_findings(value: &Value) -> Result<String, DetectorError> {
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| DetectorError::MalformedResponse {
            reason: "missing choices[0].message.content".to_string(),
        })?;

    if content.trim().is_empty() {
        return Err(DetectorError::EmptyResponse);
    }
    Ok(content.to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_strips_trailing_slash() {
        assert_eq!(
            completions_url("https://example.openai.azure.com/", "gpt-4o-mini"),
            "https://example.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions"
        );
    }

    #[test]
    fn test_extract_findings() {
        let value = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "1. 203.0.113.7 ..." } }
            ]
        });
        assert_eq!(extract_findings(&value).unwrap(), "1. 203.0.113.7 ...");
    }

    #[test]
    fn test_extract_findings_missing_choices_is_malformed() {
        let value = json!({ "error": { "code": "content_filter" } });
        assert!(matches!(
            extract_findings(&value),
            Err(DetectorError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_extract_findings_blank_is_empty() {
        let value = json!({ "choices": [ { "message": { "content": "  \n" } } ] });
        assert!(matches!(
            extract_findings(&value),
            Err(DetectorError::EmptyResponse)
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn test_unreachable_endpoint_is_a_detector_error() {
        let config = DetectorConfig {
            endpoint: "http://127.0.0.1:1".to_string(),
            deployment: "test".to_string(),
            api_key: "secret".to_string(),
            timeout_secs: 2,
            ..DetectorConfig::default()
        };
        let detector = AzureOpenAiDetector::new(&config).unwrap();
        let batch = LogBatch {
            lines: vec!["line".to_string()],
        };

        let result = detector.analyze(&batch);
        assert!(
            matches!(
                result,
                Err(DetectorError::Http { .. }) | Err(DetectorError::Timeout { .. })
            ),
            "got {result:?}"
        );
    }
}
