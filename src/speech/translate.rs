use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TranslatorConfig;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("token request failed: {0}")]
    Token(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The translation collaborator. `Ok(None)` means the service answered but
/// produced no usable translation; callers leave the glyph state unchanged.
pub trait Translate: Send + Sync {
    fn translate(&self, text: &str) -> Result<Option<String>, TranslateError>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
// Issued tokens are valid for 10 minutes; refresh well before that.
const TOKEN_TTL: Duration = Duration::from_secs(8 * 60);

struct CachedToken {
    value: String,
    fetched_at: Instant,
}

/// Microsoft Translator v3 client: a subscription key buys a short-lived
/// bearer token from the token endpoint, which authorizes translate calls.
pub struct HttpTranslator {
    client: Client,
    config: TranslatorConfig,
    token: Mutex<Option<CachedToken>>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

impl HttpTranslator {
    pub fn new(config: TranslatorConfig) -> Result<Self, TranslateError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            token: Mutex::new(None),
        })
    }

    fn bearer_token(&self) -> Result<String, TranslateError> {
        let mut cache = self.token.lock().unwrap();
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(cached.value.clone());
            }
        }

        let response = self
            .client
            .post(&self.config.token_endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .header("Content-Length", "0")
            .send()?;
        if !response.status().is_success() {
            return Err(TranslateError::Token(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }
        let value = response.text()?;
        if value.is_empty() {
            return Err(TranslateError::Token("token endpoint returned an empty body".into()));
        }

        *cache = Some(CachedToken {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }
}

impl Translate for HttpTranslator {
    fn translate(&self, text: &str) -> Result<Option<String>, TranslateError> {
        let token = self.bearer_token()?;
        let body = [TranslateRequest { text }];

        let response: Vec<TranslateResponse> = self
            .client
            .post(&self.config.endpoint)
            .query(&[
                ("api-version", "3.0"),
                ("from", self.config.source_lang.as_str()),
                ("to", self.config.target_lang.as_str()),
            ])
            .bearer_auth(token)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response
            .into_iter()
            .next()
            .and_then(|r| r.translations.into_iter().next())
            .map(|t| t.text)
            .filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shape_parses() {
        let raw = r#"[{"translations":[{"text":"你好。","to":"zh-Hans"}]}]"#;
        let parsed: Vec<TranslateResponse> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed[0].translations[0].text, "你好。");
    }

    #[test]
    fn empty_translation_list_parses_to_none() {
        let raw = r#"[{"translations":[]}]"#;
        let parsed: Vec<TranslateResponse> = serde_json::from_str(raw).unwrap();
        let first = parsed
            .into_iter()
            .next()
            .and_then(|r| r.translations.into_iter().next());
        assert!(first.is_none());
    }
}
