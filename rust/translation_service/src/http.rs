// HTTP executor for request-builder services

use crate::error::{classify_status, ProviderError};
use crate::lang::LanguageCode;
use crate::service::TranslationService;
use crate::translator::Translator;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTranslator<S> {
    service: S,
    client: reqwest::Client,
    source_lang: LanguageCode,
    timeout: Duration,
}

impl<S: TranslationService> HttpTranslator<S> {
    pub fn new(service: S, source_lang: LanguageCode, timeout: Duration) -> Self {
        Self {
            service,
            client: reqwest::Client::new(),
            source_lang,
            timeout,
        }
    }

    async fn send(&self, target_lang: &LanguageCode, text: &str) -> Result<(u16, String), ProviderError> {
        let mut request = self
            .client
            .post(self.service.base_url())
            .body(self.service.request_body(&self.source_lang, target_lang, text));
        for (name, value) in self.service.headers() {
            request = request.header(name, value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl<S: TranslationService> Translator for HttpTranslator<S> {
    fn name(&self) -> &str {
        self.service.service_name()
    }

    async fn translate(&self, text: &str, target_lang: &LanguageCode) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        debug!(
            service = self.service.service_name(),
            target_lang = %target_lang,
            chars = text.chars().count(),
            "sending translation request"
        );

        let (status, body) = tokio::time::timeout(self.timeout, self.send(target_lang, text))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &body, target_lang.as_str()));
        }

        let translated = self.service.parse_response(&body)?;
        if let Some(detected) = &translated.detected_language {
            debug!(detected = %detected, "provider detected source language");
        }
        Ok(translated.text)
    }
}
