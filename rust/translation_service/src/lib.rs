//! Cloud translation providers behind one `(text, target_lang) -> text` boundary.
//!
//! Each provider is a request builder ([`TranslationService`]); [`HttpTranslator`]
//! executes it over HTTP with a hard timeout and maps failures onto
//! distinguishable [`ProviderError`] kinds.

mod deepl;
mod error;
mod escape;
mod google;
mod http;
mod lang;
mod libre;
mod service;
mod translator;
mod utils;

pub use deepl::DeepLService;
pub use error::{classify_status, ProviderError};
pub use google::GoogleService;
pub use http::{HttpTranslator, DEFAULT_TIMEOUT};
pub use lang::{LanguageCode, AUTO_DETECT};
pub use libre::LibreService;
pub use service::{ServiceKind, TranslatedText, TranslationService};
pub use translator::Translator;

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub source_lang: LanguageCode,
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            source_lang: LanguageCode::auto(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Construct the configured provider.
pub fn build_translator(kind: ServiceKind, settings: ProviderSettings) -> Result<Box<dyn Translator>, ProviderError> {
    let ProviderSettings {
        api_key,
        endpoint,
        source_lang,
        timeout,
    } = settings;
    let api_key = api_key.filter(|k| !k.trim().is_empty());

    let translator: Box<dyn Translator> = match kind {
        ServiceKind::Google => {
            let key = api_key.ok_or_else(|| missing_key(kind))?;
            let mut svc = GoogleService::new(key);
            if let Some(endpoint) = endpoint {
                svc = svc.with_endpoint(endpoint);
            }
            Box::new(HttpTranslator::new(svc, source_lang, timeout))
        }
        ServiceKind::Deepl => {
            let key = api_key.ok_or_else(|| missing_key(kind))?;
            let mut svc = DeepLService::new(key);
            if let Some(endpoint) = endpoint {
                svc = svc.with_endpoint(endpoint);
            }
            Box::new(HttpTranslator::new(svc, source_lang, timeout))
        }
        ServiceKind::Libre => {
            let url = endpoint.ok_or_else(|| {
                ProviderError::Misconfigured("LibreTranslate requires an endpoint URL".to_string())
            })?;
            Box::new(HttpTranslator::new(LibreService::new(url, api_key), source_lang, timeout))
        }
    };
    Ok(translator)
}

fn missing_key(kind: ServiceKind) -> ProviderError {
    ProviderError::Auth(format!(
        "no API key configured for {} (set {})",
        kind,
        kind.key_env_var()
    ))
}
