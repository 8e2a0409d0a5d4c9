// Base Service trait: each provider describes how to build a POST request and
// how to read the response; the HTTP executor in http.rs performs the call.

use crate::error::ProviderError;
use crate::lang::LanguageCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatedText {
    pub text: String,
    pub detected_language: Option<String>,
}

pub trait TranslationService: Send + Sync {
    fn service_name(&self) -> &str;

    fn base_url(&self) -> String;

    fn headers(&self) -> Vec<(String, String)>;

    fn request_body(&self, source_lang: &LanguageCode, target_lang: &LanguageCode, text: &str) -> String;

    fn parse_response(&self, response: &str) -> Result<TranslatedText, ProviderError>;

    /// Provider specific spelling of a language code.
    fn map_language(&self, lang: &LanguageCode) -> String {
        lang.as_str().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    #[default]
    Google,
    Deepl,
    Libre,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::Google => "google",
            ServiceKind::Deepl => "deepl",
            ServiceKind::Libre => "libre",
        }
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            ServiceKind::Google => "GOOGLE_TRANSLATE_API_KEY",
            ServiceKind::Deepl => "DEEPL_AUTH_KEY",
            ServiceKind::Libre => "LIBRETRANSLATE_API_KEY",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(ServiceKind::Google),
            "deepl" => Ok(ServiceKind::Deepl),
            "libre" | "libretranslate" => Ok(ServiceKind::Libre),
            other => Err(format!("Unknown service: {}", other)),
        }
    }
}
