// DeepL translation service

use crate::error::ProviderError;
use crate::lang::LanguageCode;
use crate::service::{TranslatedText, TranslationService};
use crate::utils::form_body;
use serde::Deserialize;

pub struct DeepLService {
    api_key: String,
    endpoint: Option<String>,
}

#[derive(Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Deserialize)]
struct DeepLTranslation {
    text: String,
    detected_source_language: Option<String>,
}

impl DeepLService {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn uses_free_api(&self) -> bool {
        // Free-tier keys carry a ":fx" suffix
        self.api_key.ends_with(":fx")
    }
}

impl TranslationService for DeepLService {
    fn service_name(&self) -> &str {
        "deepl"
    }

    fn base_url(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            endpoint.clone()
        } else if self.uses_free_api() {
            "https://api-free.deepl.com/v2/translate".to_string()
        } else {
            "https://api.deepl.com/v2/translate".to_string()
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/x-www-form-urlencoded".to_string()),
            ("Authorization".to_string(), format!("DeepL-Auth-Key {}", self.api_key)),
        ]
    }

    fn request_body(&self, source_lang: &LanguageCode, target_lang: &LanguageCode, text: &str) -> String {
        let target = self.map_language(target_lang);
        if source_lang.is_auto() {
            form_body(&[("text", text), ("target_lang", &target)])
        } else {
            // DeepL source languages never carry a variant
            let source = source_lang.primary().to_ascii_uppercase();
            form_body(&[("text", text), ("target_lang", &target), ("source_lang", &source)])
        }
    }

    fn parse_response(&self, response: &str) -> Result<TranslatedText, ProviderError> {
        let parsed: DeepLResponse = serde_json::from_str(response)
            .map_err(|e| ProviderError::InvalidResponse(format!("JSON parse error: {}", e)))?;
        let first = parsed
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("Empty translation results".to_string()))?;
        Ok(TranslatedText {
            text: first.text,
            detected_language: first.detected_source_language.map(|l| l.to_ascii_lowercase()),
        })
    }

    fn map_language(&self, lang: &LanguageCode) -> String {
        match lang.as_str() {
            "en" => "EN-US".to_string(),
            "pt" => "PT-BR".to_string(),
            "no" => "NB".to_string(),
            "zh" | "zh-CN" | "zh-Hans" => "ZH-HANS".to_string(),
            "zh-TW" | "zh-Hant" => "ZH-HANT".to_string(),
            other => other.to_ascii_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_endpoint_from_key_kind() {
        assert_eq!(
            DeepLService::new("abc:fx".to_string()).base_url(),
            "https://api-free.deepl.com/v2/translate"
        );
        assert_eq!(DeepLService::new("abc".to_string()).base_url(), "https://api.deepl.com/v2/translate");
    }

    #[test]
    fn maps_language_codes() {
        let svc = DeepLService::new(String::new());
        let code = |c: &str| LanguageCode::parse(c).unwrap();
        assert_eq!(svc.map_language(&code("zh-CN")), "ZH-HANS");
        assert_eq!(svc.map_language(&code("fr")), "FR");
        assert_eq!(svc.map_language(&code("en")), "EN-US");
    }

    #[test]
    fn builds_form_body_and_parses_response() {
        let svc = DeepLService::new("key".to_string());
        let body = svc.request_body(
            &LanguageCode::parse_source("auto").unwrap(),
            &LanguageCode::parse("es").unwrap(),
            "Hello world",
        );
        assert_eq!(body, "text=Hello+world&target_lang=ES");
        assert!(svc
            .headers()
            .contains(&("Authorization".to_string(), "DeepL-Auth-Key key".to_string())));

        let out = svc
            .parse_response(r#"{"translations":[{"detected_source_language":"EN","text":"Hola mundo"}]}"#)
            .unwrap();
        assert_eq!(out.text, "Hola mundo");
        assert_eq!(out.detected_language.as_deref(), Some("en"));
    }
}
