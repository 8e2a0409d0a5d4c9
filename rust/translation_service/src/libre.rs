// LibreTranslate service implementation

use crate::error::ProviderError;
use crate::lang::LanguageCode;
use crate::service::{TranslatedText, TranslationService};
use crate::utils::form_body;
use serde_json::Value;

pub struct LibreService {
    url: String,
    api_key: Option<String>,
}

impl LibreService {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self { url, api_key }
    }
}

impl TranslationService for LibreService {
    fn service_name(&self) -> &str {
        "libre"
    }

    fn base_url(&self) -> String {
        let trimmed = self.url.trim_end_matches('/');
        if trimmed.ends_with("/translate") {
            trimmed.to_string()
        } else {
            format!("{}/translate", trimmed)
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), "application/x-www-form-urlencoded".to_string())]
    }

    fn request_body(&self, source_lang: &LanguageCode, target_lang: &LanguageCode, text: &str) -> String {
        let source = self.map_language(source_lang);
        let target = self.map_language(target_lang);
        let mut pairs = vec![("q", text), ("source", source.as_str()), ("target", target.as_str()), ("format", "text")];
        if let Some(ref api_key) = self.api_key {
            pairs.push(("api_key", api_key.as_str()));
        }
        form_body(&pairs)
    }

    fn parse_response(&self, response: &str) -> Result<TranslatedText, ProviderError> {
        let json: Value = serde_json::from_str(response)
            .map_err(|e| ProviderError::InvalidResponse(format!("JSON parse error: {}", e)))?;

        if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
            return Err(ProviderError::InvalidResponse(error.to_string()));
        }

        let text = json
            .get("translatedText")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ProviderError::InvalidResponse("Missing translatedText".to_string()))?
            .to_string();

        let detected_language = json
            .get("detectedLanguage")
            .and_then(|v| v.get("language"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        Ok(TranslatedText { text, detected_language })
    }

    fn map_language(&self, lang: &LanguageCode) -> String {
        // LibreTranslate only knows a handful of variants
        match lang.as_str() {
            "zh-CN" | "zh-Hans" => "zh".to_string(),
            "zh-TW" | "zh-Hant" => "zt".to_string(),
            "pt-BR" => "pb".to_string(),
            _ => lang.primary().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_translate_path_once() {
        assert_eq!(
            LibreService::new("http://localhost:5000/".to_string(), None).base_url(),
            "http://localhost:5000/translate"
        );
        assert_eq!(
            LibreService::new("http://h/translate".to_string(), None).base_url(),
            "http://h/translate"
        );
    }

    #[test]
    fn builds_body_with_optional_key() {
        let svc = LibreService::new("http://h".to_string(), Some("secret".to_string()));
        let body = svc.request_body(
            &LanguageCode::parse_source("auto").unwrap(),
            &LanguageCode::parse("zh-CN").unwrap(),
            "Bye.",
        );
        assert_eq!(body, "q=Bye.&source=auto&target=zh&format=text&api_key=secret");
    }

    #[test]
    fn surfaces_error_field() {
        let svc = LibreService::new("http://h".to_string(), None);
        assert!(matches!(
            svc.parse_response(r#"{"error":"Invalid API key"}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        let ok = svc
            .parse_response(r#"{"translatedText":"Adiós.","detectedLanguage":{"confidence":90,"language":"en"}}"#)
            .unwrap();
        assert_eq!(ok.text, "Adiós.");
        assert_eq!(ok.detected_language.as_deref(), Some("en"));
    }
}
