// Google Cloud Translation (v2, API key) service implementation

use crate::error::ProviderError;
use crate::escape::unescape_html;
use crate::lang::LanguageCode;
use crate::service::{TranslatedText, TranslationService};
use crate::utils::url_encode;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

pub struct GoogleService {
    api_key: String,
    endpoint: String,
}

#[derive(Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleTranslation {
    translated_text: String,
    detected_source_language: Option<String>,
}

impl GoogleService {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl TranslationService for GoogleService {
    fn service_name(&self) -> &str {
        "google"
    }

    fn base_url(&self) -> String {
        format!("{}?key={}", self.endpoint, url_encode(&self.api_key))
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), "application/json; charset=utf-8".to_string())]
    }

    fn request_body(&self, source_lang: &LanguageCode, target_lang: &LanguageCode, text: &str) -> String {
        let mut body = json!({
            "q": [text],
            "target": self.map_language(target_lang),
            "format": "text",
        });
        if !source_lang.is_auto() {
            body["source"] = json!(self.map_language(source_lang));
        }
        body.to_string()
    }

    fn parse_response(&self, response: &str) -> Result<TranslatedText, ProviderError> {
        let parsed: GoogleResponse = serde_json::from_str(response)
            .map_err(|e| ProviderError::InvalidResponse(format!("JSON parse error: {}", e)))?;
        let first = parsed
            .data
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("Empty translation results".to_string()))?;
        Ok(TranslatedText {
            text: unescape_html(&first.translated_text),
            detected_language: first.detected_source_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse_source(code).unwrap()
    }

    #[test]
    fn builds_v2_request() {
        let svc = GoogleService::new("k&y".to_string());
        assert_eq!(
            svc.base_url(),
            "https://translation.googleapis.com/language/translate/v2?key=k%26y"
        );
        let body: serde_json::Value =
            serde_json::from_str(&svc.request_body(&lang("auto"), &lang("fr"), "World.")).unwrap();
        assert_eq!(body["q"][0], "World.");
        assert_eq!(body["target"], "fr");
        assert_eq!(body["format"], "text");
        assert!(body.get("source").is_none());

        let body: serde_json::Value =
            serde_json::from_str(&svc.request_body(&lang("en"), &lang("zh-CN"), "x")).unwrap();
        assert_eq!(body["source"], "en");
        assert_eq!(body["target"], "zh-CN");
    }

    #[test]
    fn parses_translation_and_unescapes() {
        let svc = GoogleService::new(String::new());
        let response = r#"{"data":{"translations":[{"translatedText":"l&#39;homme &amp; le monde","detectedSourceLanguage":"en"}]}}"#;
        let out = svc.parse_response(response).unwrap();
        assert_eq!(out.text, "l'homme & le monde");
        assert_eq!(out.detected_language.as_deref(), Some("en"));
    }

    #[test]
    fn rejects_empty_or_malformed_responses() {
        let svc = GoogleService::new(String::new());
        assert!(matches!(
            svc.parse_response(r#"{"data":{"translations":[]}}"#),
            Err(ProviderError::InvalidResponse(_))
        ));
        assert!(matches!(svc.parse_response("<html>"), Err(ProviderError::InvalidResponse(_))));
    }
}
