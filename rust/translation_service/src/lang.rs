// Language codes accepted by the translation providers

use crate::error::ProviderError;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    // Primary subtag plus an optional region or script subtag: en, vi, zh-CN, zh-Hans, pt-BR
    static ref LANG_CODE_RE: Regex = Regex::new(r"^[A-Za-z]{2,3}(?:[-_](?:[A-Za-z]{2}|[A-Za-z]{4}|[0-9]{3}))?$")
        .expect("language code pattern is valid");
}

pub const AUTO_DETECT: &str = "auto";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse a target language. `auto` is rejected; it only makes sense as a source.
    pub fn parse(code: &str) -> Result<Self, ProviderError> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(AUTO_DETECT) || !LANG_CODE_RE.is_match(code) {
            return Err(ProviderError::UnsupportedLanguage(code.to_string()));
        }
        Ok(Self(normalize(code)))
    }

    /// Parse a source language, where `auto` means "let the provider detect it".
    pub fn parse_source(code: &str) -> Result<Self, ProviderError> {
        if code.trim().eq_ignore_ascii_case(AUTO_DETECT) {
            return Ok(Self::auto());
        }
        Self::parse(code)
    }

    pub fn auto() -> Self {
        Self(AUTO_DETECT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_auto(&self) -> bool {
        self.0 == AUTO_DETECT
    }

    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

fn normalize(code: &str) -> String {
    let mut parts = code.splitn(2, ['-', '_']);
    let primary = parts.next().unwrap_or_default().to_ascii_lowercase();
    match parts.next() {
        // Region subtags are upper case, script subtags title case.
        Some(sub) if sub.len() == 4 => {
            let mut chars = sub.chars();
            let head = chars.next().map(|c| c.to_ascii_uppercase()).unwrap_or_default();
            format!("{}-{}{}", primary, head, chars.as_str().to_ascii_lowercase())
        }
        Some(sub) => format!("{}-{}", primary, sub.to_ascii_uppercase()),
        None => primary,
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
