use crate::error::ProviderError;
use crate::lang::LanguageCode;
use async_trait::async_trait;

/// The `(text, target_lang) -> translated_text` boundary the document core talks to.
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    async fn translate(&self, text: &str, target_lang: &LanguageCode) -> Result<String, ProviderError>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn translate(&self, text: &str, target_lang: &LanguageCode) -> Result<String, ProviderError> {
        (**self).translate(text, target_lang).await
    }
}
