// Translation orchestrator: selection + target language -> replacement
// instruction. Holds no paragraph state; the replace engine does all mutation.

use crate::error::Result;
use crate::paragraph::{compose, merge_segment, ParagraphId, ReplacementInstruction, TranslatedSegment};
use crate::selection::{ResolvedSelection, SelectionAnchor};
use crate::views::DualView;
use std::time::Duration;
use tracing::{info, instrument, warn};
use translation_service::{LanguageCode, ProviderError, Translator, DEFAULT_TIMEOUT};

/// A validated request, detached from the session so the provider call can
/// run while the panes stay readable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationJob {
    selection: ResolvedSelection,
    segments: Vec<TranslatedSegment>,
    target_lang: LanguageCode,
    generation: u64,
}

impl TranslationJob {
    pub fn prepare(view: &DualView, anchor: &SelectionAnchor, target_lang: &LanguageCode) -> Result<Self> {
        let selection = anchor.resolve(view)?;
        let (_, translated) = view.lookup(selection.paragraph_id())?;
        Ok(Self {
            segments: translated.segments().to_vec(),
            selection,
            target_lang: target_lang.clone(),
            generation: 0,
        })
    }

    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn paragraph_id(&self) -> ParagraphId {
        self.selection.paragraph_id()
    }

    pub fn target_lang(&self) -> &LanguageCode {
        &self.target_lang
    }

    pub fn selection(&self) -> &ResolvedSelection {
        &self.selection
    }
}

pub struct Orchestrator<T> {
    translator: T,
    timeout: Duration,
    retry_transient: bool,
}

impl<T: Translator> Orchestrator<T> {
    pub fn new(translator: T) -> Self {
        Self {
            translator,
            timeout: DEFAULT_TIMEOUT,
            retry_transient: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry_transient: bool) -> Self {
        self.retry_transient = retry_transient;
        self
    }

    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// Validate the anchor against `view` and translate it.
    pub async fn translate(
        &self,
        view: &DualView,
        anchor: &SelectionAnchor,
        target_lang: &LanguageCode,
    ) -> Result<ReplacementInstruction> {
        let job = TranslationJob::prepare(view, anchor, target_lang)?;
        self.execute(job).await
    }

    #[instrument(skip(self, job), fields(paragraph_id = %job.paragraph_id(), target_lang = %job.target_lang()))]
    pub async fn execute(&self, job: TranslationJob) -> Result<ReplacementInstruction> {
        let selected = job.selection.selected();
        let translated = match self.call(selected, &job.target_lang).await {
            Ok(text) => text,
            Err(e) if self.retry_transient && e.is_transient() => {
                warn!(error = %e, kind = e.kind(), attempt = 1, "transient provider failure, retrying once");
                self.call(selected, &job.target_lang).await?
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "provider call failed");
                return Err(e.into());
            }
        };

        info!(provider = self.translator.name(), "translation received");
        // spans translated earlier stay in place unless this one overlaps them
        let segment = TranslatedSegment::new(job.selection.span(), translated);
        let merged = merge_segment(&job.segments, segment.clone());
        let new_text = compose(job.selection.source(), &merged);
        Ok(ReplacementInstruction::new(job.paragraph_id(), new_text, job.target_lang).with_segment(segment))
    }

    async fn call(&self, text: &str, target_lang: &LanguageCode) -> Result<String, ProviderError> {
        tokio::time::timeout(self.timeout, self.translator.translate(text, target_lang))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))?
    }
}
