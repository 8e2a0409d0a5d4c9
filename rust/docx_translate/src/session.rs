// Document session: explicit state for one open document and its two panes.

use crate::docx::{skeleton, DocumentXml, DocxPackage};
use crate::error::{AlignError, Result};
use crate::html::{self, Pane};
use crate::identity;
use crate::orchestrator::{Orchestrator, TranslationJob};
use crate::paragraph::{ParagraphId, ReplacementInstruction, TranslatedSegment};
use crate::replace::{self, ReplaceOutcome};
use crate::selection::SelectionAnchor;
use crate::views::DualView;
use crate::writeback;
use std::borrow::Cow;
use std::path::Path;
use tracing::{info, warn};
use translation_service::{LanguageCode, Translator};

#[derive(Clone, Debug)]
struct UndoEntry {
    paragraph_id: ParagraphId,
    previous_text: String,
    previous_segments: Vec<TranslatedSegment>,
}

pub struct DocumentSession {
    package: Option<DocxPackage>,
    view: DualView,
    selection: Option<SelectionAnchor>,
    target_lang: LanguageCode,
    pending: bool,
    generation: u64,
    last_replace: Option<UndoEntry>,
}

impl DocumentSession {
    pub fn new(target_lang: LanguageCode) -> Self {
        Self {
            package: None,
            view: DualView::empty(),
            selection: None,
            target_lang,
            pending: false,
            generation: 0,
            last_replace: None,
        }
    }

    pub fn view(&self) -> &DualView {
        &self.view
    }

    pub fn target_lang(&self) -> &LanguageCode {
        &self.target_lang
    }

    pub fn selection(&self) -> Option<&SelectionAnchor> {
        self.selection.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn can_undo(&self) -> bool {
        self.last_replace.is_some()
    }

    /// Open a DOCX file. Returns the paragraph count.
    pub fn load_path(&mut self, path: &Path) -> Result<usize> {
        let package = DocxPackage::open(path)?;
        info!(path = %path.display(), "opened document");
        self.load_package(package)
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        self.load_package(DocxPackage::from_bytes(bytes)?)
    }

    /// Load paragraphs from converter HTML. Saving creates a fresh DOCX.
    pub fn load_html(&mut self, html: &str) -> Result<usize> {
        let blocks = html::blocks_from_html(html)?;
        self.install(None, blocks)
    }

    fn load_package(&mut self, package: DocxPackage) -> Result<usize> {
        let blocks = DocumentXml::parse(package.document_xml()?)?.paragraph_texts()?;
        self.install(Some(package), blocks)
    }

    /// Replace all state with a new document. An empty document still
    /// resets the session, leaving it usable with empty panes.
    fn install(&mut self, package: Option<DocxPackage>, blocks: Vec<String>) -> Result<usize> {
        self.generation += 1;
        self.pending = false;
        self.selection = None;
        self.last_replace = None;

        match identity::build(blocks) {
            Ok(paragraphs) => {
                self.view = DualView::initialize(paragraphs);
                self.package = package;
                info!(paragraphs = self.view.len(), generation = self.generation, "document loaded");
                Ok(self.view.len())
            }
            Err(e) => {
                warn!(error = %e, "loaded document has no paragraphs");
                self.view = DualView::empty();
                self.package = None;
                Err(e)
            }
        }
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.view.is_empty() {
            return Err(AlignError::NoDocument);
        }
        Ok(())
    }

    pub fn select_text(&mut self, paragraph_id: ParagraphId, text: &str) -> Result<()> {
        self.ensure_loaded()?;
        let anchor = SelectionAnchor::new(paragraph_id, text);
        anchor.resolve(&self.view)?;
        self.selection = Some(anchor);
        Ok(())
    }

    pub fn select_paragraph(&mut self, paragraph_id: ParagraphId) -> Result<()> {
        self.ensure_loaded()?;
        let anchor = SelectionAnchor::whole(&self.view, paragraph_id)?;
        anchor.resolve(&self.view)?;
        self.selection = Some(anchor);
        Ok(())
    }

    /// Character offsets into the original pane's plain text.
    pub fn select_offsets(&mut self, start: usize, end: usize) -> Result<()> {
        self.ensure_loaded()?;
        let anchor = SelectionAnchor::from_pane_offsets(&self.view, start, end)?;
        anchor.resolve(&self.view)?;
        self.selection = Some(anchor);
        Ok(())
    }

    pub fn choose_target_language(&mut self, code: &str) -> Result<()> {
        self.target_lang = LanguageCode::parse(code)?;
        Ok(())
    }

    /// Validate the current selection and mark a request in flight.
    pub fn begin_translate(&mut self) -> Result<TranslationJob> {
        self.ensure_loaded()?;
        if self.pending {
            return Err(AlignError::TranslationPending);
        }
        let anchor = self.selection.as_ref().ok_or(AlignError::NoSelection)?;
        let job = TranslationJob::prepare(&self.view, anchor, &self.target_lang)?.with_generation(self.generation);
        self.pending = true;
        Ok(job)
    }

    /// Finish a request started by [`begin_translate`](Self::begin_translate).
    /// A result for a document that has since been replaced is discarded.
    pub fn complete_translate(
        &mut self,
        generation: u64,
        result: Result<ReplacementInstruction>,
    ) -> Result<ReplaceOutcome> {
        if generation != self.generation {
            warn!(generation, current = self.generation, "discarding stale translation");
            return Err(AlignError::StaleTranslation);
        }
        self.pending = false;

        let instruction = result?;
        self.apply(&instruction)
    }

    /// Translate the current selection and apply the result.
    pub async fn translate_selection<T: Translator>(&mut self, orchestrator: &Orchestrator<T>) -> Result<ReplaceOutcome> {
        let job = self.begin_translate()?;
        let generation = job.generation();
        let result = orchestrator.execute(job).await;
        self.complete_translate(generation, result)
    }

    /// Apply an instruction through the replace engine and remember the
    /// previous text for a single-level undo.
    pub fn apply(&mut self, instruction: &ReplacementInstruction) -> Result<ReplaceOutcome> {
        let outcome = replace::apply(&mut self.view, instruction)?;
        self.last_replace = Some(UndoEntry {
            paragraph_id: outcome.paragraph_id,
            previous_text: outcome.previous_text.clone(),
            previous_segments: outcome.previous_segments.clone(),
        });
        Ok(outcome)
    }

    pub fn undo_last(&mut self) -> Result<ReplaceOutcome> {
        let entry = self.last_replace.take().ok_or(AlignError::NothingToUndo)?;
        replace::restore(
            &mut self.view,
            entry.paragraph_id,
            entry.previous_text,
            entry.previous_segments,
        )
    }

    fn package_for_write(&self) -> Result<Cow<'_, DocxPackage>> {
        self.ensure_loaded()?;
        match &self.package {
            Some(package) => Ok(Cow::Borrowed(package)),
            None => {
                let texts: Vec<&str> = self.view.original().iter().map(|p| p.original_text()).collect();
                Ok(Cow::Owned(skeleton::package_from_texts(&texts)?))
            }
        }
    }

    pub fn to_docx_bytes(&self) -> Result<Vec<u8>> {
        let package = self.package_for_write()?;
        writeback::serialize(&self.view, &package)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let package = self.package_for_write()?;
        writeback::save(&self.view, &package, path)
    }

    pub fn render_original_html(&self) -> String {
        html::render_pane(&self.view, Pane::Original)
    }

    pub fn render_translated_html(&self) -> String {
        html::render_pane(&self.view, Pane::Translated)
    }
}
