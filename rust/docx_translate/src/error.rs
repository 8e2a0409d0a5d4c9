use crate::paragraph::ParagraphId;
use thiserror::Error;
use translation_service::ProviderError;

/// Failures reading or writing the DOCX package itself.
#[derive(Error, Debug)]
pub enum DocxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("package has no {0} part")]
    MissingPart(String),

    #[error("malformed document: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("document contains no paragraphs")]
    EmptyDocument,

    #[error("unknown paragraph id {0}")]
    UnknownParagraphId(ParagraphId),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("translation provider error: {0}")]
    TranslationProvider(#[from] ProviderError),

    #[error("document has {native} paragraphs but the translated view has {view}")]
    StructuralMismatch { native: usize, view: usize },

    #[error(transparent)]
    Document(#[from] DocxError),

    #[error("no document loaded")]
    NoDocument,

    #[error("no text selected")]
    NoSelection,

    #[error("a translation request is already in flight")]
    TranslationPending,

    #[error("translation finished after its document was replaced")]
    StaleTranslation,

    #[error("nothing to undo")]
    NothingToUndo,
}

impl AlignError {
    /// Recoverable errors are reported and the session carries on; the rest
    /// abort the current operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AlignError::EmptyDocument
                | AlignError::InvalidSelection(_)
                | AlignError::TranslationProvider(_)
                | AlignError::NoSelection
                | AlignError::TranslationPending
                | AlignError::StaleTranslation
                | AlignError::NothingToUndo
        )
    }
}

pub type Result<T, E = AlignError> = std::result::Result<T, E>;
