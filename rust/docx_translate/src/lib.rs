//! Paragraph-aligned translation of DOCX documents.
//!
//! A loaded document becomes a fixed set of paragraphs, each keyed by its load
//! position. Two panes share those keys: the original text, which never
//! changes, and a translated copy that is overwritten one paragraph at a time.
//! Saving writes the translated pane back into the original package.

pub mod config;
pub mod docx;
pub mod error;
pub mod html;
pub mod identity;
pub mod orchestrator;
pub mod paragraph;
pub mod replace;
pub mod selection;
pub mod session;
pub mod views;
pub mod writeback;

pub use config::{AppConfig, ConfigError, LanguageOption};
pub use error::{AlignError, DocxError, Result};
pub use orchestrator::{Orchestrator, TranslationJob};
pub use paragraph::{Paragraph, ParagraphId, ReplacementInstruction, TranslatedSegment};
pub use replace::ReplaceOutcome;
pub use selection::{ResolvedSelection, SelectionAnchor, SelectionScope};
pub use session::DocumentSession;
pub use views::DualView;
