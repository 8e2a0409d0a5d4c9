pub mod document;
pub mod package;
pub mod skeleton;

pub use document::DocumentXml;
pub use package::{DocxPackage, DOCUMENT_PART};
