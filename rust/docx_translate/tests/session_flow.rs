use async_trait::async_trait;
use docx_translate::docx::{skeleton, DocumentXml, DocxPackage};
use docx_translate::{identity, writeback};
use docx_translate::{AlignError, DocumentSession, DualView, Orchestrator, ParagraphId, ReplacementInstruction};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use translation_service::{LanguageCode, ProviderError, Translator};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Phrasebook provider: known phrases per language, everything else fails.
struct Phrasebook {
    calls: AtomicUsize,
}

impl Phrasebook {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Translator for Phrasebook {
    fn name(&self) -> &str {
        "phrasebook"
    }

    async fn translate(&self, text: &str, target_lang: &LanguageCode) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = match (text, target_lang.as_str()) {
            ("World.", "fr") => "Monde.",
            ("World.", "es") => "Mundo.",
            ("World.", "de") => "Welt.",
            ("Hello.", "fr") => "Bonjour.",
            ("quick", "fr") => "rapide",
            ("Good", "fr") => "Bon",
            ("world", "fr") => "monde",
            ("la", "fr") => "le",
            (_, lang) => return Err(ProviderError::UnsupportedLanguage(lang.to_string())),
        };
        Ok(out.to_string())
    }
}

fn lang(code: &str) -> LanguageCode {
    LanguageCode::parse(code).unwrap()
}

fn docx_bytes(texts: &[&str]) -> Vec<u8> {
    skeleton::package_from_texts(texts).unwrap().to_bytes().unwrap()
}

fn translated(session: &DocumentSession) -> Vec<String> {
    session
        .view()
        .translated()
        .iter()
        .map(|p| p.current_translated_text().to_string())
        .collect()
}

fn texts_of(bytes: &[u8]) -> Vec<String> {
    let package = DocxPackage::from_bytes(bytes).unwrap();
    DocumentXml::parse(package.document_xml().unwrap())
        .unwrap()
        .paragraph_texts()
        .unwrap()
}

#[tokio::test]
async fn retranslating_one_paragraph_replaces_it_each_time() {
    let mut session = DocumentSession::new(lang("vi"));
    assert_eq!(session.load_bytes(&docx_bytes(&["Hello.", "World.", "Bye."])).unwrap(), 3);
    let orchestrator = Orchestrator::new(Phrasebook::new());

    session.select_paragraph(ParagraphId::new(1)).unwrap();
    session.choose_target_language("fr").unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    assert_eq!(translated(&session), vec!["Hello.", "Monde.", "Bye."]);

    session.select_paragraph(ParagraphId::new(1)).unwrap();
    session.choose_target_language("es").unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    assert_eq!(translated(&session), vec!["Hello.", "Mundo.", "Bye."]);

    // Source text never changes, so the same selection stays valid.
    let ids: Vec<_> = session.view().ids().collect();
    assert_eq!(ids, vec![ParagraphId::new(0), ParagraphId::new(1), ParagraphId::new(2)]);
    assert!(session.view().is_aligned());

    let saved = session.to_docx_bytes().unwrap();
    assert_eq!(texts_of(&saved), vec!["Hello.", "Mundo.", "Bye."]);
}

#[tokio::test]
async fn partial_selection_keeps_the_rest_of_the_paragraph() {
    let mut session = DocumentSession::new(lang("fr"));
    session.load_bytes(&docx_bytes(&["The quick fox.", "World."])).unwrap();
    let orchestrator = Orchestrator::new(Phrasebook::new());

    session.select_text(ParagraphId::new(0), "quick").unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    assert_eq!(translated(&session), vec!["The rapide fox.", "World."]);
}

#[tokio::test]
async fn several_spans_of_one_paragraph_are_all_written() {
    let mut session = DocumentSession::new(lang("fr"));
    session.load_bytes(&docx_bytes(&["Good morning, world.", "la la land"])).unwrap();
    let orchestrator = Orchestrator::new(Phrasebook::new());

    session.select_text(ParagraphId::new(0), "Good").unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    session.select_text(ParagraphId::new(0), "world").unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    // the second paragraph starts at 21, its second "la" at 24
    session.select_offsets(24, 26).unwrap();
    session.translate_selection(&orchestrator).await.unwrap();

    let expected = vec!["Bon morning, monde.".to_string(), "la le land".to_string()];
    assert_eq!(translated(&session), expected);
    assert_eq!(texts_of(&session.to_docx_bytes().unwrap()), expected);
}

#[tokio::test]
async fn provider_failure_leaves_the_views_untouched() {
    let mut session = DocumentSession::new(lang("ja"));
    session.load_bytes(&docx_bytes(&["Hello.", "World."])).unwrap();
    let phrasebook = Phrasebook::new();
    let orchestrator = Orchestrator::new(phrasebook);

    session.select_paragraph(ParagraphId::new(0)).unwrap();
    let err = session.translate_selection(&orchestrator).await.unwrap_err();
    assert!(matches!(
        err,
        AlignError::TranslationProvider(ProviderError::UnsupportedLanguage(_))
    ));
    assert!(err.is_recoverable());
    assert_eq!(orchestrator.translator().calls.load(Ordering::SeqCst), 1);
    assert_eq!(translated(&session), vec!["Hello.", "World."]);
    assert!(!session.is_pending());
}

#[test]
fn selection_outside_the_paragraph_is_rejected() {
    let mut session = DocumentSession::new(lang("fr"));
    session.load_bytes(&docx_bytes(&["Hello.", "World."])).unwrap();

    let err = session.select_text(ParagraphId::new(0), "World.").unwrap_err();
    assert!(matches!(err, AlignError::InvalidSelection(_)));

    let err = session.select_text(ParagraphId::new(7), "Hello.").unwrap_err();
    assert!(matches!(err, AlignError::UnknownParagraphId(id) if id == ParagraphId::new(7)));

    // "Hello.\nWorld." as pane text; 3..9 spans the boundary.
    let err = session.select_offsets(3, 9).unwrap_err();
    assert!(matches!(err, AlignError::InvalidSelection(_)));
    session.select_offsets(7, 13).unwrap();
    assert_eq!(session.selection().unwrap().paragraph_id, ParagraphId::new(1));
}

#[test]
fn unknown_id_instruction_changes_nothing() {
    let mut session = DocumentSession::new(lang("fr"));
    session.load_bytes(&docx_bytes(&["Hello.", "World."])).unwrap();
    let err = session
        .apply(&ReplacementInstruction::new(ParagraphId::new(5), "x", lang("fr")))
        .unwrap_err();
    assert!(matches!(err, AlignError::UnknownParagraphId(_)));
    assert_eq!(translated(&session), vec!["Hello.", "World."]);
}

#[test]
fn mismatched_view_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("translated.docx");

    let package = DocxPackage::from_bytes(&docx_bytes(&["Hello.", "World.", "Bye."])).unwrap();
    let view = DualView::initialize(identity::build(["Hello.", "World."]).unwrap());

    let err = writeback::save(&view, &package, &out).unwrap_err();
    assert!(matches!(err, AlignError::StructuralMismatch { native: 3, view: 2 }));
    assert!(!out.exists());
}

const RICH_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Hello.</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t xml:space="preserve">World.</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#;

fn rich_docx() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opt = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file("[Content_Types].xml", opt).unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("word/document.xml", opt).unwrap();
    zip.write_all(RICH_DOCUMENT.as_bytes()).unwrap();
    zip.start_file("word/media/image1.png", opt).unwrap();
    zip.write_all(b"\x89PNG").unwrap();
    zip.finish().unwrap().into_inner()
}

#[tokio::test]
async fn write_back_keeps_structure_and_formatting() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rich.docx");
    let out = dir.path().join("rich.fr.docx");
    std::fs::write(&input, rich_docx()).unwrap();

    let mut session = DocumentSession::new(lang("fr"));
    assert_eq!(session.load_path(&input).unwrap(), 2);
    let orchestrator = Orchestrator::new(Phrasebook::new());
    session.select_paragraph(ParagraphId::new(0)).unwrap();
    session.translate_selection(&orchestrator).await.unwrap();
    session.save(&out).unwrap();

    let package = DocxPackage::from_bytes(&std::fs::read(&out).unwrap()).unwrap();
    let xml = package.document_xml().unwrap();
    assert!(xml.contains(
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Bonjour.</w:t></w:r></w:p>"#
    ));
    assert!(xml.contains("<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"));
    assert!(xml.contains(r#"<w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:t xml:space="preserve">World.</w:t></w:r></w:p>"#));
    assert_eq!(package.part("word/media/image1.png"), Some(&b"\x89PNG"[..]));
}
