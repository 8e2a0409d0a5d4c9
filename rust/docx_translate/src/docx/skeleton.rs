// Minimal WordprocessingML package, used to create documents from plain paragraphs.

use super::package::{DocxPackage, DOCUMENT_PART};
use crate::error::DocxError;

fn xml_escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn paragraph_xml(text: &str) -> String {
    if text.is_empty() {
        return "<w:p/>".to_string();
    }
    let mut runs = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            runs.push_str("<w:br/>");
        }
        if !line.is_empty() {
            runs.push_str(r#"<w:t xml:space="preserve">"#);
            runs.push_str(&xml_escape_text(line));
            runs.push_str("</w:t>");
        }
    }
    format!("<w:p><w:r>{runs}</w:r></w:p>")
}

pub fn document_xml(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| paragraph_xml(p)).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#
    )
}

fn content_types_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#
}

fn rels_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#
}

/// Package holding one body paragraph per entry of `paragraphs`.
pub fn package_from_texts(paragraphs: &[&str]) -> Result<DocxPackage, DocxError> {
    DocxPackage::from_entries(vec![
        ("[Content_Types].xml".to_string(), content_types_xml().as_bytes().to_vec()),
        ("_rels/".to_string(), Vec::new()),
        ("_rels/.rels".to_string(), rels_xml().as_bytes().to_vec()),
        ("word/".to_string(), Vec::new()),
        (DOCUMENT_PART.to_string(), document_xml(paragraphs).into_bytes()),
    ])
}
