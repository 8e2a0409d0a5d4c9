// Normalized HTML panes, and block extraction from converter HTML.

use crate::error::{DocxError, Result};
use crate::paragraph::Paragraph;
use crate::views::DualView;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Original,
    Translated,
}

impl Pane {
    fn title(self) -> &'static str {
        match self {
            Pane::Original => "Original",
            Pane::Translated => "Translated",
        }
    }

    fn text(self, paragraph: &Paragraph) -> &str {
        match self {
            Pane::Original => paragraph.original_text(),
            Pane::Translated => paragraph.current_translated_text(),
        }
    }
}

// Multi-column layouts from the source document are flattened so both panes
// scroll in step.
const PANE_CSS: &str = "body{column-count:1;columns:auto;max-width:48em;margin:2em auto;font-family:serif;line-height:1.5}\
p{margin:0 0 .8em;white-space:pre-wrap}";

fn esc_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(ch),
        }
    }
    out
}

/// One `<p data-pid>` per paragraph, in id order.
pub fn render_pane(view: &DualView, pane: Pane) -> String {
    let paragraphs = match pane {
        Pane::Original => view.original(),
        Pane::Translated => view.translated(),
    };

    let mut body = String::new();
    for paragraph in paragraphs {
        let text = pane.text(paragraph);
        body.push_str(&format!("<p data-pid=\"{}\">", paragraph.id()));
        if text.is_empty() {
            body.push_str("<br>");
        } else {
            body.push_str(&esc_text(text));
        }
        body.push_str("</p>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\n<body>\n{}</body></html>\n",
        pane.title(),
        PANE_CSS,
        body
    )
}

fn parse_to_dom(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

fn node_children(h: &Handle) -> Vec<Handle> {
    h.children.borrow().clone()
}

fn elem_tag_lower(h: &Handle) -> Option<String> {
    match &h.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

fn attr(h: &Handle, key: &str) -> Option<String> {
    match &h.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn find_elem(node: &Handle, name: &str) -> Option<Handle> {
    if elem_tag_lower(node).as_deref() == Some(name) {
        return Some(node.clone());
    }
    node.children.borrow().iter().find_map(|c| find_elem(c, name))
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "pre" | "blockquote"
    )
}

fn is_container_tag(tag: &str) -> bool {
    matches!(
        tag,
        "div" | "section" | "article" | "main" | "header" | "footer" | "nav" | "aside" | "ul" | "ol" | "body"
    )
}

fn is_skipped_tag(tag: &str) -> bool {
    matches!(
        tag,
        "table" | "script" | "style" | "img" | "svg" | "head" | "template" | "noscript"
    )
}

fn has_block_descendant(node: &Handle) -> bool {
    node.children.borrow().iter().any(|c| match elem_tag_lower(c) {
        Some(tag) => is_block_tag(&tag) || is_container_tag(&tag) || has_block_descendant(c),
        None => false,
    })
}

fn push_collapsed(out: &mut String, s: &str) {
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
}

fn inline_text(node: &Handle, pre: bool, out: &mut String) {
    for child in node_children(node) {
        match &child.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if pre {
                    out.push_str(&text);
                } else {
                    push_collapsed(out, &text);
                }
            }
            NodeData::Element { .. } => {
                let tag = elem_tag_lower(&child).unwrap_or_default();
                if tag == "br" {
                    out.push('\n');
                } else if !is_skipped_tag(&tag) {
                    inline_text(&child, pre || tag == "pre", out);
                }
            }
            _ => {}
        }
    }
}

fn finish_block(raw: &str, pre: bool) -> String {
    let text = if pre {
        raw.replace("\r\n", "\n").trim_matches('\n').to_string()
    } else {
        raw.split('\n').map(str::trim).collect::<Vec<_>>().join("\n")
    };
    if text.trim().is_empty() {
        String::new()
    } else {
        text
    }
}

struct Block {
    pid: Option<String>,
    text: String,
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<Block>,
    loose: String,
}

impl BlockCollector {
    fn flush_loose(&mut self) {
        let text = finish_block(&self.loose, false);
        if !text.is_empty() {
            self.blocks.push(Block { pid: None, text });
        }
        self.loose.clear();
    }

    fn walk(&mut self, node: &Handle) {
        for child in node_children(node) {
            match &child.data {
                NodeData::Text { contents } => push_collapsed(&mut self.loose, &contents.borrow()),
                NodeData::Element { .. } => {
                    let tag = elem_tag_lower(&child).unwrap_or_default();
                    if is_skipped_tag(&tag) {
                        continue;
                    }
                    if tag == "br" {
                        self.loose.push('\n');
                    } else if is_block_tag(&tag) && !has_block_descendant(&child) {
                        self.flush_loose();
                        let pre = tag == "pre";
                        let mut raw = String::new();
                        inline_text(&child, pre, &mut raw);
                        self.blocks.push(Block {
                            pid: attr(&child, "data-pid"),
                            text: finish_block(&raw, pre),
                        });
                    } else if is_block_tag(&tag) || is_container_tag(&tag) {
                        self.flush_loose();
                        self.walk(&child);
                        self.flush_loose();
                    } else {
                        self.walk(&child);
                    }
                }
                _ => {}
            }
        }
    }
}

/// Paragraph texts of converter HTML, in document order.
pub fn blocks_from_html(html: &str) -> Result<Vec<String>> {
    let dom = parse_to_dom(html);
    let root = find_elem(&dom.document, "body").unwrap_or_else(|| dom.document.clone());

    let mut collector = BlockCollector::default();
    collector.walk(&root);
    collector.flush_loose();

    let mut last_pid: Option<usize> = None;
    for block in &collector.blocks {
        let Some(raw) = &block.pid else { continue };
        let pid: usize = raw
            .trim()
            .parse()
            .map_err(|_| DocxError::Malformed(format!("data-pid {:?} is not a paragraph id", raw)))?;
        if last_pid.is_some_and(|last| pid <= last) {
            return Err(DocxError::Malformed(format!("data-pid {} appears out of document order", pid)).into());
        }
        last_pid = Some(pid);
    }

    debug!(blocks = collector.blocks.len(), "extracted html blocks");
    Ok(collector.blocks.into_iter().map(|b| b.text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlignError;
    use crate::identity;
    use crate::paragraph::{ParagraphId, ReplacementInstruction};
    use crate::replace;
    use translation_service::LanguageCode;

    fn view(blocks: &[&str]) -> DualView {
        DualView::initialize(identity::build(blocks.iter().copied()).unwrap())
    }

    #[test]
    fn panes_tag_paragraphs_with_ids() {
        let mut v = view(&["Hello.", "", "a < b"]);
        let fr = LanguageCode::parse("fr").unwrap();
        replace::apply(&mut v, &ReplacementInstruction::new(ParagraphId::new(0), "Bonjour.", fr)).unwrap();

        let original = render_pane(&v, Pane::Original);
        assert!(original.contains("<p data-pid=\"0\">Hello.</p>"));
        assert!(original.contains("<p data-pid=\"1\"><br></p>"));
        assert!(original.contains("<p data-pid=\"2\">a &lt; b</p>"));
        assert!(original.contains("column-count:1"));

        let translated = render_pane(&v, Pane::Translated);
        assert!(translated.contains("<p data-pid=\"0\">Bonjour.</p>"));
    }

    #[test]
    fn rendered_pane_reads_back_as_the_same_blocks() {
        let texts = ["Hello.", "", "two\nlines", "Fish & chips"];
        let html = render_pane(&view(&texts), Pane::Original);
        assert_eq!(blocks_from_html(&html).unwrap(), texts);
    }

    #[test]
    fn block_elements_become_paragraphs() {
        let html = "<html><head><title>t</title><style>p{}</style></head><body>\
            <h1>Title</h1><p>Some   <b>bold</b>\n text</p><ul><li>one</li><li>two</li></ul>\
            <pre>  keep\n  lines</pre><table><tr><td>cell</td></tr></table></body></html>";
        assert_eq!(
            blocks_from_html(html).unwrap(),
            vec!["Title", "Some bold text", "one", "two", "  keep\n  lines"]
        );
    }

    #[test]
    fn loose_div_text_is_a_block() {
        let html = "<body><div>loose text<p>para</p>tail</div></body>";
        assert_eq!(blocks_from_html(html).unwrap(), vec!["loose text", "para", "tail"]);
    }

    #[test]
    fn nested_blockquote_paragraphs_are_separate() {
        let html = "<body><blockquote><p>a</p><p>b</p></blockquote></body>";
        assert_eq!(blocks_from_html(html).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn out_of_order_pids_are_rejected() {
        let html = r#"<body><p data-pid="1">b</p><p data-pid="0">a</p></body>"#;
        let err = blocks_from_html(html).unwrap_err();
        assert!(matches!(err, AlignError::Document(DocxError::Malformed(_))));
    }
}
