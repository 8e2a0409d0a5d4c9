// Selection anchors: untrusted `(paragraph_id, text)` input from a pane,
// validated into a byte span of one paragraph's source text.

use crate::error::{AlignError, Result};
use crate::paragraph::ParagraphId;
use crate::views::DualView;
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionAnchor {
    pub paragraph_id: ParagraphId,
    pub selected_text: String,
    /// Character range of `selected_text` within the paragraph, when the pane
    /// reported where the selection is.
    pub span: Option<Range<usize>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionScope {
    WholeParagraph,
    Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSelection {
    paragraph_id: ParagraphId,
    source: String,
    span: Range<usize>,
    scope: SelectionScope,
}

impl SelectionAnchor {
    pub fn new(paragraph_id: ParagraphId, selected_text: impl Into<String>) -> Self {
        Self {
            paragraph_id,
            selected_text: selected_text.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    /// Anchor covering a whole paragraph.
    pub fn whole(view: &DualView, paragraph_id: ParagraphId) -> Result<Self> {
        let (original, _) = view.lookup(paragraph_id)?;
        Ok(Self::new(paragraph_id, original.original_text()))
    }

    /// Build an anchor from character offsets into the original pane's plain
    /// text (paragraphs joined by `\n`). A range ending just past a paragraph's
    /// trailing newline still belongs to that paragraph.
    pub fn from_pane_offsets(view: &DualView, start: usize, end: usize) -> Result<Self> {
        if end <= start {
            return Err(AlignError::InvalidSelection("empty selection".to_string()));
        }

        let mut para_start = 0usize;
        for paragraph in view.original() {
            let text = paragraph.original_text();
            let para_end = para_start + text.chars().count();

            if start <= para_end && start >= para_start {
                let end = if end == para_end + 1 { para_end } else { end };
                if end > para_end {
                    return Err(AlignError::InvalidSelection(
                        "selection spans multiple paragraphs".to_string(),
                    ));
                }
                let span = (start - para_start)..(end - para_start);
                let selected: String = text.chars().skip(span.start).take(span.len()).collect();
                return Ok(Self::new(paragraph.id(), selected).with_span(span));
            }
            para_start = para_end + 1;
        }

        Err(AlignError::InvalidSelection(format!(
            "offsets {}..{} are outside the document",
            start, end
        )))
    }

    /// Validate the anchor against the paragraph it names.
    pub fn resolve(&self, view: &DualView) -> Result<ResolvedSelection> {
        let (original, _) = view.lookup(self.paragraph_id)?;
        let source = original.original_text();

        let wanted = self.selected_text.trim();
        if wanted.is_empty() {
            return Err(AlignError::InvalidSelection("empty selection".to_string()));
        }

        let span = match &self.span {
            Some(chars) => char_span(source, chars.clone())
                .filter(|bytes| source[bytes.clone()] == self.selected_text)
                .map(|bytes| trim_within(source, bytes)),
            None => locate(source, wanted),
        };
        let span = span.ok_or_else(|| {
            AlignError::InvalidSelection(format!(
                "selected text is not part of paragraph {}",
                self.paragraph_id
            ))
        })?;

        let content = trimmed_range(source);
        let scope = if span.start <= content.start && span.end >= content.end {
            SelectionScope::WholeParagraph
        } else {
            SelectionScope::Span
        };
        let span = if scope == SelectionScope::WholeParagraph { content } else { span };

        Ok(ResolvedSelection {
            paragraph_id: self.paragraph_id,
            source: source.to_string(),
            span,
            scope,
        })
    }
}

impl ResolvedSelection {
    pub fn paragraph_id(&self) -> ParagraphId {
        self.paragraph_id
    }

    pub fn scope(&self) -> &SelectionScope {
        &self.scope
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// The text to send to the provider.
    pub fn selected(&self) -> &str {
        &self.source[self.span.clone()]
    }

    /// The paragraph's original text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Byte range of the character range `chars` in `s`.
fn char_span(s: &str, chars: Range<usize>) -> Option<Range<usize>> {
    let mut bounds = s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()));
    let start = bounds.nth(chars.start)?;
    if chars.end <= chars.start {
        return Some(start..start);
    }
    let end = bounds.nth(chars.end - chars.start - 1)?;
    Some(start..end)
}

fn trim_within(s: &str, range: Range<usize>) -> Range<usize> {
    let inner = &s[range.clone()];
    let start = range.start + (inner.len() - inner.trim_start().len());
    let end = range.start + inner.trim_end().len();
    start..end.max(start)
}

fn trimmed_range(s: &str) -> Range<usize> {
    let start = s.len() - s.trim_start().len();
    let end = s.trim_end().len();
    if end < start {
        start..start
    } else {
        start..end
    }
}

/// Byte range of `needle` in `haystack`: exact match first, then a match that
/// treats every whitespace run as a single space.
fn locate(haystack: &str, needle: &str) -> Option<Range<usize>> {
    if let Some(pos) = haystack.find(needle) {
        return Some(pos..pos + needle.len());
    }

    let (hay_norm, spans) = collapse_whitespace(haystack);
    let (needle_norm, _) = collapse_whitespace(needle);
    let needle_norm = needle_norm.trim();
    if needle_norm.is_empty() {
        return None;
    }

    let byte_pos = hay_norm.find(needle_norm)?;
    let first = hay_norm[..byte_pos].chars().count();
    let count = needle_norm.chars().count();
    let start = spans.get(first)?.start;
    let end = spans.get(first + count - 1)?.end;
    Some(start..end)
}

/// Collapse whitespace runs to one space; for every output char, the byte
/// range it came from in the input.
fn collapse_whitespace(s: &str) -> (String, Vec<Range<usize>>) {
    let mut out = String::with_capacity(s.len());
    let mut spans: Vec<Range<usize>> = Vec::with_capacity(s.len());
    let mut in_ws = false;
    for (i, ch) in s.char_indices() {
        let end = i + ch.len_utf8();
        if ch.is_whitespace() {
            if in_ws {
                if let Some(last) = spans.last_mut() {
                    last.end = end;
                }
                continue;
            }
            in_ws = true;
            out.push(' ');
        } else {
            in_ws = false;
            out.push(ch);
        }
        spans.push(i..end);
    }
    (out, spans)
}
