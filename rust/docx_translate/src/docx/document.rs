// Event-level view of word/document.xml.
//
// The document is kept as the full owned event stream so untouched markup is
// written back byte-for-byte; body paragraphs are ranges into that stream.

use crate::error::DocxError;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use std::ops::Range;

pub(crate) const W_BODY: &[u8] = b"w:body";
pub(crate) const W_P: &[u8] = b"w:p";

/// Subtrees that never contribute visible paragraph text.
const NON_TEXT_SUBTREES: &[&[u8]] = &[
    b"w:pPr",
    b"w:rPr",
    b"w:del",
    b"w:moveFrom",
    b"w:delText",
    b"w:instrText",
    b"w:drawing",
    b"w:pict",
    b"w:object",
    b"mc:AlternateContent",
];

#[derive(Debug)]
pub struct DocumentXml {
    events: Vec<Event<'static>>,
    paragraphs: Vec<Range<usize>>,
}

impl DocumentXml {
    pub fn parse(xml: &str) -> Result<Self, DocxError> {
        let mut reader = Reader::from_str(xml);
        let mut events = Vec::new();
        let mut paragraphs = Vec::new();
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut open: Option<usize> = None;
        let mut saw_body = false;

        loop {
            let event = reader.read_event()?;
            let parent_is_body = stack.last().map(Vec::as_slice) == Some(W_BODY);
            match &event {
                Event::Start(e) => {
                    let name = e.name().into_inner();
                    if name == W_BODY {
                        saw_body = true;
                    }
                    if name == W_P && parent_is_body {
                        open = Some(events.len());
                    }
                    stack.push(name.to_vec());
                }
                Event::End(_) => {
                    stack.pop();
                    if stack.last().map(Vec::as_slice) == Some(W_BODY) {
                        if let Some(start) = open.take() {
                            paragraphs.push(start..events.len() + 1);
                        }
                    }
                }
                Event::Empty(e) => {
                    if e.name().into_inner() == W_P && parent_is_body {
                        paragraphs.push(events.len()..events.len() + 1);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            events.push(event.into_owned());
        }

        if !saw_body {
            return Err(DocxError::Malformed("document has no w:body".to_string()));
        }
        if !stack.is_empty() {
            return Err(DocxError::Malformed("unclosed elements at end of document".to_string()));
        }
        Ok(Self { events, paragraphs })
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_events(&self, index: usize) -> Option<&[Event<'static>]> {
        self.paragraphs.get(index).map(|r| &self.events[r.clone()])
    }

    /// Visible text of every body paragraph, in document order.
    pub fn paragraph_texts(&self) -> Result<Vec<String>, DocxError> {
        self.paragraphs
            .iter()
            .map(|r| collect_text(&self.events[r.clone()]))
            .collect()
    }

    /// Re-serialize the document. `replace` may return new events for a paragraph;
    /// returning `None` keeps the paragraph exactly as read.
    pub fn render_with<F>(&self, mut replace: F) -> Result<Vec<u8>, DocxError>
    where
        F: FnMut(usize, &[Event<'static>]) -> Result<Option<Vec<Event<'static>>>, DocxError>,
    {
        let mut writer = Writer::new(Vec::with_capacity(self.events.len() * 16));
        let mut cursor = 0;
        for (index, range) in self.paragraphs.iter().enumerate() {
            for event in &self.events[cursor..range.start] {
                writer.write_event(event)?;
            }
            let original = &self.events[range.clone()];
            match replace(index, original)? {
                Some(events) => {
                    for event in &events {
                        writer.write_event(event)?;
                    }
                }
                None => {
                    for event in original {
                        writer.write_event(event)?;
                    }
                }
            }
            cursor = range.end;
        }
        for event in &self.events[cursor..] {
            writer.write_event(event)?;
        }
        Ok(writer.into_inner())
    }
}

pub(crate) fn element_name<'a>(event: &'a Event<'_>) -> Option<&'a [u8]> {
    match event {
        Event::Start(e) | Event::Empty(e) => Some(e.name().into_inner()),
        Event::End(e) => Some(e.name().into_inner()),
        _ => None,
    }
}

/// Text a run of events contributes: `w:t` content, tabs and breaks.
pub(crate) fn collect_text(events: &[Event<'_>]) -> Result<String, DocxError> {
    let mut out = String::new();
    let mut skip_depth = 0usize;
    let mut in_text = false;

    for event in events {
        match event {
            Event::Start(e) => {
                let name = e.name().into_inner();
                if skip_depth > 0 || NON_TEXT_SUBTREES.contains(&name) {
                    skip_depth += 1;
                } else if name == b"w:t" {
                    in_text = true;
                }
            }
            Event::End(e) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                } else if e.name().into_inner() == b"w:t" {
                    in_text = false;
                }
            }
            Event::Empty(e) if skip_depth == 0 => match e.name().into_inner() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if skip_depth == 0 && in_text => out.push_str(&t.unescape()?),
            _ => {}
        }
    }
    Ok(out)
}
