// Write-back serializer: the translated pane goes back into the DOCX package.
//
// Paragraphs the user never touched are copied event-for-event. A replaced
// paragraph keeps its properties and non-text content; its text runs collapse
// into one run carrying the formatting of the first run they replace.

use crate::docx::document::{collect_text, element_name};
use crate::docx::{DocumentXml, DocxPackage, DOCUMENT_PART};
use crate::error::{AlignError, DocxError, Result};
use crate::views::DualView;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::path::Path;
use tracing::{error, info, instrument};

/// Run children that only carry text (or its formatting).
const TEXT_RUN_CHILDREN: &[&[u8]] = &[
    b"w:rPr",
    b"w:t",
    b"w:tab",
    b"w:br",
    b"w:cr",
    b"w:softHyphen",
    b"w:noBreakHyphen",
    b"w:lastRenderedPageBreak",
];

/// Text-bearing run children removed when a mixed run is kept.
const STRIPPED_RUN_CHILDREN: &[&[u8]] = &[b"w:t", b"w:tab", b"w:br", b"w:cr", b"w:softHyphen", b"w:noBreakHyphen"];

/// Produce the bytes of a new DOCX whose body paragraphs carry the translated
/// pane's text. Fails with `StructuralMismatch` when the package and the view
/// disagree on the paragraph count.
pub fn serialize(view: &DualView, package: &DocxPackage) -> Result<Vec<u8>> {
    let document = DocumentXml::parse(package.document_xml()?)?;
    if document.paragraph_count() != view.len() {
        error!(
            native = document.paragraph_count(),
            view = view.len(),
            "paragraph count mismatch on write-back"
        );
        return Err(AlignError::StructuralMismatch {
            native: document.paragraph_count(),
            view: view.len(),
        });
    }

    let translated = view.translated();
    let mut rewritten = 0usize;
    let xml = document.render_with(|index, events| {
        let paragraph = &translated[index];
        if !paragraph.is_modified() {
            return Ok(None);
        }
        rewritten += 1;
        rewrite_paragraph(events, paragraph.current_translated_text()).map(Some)
    })?;

    info!(paragraphs = view.len(), rewritten, "serialized translated document");
    Ok(package.with_part(DOCUMENT_PART, xml).to_bytes()?)
}

/// Serialize and write to `path`. Nothing is written if serialization fails.
#[instrument(skip(view, package, path), fields(path = %path.display()))]
pub fn save(view: &DualView, package: &DocxPackage, path: &Path) -> Result<()> {
    let bytes = serialize(view, package)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(DocxError::from)?;
    }
    std::fs::write(path, bytes).map_err(DocxError::from)?;
    info!("saved translated document");
    Ok(())
}

pub(crate) fn rewrite_paragraph(events: &[Event<'static>], new_text: &str) -> Result<Vec<Event<'static>>, DocxError> {
    let (open, inner, close) = match events {
        [Event::Empty(start)] => (
            Event::Start(start.clone()),
            &[][..],
            Event::End(BytesEnd::new("w:p")),
        ),
        [open, inner @ .., close] => (open.clone(), inner, close.clone()),
        _ => return Err(DocxError::Malformed("empty paragraph event range".to_string())),
    };

    let mut rewrite = Rewrite::default();
    let mut field: Vec<&[Event<'static>]> = Vec::new();
    let mut field_depth = 0usize;

    for group in split_children(inner) {
        let name = element_name(&group[0]);
        let marker = if name == Some(b"w:r".as_slice()) { field_char_type(group) } else { None };

        // Complex fields (fldChar begin..end) are kept or dropped as a whole.
        if field_depth > 0 || marker.as_deref() == Some(b"begin".as_slice()) {
            match marker.as_deref() {
                Some(b"begin") => field_depth += 1,
                Some(b"end") => field_depth = field_depth.saturating_sub(1),
                _ => {}
            }
            field.push(group);
            if field_depth == 0 {
                rewrite.field(&field)?;
                field.clear();
            }
            continue;
        }

        if name == Some(b"w:pPr".as_slice()) {
            rewrite.keep(group);
            rewrite.after_properties = rewrite.kept.len();
            continue;
        }
        if collect_text(group)?.is_empty() {
            rewrite.keep(group);
            continue;
        }
        rewrite.drop_text(group);
        if name == Some(b"w:r".as_slice()) && has_non_text_content(group) {
            rewrite.kept.push(strip_text(group));
        }
    }
    if !field.is_empty() {
        rewrite.field(&field)?;
    }

    let Rewrite {
        mut kept,
        after_properties,
        insert_at,
        run_properties,
    } = rewrite;
    if !new_text.is_empty() {
        kept.insert(insert_at.unwrap_or(after_properties), text_run(run_properties, new_text));
    }

    let mut out = Vec::with_capacity(kept.iter().map(Vec::len).sum::<usize>() + 2);
    out.push(open);
    out.extend(kept.into_iter().flatten());
    out.push(close);
    Ok(out)
}

#[derive(Default)]
struct Rewrite {
    kept: Vec<Vec<Event<'static>>>,
    after_properties: usize,
    insert_at: Option<usize>,
    run_properties: Option<Vec<Event<'static>>>,
}

impl Rewrite {
    fn keep(&mut self, group: &[Event<'static>]) {
        self.kept.push(group.to_vec());
    }

    /// The new run goes where the first dropped text was.
    fn drop_text(&mut self, group: &[Event<'static>]) {
        if self.insert_at.is_none() {
            self.insert_at = Some(self.kept.len());
            self.run_properties = find_element(group, b"w:rPr");
        }
    }

    /// A field whose result shows text is replaced along with its markers and
    /// field code; a field with no visible result stays as it is.
    fn field(&mut self, groups: &[&[Event<'static>]]) -> Result<(), DocxError> {
        let mut texts = Vec::with_capacity(groups.len());
        for group in groups {
            texts.push(collect_text(group)?);
        }
        if texts.iter().all(String::is_empty) {
            for group in groups {
                self.keep(group);
            }
            return Ok(());
        }

        for (group, text) in groups.iter().zip(&texts) {
            if !text.is_empty() {
                self.drop_text(group);
            } else if element_name(&group[0]) != Some(b"w:r".as_slice()) {
                self.keep(group);
            }
        }
        Ok(())
    }
}

/// `w:fldCharType` of the run's field character, if it has one.
fn field_char_type(run: &[Event<'static>]) -> Option<Vec<u8>> {
    run.iter().find_map(|event| match event {
        Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:fldChar" => e
            .try_get_attribute("w:fldCharType")
            .ok()
            .flatten()
            .map(|a| a.value.into_owned()),
        _ => None,
    })
}

/// Top-level element groups of a well-nested event slice.
fn split_children<'e>(events: &'e [Event<'static>]) -> Vec<&'e [Event<'static>]> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, event) in events.iter().enumerate() {
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    groups.push(&events[start..=i]);
                }
            }
            _ if depth == 0 => groups.push(&events[i..=i]),
            _ => {}
        }
    }
    groups
}

fn run_children<'a>(run: &'a [Event<'static>]) -> &'a [Event<'static>] {
    match run {
        [Event::Start(_), inner @ .., Event::End(_)] => inner,
        _ => &[],
    }
}

fn has_non_text_content(run: &[Event<'static>]) -> bool {
    split_children(run_children(run))
        .iter()
        .filter_map(|g| element_name(&g[0]))
        .any(|name| !TEXT_RUN_CHILDREN.contains(&name))
}

fn strip_text(run: &[Event<'static>]) -> Vec<Event<'static>> {
    let mut out = vec![run[0].clone()];
    for group in split_children(run_children(run)) {
        match element_name(&group[0]) {
            Some(name) if STRIPPED_RUN_CHILDREN.contains(&name) => {}
            _ => out.extend(group.iter().cloned()),
        }
    }
    if let Some(close) = run.last().filter(|_| run.len() > 1) {
        out.push(close.clone());
    }
    out
}

/// First complete element named `name` anywhere inside `events`.
fn find_element(events: &[Event<'static>], name: &[u8]) -> Option<Vec<Event<'static>>> {
    let start = events.iter().position(|e| {
        matches!(e, Event::Start(_) | Event::Empty(_)) && element_name(e) == Some(name)
    })?;
    split_children(&events[start..]).first().map(|g| g.to_vec())
}

fn text_run(properties: Option<Vec<Event<'static>>>, text: &str) -> Vec<Event<'static>> {
    let text = text.replace("\r\n", "\n");
    let mut run = vec![Event::Start(BytesStart::new("w:r"))];
    run.extend(properties.unwrap_or_default());

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run.push(Event::Empty(BytesStart::new("w:br")));
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                run.push(Event::Empty(BytesStart::new("w:tab")));
            }
            if piece.is_empty() {
                continue;
            }
            let mut t = BytesStart::new("w:t");
            t.push_attribute(("xml:space", "preserve"));
            run.push(Event::Start(t));
            run.push(Event::Text(BytesText::new(piece).into_owned()));
            run.push(Event::End(BytesEnd::new("w:t")));
        }
    }

    run.push(Event::End(BytesEnd::new("w:r")));
    run
}
