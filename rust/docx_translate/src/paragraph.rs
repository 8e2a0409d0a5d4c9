use std::fmt;
use std::ops::Range;
use translation_service::LanguageCode;

/// Stable paragraph identity: the paragraph's position at load time. Never
/// recomputed from content or position afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphId(usize);

impl ParagraphId {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for ParagraphId {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paragraph {
    id: ParagraphId,
    order_index: usize,
    original_text: String,
    current_translated_text: String,
    segments: Vec<TranslatedSegment>,
}

impl Paragraph {
    pub(crate) fn new(id: ParagraphId, order_index: usize, original_text: String) -> Self {
        Self {
            id,
            order_index,
            current_translated_text: original_text.clone(),
            original_text,
            segments: Vec::new(),
        }
    }

    pub fn id(&self) -> ParagraphId {
        self.id
    }

    pub fn order_index(&self) -> usize {
        self.order_index
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn current_translated_text(&self) -> &str {
        &self.current_translated_text
    }

    /// Whether the translated text differs from the source text.
    pub fn is_modified(&self) -> bool {
        self.current_translated_text != self.original_text
    }

    /// Translated spans of the source text making up the current translation,
    /// sorted by position. Empty when the translation was set wholesale.
    pub fn segments(&self) -> &[TranslatedSegment] {
        &self.segments
    }

    /// Overwrite the translated text and its segments, returning both as they
    /// were before.
    pub(crate) fn replace_translation(
        &mut self,
        text: String,
        segments: Vec<TranslatedSegment>,
    ) -> (String, Vec<TranslatedSegment>) {
        (
            std::mem::replace(&mut self.current_translated_text, text),
            std::mem::replace(&mut self.segments, segments),
        )
    }
}

/// One translated span: a byte range of the paragraph's source text and the
/// translation that stands in for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatedSegment {
    pub span: Range<usize>,
    pub text: String,
}

impl TranslatedSegment {
    pub fn new(span: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    fn overlaps(&self, other: &Range<usize>) -> bool {
        self.span.start < other.end && other.start < self.span.end
    }
}

/// Add `segment`, dropping every earlier segment it overlaps. Re-translating a
/// span therefore replaces that span's entry instead of stacking on it.
pub(crate) fn merge_segment(segments: &[TranslatedSegment], segment: TranslatedSegment) -> Vec<TranslatedSegment> {
    let mut merged: Vec<TranslatedSegment> = segments
        .iter()
        .filter(|s| !s.overlaps(&segment.span))
        .cloned()
        .collect();
    let at = merged.partition_point(|s| s.span.start < segment.span.start);
    merged.insert(at, segment);
    merged
}

/// Source text with every segment's span swapped for its translation.
/// `segments` must be sorted and non-overlapping, with spans inside `source`.
pub(crate) fn compose(source: &str, segments: &[TranslatedSegment]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for segment in segments {
        out.push_str(&source[cursor..segment.span.start]);
        out.push_str(&segment.text);
        cursor = segment.span.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Output of the orchestrator, input of the replace engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementInstruction {
    pub paragraph_id: ParagraphId,
    pub new_text: String,
    pub target_lang: LanguageCode,
    /// The span this instruction translated. `None` replaces the paragraph's
    /// translation wholesale.
    pub segment: Option<TranslatedSegment>,
}

impl ReplacementInstruction {
    pub fn new(paragraph_id: ParagraphId, new_text: impl Into<String>, target_lang: LanguageCode) -> Self {
        Self {
            paragraph_id,
            new_text: new_text.into(),
            target_lang,
            segment: None,
        }
    }

    pub fn with_segment(mut self, segment: TranslatedSegment) -> Self {
        self.segment = Some(segment);
        self
    }
}
