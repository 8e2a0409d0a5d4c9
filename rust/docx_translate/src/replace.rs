// Replace engine: overwrite one paragraph of the translated pane, found by id.

use crate::error::Result;
use crate::paragraph::{merge_segment, ParagraphId, ReplacementInstruction, TranslatedSegment};
use crate::views::DualView;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub paragraph_id: ParagraphId,
    pub previous_text: String,
    pub previous_segments: Vec<TranslatedSegment>,
    pub changed: bool,
}

/// Set the paragraph's translated text to `instruction.new_text`. Lookup is by
/// id only, so the previous translation (whatever language it was in) plays no
/// part. Every other paragraph is left untouched; on error nothing changes.
pub fn apply(view: &mut DualView, instruction: &ReplacementInstruction) -> Result<ReplaceOutcome> {
    let paragraph = view.translated_mut(instruction.paragraph_id)?;
    let segments = match &instruction.segment {
        Some(segment) => merge_segment(paragraph.segments(), segment.clone()),
        None => Vec::new(),
    };
    let outcome = set(view, instruction.paragraph_id, instruction.new_text.clone(), segments)?;

    info!(
        paragraph_id = %instruction.paragraph_id,
        target_lang = %instruction.target_lang,
        changed = outcome.changed,
        "replaced translated paragraph"
    );
    Ok(outcome)
}

/// Put back a translation captured in an earlier [`ReplaceOutcome`].
pub(crate) fn restore(
    view: &mut DualView,
    paragraph_id: ParagraphId,
    text: String,
    segments: Vec<TranslatedSegment>,
) -> Result<ReplaceOutcome> {
    let outcome = set(view, paragraph_id, text, segments)?;
    info!(paragraph_id = %paragraph_id, "restored translated paragraph");
    Ok(outcome)
}

fn set(
    view: &mut DualView,
    paragraph_id: ParagraphId,
    text: String,
    segments: Vec<TranslatedSegment>,
) -> Result<ReplaceOutcome> {
    let paragraph = view.translated_mut(paragraph_id)?;
    let changed = paragraph.current_translated_text() != text;
    let (previous_text, previous_segments) = paragraph.replace_translation(text, segments);
    Ok(ReplaceOutcome {
        paragraph_id,
        previous_text,
        previous_segments,
        changed,
    })
}
