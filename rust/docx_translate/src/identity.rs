// Paragraph identity index: one build pass per loaded document

use crate::error::{AlignError, Result};
use crate::paragraph::{Paragraph, ParagraphId};

/// Assign every block its id (the block's position at load time) and build the
/// paragraph set. Re-ordering never happens after load, so the position is a
/// stable key; a structural change requires a full rebuild.
pub fn build<I, S>(blocks: I) -> Result<Vec<Paragraph>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let paragraphs: Vec<Paragraph> = blocks
        .into_iter()
        .enumerate()
        .map(|(order_index, block)| Paragraph::new(ParagraphId::new(order_index), order_index, block.into()))
        .collect();

    if paragraphs.is_empty() {
        return Err(AlignError::EmptyDocument);
    }
    Ok(paragraphs)
}
