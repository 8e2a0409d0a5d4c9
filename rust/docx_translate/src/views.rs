// Dual-view synchronizer: the original pane and the translated pane over one
// paragraph set.

use crate::error::{AlignError, Result};
use crate::paragraph::{Paragraph, ParagraphId};
use tracing::error;

/// Both panes always hold the same ids in the same order. Only the translated
/// pane's text ever changes, and only through [`crate::replace::apply`].
#[derive(Clone, Debug, Default)]
pub struct DualView {
    original: Vec<Paragraph>,
    translated: Vec<Paragraph>,
}

impl DualView {
    pub fn initialize(paragraphs: Vec<Paragraph>) -> Self {
        let translated = paragraphs.clone();
        Self {
            original: paragraphs,
            translated,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    pub fn original(&self) -> &[Paragraph] {
        &self.original
    }

    pub fn translated(&self) -> &[Paragraph] {
        &self.translated
    }

    pub fn ids(&self) -> impl Iterator<Item = ParagraphId> + '_ {
        self.original.iter().map(Paragraph::id)
    }

    /// The paragraph in each view, `(original, translated)`.
    pub fn lookup(&self, id: ParagraphId) -> Result<(&Paragraph, &Paragraph)> {
        let index = id.get();
        match (self.original.get(index), self.translated.get(index)) {
            (Some(o), Some(t)) if o.id() == id && t.id() == id => Ok((o, t)),
            _ => Err(unknown(id)),
        }
    }

    pub(crate) fn translated_mut(&mut self, id: ParagraphId) -> Result<&mut Paragraph> {
        self.lookup(id)?;
        Ok(&mut self.translated[id.get()])
    }

    /// Same ids, same order, same source text in both panes.
    pub fn is_aligned(&self) -> bool {
        self.original.len() == self.translated.len()
            && self.original.iter().zip(&self.translated).all(|(o, t)| {
                o.id() == t.id() && o.order_index() == t.order_index() && o.original_text() == t.original_text()
            })
    }

    /// Plain text of the original pane, paragraphs separated by `\n`.
    pub fn original_pane_text(&self) -> String {
        self.original
            .iter()
            .map(Paragraph::original_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn unknown(id: ParagraphId) -> AlignError {
    error!(paragraph_id = %id, "paragraph id missing from a view");
    AlignError::UnknownParagraphId(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity;

    fn view() -> DualView {
        DualView::initialize(identity::build(["Hello.", "World.", "Bye."]).unwrap())
    }

    #[test]
    fn panes_start_identical() {
        let v = view();
        assert!(v.is_aligned());
        assert_eq!(v.len(), 3);
        assert_eq!(v.original(), v.translated());
        assert_eq!(v.ids().map(ParagraphId::get).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn lookup_returns_both_panes() {
        let v = view();
        let (o, t) = v.lookup(ParagraphId::new(2)).unwrap();
        assert_eq!(o.original_text(), "Bye.");
        assert_eq!(t.current_translated_text(), "Bye.");
    }

    #[test]
    fn lookup_unknown_id_fails() {
        let v = view();
        assert!(matches!(
            v.lookup(ParagraphId::new(3)),
            Err(AlignError::UnknownParagraphId(id)) if id.get() == 3
        ));
        assert!(matches!(
            DualView::empty().lookup(ParagraphId::new(0)),
            Err(AlignError::UnknownParagraphId(_))
        ));
    }

    #[test]
    fn translated_buffer_is_independent() {
        let mut v = view();
        v.translated_mut(ParagraphId::new(0))
            .unwrap()
            .replace_translation("Bonjour.".to_string(), Vec::new());
        let (o, t) = v.lookup(ParagraphId::new(0)).unwrap();
        assert_eq!(o.current_translated_text(), "Hello.");
        assert_eq!(t.current_translated_text(), "Bonjour.");
        assert!(v.is_aligned());
    }

    #[test]
    fn pane_text_joins_with_newlines() {
        assert_eq!(view().original_pane_text(), "Hello.\nWorld.\nBye.");
    }
}
