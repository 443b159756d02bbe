//! Text edits.
//!
//! Fixes are expressed as byte-range replacements against the original
//! source. [`TextEdits`] keeps a set of edits that can be applied together:
//! an edit that overlaps one already accepted, or repeats it, is rejected.

use std::cmp::Ordering;

use oxc_span::Span;

use crate::directive::{CANONICAL_DIRECTIVE, DirectiveState};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub start: u32,
    pub end: u32,
    pub replacement: String,
}

impl TextEdit {
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self {
            start: offset,
            end: offset,
            replacement: text.into(),
        }
    }

    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            replacement: text.into(),
        }
    }

    pub fn delete(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            replacement: String::new(),
        }
    }

    pub fn is_insert(&self) -> bool {
        self.start == self.end
    }

    /// Two inserts at one offset conflict (their order would be ambiguous).
    /// An insert touching the boundary of a replacement does not.
    pub fn overlaps(&self, other: &TextEdit) -> bool {
        match (self.is_insert(), other.is_insert()) {
            (true, true) => self.start == other.start,
            (true, false) => other.start < self.start && self.start < other.end,
            (false, true) => self.start < other.start && other.start < self.end,
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }

    fn order(&self, other: &TextEdit) -> Ordering {
        (self.start, self.end).cmp(&(other.start, other.end))
    }
}

/// The ADD_DIRECTIVE fix: canonical directive plus a blank line, before the
/// first top-level statement.
pub fn add_directive_edit(directive: &DirectiveState) -> TextEdit {
    TextEdit::insert(directive.insertion_offset(), CANONICAL_DIRECTIVE)
}

/// A set of mutually compatible edits.
#[derive(Debug, Clone, Default)]
pub struct TextEdits {
    edits: Vec<TextEdit>,
}

impl TextEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `edit` unless it duplicates or overlaps an accepted edit.
    pub fn push(&mut self, edit: TextEdit) -> bool {
        if self
            .edits
            .iter()
            .any(|existing| *existing == edit || existing.overlaps(&edit))
        {
            tracing::trace!(start = edit.start, end = edit.end, "rejected conflicting edit");
            return false;
        }
        self.edits.push(edit);
        true
    }

    /// Accept every edit of a group, or none of them.
    pub fn push_all(&mut self, group: Vec<TextEdit>) -> bool {
        let conflicts = group.iter().enumerate().any(|(i, edit)| {
            self.edits
                .iter()
                .chain(&group[..i])
                .any(|existing| *existing == *edit || existing.overlaps(edit))
        });
        if conflicts {
            return false;
        }
        self.edits.extend(group);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Edits in application order.
    pub fn into_sorted(mut self) -> Vec<TextEdit> {
        self.edits.sort_by(TextEdit::order);
        self.edits
    }
}

/// Apply non-overlapping edits to `source`.
///
/// Edits are applied front to back in `(start, end)` order. Edits that
/// overlap an earlier one, or that fall outside the source or off a
/// character boundary, are skipped.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| a.order(b));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0usize;
    let mut last_insert: Option<usize> = None;

    for edit in ordered {
        let (start, end) = (edit.start as usize, edit.end as usize);
        if start < cursor
            || end < start
            || end > source.len()
            || !source.is_char_boundary(start)
            || !source.is_char_boundary(end)
            || (edit.is_insert() && last_insert == Some(start))
        {
            continue;
        }

        output.push_str(&source[cursor..start]);
        output.push_str(&edit.replacement);
        cursor = end;
        last_insert = edit.is_insert().then_some(start);
    }

    output.push_str(&source[cursor..]);
    output
}
