//! Structured text mutations over the raw markup buffer.
//!
//! Two entry points: [`apply_wrap`] wraps or splices markup for a
//! [`StyleKind`] around the current selection, and [`apply_indent`] shifts
//! the indentation of every line touched by the selection. Both are pure —
//! they take the current text and return a new text plus the selection to
//! restore, and never fail in a way that loses the input buffer.
//!
//! Wrapping is always additive: applying bold to an already-bold span nests
//! the markers rather than toggling them.

use thiserror::Error;

/// Fixed table skeleton spliced in for [`StyleKind::Table`].
const TABLE_TEMPLATE: &str = "\n\
| Column 1 | Column 2 | Column 3 |\n\
| --- | --- | --- |\n\
| Cell | Cell | Cell |\n\
| Cell | Cell | Cell |\n";

const DIVIDER_TEMPLATE: &str = "\n---\n";

/// A selection over the text buffer, in byte offsets.
///
/// `start == end` is a caret. Offsets must lie on `char` boundaries; the
/// mutation functions validate this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty selection at `pos`.
    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The fixed set of markup actions.
///
/// `Link` and `Image` carry the auxiliary input (URL, asset source) that the
/// host obtains out-of-band before applying the mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    H1,
    H2,
    H3,
    H4,
    BulletList,
    OrderedList,
    Quote,
    CodeBlock,
    InlineCode,
    Divider,
    Table,
    Link { url: String },
    Image { alt: String, src: String },
}

/// Direction for [`apply_indent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentDirection {
    Forward,
    Backward,
}

/// Result of a text mutation: the new buffer and the selection to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub text: String,
    pub selection: Selection,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("selection {start}..{end} out of bounds for text of length {len}")]
    OutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("selection start {start} is after end {end}")]
    Inverted { start: usize, end: usize },
    #[error("selection offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// Static prefix/suffix pairs for the plain wrap kinds.
fn affixes(kind: &StyleKind) -> (&'static str, &'static str) {
    match kind {
        StyleKind::Bold => ("**", "**"),
        StyleKind::Italic => ("*", "*"),
        StyleKind::Underline => ("<u>", "</u>"),
        StyleKind::Strikethrough => ("~~", "~~"),
        StyleKind::H1 => ("# ", ""),
        StyleKind::H2 => ("## ", ""),
        StyleKind::H3 => ("### ", ""),
        StyleKind::H4 => ("#### ", ""),
        StyleKind::BulletList => ("- ", ""),
        StyleKind::OrderedList => ("1. ", ""),
        StyleKind::Quote => ("> ", ""),
        StyleKind::CodeBlock => ("```\n", "\n```"),
        StyleKind::InlineCode => ("`", "`"),
        StyleKind::Divider
        | StyleKind::Table
        | StyleKind::Link { .. }
        | StyleKind::Image { .. } => unreachable!("handled before affix lookup"),
    }
}

/// Placeholder inserted when a wrap action runs on an empty selection.
fn placeholder(kind: &StyleKind) -> &'static str {
    match kind {
        StyleKind::H1 | StyleKind::H2 | StyleKind::H3 | StyleKind::H4 => "Heading",
        StyleKind::BulletList | StyleKind::OrderedList => "List item",
        StyleKind::Quote => "Quote",
        StyleKind::CodeBlock | StyleKind::InlineCode => "code",
        _ => "text",
    }
}

/// Wrap or splice markup for `kind` around the selection.
///
/// The returned selection covers the wrapped span (or the placeholder, so the
/// caller can type over it); template insertions leave a caret after the
/// inserted text.
pub fn apply_wrap(text: &str, sel: Selection, kind: &StyleKind) -> Result<Mutation, MarkupError> {
    validate(text, sel)?;
    let selected = &text[sel.start..sel.end];

    // (inserted text, highlighted range relative to the insertion point)
    let (inserted, highlight) = match kind {
        StyleKind::Link { url } => {
            let label = if selected.is_empty() {
                "link text"
            } else {
                selected
            };
            let inserted = format!("[{label}]({url})");
            (inserted, 1..1 + label.len())
        }
        StyleKind::Image { alt, src } => {
            // Selection content is discarded; the image replaces it.
            let inserted = format!("![{alt}]({src})");
            let end = inserted.len();
            (inserted, end..end)
        }
        StyleKind::Table => {
            let end = TABLE_TEMPLATE.len();
            (TABLE_TEMPLATE.to_string(), end..end)
        }
        StyleKind::Divider => {
            let end = DIVIDER_TEMPLATE.len();
            (DIVIDER_TEMPLATE.to_string(), end..end)
        }
        _ => {
            let (prefix, suffix) = affixes(kind);
            let body = if selected.is_empty() {
                placeholder(kind)
            } else {
                selected
            };
            let inserted = format!("{prefix}{body}{suffix}");
            (inserted, prefix.len()..prefix.len() + body.len())
        }
    };

    let mut out = String::with_capacity(text.len() + inserted.len());
    out.push_str(&text[..sel.start]);
    out.push_str(&inserted);
    out.push_str(&text[sel.end..]);

    Ok(Mutation {
        text: out,
        selection: Selection::new(sel.start + highlight.start, sel.start + highlight.end),
    })
}

/// Shift indentation for every line touched by the selection.
///
/// `Forward` prepends two spaces to each line. `Backward` removes up to two
/// leading spaces per line — fewer if the line has less indentation, never
/// going negative. The returned selection covers the mutated lines.
pub fn apply_indent(
    text: &str,
    sel: Selection,
    direction: IndentDirection,
) -> Result<Mutation, MarkupError> {
    validate(text, sel)?;

    // Expand left to the start of the first touched line.
    let region_start = text[..sel.start].rfind('\n').map_or(0, |i| i + 1);

    // Expand right to the end of the last touched line. A selection ending
    // exactly at a line start does not touch the following line.
    let region_end = if sel.end > sel.start && text[..sel.end].ends_with('\n') {
        sel.end - 1
    } else {
        text[sel.end..]
            .find('\n')
            .map_or(text.len(), |i| sel.end + i)
    };

    let region = &text[region_start..region_end];
    let mut out = String::with_capacity(region.len() + 16);
    for (i, line) in region.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match direction {
            IndentDirection::Forward => {
                out.push_str("  ");
                out.push_str(line);
            }
            IndentDirection::Backward => {
                let strip = line.bytes().take_while(|&b| b == b' ').count().min(2);
                out.push_str(&line[strip..]);
            }
        }
    }

    let mut new_text = String::with_capacity(text.len() + out.len() - region.len());
    new_text.push_str(&text[..region_start]);
    new_text.push_str(&out);
    new_text.push_str(&text[region_end..]);

    Ok(Mutation {
        text: new_text,
        selection: Selection::new(region_start, region_start + out.len()),
    })
}

fn validate(text: &str, sel: Selection) -> Result<(), MarkupError> {
    if sel.start > sel.end {
        return Err(MarkupError::Inverted {
            start: sel.start,
            end: sel.end,
        });
    }
    if sel.end > text.len() {
        return Err(MarkupError::OutOfBounds {
            start: sel.start,
            end: sel.end,
            len: text.len(),
        });
    }
    for offset in [sel.start, sel.end] {
        if !text.is_char_boundary(offset) {
            return Err(MarkupError::NotCharBoundary(offset));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(text: &str) -> Selection {
        Selection::new(0, text.len())
    }

    #[test]
    fn bold_wraps_selection() {
        let m = apply_wrap("hello", full("hello"), &StyleKind::Bold).unwrap();
        assert_eq!(m.text, "**hello**");
        assert_eq!(m.selection, Selection::new(2, 7));
    }

    #[test]
    fn wrap_is_additive_not_toggling() {
        let m = apply_wrap("**hello**", full("**hello**"), &StyleKind::Bold).unwrap();
        assert_eq!(m.text, "****hello****");
    }

    #[test]
    fn empty_selection_inserts_placeholder() {
        let m = apply_wrap("ab", Selection::caret(1), &StyleKind::Bold).unwrap();
        assert_eq!(m.text, "a**text**b");
        // Placeholder is selected so the user can type over it.
        assert_eq!(m.selection, Selection::new(3, 7));
    }

    #[test]
    fn heading_prefix_only() {
        let m = apply_wrap("Title", full("Title"), &StyleKind::H2).unwrap();
        assert_eq!(m.text, "## Title");
    }

    #[test]
    fn code_block_wraps_with_fences() {
        let m = apply_wrap("let x = 1;", full("let x = 1;"), &StyleKind::CodeBlock).unwrap();
        assert_eq!(m.text, "```\nlet x = 1;\n```");
    }

    #[test]
    fn link_uses_selection_as_label() {
        let kind = StyleKind::Link {
            url: "https://example.com".into(),
        };
        let m = apply_wrap("docs here", Selection::new(0, 4), &kind).unwrap();
        assert_eq!(m.text, "[docs](https://example.com) here");
        assert_eq!(m.selection, Selection::new(1, 5));
    }

    #[test]
    fn link_without_selection_gets_placeholder_label() {
        let kind = StyleKind::Link {
            url: "https://example.com".into(),
        };
        let m = apply_wrap("", Selection::caret(0), &kind).unwrap();
        assert_eq!(m.text, "[link text](https://example.com)");
    }

    #[test]
    fn image_replaces_selection() {
        let kind = StyleKind::Image {
            alt: "diagram".into(),
            src: "data:image/png;base64,AAAA".into(),
        };
        let m = apply_wrap("abcdef", Selection::new(1, 4), &kind).unwrap();
        assert_eq!(m.text, "a![diagram](data:image/png;base64,AAAA)ef");
        assert!(m.selection.is_empty());
    }

    #[test]
    fn table_ignores_selection_content() {
        let m = apply_wrap("drop me", full("drop me"), &StyleKind::Table).unwrap();
        assert!(!m.text.contains("drop me"));
        assert!(m.text.contains("| Column 1 |"));
    }

    #[test]
    fn divider_splices_template() {
        let m = apply_wrap("ab", Selection::caret(1), &StyleKind::Divider).unwrap();
        assert_eq!(m.text, "a\n---\nb");
    }

    #[test]
    fn indent_forward_prepends_two_spaces_per_line() {
        let text = "one\ntwo\nthree";
        let m = apply_indent(text, full(text), IndentDirection::Forward).unwrap();
        assert_eq!(m.text, "  one\n  two\n  three");
    }

    #[test]
    fn indent_roundtrip_restores_original() {
        let text = "  already indented";
        let fwd = apply_indent(text, full(text), IndentDirection::Forward).unwrap();
        let back = apply_indent(&fwd.text, fwd.selection, IndentDirection::Backward).unwrap();
        assert_eq!(back.text, text);
    }

    #[test]
    fn outdent_never_goes_negative() {
        let text = " one\nzero\n   three";
        let m = apply_indent(text, full(text), IndentDirection::Backward).unwrap();
        assert_eq!(m.text, "one\nzero\n three");
    }

    #[test]
    fn indent_expands_to_whole_touched_lines() {
        let text = "alpha\nbeta\ngamma";
        // Selection from mid-"alpha" to mid-"beta".
        let m = apply_indent(text, Selection::new(2, 8), IndentDirection::Forward).unwrap();
        assert_eq!(m.text, "  alpha\n  beta\ngamma");
    }

    #[test]
    fn selection_ending_at_line_start_leaves_next_line_alone() {
        let text = "alpha\nbeta";
        let m = apply_indent(text, Selection::new(0, 6), IndentDirection::Forward).unwrap();
        assert_eq!(m.text, "  alpha\nbeta");
    }

    #[test]
    fn caret_indents_its_own_line() {
        let text = "alpha\nbeta";
        let m = apply_indent(text, Selection::caret(8), IndentDirection::Forward).unwrap();
        assert_eq!(m.text, "alpha\n  beta");
    }

    #[test]
    fn inverted_selection_is_rejected() {
        let err = apply_wrap("abc", Selection::new(2, 1), &StyleKind::Bold).unwrap_err();
        assert_eq!(err, MarkupError::Inverted { start: 2, end: 1 });
    }

    #[test]
    fn out_of_bounds_selection_is_rejected() {
        let err = apply_wrap("abc", Selection::new(0, 9), &StyleKind::Bold).unwrap_err();
        assert!(matches!(err, MarkupError::OutOfBounds { .. }));
    }

    #[test]
    fn non_char_boundary_is_rejected() {
        // 'é' is two bytes; offset 1 falls inside it.
        let err = apply_wrap("é", Selection::new(0, 1), &StyleKind::Bold).unwrap_err();
        assert_eq!(err, MarkupError::NotCharBoundary(1));
    }
}
