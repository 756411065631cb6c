/// Formatting context around an insertion offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Layout {
    /// The closing delimiter sits on its own line.
    pub multiline: bool,
    /// Indentation for a new element inserted at the offset.
    pub indent: String,
}

const INDENT_UNIT: &str = "  ";

pub(crate) fn layout_at(text: &str, offset: usize) -> Layout {
    let gap: &str = {
        let rest = &text[offset..];
        let end = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    let multiline = gap.contains('\n');

    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let mut indent: String = text[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();

    let after_opener = text[..offset]
        .chars()
        .next_back()
        .is_some_and(|c| matches!(c, '{' | '[' | '('));
    if after_opener {
        indent.push_str(INDENT_UNIT);
    }

    Layout { multiline, indent }
}
