pub mod bubble;
pub mod table;

/// The presentation shape chosen for one bot reply.
///
/// Classification is a pure function of the reply text; it is recomputed on
/// every render and never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    MultiColumnTable {
        rows: Vec<Vec<String>>,
        column_count: usize,
    },
    SingleColumnTable {
        rows: Vec<String>,
    },
    DelimitedParagraph(String),
    PlainBubble(String),
}

/// Characters that mark a multi-line reply as "delimited" prose rather than
/// a plain bubble.
fn is_mixed_delimiter(c: char) -> bool {
    matches!(c, '-' | '/' | '*' | '(' | ')' | ':')
}

/// Picks a [`Shape`] for a bot reply.
///
/// The rules are checked in order and the first match wins:
///
/// 1. multi-line and some line splits on `-` into more than one cell
///    -> multi-column table, padded to the widest row at render time;
/// 2. multi-line and any line contains a mixed delimiter
///    -> delimited paragraph (bubble with line breaks kept);
/// 3. single line splitting on `,` into more than two segments
///    -> single-column table, one segment per row;
/// 4. anything else -> plain bubble.
///
/// The threshold in rule 3 is deliberately strict: a two-item comma list
/// stays a plain bubble. Total over all inputs, the empty string included.
pub fn classify(text: &str) -> Shape {
    let lines: Vec<&str> = text.split('\n').collect();

    let is_multi_line = lines.len() > 1;
    let any_line_has_multiple_columns = lines.iter().any(|line| line.split('-').count() > 1);
    let is_single_line_multiple_columns = !is_multi_line && text.split(',').count() > 2;
    let has_multi_line_delimiters = lines
        .iter()
        .any(|line| line.chars().any(is_mixed_delimiter));

    if is_multi_line && any_line_has_multiple_columns {
        let rows: Vec<Vec<String>> = lines
            .iter()
            .map(|line| line.split('-').map(|cell| cell.trim().to_string()).collect())
            .collect();
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        Shape::MultiColumnTable { rows, column_count }
    } else if is_multi_line && has_multi_line_delimiters {
        Shape::DelimitedParagraph(text.to_string())
    } else if is_single_line_multiple_columns {
        let rows = text.split(',').map(|cell| cell.trim().to_string()).collect();
        Shape::SingleColumnTable { rows }
    } else {
        Shape::PlainBubble(text.to_string())
    }
}
