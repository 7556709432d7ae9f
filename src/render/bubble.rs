use regex::RegexBuilder;

/// One run of bubble text, tagged with whether it matched the search query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self { text: text.to_string(), is_match: false }
    }

    fn matched(text: &str) -> Self {
        Self { text: text.to_string(), is_match: true }
    }
}

/// Splits `text` around case-insensitive occurrences of the literal
/// `highlight` string.
///
/// The query is escaped before matching, so metacharacters like `.` or `*`
/// match themselves. Concatenating the returned segment texts always
/// reproduces `text` exactly; empty inter-match gaps are not emitted.
pub fn highlight_segments(text: &str, highlight: &str) -> Vec<Segment> {
    if highlight.is_empty() {
        return vec![Segment::plain(text)];
    }

    let pattern = match RegexBuilder::new(&regex::escape(highlight))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        // An escaped literal always compiles; if it somehow does not,
        // fall back to an unhighlighted bubble rather than failing a render.
        Err(_) => return vec![Segment::plain(text)],
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(Segment::plain(&text[cursor..found.start()]));
        }
        segments.push(Segment::matched(found.as_str()));
        cursor = found.end();
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

/// Formats a bubble for the terminal, marking matched runs with ANSI
/// reverse video. Line breaks in `text` are preserved as-is.
pub fn format_bubble(text: &str, highlight: &str) -> String {
    highlight_segments(text, highlight)
        .into_iter()
        .map(|segment| {
            if segment.is_match {
                format!("\x1b[7m{}\x1b[0m", segment.text)
            } else {
                segment.text
            }
        })
        .collect()
}
