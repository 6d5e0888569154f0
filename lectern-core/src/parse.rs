//! Plain-text passage parsing.
//!
//! The text endpoint returns JSON whose `passages` hold pre-formatted text:
//! section headings on their own lines, verse paragraphs indented with
//! leading whitespace and `[n]` verse markers, and a trailing block
//! introduced by `Footnotes`. Everything here is tied to that layout and
//! nothing outside this module looks at raw text.

use crate::chapter::{HeadingMap, ParsedChapter, NO_HEADING};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// Canonical reference reported in place of a real one when the upstream
/// response is missing its passage fields.
pub const OVERLOADED_CANONICAL: &str = "API Overloaded";
const OVERLOADED_HEADING: &str = "try again later";
const OVERLOADED_NOTICE: &str = "If this keeps happening, the app could be heavily throttled";

const FOOTNOTES_MARKER: &str = "Footnotes";

/// The fields of a text endpoint response that the parser needs.
#[derive(Debug, Deserialize)]
struct TextResponse {
    canonical: Option<String>,
    passages: Option<Vec<String>>,
}

/// A text response split by heading, verse markers still embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPassage {
    pub canonical: String,
    /// Heading → raw paragraph text (each line keeps its trailing newline).
    pub sections: HeadingMap<String>,
    pub footnotes: String,
}

impl TextPassage {
    /// Retry notice returned in place of an error for malformed responses.
    pub fn overloaded() -> Self {
        let mut sections = HeadingMap::new();
        sections.insert(OVERLOADED_HEADING, OVERLOADED_NOTICE.to_string());
        Self {
            canonical: OVERLOADED_CANONICAL.to_string(),
            sections,
            footnotes: String::new(),
        }
    }

    pub fn is_overloaded(&self) -> bool {
        self.canonical == OVERLOADED_CANONICAL
    }

    /// Split every section into verses, taking book and chapter from the
    /// canonical reference (`"John 11"` → `"John"`, `"11"`).
    pub fn into_chapter(self) -> ParsedChapter {
        let (book, chapter) = match self.canonical.rfind(' ') {
            Some(pos) => (
                self.canonical[..pos].to_string(),
                self.canonical[pos + 1..].to_string(),
            ),
            None => (self.canonical.clone(), String::new()),
        };
        self.into_chapter_as(book, chapter)
    }

    /// Like [`into_chapter`](Self::into_chapter) with an explicit book and
    /// chapter, for range queries whose canonical form is not `"Book C"`.
    pub fn into_chapter_as(
        self,
        book: impl Into<String>,
        chapter: impl Into<String>,
    ) -> ParsedChapter {
        ParsedChapter {
            book: book.into(),
            chapter: chapter.into(),
            verses: self.sections.map_values(|block| split_verses(&block)),
            footnotes: self.footnotes,
        }
    }
}

/// Parse a text endpoint JSON body.
///
/// Returns `None` when the body is not JSON or lacks `canonical`/`passages`;
/// callers decide whether that means "retry later" or "invalid passage".
pub fn parse_text_response(body: &str) -> Option<TextPassage> {
    let response: TextResponse = serde_json::from_str(body).ok()?;
    let canonical = response.canonical?;
    let text = response.passages?.concat();

    Some(TextPassage {
        canonical,
        sections: parse_headings(&text),
        footnotes: parse_footnotes(&text),
    })
}

fn heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s{4}[A-Z][a-zA-Z'\u{2019}\s]+$").expect("heading pattern is valid")
    })
}

/// Group indented body lines under the heading that precedes them.
///
/// A heading is either an indented title-case line followed by a blank line,
/// or any unindented line with alphanumeric content. Lines without
/// alphanumeric content are skipped. Lines before the first heading land
/// under [`NO_HEADING`].
pub fn parse_headings(text: &str) -> HeadingMap<String> {
    let mut parsed: HeadingMap<String> = HeadingMap::new();
    let mut heading = NO_HEADING.to_string();
    let mut lines = text.lines().peekable();

    while let Some(line) = lines.next() {
        let has_alnum = line.chars().any(char::is_alphanumeric);
        let followed_by_blank = lines.peek().is_some_and(|next| next.trim().is_empty());

        if followed_by_blank && heading_pattern().is_match(line) {
            heading = line.trim().to_string();
        } else if line.starts_with(char::is_whitespace) && has_alnum {
            let block = parsed.get_or_insert_with(&heading, String::new);
            block.push_str(line);
            block.push('\n');
        } else if has_alnum {
            heading = line.trim().to_string();
        }
    }

    parsed
}

/// Extract the footnotes block: everything from the first `(` after the
/// `Footnotes` marker, one footnote per line.
pub fn parse_footnotes(text: &str) -> String {
    let Some(marker) = text.find(FOOTNOTES_MARKER) else {
        return String::new();
    };
    let block = &text[marker..];
    let Some(open) = block.find('(') else {
        return String::new();
    };

    block[open..]
        .replace("\n\n", "\n")
        .trim_end()
        .to_string()
}

/// Split one heading's raw block on its `[n]` markers.
///
/// `"  [1] a\n  [2] b\n"` → `["1 a", "2 b"]`.
pub fn split_verses(block: &str) -> Vec<String> {
    block
        .replace(']', "")
        .split('[')
        .map(str::trim_end)
        .filter(|verse| !verse.is_empty())
        .map(str::to_string)
        .collect()
}
