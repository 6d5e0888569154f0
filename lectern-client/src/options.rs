//! Query parameters for the text and HTML endpoints.

/// Indentation character used by the text endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndentUsing {
    #[default]
    Space,
    Tab,
}

impl IndentUsing {
    fn as_str(self) -> &'static str {
        match self {
            IndentUsing::Space => "space",
            IndentUsing::Tab => "tab",
        }
    }
}

/// Where the HTML endpoint attaches its audio link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioLinkTarget {
    #[default]
    Passage,
    Heading,
}

impl AudioLinkTarget {
    fn as_str(self) -> &'static str {
        match self {
            AudioLinkTarget::Passage => "passage",
            AudioLinkTarget::Heading => "heading",
        }
    }
}

/// Options for the plain-text endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    pub include_passage_references: bool,
    pub include_verse_numbers: bool,
    /// Footnote callouts in the verse text.
    pub include_footnotes: bool,
    /// Footnote bodies below the text; ignored unless `include_footnotes`.
    pub include_footnote_body: bool,
    pub include_headings: bool,
    /// Mutually exclusive with `include_copyright`; setting both sends neither.
    pub include_short_copyright: bool,
    pub include_copyright: bool,
    pub include_passage_horizontal_lines: bool,
    pub include_heading_horizontal_lines: bool,
    pub horizontal_line_length: u32,
    pub include_selahs: bool,
    pub indent_using: IndentUsing,
    pub indent_paragraphs: u32,
    pub indent_poetry: bool,
    pub indent_poetry_lines: u32,
    pub indent_declares: u32,
    pub indent_psalm_doxology: u32,
    /// 0 means unlimited.
    pub line_length: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            include_passage_references: false,
            include_verse_numbers: true,
            include_footnotes: true,
            include_footnote_body: true,
            include_headings: true,
            include_short_copyright: false,
            include_copyright: false,
            include_passage_horizontal_lines: false,
            include_heading_horizontal_lines: false,
            horizontal_line_length: 55,
            include_selahs: true,
            indent_using: IndentUsing::Space,
            indent_paragraphs: 2,
            indent_poetry: true,
            indent_poetry_lines: 4,
            indent_declares: 40,
            indent_psalm_doxology: 30,
            line_length: 0,
        }
    }
}

impl TextOptions {
    /// Preset for whole-chapter retrieval: headings, verse numbers and
    /// footnotes on, references and copyright off. The parser depends on
    /// this layout.
    pub fn chapter() -> Self {
        Self {
            include_passage_references: false,
            include_verse_numbers: true,
            include_footnotes: true,
            include_footnote_body: true,
            include_headings: true,
            include_short_copyright: false,
            ..Self::default()
        }
    }

    pub fn to_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let (short_copyright, copyright) =
            exclusive_copyright(self.include_short_copyright, self.include_copyright);
        vec![
            ("q", query.to_string()),
            ("include-headings", flag(self.include_headings)),
            ("include-footnotes", flag(self.include_footnotes)),
            (
                "include-footnote-body",
                flag(self.include_footnotes && self.include_footnote_body),
            ),
            ("include-verse-numbers", flag(self.include_verse_numbers)),
            ("include-short-copyright", flag(short_copyright)),
            (
                "include-passage-references",
                flag(self.include_passage_references),
            ),
            ("include-copyright", flag(copyright)),
            (
                "include-passage-horizontal-lines",
                flag(self.include_passage_horizontal_lines),
            ),
            (
                "include-heading-horizontal-lines",
                flag(self.include_heading_horizontal_lines),
            ),
            (
                "horizontal-line-length",
                self.horizontal_line_length.to_string(),
            ),
            ("include-selahs", flag(self.include_selahs)),
            ("indent-using", self.indent_using.as_str().to_string()),
            ("indent-paragraphs", self.indent_paragraphs.to_string()),
            ("indent-poetry", flag(self.indent_poetry)),
            ("indent-poetry-lines", self.indent_poetry_lines.to_string()),
            ("indent-declares", self.indent_declares.to_string()),
            (
                "indent-psalm-doxology",
                self.indent_psalm_doxology.to_string(),
            ),
            ("line-length", self.line_length.to_string()),
        ]
    }
}

/// Options for the HTML endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    pub include_passage_references: bool,
    pub include_verse_numbers: bool,
    pub include_first_verse_numbers: bool,
    pub include_footnotes: bool,
    pub include_footnote_body: bool,
    pub include_headings: bool,
    pub include_short_copyright: bool,
    pub include_copyright: bool,
    pub include_css_link: bool,
    pub inline_styles: bool,
    pub wrapping_div: bool,
    pub div_classes: String,
    pub paragraph_tag: String,
    pub include_book_titles: bool,
    pub include_verse_anchors: bool,
    pub include_chapter_numbers: bool,
    pub include_crossrefs: bool,
    pub include_subheadings: bool,
    pub include_surrounding_chapters: bool,
    /// `"smart"`, `"true"` or `"false"`.
    pub include_surrounding_chapters_below: String,
    pub link_url: String,
    pub crossref_url: String,
    pub preface_url: String,
    pub include_audio_link: bool,
    pub attach_audio_link_to: AudioLinkTarget,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            include_passage_references: true,
            include_verse_numbers: true,
            include_first_verse_numbers: true,
            include_footnotes: true,
            include_footnote_body: true,
            include_headings: true,
            include_short_copyright: false,
            include_copyright: false,
            include_css_link: false,
            inline_styles: false,
            wrapping_div: false,
            div_classes: "passage".to_string(),
            paragraph_tag: "p".to_string(),
            include_book_titles: false,
            include_verse_anchors: false,
            include_chapter_numbers: true,
            include_crossrefs: false,
            include_subheadings: true,
            include_surrounding_chapters: false,
            include_surrounding_chapters_below: "smart".to_string(),
            link_url: String::new(),
            crossref_url: String::new(),
            preface_url: "https://www.esv.org/preface/".to_string(),
            include_audio_link: true,
            attach_audio_link_to: AudioLinkTarget::Passage,
        }
    }
}

impl HtmlOptions {
    /// Bare passage HTML: no footnotes, no audio link.
    pub fn basic() -> Self {
        Self {
            include_footnotes: false,
            include_audio_link: false,
            ..Self::default()
        }
    }

    pub fn to_params(&self, query: &str) -> Vec<(&'static str, String)> {
        let (short_copyright, copyright) =
            exclusive_copyright(self.include_short_copyright, self.include_copyright);
        vec![
            ("q", query.to_string()),
            ("include-headings", flag(self.include_headings)),
            ("include-footnotes", flag(self.include_footnotes)),
            (
                "include-footnote-body",
                flag(self.include_footnotes && self.include_footnote_body),
            ),
            ("include-verse-numbers", flag(self.include_verse_numbers)),
            (
                "include-first-verse-numbers",
                flag(self.include_first_verse_numbers),
            ),
            ("include-short-copyright", flag(short_copyright)),
            (
                "include-passage-references",
                flag(self.include_passage_references),
            ),
            ("include-copyright", flag(copyright)),
            ("include-css-link", flag(self.include_css_link)),
            ("inline-styles", flag(self.inline_styles)),
            ("wrapping-div", flag(self.wrapping_div)),
            ("div-classes", self.div_classes.clone()),
            ("paragraph-tag", self.paragraph_tag.clone()),
            ("include-book-titles", flag(self.include_book_titles)),
            ("include-verse-anchors", flag(self.include_verse_anchors)),
            ("include-chapter-numbers", flag(self.include_chapter_numbers)),
            ("include-crossrefs", flag(self.include_crossrefs)),
            ("include-subheadings", flag(self.include_subheadings)),
            (
                "include-surrounding-chapters",
                flag(self.include_surrounding_chapters),
            ),
            (
                "include-surrounding-chapters-below",
                self.include_surrounding_chapters_below.clone(),
            ),
            ("link-url", self.link_url.clone()),
            ("crossref-url", self.crossref_url.clone()),
            ("preface-url", self.preface_url.clone()),
            ("include-audio-link", flag(self.include_audio_link)),
            (
                "attach-audio-link-to",
                self.attach_audio_link_to.as_str().to_string(),
            ),
        ]
    }
}

fn flag(value: bool) -> String {
    value.to_string()
}

/// Short and long copyright cancel each other out.
fn exclusive_copyright(short: bool, long: bool) -> (bool, bool) {
    (short && !long, long && !short)
}
