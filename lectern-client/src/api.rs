//! The four ESV query modes over a [`Transport`].

use crate::options::{HtmlOptions, TextOptions};
use crate::transport::{Endpoint, Transport, TransportError};
use lectern_core::{
    addressing, has_passage, parse_text_response, LecternError, ParsedChapter, TextPassage,
    MAX_SEARCH_PAGE_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_SEARCH_PAGE_SIZE: usize = 20;

/// HTML endpoint response, passed through largely as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlPassage {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub canonical: String,
    /// Verse-id ranges, e.g. `[[43011035, 43011035]]`.
    #[serde(default)]
    pub parsed: Vec<Vec<u64>>,
    #[serde(default)]
    pub passage_meta: Vec<PassageMeta>,
    #[serde(default)]
    pub passages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMeta {
    #[serde(default)]
    pub canonical: String,
    #[serde(default)]
    pub chapter_start: Vec<u64>,
    #[serde(default)]
    pub chapter_end: Vec<u64>,
    #[serde(default)]
    pub prev_verse: Option<u64>,
    #[serde(default)]
    pub next_verse: Option<u64>,
    #[serde(default)]
    pub prev_chapter: Option<Vec<u64>>,
    #[serde(default)]
    pub next_chapter: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub reference: String,
    pub content: String,
}

/// Query modes sharing one transport.
pub struct EsvApi<T> {
    transport: T,
}

impl<T: Transport> EsvApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Plain-text passage for a free-form query.
    ///
    /// A throttled request (429/503) or a response without
    /// `canonical`/`passages` comes back as the [`TextPassage::overloaded`]
    /// notice instead of an error.
    pub fn passage_text(
        &self,
        query: &str,
        options: &TextOptions,
    ) -> lectern_core::Result<TextPassage> {
        let Some(body) = self.fetch_text(query, options)? else {
            return Ok(TextPassage::overloaded());
        };
        Ok(parse_text_response(&body).unwrap_or_else(|| {
            warn!(query, "text response missing passage fields, returning retry notice");
            TextPassage::overloaded()
        }))
    }

    /// One whole chapter, validated against the canon first.
    ///
    /// Strict: a throttled or malformed upstream response is `InvalidPassage`.
    pub fn chapter(&self, book: &str, chapter: u32) -> lectern_core::Result<ParsedChapter> {
        let query = addressing::chapter_query(book, chapter)?;
        let passage = self
            .fetch_text(&query, &TextOptions::chapter())?
            .and_then(|body| parse_text_response(&body))
            .ok_or_else(|| LecternError::InvalidPassage(format!("{} {}", book, chapter)))?;
        Ok(passage.into_chapter_as(book, chapter.to_string()))
    }

    /// Like [`chapter`](Self::chapter) but returns the retry notice on a
    /// malformed response. The boolean is `true` when the notice was used.
    pub fn chapter_lenient(
        &self,
        book: &str,
        chapter: u32,
    ) -> lectern_core::Result<(ParsedChapter, bool)> {
        let query = addressing::chapter_query(book, chapter)?;
        let passage = self.passage_text(&query, &TextOptions::chapter())?;
        let overloaded = passage.is_overloaded();
        Ok((passage.into_chapter_as(book, chapter.to_string()), overloaded))
    }

    pub fn passage_html(
        &self,
        query: &str,
        options: &HtmlOptions,
    ) -> lectern_core::Result<HtmlPassage> {
        debug!(query, "requesting passage html");
        let response = self
            .transport
            .get(Endpoint::Html, &options.to_params(query))
            .map_err(|e| not_found(query, e))?;

        match serde_json::from_str::<HtmlPassage>(&response.body) {
            Ok(html) if !html.passages.is_empty() => Ok(html),
            _ => Err(LecternError::InvalidPassage(query.to_string())),
        }
    }

    /// Just the passage HTML strings, without footnotes or audio link.
    pub fn passage_html_basic(&self, query: &str) -> lectern_core::Result<Vec<String>> {
        Ok(self.passage_html(query, &HtmlOptions::basic())?.passages)
    }

    /// Link to the audio recording of a chapter or single verse.
    ///
    /// The endpoint builds a URL for any query, so the reference is checked
    /// locally to avoid handing out dead links.
    pub fn audio_url(
        &self,
        book: &str,
        chapter: u32,
        verse: Option<u32>,
    ) -> lectern_core::Result<String> {
        if !has_passage(book, chapter) {
            return Err(LecternError::InvalidPassage(format!("{} {}", book, chapter)));
        }
        let query = match verse {
            Some(verse) => format!("{} {}:{}", book, chapter, verse),
            None => format!("{} {}", book, chapter),
        };
        debug!(query = %query, "requesting audio link");

        let response = self
            .transport
            .get(Endpoint::Audio, &[("q", query.clone())])
            .map_err(|e| not_found(&query, e))?;
        if response.url.is_empty() {
            return Err(LecternError::PassageNotFound(query));
        }
        Ok(response.url)
    }

    /// First page of results with the default page size.
    pub fn search(&self, query: &str) -> lectern_core::Result<SearchPage> {
        self.search_page(query, DEFAULT_SEARCH_PAGE_SIZE, 1)
    }

    pub fn search_page(
        &self,
        query: &str,
        page_size: usize,
        page: u32,
    ) -> lectern_core::Result<SearchPage> {
        if page_size > MAX_SEARCH_PAGE_SIZE {
            return Err(LecternError::SearchInvalid(page_size));
        }
        debug!(query, page_size, page, "searching");

        let params = [
            ("q", query.to_string()),
            ("page-size", page_size.to_string()),
            ("page", page.to_string()),
        ];
        let response = self
            .transport
            .get(Endpoint::Search, &params)
            .map_err(|e| {
                LecternError::SearchError(format!("There was a connection issue: {}", e))
            })?;

        serde_json::from_str(&response.body)
            .map_err(|e| LecternError::SearchError(format!("Unexpected search response: {}", e)))
    }

    /// Raw text body, or `None` when upstream is throttling.
    fn fetch_text(
        &self,
        query: &str,
        options: &TextOptions,
    ) -> lectern_core::Result<Option<String>> {
        debug!(query, "requesting passage text");
        match self.transport.get(Endpoint::Text, &options.to_params(query)) {
            Ok(response) => Ok(Some(response.body)),
            Err(e) if e.is_throttled() => {
                warn!(query, error = %e, "passage request throttled");
                Ok(None)
            }
            Err(e) => Err(not_found(query, e)),
        }
    }
}

fn not_found(query: &str, err: TransportError) -> LecternError {
    warn!(query, error = %err, "passage request failed");
    LecternError::PassageNotFound(query.to_string())
}
