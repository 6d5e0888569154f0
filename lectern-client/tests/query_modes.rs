//! Query-mode and cache behaviour driven through a recording fake transport.
//!
//! No network: every test scripts the upstream responses and then checks both
//! what came back and which requests were (or were not) sent.

use lectern_client::{
    Bible, Endpoint, EsvApi, HtmlOptions, Transport, TransportError, TransportResponse,
};
use lectern_core::{ChapterCache, LecternError, DEFAULT_VERSE_BUDGET};
use std::cell::RefCell;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Call = (Endpoint, Vec<(String, String)>);
type Reply = Result<TransportResponse, TransportError>;

struct FakeTransport {
    respond: Box<dyn Fn(Endpoint, &[(&str, String)]) -> Reply>,
    calls: RefCell<Vec<Call>>,
}

impl FakeTransport {
    fn new(respond: impl Fn(Endpoint, &[(&str, String)]) -> Reply + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn queries(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|(_, params)| param(params, "q").to_string())
            .collect()
    }
}

impl Transport for FakeTransport {
    fn get(&self, endpoint: Endpoint, params: &[(&str, String)]) -> Reply {
        self.calls.borrow_mut().push((
            endpoint,
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));
        (self.respond)(endpoint, params)
    }
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn body(body: String) -> Reply {
    Ok(TransportResponse {
        url: String::new(),
        body,
    })
}

/// A text endpoint body with one heading and `verses` numbered verses.
fn chapter_body(canonical: &str, heading: &str, verses: usize) -> String {
    let mut text = format!("{}\n\n", heading);
    for i in 1..=verses {
        text.push_str(&format!("  [{}] Verse {} text.\n", i, i));
    }
    text.push_str("\nFootnotes\n\n(1) 1:1 A note\n\n");
    serde_json::json!({ "query": canonical, "canonical": canonical, "passages": [text] })
        .to_string()
}

/// Answers every text query with a chapter body named after the query.
fn chapters(verses: usize) -> FakeTransport {
    FakeTransport::new(move |_, params| {
        let q = params
            .iter()
            .find(|(k, _)| *k == "q")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        body(chapter_body(&q, "A Heading", verses))
    })
}

fn bible(transport: FakeTransport) -> Bible<FakeTransport> {
    Bible::new(
        EsvApi::new(transport),
        ChapterCache::in_memory(DEFAULT_VERSE_BUDGET),
    )
}

// ---------------------------------------------------------------------------
// Cached chapter path
// ---------------------------------------------------------------------------

#[test]
fn test_miss_fetches_then_hit_is_served_from_cache() {
    let mut bible = bible(chapters(57));

    let first = bible.get_passage("John", 11).unwrap();
    assert_eq!(first.book, "John");
    assert_eq!(first.chapter, "11");
    assert_eq!(first.verses.get("A Heading").unwrap().len(), 57);
    assert_eq!(first.verses.get("A Heading").unwrap()[34], "35 Verse 35 text.");
    assert_eq!(first.footnotes, "(1) 1:1 A note");

    let second = bible.get_passage("John", 11).unwrap();
    assert_eq!(first, second);
    assert_eq!(bible.api().transport().queries(), ["John 11"]);
}

#[test]
fn test_chapter_requests_use_the_parser_preset() {
    let mut bible = bible(chapters(3));
    bible.get_passage("Ruth", 2).unwrap();

    let calls = bible.api().transport().calls();
    assert_eq!(calls.len(), 1);
    let (endpoint, params) = &calls[0];
    assert_eq!(*endpoint, Endpoint::Text);
    assert_eq!(param(params, "include-headings"), "true");
    assert_eq!(param(params, "include-verse-numbers"), "true");
    assert_eq!(param(params, "include-passage-references"), "false");
    assert_eq!(param(params, "include-footnote-body"), "true");
}

#[test]
fn test_single_chapter_book_expands_to_verse_range() {
    let mut bible = bible(chapters(25));

    let jude = bible.get_passage("Jude", 1).unwrap();
    assert_eq!(jude.book, "Jude");
    assert_eq!(jude.chapter, "1");
    assert_eq!(jude.verse_count(), 25);

    bible.get_chapter_json("Obadiah", 1).unwrap();
    assert_eq!(
        bible.api().transport().queries(),
        ["Jude 1-25", "Obadiah 1-21"]
    );
}

#[test]
fn test_invalid_reference_never_reaches_the_transport() {
    let mut bible = bible(chapters(1));

    assert!(matches!(
        bible.get_passage("John", 22),
        Err(LecternError::InvalidPassage(r)) if r == "John 22"
    ));
    assert!(matches!(
        bible.get_chapter_json("Book", 25),
        Err(LecternError::InvalidPassage(_))
    ));
    assert!(matches!(
        bible.api().audio_url("Book", 25, None),
        Err(LecternError::InvalidPassage(_))
    ));
    assert!(bible.api().transport().calls().is_empty());
}

#[test]
fn test_malformed_response_is_lenient_when_cached_and_strict_when_direct() {
    let throttled = FakeTransport::new(|_, _| {
        body(r#"{"detail": "Request was throttled."}"#.to_string())
    });
    let mut bible = bible(throttled);

    let notice = bible.get_passage("John", 3).unwrap();
    assert!(notice.verses.get("try again later").is_some());
    assert_eq!(bible.cache().occupied(), 0);

    // Not cached, so the next call goes upstream again.
    bible.get_passage("John", 3).unwrap();
    assert_eq!(bible.api().transport().calls().len(), 2);

    assert!(matches!(
        bible.get_chapter_json("John", 3),
        Err(LecternError::InvalidPassage(r)) if r == "John 3"
    ));

    let text = bible
        .api()
        .passage_text("John 3:16", &Default::default())
        .unwrap();
    assert!(text.is_overloaded());
}

#[test]
fn test_throttled_status_returns_notice_without_caching() {
    let throttled = FakeTransport::new(|_, _| {
        Err(TransportError::Status {
            status: 429,
            url: "https://api.esv.org/v3/passage/text/".into(),
        })
    });
    let mut bible = bible(throttled);

    let notice = bible.get_passage("John", 3).unwrap();
    assert_eq!(notice.book, "John");
    assert_eq!(notice.chapter, "3");
    assert!(notice.verses.get("try again later").is_some());
    assert_eq!(bible.cache().occupied(), 0);

    assert!(bible
        .api()
        .passage_text("John 3:16", &Default::default())
        .unwrap()
        .is_overloaded());
    assert!(matches!(
        bible.get_chapter_json("John", 3),
        Err(LecternError::InvalidPassage(r)) if r == "John 3"
    ));
}

#[test]
fn test_transport_failure_is_retryable_not_found() {
    let down = FakeTransport::new(|_, _| Err(TransportError::Connection("refused".into())));
    let mut bible = bible(down);

    let err = bible.get_passage("John", 1).unwrap_err();
    assert!(matches!(&err, LecternError::PassageNotFound(q) if q == "John 1"));
    assert!(err.is_retryable());
}

#[test]
fn test_cache_stays_under_budget_across_many_chapters() {
    let mut bible = bible(chapters(90));
    for chapter in 1..=21 {
        bible.get_passage("John", chapter).unwrap();
        assert!(bible.cache().resident_verses() < DEFAULT_VERSE_BUDGET);
    }
    // Five chapters of 90 fit; the earliest ones were evicted in canonical order.
    assert_eq!(bible.cache().occupied(), 5);
    assert!(bible.cache().get("John", 21).is_some());
    assert!(bible.cache().get("John", 1).is_none());
}

#[test]
fn test_snapshot_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bibles/json_bibles/esv.json");

    let mut first = Bible::new(
        EsvApi::new(chapters(31)),
        ChapterCache::open(&path, DEFAULT_VERSE_BUDGET),
    );
    first.get_passage("Proverbs", 31).unwrap();
    first.shutdown().unwrap();

    let mut second = Bible::new(
        EsvApi::new(chapters(31)),
        ChapterCache::open(&path, DEFAULT_VERSE_BUDGET),
    );
    let hit = second.get_passage("Proverbs", 31).unwrap();
    assert_eq!(hit.verse_count(), 31);
    assert!(second.api().transport().calls().is_empty());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn search_results() -> FakeTransport {
    FakeTransport::new(|_, params| {
        let page = params
            .iter()
            .find(|(k, _)| *k == "page")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        body(format!(
            r#"{{"page": {}, "total_pages": 1, "total_results": 1,
                "results": [{{"reference": "John 11:35", "content": "Jesus wept."}}]}}"#,
            page
        ))
    })
}

#[test]
fn test_search_defaults_to_first_page() {
    let api = EsvApi::new(search_results());
    let result = api.search("Jesus wept").unwrap();
    assert_eq!(result.page, 1);
    assert_eq!(result.total_results, 1);
    assert_eq!(result.results[0].reference, "John 11:35");

    let calls = api.transport().calls();
    assert_eq!(calls[0].0, Endpoint::Search);
    assert_eq!(param(&calls[0].1, "page-size"), "20");
    assert_eq!(param(&calls[0].1, "page"), "1");
}

#[test]
fn test_oversized_page_is_rejected_before_any_call() {
    let api = EsvApi::new(search_results());
    assert!(matches!(
        api.search_page("a query!", 101, 1),
        Err(LecternError::SearchInvalid(101))
    ));
    assert!(api.transport().calls().is_empty());

    assert_eq!(api.search_page("love", 100, 2).unwrap().page, 2);
}

#[test]
fn test_search_transport_failure_is_search_error() {
    let api = EsvApi::new(FakeTransport::new(|_, _| {
        Err(TransportError::Status {
            status: 503,
            url: "https://api.esv.org/v3/passage/search/".into(),
        })
    }));
    assert!(matches!(
        api.search("love"),
        Err(LecternError::SearchError(_))
    ));
}

// ---------------------------------------------------------------------------
// Audio and HTML
// ---------------------------------------------------------------------------

#[test]
fn test_audio_returns_final_url() {
    let api = EsvApi::new(FakeTransport::new(|_, params| {
        let q = params[0].1.replace(' ', "%20");
        Ok(TransportResponse {
            url: format!("https://audio.esv.org/hw/mq/{}.mp3", q),
            body: String::new(),
        })
    }));

    assert_eq!(
        api.audio_url("John", 11, Some(35)).unwrap(),
        "https://audio.esv.org/hw/mq/John%2011:35.mp3"
    );
    assert_eq!(
        api.audio_url("John", 11, None).unwrap(),
        "https://audio.esv.org/hw/mq/John%2011.mp3"
    );
}

#[test]
fn test_audio_without_url_is_not_found() {
    let api = EsvApi::new(FakeTransport::new(|_, _| body(String::new())));
    assert!(matches!(
        api.audio_url("John", 11, None),
        Err(LecternError::PassageNotFound(q)) if q == "John 11"
    ));
}

#[test]
fn test_html_passthrough_and_basic() {
    let api = EsvApi::new(FakeTransport::new(|_, params| {
        if params.iter().any(|(_, v)| v == "Book 25") {
            return body(r#"{"query": "Book 25", "canonical": "", "passages": []}"#.into());
        }
        body(
            r#"{"query": "John 11:35", "canonical": "John 11:35",
                "parsed": [[43011035, 43011035]],
                "passage_meta": [{"canonical": "John 11:35", "chapter_start": [43011001, 43011057],
                                  "chapter_end": [43011001, 43011057], "prev_verse": 43011034,
                                  "next_verse": 43011036, "prev_chapter": [43010001, 43010042],
                                  "next_chapter": [43012001, 43012050]}],
                "passages": ["<h2>John 11:35</h2><p>Jesus wept.</p>"]}"#
                .into(),
        )
    }));

    let html = api
        .passage_html("John 11:35", &HtmlOptions::default())
        .unwrap();
    assert_eq!(html.canonical, "John 11:35");
    assert_eq!(html.parsed[0].len(), 2);
    assert_eq!(html.passage_meta[0].next_verse, Some(43011036));

    let basic = api.passage_html_basic("John 11:35").unwrap();
    assert_eq!(basic.len(), 1);
    let calls = api.transport().calls();
    assert_eq!(param(&calls[1].1, "include-footnotes"), "false");
    assert_eq!(param(&calls[1].1, "include-audio-link"), "false");

    assert!(matches!(
        api.passage_html("Book 25", &HtmlOptions::default()),
        Err(LecternError::InvalidPassage(_))
    ));
}
