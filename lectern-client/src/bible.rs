//! Cached chapter access on top of [`EsvApi`].

use crate::api::EsvApi;
use crate::transport::{HttpTransport, Transport};
use lectern_core::{has_passage, ChapterCache, Config, LecternError, ParsedChapter};
use tracing::{debug, warn};

/// Owns the API client and the chapter cache.
///
/// Cache reads and writes take `&mut self`, so the lookup, eviction and
/// insert for one request always run as a unit. Share across threads by
/// wrapping the whole `Bible` in a `Mutex`.
pub struct Bible<T = HttpTransport> {
    api: EsvApi<T>,
    cache: ChapterCache,
}

impl Bible<HttpTransport> {
    /// HTTP transport and snapshot cache as described by `config`.
    pub fn from_config(config: &Config, api_key: &str) -> lectern_core::Result<Self> {
        let transport =
            HttpTransport::new(&config.api.base_url, api_key, config.timeout_duration())
                .map_err(|e| LecternError::Client(e.to_string()))?;
        let cache = if config.cache.persist {
            ChapterCache::open(&config.cache.path, config.cache.verse_budget)
        } else {
            ChapterCache::in_memory(config.cache.verse_budget)
        };
        Ok(Self::new(EsvApi::new(transport), cache))
    }
}

impl<T: Transport> Bible<T> {
    pub fn new(api: EsvApi<T>, cache: ChapterCache) -> Self {
        Self { api, cache }
    }

    pub fn api(&self) -> &EsvApi<T> {
        &self.api
    }

    pub fn cache(&self) -> &ChapterCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ChapterCache {
        &mut self.cache
    }

    /// A whole chapter, from the cache when possible.
    ///
    /// On a miss the chapter is fetched, parsed and cached. If the upstream
    /// response is malformed the retry notice is returned and nothing is
    /// cached.
    pub fn get_passage(
        &mut self,
        book: &str,
        chapter: u32,
    ) -> lectern_core::Result<ParsedChapter> {
        if !has_passage(book, chapter) {
            return Err(LecternError::InvalidPassage(format!("{} {}", book, chapter)));
        }
        if let Some(hit) = self.cache.get(book, chapter) {
            debug!(book, chapter, "chapter cache hit");
            return Ok(hit);
        }
        debug!(book, chapter, "chapter cache miss");

        let (parsed, overloaded) = self.api.chapter_lenient(book, chapter)?;
        if overloaded {
            warn!(book, chapter, "not caching retry notice");
            return Ok(parsed);
        }
        self.cache
            .put(book, chapter, parsed.verses.clone(), parsed.footnotes.clone())?;
        Ok(parsed)
    }

    /// A whole chapter straight from the API, bypassing the cache.
    ///
    /// Strict: invalid references and malformed responses are both
    /// `InvalidPassage`.
    pub fn get_chapter_json(
        &self,
        book: &str,
        chapter: u32,
    ) -> lectern_core::Result<ParsedChapter> {
        self.api.chapter(book, chapter)
    }

    /// Flush the cache snapshot and release the client.
    pub fn shutdown(self) -> lectern_core::Result<()> {
        self.cache.flush()
    }
}
