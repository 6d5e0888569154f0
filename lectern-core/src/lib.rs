//! Lectern Core - Canon addressing, passage parsing and chapter caching
//!
//! This library holds everything about the ESV passage API that does not
//! need a network connection: the 66-book canon, previous/next chapter
//! traversal, the plain-text response parser, and the verse-budgeted
//! chapter cache.

pub mod addressing;
pub mod cache;
pub mod canon;
pub mod chapter;
pub mod config;
pub mod error;
pub mod parse;

pub use addressing::{chapter_query, has_passage, next_passage, previous_passage, PassageRef};
pub use cache::{CacheEntry, ChapterCache, PutOutcome, DEFAULT_VERSE_BUDGET};
pub use canon::{chapter_count, ordered_books, BookEntry};
pub use chapter::{HeadingMap, ParsedChapter, NO_HEADING};
pub use config::Config;
pub use error::{LecternError, MAX_SEARCH_PAGE_SIZE};
pub use parse::{parse_text_response, TextPassage};

/// Result type alias for lectern operations
pub type Result<T> = std::result::Result<T, LecternError>;
