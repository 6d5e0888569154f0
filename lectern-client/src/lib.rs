//! Lectern Client - Blocking access to the ESV passage API
//!
//! `EsvApi` implements the text, HTML, audio and search query modes over a
//! pluggable `Transport`; `Bible` adds the verse-budgeted chapter cache on
//! top.

pub mod api;
pub mod bible;
pub mod options;
pub mod transport;

pub use api::{
    EsvApi, HtmlPassage, PassageMeta, SearchPage, SearchResult, DEFAULT_SEARCH_PAGE_SIZE,
};
pub use bible::Bible;
pub use options::{AudioLinkTarget, HtmlOptions, IndentUsing, TextOptions};
pub use transport::{Endpoint, HttpTransport, Transport, TransportError, TransportResponse};
