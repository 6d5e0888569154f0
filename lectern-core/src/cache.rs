//! Bounded chapter cache with a JSON snapshot on disk.
//!
//! Every (book, chapter) pair in the canon owns exactly one slot, empty until
//! a chapter is stored. The cache keeps the total number of resident verses
//! under a budget; when an insert would cross it, filled slots are cleared in
//! canonical order (Genesis 1 first) until the new chapter fits.

use crate::canon::{self, CANON};
use crate::chapter::{HeadingMap, ParsedChapter};
use crate::LecternError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Upper bound on resident verses, from the upstream quota.
pub const DEFAULT_VERSE_BUDGET: usize = 500;

/// A stored chapter body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub verses: HeadingMap<Vec<String>>,
    pub footnotes: String,
}

impl CacheEntry {
    pub fn verse_count(&self) -> usize {
        self.verses.verse_count()
    }
}

/// Result of a single `put`, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOutcome {
    pub evicted_chapters: usize,
    pub evicted_verses: usize,
}

pub struct ChapterCache {
    /// `slots[book_index][chapter - 1]`
    slots: Vec<Vec<Option<CacheEntry>>>,
    budget: usize,
    /// Snapshot location; `None` once persistence is off for this process.
    path: Option<PathBuf>,
}

impl ChapterCache {
    /// A cache that never touches disk.
    pub fn in_memory(budget: usize) -> Self {
        Self {
            slots: empty_slots(),
            budget,
            path: None,
        }
    }

    /// Load the snapshot at `path`, or start all-empty if it is missing or
    /// unreadable. Later writes go back to `path`.
    pub fn open(path: impl Into<PathBuf>, budget: usize) -> Self {
        let path = path.into();
        let slots = match load_snapshot(&path) {
            Ok(Some(slots)) => {
                info!(path = %path.display(), "loaded chapter cache snapshot");
                slots
            }
            Ok(None) => {
                debug!(path = %path.display(), "no chapter cache snapshot, starting empty");
                empty_slots()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable chapter cache snapshot");
                empty_slots()
            }
        };

        let mut cache = Self {
            slots,
            budget,
            path: Some(path),
        };
        // A snapshot written under a larger budget may be over the limit.
        let resident = cache.resident_verses();
        if resident >= budget {
            let freed = cache.evict(resident + 1 - budget);
            info!(
                evicted_verses = freed.evicted_verses,
                "trimmed snapshot to verse budget"
            );
        }
        cache
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Cached chapter, or `None` on a miss. Unknown references are misses.
    pub fn get(&self, book: &str, chapter: u32) -> Option<ParsedChapter> {
        let entry = self.slot(book, chapter)?.as_ref()?;
        if entry.verses.is_empty() {
            return None;
        }
        Some(ParsedChapter {
            book: book.to_string(),
            chapter: chapter.to_string(),
            verses: entry.verses.clone(),
            footnotes: entry.footnotes.clone(),
        })
    }

    /// Store a chapter, evicting older chapters first if the total would
    /// reach the budget, then persist the snapshot.
    ///
    /// Persistence failures are logged and switch the cache to in-memory
    /// mode; they never fail the insert.
    pub fn put(
        &mut self,
        book: &str,
        chapter: u32,
        verses: HeadingMap<Vec<String>>,
        footnotes: String,
    ) -> crate::Result<PutOutcome> {
        let (b, c) = slot_index(book, chapter)
            .ok_or_else(|| LecternError::InvalidPassage(format!("{} {}", book, chapter)))?;

        // The slot is about to be overwritten; its old verses don't count.
        self.slots[b][c] = None;

        let incoming = verses.verse_count();
        let resident = self.resident_verses();
        let mut outcome = PutOutcome::default();

        if resident + incoming >= self.budget {
            let required = (resident + incoming + 1).saturating_sub(self.budget);
            outcome = self.evict(required);
            info!(
                book,
                chapter,
                evicted_chapters = outcome.evicted_chapters,
                evicted_verses = outcome.evicted_verses,
                "evicted cached chapters to stay under verse budget"
            );
            if incoming >= self.budget {
                warn!(
                    book,
                    chapter,
                    verses = incoming,
                    budget = self.budget,
                    "chapter alone exceeds the verse budget"
                );
            }
        }

        self.slots[b][c] = Some(CacheEntry { verses, footnotes });
        debug!(book, chapter, verses = incoming, "cached chapter");
        self.persist();
        Ok(outcome)
    }

    /// Sum of verse-list lengths across every heading of every slot.
    pub fn resident_verses(&self) -> usize {
        self.entries().map(CacheEntry::verse_count).sum()
    }

    /// Number of filled slots.
    pub fn occupied(&self) -> usize {
        self.entries().count()
    }

    /// Empty every slot and persist.
    pub fn clear(&mut self) {
        self.slots = empty_slots();
        self.persist();
    }

    /// Write the snapshot now (shutdown). Unlike `put`, errors go to the caller.
    pub fn flush(&self) -> crate::Result<()> {
        match &self.path {
            Some(path) => write_snapshot(path, &self.slots),
            None => Ok(()),
        }
    }

    fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.slots.iter().flatten().flatten()
    }

    fn slot(&self, book: &str, chapter: u32) -> Option<&Option<CacheEntry>> {
        let (b, c) = slot_index(book, chapter)?;
        Some(&self.slots[b][c])
    }

    /// Clear filled slots in canonical order until `required` verses are freed.
    fn evict(&mut self, required: usize) -> PutOutcome {
        let mut outcome = PutOutcome::default();
        for slot in self.slots.iter_mut().flatten() {
            if outcome.evicted_verses >= required {
                break;
            }
            if let Some(entry) = slot.take() {
                outcome.evicted_chapters += 1;
                outcome.evicted_verses += entry.verse_count();
            }
        }
        outcome
    }

    fn persist(&mut self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = write_snapshot(path, &self.slots) {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to write chapter cache, continuing in memory only"
            );
            self.path = None;
        }
    }
}

fn empty_slots() -> Vec<Vec<Option<CacheEntry>>> {
    CANON
        .iter()
        .map(|b| vec![None; b.chapter_count as usize])
        .collect()
}

fn slot_index(book: &str, chapter: u32) -> Option<(usize, usize)> {
    let b = canon::book_index(book)?;
    if (1..=CANON[b].chapter_count).contains(&chapter) {
        Some((b, chapter as usize - 1))
    } else {
        None
    }
}

/// `{}` in the snapshot.
#[derive(Serialize)]
struct EmptySlot {}

struct Snapshot<'a>(&'a [Vec<Option<CacheEntry>>]);
struct BookSlots<'a>(&'a [Option<CacheEntry>]);

impl Serialize for Snapshot<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (book, slots) in CANON.iter().zip(self.0) {
            map.serialize_entry(book.name, &BookSlots(slots))?;
        }
        map.end()
    }
}

impl Serialize for BookSlots<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, slot) in self.0.iter().enumerate() {
            let key = (i + 1).to_string();
            match slot {
                Some(entry) => map.serialize_entry(&key, entry)?,
                None => map.serialize_entry(&key, &EmptySlot {})?,
            }
        }
        map.end()
    }
}

fn write_snapshot(path: &Path, slots: &[Vec<Option<CacheEntry>>]) -> crate::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, &Snapshot(slots))?;
        writer.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// `Ok(None)` when there is no snapshot file.
fn load_snapshot(path: &Path) -> crate::Result<Option<Vec<Vec<Option<CacheEntry>>>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let raw: HashMap<String, HashMap<String, serde_json::Value>> =
        serde_json::from_reader(BufReader::new(file))?;

    let mut slots = empty_slots();
    for (book, chapters) in raw {
        for (chapter, value) in chapters {
            let Some((b, c)) = chapter
                .parse()
                .ok()
                .and_then(|chapter| slot_index(&book, chapter))
            else {
                continue;
            };
            // Empty slots are stored as `{}` and fail to deserialize as entries.
            slots[b][c] = serde_json::from_value(value).ok();
        }
    }
    Ok(Some(slots))
}
