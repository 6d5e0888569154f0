//! The fixed Protestant canon: 66 books in canonical order with chapter counts.

use crate::LecternError;

/// A book of the canon and how many chapters it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookEntry {
    pub name: &'static str,
    pub chapter_count: u32,
}

const fn book(name: &'static str, chapter_count: u32) -> BookEntry {
    BookEntry {
        name,
        chapter_count,
    }
}

/// Canonical order defines adjacency for previous/next traversal.
pub static CANON: [BookEntry; 66] = [
    book("Genesis", 50),
    book("Exodus", 40),
    book("Leviticus", 27),
    book("Numbers", 36),
    book("Deuteronomy", 34),
    book("Joshua", 24),
    book("Judges", 21),
    book("Ruth", 4),
    book("1 Samuel", 31),
    book("2 Samuel", 24),
    book("1 Kings", 22),
    book("2 Kings", 25),
    book("1 Chronicles", 29),
    book("2 Chronicles", 36),
    book("Ezra", 10),
    book("Nehemiah", 13),
    book("Esther", 10),
    book("Job", 42),
    book("Psalm", 150),
    book("Proverbs", 31),
    book("Ecclesiastes", 12),
    book("Song of Solomon", 8),
    book("Isaiah", 66),
    book("Jeremiah", 52),
    book("Lamentations", 5),
    book("Ezekiel", 48),
    book("Daniel", 12),
    book("Hosea", 14),
    book("Joel", 3),
    book("Amos", 9),
    book("Obadiah", 1),
    book("Jonah", 4),
    book("Micah", 7),
    book("Nahum", 3),
    book("Habakkuk", 3),
    book("Zephaniah", 3),
    book("Haggai", 2),
    book("Zechariah", 14),
    book("Malachi", 4),
    book("Matthew", 28),
    book("Mark", 16),
    book("Luke", 24),
    book("John", 21),
    book("Acts", 28),
    book("Romans", 16),
    book("1 Corinthians", 16),
    book("2 Corinthians", 13),
    book("Galatians", 6),
    book("Ephesians", 6),
    book("Philippians", 4),
    book("Colossians", 4),
    book("1 Thessalonians", 5),
    book("2 Thessalonians", 3),
    book("1 Timothy", 6),
    book("2 Timothy", 4),
    book("Titus", 3),
    book("Philemon", 1),
    book("Hebrews", 13),
    book("James", 5),
    book("1 Peter", 5),
    book("2 Peter", 3),
    book("1 John", 5),
    book("2 John", 1),
    book("3 John", 1),
    book("Jude", 1),
    book("Revelation", 22),
];

/// Last verse of each single-chapter book. The upstream service answers a
/// bare "Jude 1" with verse 1 only, so whole-chapter requests for these books
/// must be phrased as an explicit verse range.
static SINGLE_CHAPTER_LAST_VERSE: [(&str, u32); 5] = [
    ("Obadiah", 21),
    ("Philemon", 25),
    ("2 John", 13),
    ("3 John", 15),
    ("Jude", 25),
];

/// All books in canonical order.
pub fn ordered_books() -> &'static [BookEntry] {
    &CANON
}

/// Position of `name` in canonical order (case-sensitive exact match).
pub fn book_index(name: &str) -> Option<usize> {
    CANON.iter().position(|b| b.name == name)
}

pub fn chapter_count(name: &str) -> crate::Result<u32> {
    book_index(name)
        .map(|i| CANON[i].chapter_count)
        .ok_or_else(|| LecternError::UnknownBook(name.to_string()))
}

/// Final verse number for single-chapter books, `None` for every other book.
pub fn single_chapter_last_verse(name: &str) -> Option<u32> {
    SINGLE_CHAPTER_LAST_VERSE
        .iter()
        .find(|(book, _)| *book == name)
        .map(|(_, last)| *last)
}
