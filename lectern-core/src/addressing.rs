//! Reference validation and chapter-to-chapter traversal over the canon.

use crate::canon::{self, CANON};
use crate::LecternError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A book + chapter reference into the canon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassageRef {
    pub book: String,
    pub chapter: u32,
}

impl PassageRef {
    pub fn new(book: impl Into<String>, chapter: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
        }
    }

    pub fn is_valid(&self) -> bool {
        has_passage(&self.book, self.chapter)
    }
}

impl fmt::Display for PassageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)
    }
}

/// True iff `book` is in the canon and `1 <= chapter <= chapter_count`.
pub fn has_passage(book: &str, chapter: u32) -> bool {
    match canon::chapter_count(book) {
        Ok(count) => (1..=count).contains(&chapter),
        Err(_) => false,
    }
}

fn validated_index(book: &str, chapter: u32) -> crate::Result<usize> {
    match canon::book_index(book) {
        Some(i) if (1..=CANON[i].chapter_count).contains(&chapter) => Ok(i),
        _ => Err(LecternError::InvalidPassage(format!("{} {}", book, chapter))),
    }
}

/// The chapter before `book chapter`, crossing book boundaries and wrapping
/// from Genesis 1 to the last chapter of Revelation.
pub fn previous_passage(book: &str, chapter: u32) -> crate::Result<(&'static str, String)> {
    let i = validated_index(book, chapter)?;
    if chapter > 1 {
        return Ok((CANON[i].name, (chapter - 1).to_string()));
    }
    let prev = CANON[(i + CANON.len() - 1) % CANON.len()];
    Ok((prev.name, prev.chapter_count.to_string()))
}

/// The chapter after `book chapter`, wrapping from the end of Revelation back
/// to Genesis 1.
pub fn next_passage(book: &str, chapter: u32) -> crate::Result<(&'static str, String)> {
    let i = validated_index(book, chapter)?;
    if chapter < CANON[i].chapter_count {
        return Ok((CANON[i].name, (chapter + 1).to_string()));
    }
    let next = CANON[(i + 1) % CANON.len()];
    Ok((next.name, "1".to_string()))
}

/// Upstream query string for a whole chapter.
///
/// Single-chapter books expand to an explicit verse range (`"Jude 1-25"`);
/// everything else is the bare `"Book C"` form.
pub fn chapter_query(book: &str, chapter: u32) -> crate::Result<String> {
    validated_index(book, chapter)?;
    Ok(match canon::single_chapter_last_verse(book) {
        Some(last) => format!("{} 1-{}", book, last),
        None => format!("{} {}", book, chapter),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::ordered_books;

    #[test]
    fn test_has_passage() {
        assert!(has_passage("Genesis", 50));
        assert!(!has_passage("Genesis", 51));
        assert!(!has_passage("Genesis", 0));
        assert!(!has_passage("Book", 25));
        assert!(!has_passage("john", 3));
    }

    #[test]
    fn test_has_passage_bounds_for_every_book() {
        for book in ordered_books() {
            assert!(has_passage(book.name, 1), "{} 1", book.name);
            assert!(has_passage(book.name, book.chapter_count));
            assert!(!has_passage(book.name, book.chapter_count + 1));
        }
    }

    #[test]
    fn test_previous_passage() {
        assert_eq!(
            previous_passage("John", 3).unwrap(),
            ("John", "2".to_string())
        );
        assert_eq!(
            previous_passage("John", 1).unwrap(),
            ("Luke", "24".to_string())
        );
        assert_eq!(
            previous_passage("Genesis", 1).unwrap(),
            ("Revelation", "22".to_string())
        );
        assert_eq!(
            previous_passage("Hebrews", 1).unwrap(),
            ("Philemon", "1".to_string())
        );
    }

    #[test]
    fn test_next_passage() {
        assert_eq!(next_passage("John", 4).unwrap(), ("John", "5".to_string()));
        assert_eq!(next_passage("Luke", 24).unwrap(), ("John", "1".to_string()));
        assert_eq!(
            next_passage("Revelation", 22).unwrap(),
            ("Genesis", "1".to_string())
        );
        assert_eq!(next_passage("Jude", 1).unwrap(), ("Revelation", "1".to_string()));
    }

    #[test]
    fn test_traversal_rejects_invalid_reference() {
        assert!(matches!(
            previous_passage("Genesis", 51),
            Err(LecternError::InvalidPassage(r)) if r == "Genesis 51"
        ));
        assert!(matches!(
            next_passage("Book", 1),
            Err(LecternError::InvalidPassage(_))
        ));
    }

    #[test]
    fn test_next_then_previous_walks_whole_canon() {
        let total: u32 = ordered_books().iter().map(|b| b.chapter_count).sum();
        let (mut book, mut chapter) = ("Genesis".to_string(), 1u32);
        for _ in 0..total {
            let (nb, nc) = next_passage(&book, chapter).unwrap();
            let (pb, pc) = previous_passage(nb, nc.parse().unwrap()).unwrap();
            assert_eq!((pb, pc.parse::<u32>().unwrap()), (book.as_str(), chapter));
            book = nb.to_string();
            chapter = nc.parse().unwrap();
        }
        assert_eq!((book.as_str(), chapter), ("Genesis", 1));
    }

    #[test]
    fn test_chapter_query_single_chapter_books() {
        assert_eq!(chapter_query("Jude", 1).unwrap(), "Jude 1-25");
        assert_eq!(chapter_query("Obadiah", 1).unwrap(), "Obadiah 1-21");
        assert_eq!(chapter_query("Philemon", 1).unwrap(), "Philemon 1-25");
        assert_eq!(chapter_query("2 John", 1).unwrap(), "2 John 1-13");
        assert_eq!(chapter_query("3 John", 1).unwrap(), "3 John 1-15");
        assert_eq!(chapter_query("John", 11).unwrap(), "John 11");
        assert!(chapter_query("Jude", 2).is_err());
    }

    #[test]
    fn test_passage_ref_display() {
        let r = PassageRef::new("Song of Solomon", 2);
        assert_eq!(r.to_string(), "Song of Solomon 2");
        assert!(r.is_valid());
    }
}
