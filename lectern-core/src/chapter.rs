//! Parsed chapter data shared by the parser, the cache and the client.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Heading key for verses that appear before the first heading.
pub const NO_HEADING: &str = "none";

/// Heading → value mapping that keeps headings in source order.
///
/// Serializes as a JSON object; key order survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for HeadingMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> HeadingMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, heading: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(h, _)| h == heading)
            .map(|(_, v)| v)
    }

    /// Mutable access to `heading`, appending a fresh value if it is new.
    pub fn get_or_insert_with(&mut self, heading: &str, make: impl FnOnce() -> V) -> &mut V {
        let pos = match self.entries.iter().position(|(h, _)| h == heading) {
            Some(pos) => pos,
            None => {
                self.entries.push((heading.to_string(), make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, heading: impl Into<String>, value: V) {
        let heading = heading.into();
        match self.entries.iter_mut().find(|(h, _)| *h == heading) {
            Some((_, v)) => *v = value,
            None => self.entries.push((heading, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(h, v)| (h.as_str(), v))
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(h, _)| h.as_str())
    }

    pub fn map_values<U>(self, mut f: impl FnMut(V) -> U) -> HeadingMap<U> {
        HeadingMap {
            entries: self.entries.into_iter().map(|(h, v)| (h, f(v))).collect(),
        }
    }
}

impl HeadingMap<Vec<String>> {
    /// Total verses across every heading.
    pub fn verse_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

impl<V> FromIterator<(String, V)> for HeadingMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = HeadingMap::new();
        for (h, v) in iter {
            map.insert(h, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for HeadingMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (h, v) in &self.entries {
            map.serialize_entry(h, v)?;
        }
        map.end()
    }
}

struct HeadingMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for HeadingMapVisitor<V> {
    type Value = HeadingMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of heading to verses")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = HeadingMap::new();
        while let Some((h, v)) = access.next_entry::<String, V>()? {
            map.insert(h, v);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for HeadingMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(HeadingMapVisitor(PhantomData))
    }
}

/// One chapter split into headed verse lists plus its footnotes block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedChapter {
    pub book: String,
    /// Chapter number as a string, matching the JSON shape consumers expect.
    pub chapter: String,
    pub verses: HeadingMap<Vec<String>>,
    pub footnotes: String,
}

impl ParsedChapter {
    pub fn verse_count(&self) -> usize {
        self.verses.verse_count()
    }
}
