use crate::model::Post;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Symbol -> mention timestamps, keyed in first-seen order.
///
/// Timestamps follow the order posts were iterated (source ranking), not `created_at`.
/// A post naming a symbol twice contributes its timestamp twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MentionIndex {
    entries: Vec<(String, Vec<DateTime<Utc>>)>,
    positions: HashMap<String, usize>,
}

impl MentionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, symbol: &str, at: DateTime<Utc>) {
        match self.positions.get(symbol) {
            Some(&pos) => self.entries[pos].1.push(at),
            None => {
                self.positions.insert(symbol.to_string(), self.entries.len());
                self.entries.push((symbol.to_string(), vec![at]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(symbol, _)| symbol.as_str())
    }

    pub fn mentions(&self, symbol: &str) -> Option<&[DateTime<Utc>]> {
        self.positions
            .get(symbol)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn mention_count(&self, symbol: &str) -> usize {
        self.mentions(symbol).map_or(0, <[_]>::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DateTime<Utc>])> {
        self.entries
            .iter()
            .map(|(symbol, stamps)| (symbol.as_str(), stamps.as_slice()))
    }

    /// Symbols by descending mention count; ties stay in first-seen order.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .iter()
            .map(|(symbol, stamps)| (symbol, stamps.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Builds the mention index for one run.
pub fn aggregate<F>(posts: &[Post], include_comments: bool, extract: F) -> MentionIndex
where
    F: Fn(&str) -> Vec<String>,
{
    let mut index = MentionIndex::new();
    for post in posts {
        for symbol in extract(&post.scan_text(include_comments)) {
            index.record(&symbol, post.created_at);
        }
    }
    index
}
