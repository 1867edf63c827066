//! Lexical helpers shared by the grounding and relevance detectors

use std::collections::{HashMap, HashSet};

/// Function words carrying no claim content; excluded from overlap scoring.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had", "has",
    "have", "he", "her", "his", "i", "in", "into", "is", "it", "its", "it's", "my", "of", "on",
    "or", "our", "she", "that", "the", "their", "there", "they", "this", "to", "was", "we", "were",
    "what", "which", "who", "will", "with", "you", "your",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Light suffix stripping so inflected forms compare equal
/// (landed/landing → land). Deliberately crude; only applied to longer
/// words to avoid mangling short ones.
fn normalize(word: &str) -> String {
    if word.len() > 5 {
        for suffix in ["ing", "ed", "es"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                return stem.to_string();
            }
        }
    }
    if word.len() > 4 {
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
    }
    word.to_string()
}

/// Lowercased, normalized content words of a text.
pub fn content_words(text: &str) -> HashSet<String> {
    split_words(text)
        .filter(|w| !is_stopword(w))
        .map(|w| normalize(&w))
        .collect()
}

/// Term-frequency map over all words (stopwords included; frequency weight
/// matters more than content filtering for similarity scoring).
pub fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in split_words(text) {
        *counts.entry(normalize(&word)).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity between two term-frequency vectors. Returns 0.0 when
/// either text has no words.
pub fn cosine_similarity(a: &HashMap<String, usize>, b: &HashMap<String, usize>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, &count)| b.get(term).map(|&other| (count * other) as f64))
        .sum();
    let norm = |m: &HashMap<String, usize>| -> f64 {
        m.values().map(|&c| (c * c) as f64).sum::<f64>().sqrt()
    };
    dot / (norm(a) * norm(b))
}

fn split_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}
