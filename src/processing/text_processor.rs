//! Tokenization and term filtering

use crate::config::MatchingConfig;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap, HashSet};

static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("Invalid punctuation regex"));

/// Endings of inflected or derived words that rarely name a skill
const GRAMMATICAL_SUFFIXES: &[&str] = &[
    "ing", "ed", "ly", "tion", "ment", "ness", "ous", "ive", "ful", "able",
];

/// Unique lowercase tokens of a document, kept in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    tokens: IndexSet<String>,
}

impl TokenSet {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.tokens.iter()
    }

    /// Tokens in first-occurrence order
    pub fn to_vec(&self) -> Vec<String> {
        self.tokens.iter().cloned().collect()
    }

    pub fn sorted(&self) -> BTreeSet<String> {
        self.tokens.iter().cloned().collect()
    }

    pub fn intersection(&self, other: &TokenSet) -> BTreeSet<String> {
        self.tokens.iter().filter(|t| other.contains(t)).cloned().collect()
    }

    pub fn difference(&self, other: &TokenSet) -> BTreeSet<String> {
        self.tokens.iter().filter(|t| !other.contains(t)).cloned().collect()
    }

    fn retain(&mut self, keep: impl FnMut(&String) -> bool) {
        self.tokens.retain(keep);
    }
}

impl FromIterator<String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl Serialize for TokenSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tokens.iter())
    }
}

pub struct TextProcessor {
    stop_words: HashSet<String>,
    resume_verbs: HashSet<String>,
    min_token_length: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new(&MatchingConfig::default())
    }
}

impl TextProcessor {
    pub fn new(config: &MatchingConfig) -> Self {
        let mut stop_words = Self::create_stop_words();
        stop_words.extend(config.extra_stopwords.iter().map(|w| w.to_lowercase()));

        Self {
            stop_words,
            resume_verbs: Self::create_resume_verbs(),
            min_token_length: config.min_token_length,
        }
    }

    /// Lowercase and replace everything but ASCII letters, digits and whitespace
    pub fn normalize(&self, text: &str) -> String {
        NON_ALPHANUMERIC.replace_all(&text.to_lowercase(), " ").into_owned()
    }

    /// Filtered tokens in document order, repetitions kept
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_length)
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }

    pub fn token_set(&self, text: &str) -> TokenSet {
        self.tokens(text).into_iter().collect()
    }

    /// Noun-like terms: the token set without resume verbs and inflected words
    pub fn skill_terms(&self, text: &str) -> TokenSet {
        let mut terms = self.token_set(text);
        terms.retain(|t| !self.resume_verbs.contains(t) && !Self::has_grammatical_suffix(t));
        terms
    }

    /// Most frequent tokens, ties broken alphabetically
    pub fn term_frequencies(&self, text: &str, max_terms: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in self.tokens(text) {
            *counts.entry(token).or_insert(0) += 1;
        }

        let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(max_terms);
        sorted
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    fn has_grammatical_suffix(token: &str) -> bool {
        GRAMMATICAL_SUFFIXES
            .iter()
            .any(|suffix| token.len() > suffix.len() + 2 && token.ends_with(suffix))
    }

    /// Function words and auxiliary verbs
    fn create_stop_words() -> HashSet<String> {
        let stop_words = [
            "the", "and", "for", "with", "that", "this", "are", "was", "were", "from", "you", "your",
            "our", "ours", "they", "them", "their", "its", "his", "her", "hers", "him", "she", "who",
            "whom", "whose", "which", "what", "when", "where", "why", "how", "all", "any", "both",
            "each", "few", "more", "most", "other", "some", "such", "nor", "not", "only", "own",
            "same", "than", "too", "very", "can", "will", "just", "should", "would", "could", "may",
            "might", "must", "shall", "has", "have", "had", "having", "does", "did", "doing", "been",
            "being", "into", "onto", "over", "under", "about", "above", "below", "between", "through",
            "during", "before", "after", "again", "further", "then", "once", "here", "there", "these",
            "those", "also", "well", "etc", "via", "per", "upon", "within", "without", "across",
            "along", "among", "while", "but", "yet", "out", "off", "able", "like",
        ];

        stop_words.iter().map(|&s| s.to_string()).collect()
    }

    /// Verbs and filler nouns that every resume and posting repeats
    fn create_resume_verbs() -> HashSet<String> {
        let verbs = [
            "developed", "managed", "led", "created", "built", "designed", "implemented", "worked",
            "experienced", "skilled", "responsible", "including", "using", "used", "strong",
            "ability", "experience", "skills", "skill", "team", "years", "year", "role", "position",
            "job", "candidate", "looking", "seeking", "need", "needs", "required", "requirements",
            "preferred", "plus", "knowledge", "understanding", "work", "new", "good", "great",
            "excellent", "proven", "hands", "highly", "join", "help", "make",
        ];

        verbs.iter().map(|&s| s.to_string()).collect()
    }
}
