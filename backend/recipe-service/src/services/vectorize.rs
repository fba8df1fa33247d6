//! Term-frequency / inverse-document-frequency vector space model.
//!
//! Fit once over a fixed corpus of ingredient documents, then transform
//! incoming queries into sparse vectors comparable against the fitted
//! matrix. Vocabulary and idf weights are frozen at fit time; query terms
//! outside the vocabulary are ignored.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Terms must appear in at least this many documents.
const MIN_DF: usize = 1;
/// Terms appearing in more than this fraction of documents are dropped as
/// uninformative.
const MAX_DF_RATIO: f32 = 0.8;

#[derive(Debug, Error)]
pub enum VectorizeError {
    #[error("vocabulary is empty after tokenization and pruning")]
    EmptyVocabulary,

    #[error("transform called before fit")]
    NotFitted,
}

/// Sparse weight vector over the fitted vocabulary: `(term_id, weight)`
/// pairs sorted by term id, L2-normalized at construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparseVector(pub Vec<(usize, f32)>);

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

/// TF-IDF vectorizer over unigrams and bigrams with English stop-word
/// removal and smoothed idf weighting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    fitted: bool,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Fit the vocabulary and idf weights over `documents` and return the
    /// corpus matrix, one vector per input document in order.
    ///
    /// Fails with [`VectorizeError::EmptyVocabulary`] when no term survives
    /// tokenization and document-frequency pruning. That is fatal for the
    /// caller's training step; there is no fallback model.
    pub fn fit(&mut self, documents: &[String]) -> Result<Vec<SparseVector>, VectorizeError> {
        let n_docs = documents.len();
        if n_docs == 0 {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let doc_terms: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for terms in &doc_terms {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let max_df = MAX_DF_RATIO * n_docs as f32;
        let mut kept: Vec<(&str, usize)> = df
            .into_iter()
            .filter(|(_, count)| *count >= MIN_DF && (*count as f32) <= max_df)
            .collect();
        if kept.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }
        // Sorted vocabulary keeps term ids deterministic across fits.
        kept.sort_by(|a, b| a.0.cmp(b.0));

        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(id, (term, _))| (term.to_string(), id))
            .collect();
        self.idf = kept
            .iter()
            .map(|(_, count)| ((1.0 + n_docs as f32) / (1.0 + *count as f32)).ln() + 1.0)
            .collect();
        self.fitted = true;

        Ok(doc_terms.iter().map(|terms| self.weigh(terms)).collect())
    }

    /// Project a query onto the fitted vocabulary. Terms the fit never saw
    /// are ignored; a query with no known terms yields a zero vector.
    pub fn transform(&self, query: &str) -> Result<SparseVector, VectorizeError> {
        if !self.fitted {
            return Err(VectorizeError::NotFitted);
        }
        Ok(self.weigh(&tokenize(query)))
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in terms {
            if let Some(&id) = self.vocabulary.get(term.as_str()) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id]))
            .collect();
        entries.sort_by_key(|(id, _)| *id);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        SparseVector(entries)
    }
}

/// Lowercased alphanumeric word tokens of length >= 2, stop words removed,
/// then unigrams plus adjacent bigrams.
fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !STOP_WORDS.contains(w))
        .collect();

    let mut terms: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for pair in words.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down",
        "during", "each", "few", "for", "from", "further", "had", "has", "have", "having",
        "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "if", "in",
        "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself",
        "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our",
        "ours", "ourselves", "out", "over", "own", "same", "she", "should", "so", "some",
        "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
        "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
        "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
        "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
        "yourselves",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let mut v = TfidfVectorizer::new();
        let matrix = v
            .fit(&docs(&["pasta eggs pancetta", "chicken curry onion"]))
            .unwrap();
        assert!(v.is_fitted());
        assert_eq!(matrix.len(), 2);
        assert!(v.vocabulary_len() > 0);
        for vec in &matrix {
            assert!(!vec.is_zero());
        }
    }

    #[test]
    fn test_fit_empty_corpus_fails() {
        let mut v = TfidfVectorizer::new();
        assert!(matches!(
            v.fit(&[]),
            Err(VectorizeError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_fit_all_stop_words_fails() {
        let mut v = TfidfVectorizer::new();
        assert!(matches!(
            v.fit(&docs(&["the and of", "with from"])),
            Err(VectorizeError::EmptyVocabulary)
        ));
    }

    #[test]
    fn test_max_df_prunes_ubiquitous_terms() {
        // "salt" is in 100% of documents, above the 80% cutoff.
        let mut v = TfidfVectorizer::new();
        v.fit(&docs(&["salt pasta", "salt chicken", "salt beef", "salt lamb"]))
            .unwrap();
        let q = v.transform("salt").unwrap();
        assert!(q.is_zero());
    }

    #[test]
    fn test_transform_before_fit_rejected() {
        let v = TfidfVectorizer::new();
        assert!(matches!(v.transform("pasta"), Err(VectorizeError::NotFitted)));
    }

    #[test]
    fn test_unknown_query_terms_ignored() {
        let mut v = TfidfVectorizer::new();
        v.fit(&docs(&["pasta eggs", "chicken onion"])).unwrap();
        let q = v.transform("dragonfruit starlight").unwrap();
        assert!(q.is_zero());
    }

    #[test]
    fn test_vectors_are_l2_normalized() {
        let mut v = TfidfVectorizer::new();
        let matrix = v.fit(&docs(&["pasta eggs", "chicken onion"])).unwrap();
        for vec in matrix {
            let norm: f32 = vec.0.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_bigrams_included() {
        let mut v = TfidfVectorizer::new();
        v.fit(&docs(&["olive oil pasta", "chicken onion"])).unwrap();
        let q = v.transform("olive oil").unwrap();
        // Matches the "olive oil" bigram as well as both unigrams.
        assert!(q.0.len() >= 3);
    }
}
