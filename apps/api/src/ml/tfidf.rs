//! TF-IDF vectorizer with smoothed idf and L2-normalised sparse vectors.
//!
//! `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, term frequency is the raw count,
//! and every vector is scaled to unit length so cosine similarity is a dot product.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::ml::stop_words::is_stop_word;

/// Tokens of two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Single characters plus `/`, `+` and `-`, so "CI/CD" and "C++" survive.
pub const SKILL_TOKEN_PATTERN: &str = r"\b[\w/+-]+\b";

/// Sparse vector as (feature index, weight), sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfIdfBuilder {
    token_pattern: Regex,
    stop_words: bool,
    max_ngram: usize,
    max_features: Option<usize>,
    documents: Vec<String>,
}

impl TfIdfBuilder {
    pub fn new(token_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            token_pattern: Regex::new(token_pattern)?,
            stop_words: false,
            max_ngram: 1,
            max_features: None,
            documents: Vec::new(),
        })
    }

    pub fn english_stop_words(mut self) -> Self {
        self.stop_words = true;
        self
    }

    /// Emit every n-gram from 1 up to `max_ngram`.
    pub fn ngrams(mut self, max_ngram: usize) -> Self {
        self.max_ngram = max_ngram.max(1);
        self
    }

    /// Keep only the most frequent terms across the corpus.
    pub fn max_features(mut self, limit: usize) -> Self {
        self.max_features = Some(limit);
        self
    }

    pub fn add(&mut self, document: impl Into<String>) {
        self.documents.push(document.into());
    }

    pub fn build(self) -> TfIdfModel {
        let analyzer = Analyzer {
            token_pattern: self.token_pattern,
            stop_words: self.stop_words,
            max_ngram: self.max_ngram,
        };

        let counts: Vec<HashMap<String, usize>> = self
            .documents
            .iter()
            .map(|doc| analyzer.term_counts(doc))
            .collect();

        let mut corpus_freq: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in &counts {
            for (term, count) in doc {
                *corpus_freq.entry(term.as_str()).or_default() += count;
                *doc_freq.entry(term.as_str()).or_default() += 1;
            }
        }

        let mut terms: Vec<&str> = corpus_freq.keys().copied().collect();
        if let Some(limit) = self.max_features {
            if terms.len() > limit {
                // Highest corpus frequency wins; ties fall back to term order.
                terms.sort_by(|a, b| corpus_freq[b].cmp(&corpus_freq[a]).then(a.cmp(b)));
                terms.truncate(limit);
                terms.sort_unstable();
            }
        }

        let n = counts.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|t| ((1.0 + n) / (1.0 + doc_freq[t] as f64)).ln() + 1.0)
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let model = TfIdfModel {
            analyzer,
            vocabulary,
            idf,
            document_vectors: Vec::new(),
        };
        let document_vectors = counts.iter().map(|c| model.weigh(c)).collect();
        TfIdfModel {
            document_vectors,
            ..model
        }
    }
}

#[derive(Debug, Clone)]
struct Analyzer {
    token_pattern: Regex,
    stop_words: bool,
    max_ngram: usize,
}

impl Analyzer {
    fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .filter(|t| !(self.stop_words && is_stop_word(t)))
            .collect()
    }

    fn term_counts(&self, text: &str) -> HashMap<String, usize> {
        let tokens = self.tokens(text);
        let mut counts = HashMap::new();
        for n in 1..=self.max_ngram {
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_default() += 1;
            }
        }
        counts
    }
}

/// A fitted vocabulary with the vectors of the documents it was fitted on.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    analyzer: Analyzer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    document_vectors: Vec<SparseVector>,
}

impl TfIdfModel {
    #[cfg(test)]
    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    pub fn document_vectors(&self) -> &[SparseVector] {
        &self.document_vectors
    }

    /// Projects unseen text onto the fitted vocabulary. Unknown terms are dropped.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&self.analyzer.term_counts(text))
    }

    /// Cosine similarity of `text` against every fitted document, in fit order.
    pub fn similarities(&self, text: &str) -> Vec<f64> {
        let query = self.transform(text);
        self.document_vectors
            .iter()
            .map(|doc| cosine_similarity(&query, doc))
            .collect()
    }

    fn weigh(&self, counts: &HashMap<String, usize>) -> SparseVector {
        let mut vector: SparseVector = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&i| (i, count as f64 * self.idf[i]))
            })
            .collect();
        vector.sort_unstable_by_key(|(i, _)| *i);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in vector.iter_mut() {
                *w /= norm;
            }
        }
        vector
    }
}

/// Dot product of two index-sorted sparse vectors. Zero vectors score 0.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (mut i, mut j, mut dot) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills_model(docs: &[&str]) -> TfIdfModel {
        let mut builder = TfIdfBuilder::new(SKILL_TOKEN_PATTERN).unwrap();
        for doc in docs {
            builder.add(*doc);
        }
        builder.build()
    }

    #[test]
    fn test_identical_text_scores_one() {
        let model = skills_model(&["Python Docker CI/CD", "Figma Sketch"]);
        let scores = model.similarities("python docker ci/cd");
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_skill_pattern_keeps_slashes_and_plus() {
        let model = skills_model(&["CI/CD C++"]);
        assert_eq!(model.vocabulary_len(), 2);
        assert!(model.similarities("c++")[0] > 0.0);
    }

    #[test]
    fn test_smoothed_idf_prefers_rare_terms() {
        // "python" appears everywhere, "rust" only in the first document.
        let model = skills_model(&["python rust", "python go", "python java"]);
        let vector = model.transform("python rust");
        let weights: Vec<f64> = vector.iter().map(|(_, w)| *w).collect();
        assert_eq!(weights.len(), 2);
        assert!(weights.iter().any(|w| *w > 0.8));
    }

    #[test]
    fn test_empty_or_unknown_text_is_a_zero_vector() {
        let model = skills_model(&["python"]);
        assert!(model.transform("").is_empty());
        assert!(model.transform("cobol").is_empty());
        assert_eq!(model.similarities("   "), vec![0.0]);
    }

    #[test]
    fn test_stop_words_bigrams_and_feature_cap() {
        let mut builder = TfIdfBuilder::new(DEFAULT_TOKEN_PATTERN)
            .unwrap()
            .english_stop_words()
            .ngrams(2)
            .max_features(3);
        builder.add("the senior rust engineer with rust");
        builder.add("rust engineer");
        let model = builder.build();
        assert_eq!(model.vocabulary_len(), 3);
        // "rust" (3) and "engineer" (2) and "rust engineer" (2) are the most frequent.
        assert!(model.similarities("rust engineer")[1] > 0.99);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let model = skills_model(&["a b c", "b c d"]);
        for vector in model.document_vectors() {
            let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }
}
