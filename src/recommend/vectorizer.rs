//! TF-IDF vector space over a small document collection.
//!
//! ```text
//! tf(t, d)   = count of t in d
//! idf(t)     = ln((1 + n) / (1 + df(t))) + 1
//! w(t, d)    = tf(t, d) * idf(t), each row scaled to unit L2 norm
//! ```
//!
//! The vocabulary is ordered lexicographically so the column layout, and
//! with it every score, is reproducible across runs.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use lazy_static::lazy_static;
use nalgebra::{DMatrix, DVector};
use regex::Regex;
use thiserror::Error;

use super::stop_words::is_stop_word;

lazy_static! {
    // Runs of two or more word characters; single letters never become terms.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VectorizerError {
    #[error("cannot fit a vector space on zero documents")]
    NoDocuments,

    #[error("empty vocabulary; every document is empty or contains only stop words")]
    EmptyVocabulary,
}

/// Lowercased tokens of `text`, stop words included.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn analyze(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .collect()
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: DVector<f64>,
    documents: DMatrix<f64>,
}

impl TfidfVectorizer {
    /// Learns vocabulary and idf weights from `documents` and keeps their
    /// normalized rows for scoring.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Result<Self, VectorizerError> {
        if documents.is_empty() {
            return Err(VectorizerError::NoDocuments);
        }

        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| analyze(d.as_ref())).collect();

        let terms: BTreeSet<&str> = analyzed
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        if terms.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term.to_string(), idx))
            .collect();

        let n_docs = analyzed.len();
        let n_terms = vocabulary.len();

        let mut doc_freq = vec![0usize; n_terms];
        for tokens in &analyzed {
            let unique: HashSet<usize> = tokens.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for idx in unique {
                doc_freq[idx] += 1;
            }
        }

        let idf = DVector::from_iterator(
            n_terms,
            doc_freq
                .iter()
                .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0),
        );

        let mut documents = DMatrix::zeros(n_docs, n_terms);
        for (row, tokens) in analyzed.iter().enumerate() {
            for token in tokens {
                if let Some(&col) = vocabulary.get(token) {
                    documents[(row, col)] += 1.0;
                }
            }
            for col in 0..n_terms {
                documents[(row, col)] *= idf[col];
            }
            let norm = documents.row(row).norm();
            if norm > 0.0 {
                for col in 0..n_terms {
                    documents[(row, col)] /= norm;
                }
            }
        }

        Ok(Self {
            vocabulary,
            idf,
            documents,
        })
    }

    /// Projects `text` into the fitted space. Unknown terms are ignored, so
    /// text with no known terms maps to the zero vector.
    pub fn transform(&self, text: &str) -> DVector<f64> {
        let mut vector = DVector::zeros(self.vocabulary.len());
        for token in analyze(text) {
            if let Some(&col) = self.vocabulary.get(&token) {
                vector[col] += 1.0;
            }
        }
        vector.component_mul_assign(&self.idf);

        let norm = vector.norm();
        if norm > 0.0 {
            vector /= norm;
        }
        vector
    }

    /// Cosine similarity of `text` against every fitted document, in fit order.
    pub fn similarities(&self, text: &str) -> Vec<f64> {
        let query = self.transform(text);
        (0..self.documents.nrows())
            .map(|row| cosine_similarity(&query, &self.documents.row(row).transpose()))
            .collect()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &DVector<f64> {
        &self.idf
    }

    pub fn document_matrix(&self) -> &DMatrix<f64> {
        &self.documents
    }
}

/// Dot product over the product of magnitudes; 0 when either side is zero.
pub fn cosine_similarity(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(tokenize("C# and R, a Go-to guide!"), vec!["and", "go", "to", "guide"]);
    }

    #[test]
    fn test_tokenize_lowercases_unicode() {
        assert_eq!(tokenize("Café Ünicode"), vec!["café", "ünicode"]);
    }

    #[test]
    fn test_vocabulary_excludes_stop_words_and_is_sorted() {
        let vectorizer = TfidfVectorizer::fit(&["the python course", "a yoga course"]).unwrap();
        let terms: Vec<&str> = vectorizer.vocabulary().keys().map(String::as_str).collect();
        assert_eq!(terms, vec!["course", "python", "yoga"]);
        assert_eq!(vectorizer.vocabulary()["course"], 0);
    }

    #[test]
    fn test_smoothed_idf() {
        let vectorizer = TfidfVectorizer::fit(&["python course", "yoga course"]).unwrap();
        let idf = vectorizer.idf();
        // "course" appears everywhere, "python" in one of two documents.
        assert!((idf[0] - 1.0).abs() < EPS);
        assert!((idf[1] - ((3.0_f64 / 2.0).ln() + 1.0)).abs() < EPS);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let vectorizer =
            TfidfVectorizer::fit(&["rust systems programming", "rust web", "cooking"]).unwrap();
        for row in vectorizer.document_matrix().row_iter() {
            assert!((row.norm() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_unknown_query_terms_are_ignored() {
        let vectorizer = TfidfVectorizer::fit(&["python course"]).unwrap();
        let query = vectorizer.transform("gardening knitting");
        assert_eq!(query.norm(), 0.0);
        assert_eq!(vectorizer.similarities("gardening"), vec![0.0]);
    }

    #[test]
    fn test_identical_text_scores_one() {
        let vectorizer = TfidfVectorizer::fit(&["machine learning basics", "web design"]).unwrap();
        let scores = vectorizer.similarities("machine learning basics");
        assert!((scores[0] - 1.0).abs() < EPS);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [&str; 0] = [];
        assert_eq!(TfidfVectorizer::fit(&empty).unwrap_err(), VectorizerError::NoDocuments);
        assert_eq!(
            TfidfVectorizer::fit(&["the and of", ""]).unwrap_err(),
            VectorizerError::EmptyVocabulary
        );
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = DVector::from_vec(vec![0.0, 0.0]);
        let b = DVector::from_vec(vec![1.0, 0.0]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_orthogonal_and_parallel() {
        let a = DVector::from_vec(vec![1.0, 0.0]);
        let b = DVector::from_vec(vec![0.0, 2.0]);
        let c = DVector::from_vec(vec![3.0, 0.0]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert!((cosine_similarity(&a, &c) - 1.0).abs() < EPS);
    }
}
