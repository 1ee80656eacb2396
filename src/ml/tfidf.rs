//! TF-IDF vectorization of event descriptions.
//!
//! Follows the common scikit-learn defaults: lowercased `\b\w\w+\b` tokens,
//! English stop words removed, smooth IDF (`ln((1+n)/(1+df)) + 1`) and
//! L2-normalized rows, so cosine similarity is a plain dot product.

use ndarray::{Array2, ArrayView1};
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;
use stop_words::{get, LANGUAGE};

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

static ENGLISH_STOP_WORDS: LazyLock<HashSet<String>> =
    LazyLock::new(|| get(LANGUAGE::English).into_iter().collect());

#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    max_features: Option<usize>,
}

/// Result of fitting on a corpus: one row per document, one column per term
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    pub vocabulary: Vec<String>,
    pub rows: Array2<f64>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the `n` terms with the highest total count in the corpus
    pub fn with_max_features(n: usize) -> Self {
        Self {
            max_features: Some(n),
        }
    }

    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> TfidfMatrix {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        // corpus term counts and document frequencies
        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                *term_counts.entry(token.as_str()).or_insert(0) += 1;
                if seen.insert(token.as_str()) {
                    *doc_freq.entry(token.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut terms: Vec<(&str, usize)> = term_counts.into_iter().collect();
        if let Some(limit) = self.max_features {
            terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            terms.truncate(limit);
        }

        // vocabulary columns are ordered alphabetically
        let columns: BTreeMap<&str, usize> = {
            let mut names: Vec<&str> = terms.iter().map(|(t, _)| *t).collect();
            names.sort_unstable();
            names.into_iter().enumerate().map(|(i, t)| (t, i)).collect()
        };

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = columns
            .keys()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut rows = Array2::<f64>::zeros((documents.len(), columns.len()));
        for (i, tokens) in tokenized.iter().enumerate() {
            for token in tokens {
                if let Some(&j) = columns.get(token.as_str()) {
                    rows[[i, j]] += 1.0;
                }
            }
            let mut row = rows.row_mut(i);
            for (j, value) in row.iter_mut().enumerate() {
                *value *= idf[j];
            }
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        TfidfMatrix {
            vocabulary: columns.keys().map(|t| t.to_string()).collect(),
            rows,
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !ENGLISH_STOP_WORDS.contains(*t))
        .map(str::to_string)
        .collect()
}

/// Cosine similarity of two L2-normalized rows
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.dot(&b)
}
