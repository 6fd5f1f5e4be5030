//! TF-IDF vectorizer applying a pre-fitted vocabulary and idf table.
//!
//! The transform follows scikit-learn's `TfidfVectorizer.transform`:
//! 1. optional lowercasing
//! 2. tokenization with `token_pattern` (default `(?u)\b\w\w+\b`)
//! 3. stop-word removal, then word n-grams over `ngram_range`
//! 4. term counts (or `1 + ln(tf)` when `sublinear_tf`) times `idf`
//! 5. `l2` / `l1` row normalization, or none
//!
//! Terms outside the vocabulary are dropped, so text without any known term
//! embeds to the zero vector.

use crate::error::{EmbedderError, Result};
use crate::{Embedding, TextEmbedder};
use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after tf-idf weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk layout of a fitted model
#[derive(Debug, Deserialize)]
struct TfidfModelFile {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default)]
    token_pattern: Option<String>,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    lowercase: bool,
    ngram_range: (usize, usize),
    norm: Option<Norm>,
    sublinear_tf: bool,
    stop_words: HashSet<String>,
    token_pattern: Regex,
}

impl TfidfVectorizer {
    /// Build a vectorizer with scikit-learn's default options.
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f32>) -> Result<Self> {
        let vectorizer = Self {
            vocabulary,
            idf,
            lowercase: true,
            ngram_range: default_ngram_range(),
            norm: default_norm(),
            sublinear_tf: false,
            stop_words: HashSet::new(),
            token_pattern: Regex::new(DEFAULT_TOKEN_PATTERN)?,
        };
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Result<Self> {
        self.ngram_range = (min_n, max_n);
        self.validate()?;
        Ok(self)
    }

    /// Load a fitted model from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading TF-IDF model from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => EmbedderError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => EmbedderError::Io(e),
        })?;
        let vectorizer = Self::from_json_str(&content)?;
        info!(
            "TF-IDF model ready: {} terms, ngram_range {:?}",
            vectorizer.vocabulary.len(),
            vectorizer.ngram_range
        );
        Ok(vectorizer)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let model: TfidfModelFile = serde_json::from_str(content)?;
        let token_pattern = Regex::new(
            model
                .token_pattern
                .as_deref()
                .unwrap_or(DEFAULT_TOKEN_PATTERN),
        )?;
        let vectorizer = Self {
            vocabulary: model.vocabulary,
            idf: model.idf,
            lowercase: model.lowercase,
            ngram_range: model.ngram_range,
            norm: model.norm,
            sublinear_tf: model.sublinear_tf,
            stop_words: model.stop_words.into_iter().collect(),
            token_pattern,
        };
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    fn validate(&self) -> Result<()> {
        if self.idf.is_empty() {
            return Err(EmbedderError::InvalidModel("idf table is empty".into()));
        }
        if let Some((term, &index)) = self
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= self.idf.len())
        {
            return Err(EmbedderError::InvalidModel(format!(
                "term {:?} maps to column {} but idf has {} entries",
                term,
                index,
                self.idf.len()
            )));
        }
        if let Some(bad) = self.idf.iter().find(|v| !v.is_finite()) {
            return Err(EmbedderError::InvalidModel(format!(
                "idf contains non-finite value {}",
                bad
            )));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(EmbedderError::InvalidModel(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }
        if self.token_pattern.captures_len() > 2 {
            return Err(EmbedderError::InvalidModel(
                "token pattern may contain at most one capture group".into(),
            ));
        }
        Ok(())
    }

    /// Split text into the terms the vocabulary is keyed by.
    ///
    /// A token pattern with one capture group yields the group, like
    /// scikit-learn does.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = if self.token_pattern.captures_len() == 2 {
            self.token_pattern
                .captures_iter(&text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect()
        } else {
            self.token_pattern
                .find_iter(&text)
                .map(|m| m.as_str())
                .collect()
        };
        let tokens: Vec<&str> = tokens
            .into_iter()
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn transform(&self, text: &str) -> Embedding {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = vec![0.0f32; self.idf.len()];
        for (column, tf) in counts {
            let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
            vector[column] = tf * self.idf[column];
        }

        let norm = match self.norm {
            Some(Norm::L2) => vector.iter().map(|v| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => vector.iter().map(|v| v.abs()).sum::<f32>(),
            None => 1.0,
        };
        if norm > 0.0 && norm != 1.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl TextEmbedder for TfidfVectorizer {
    fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(self.transform(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        debug!("Embedding batch of {} texts", texts.len());
        Ok(texts.par_iter().map(|text| self.transform(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.idf.len()
    }

    fn model_name(&self) -> &str {
        "tfidf"
    }
}
