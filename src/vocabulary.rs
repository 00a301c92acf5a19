//! Ingredient vocabulary and 0/1 feature extraction.
//!
//! The vocabulary is an ordered, immutable token set fixed at build time.
//! It defines the feature-vector dimensionality `V` every other component
//! indexes against. Tokens are matched verbatim; no text normalization
//! happens here.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{DespensaError, Result};
use crate::primitives::{Matrix, Vector};

/// Minimum times an ingredient must occur in the training corpus to be
/// kept in the vocabulary.
pub const DEFAULT_MIN_OCCURRENCES: usize = 10;

/// Ordered, immutable ingredient token set.
///
/// Built once from a training corpus; rare tokens below the occurrence
/// floor are dropped. Token order is lexicographic, so feature extraction
/// is deterministic for a given corpus.
///
/// # Examples
///
/// ```
/// use despensa::vocabulary::IngredientVocabulary;
///
/// let corpus = vec![
///     vec!["pasta".to_string(), "tomato".to_string()],
///     vec!["pasta".to_string(), "basil".to_string()],
/// ];
/// let vocab = IngredientVocabulary::build(&corpus, 1).expect("non-empty corpus");
/// assert_eq!(vocab.len(), 3);
///
/// let features = vocab.extract(&["pasta".to_string()]);
/// assert_eq!(features.len(), 3);
/// assert_eq!(features.iter().sum::<f32>(), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientVocabulary {
    /// Tokens in lexicographic order; position defines the feature index.
    tokens: Vec<String>,
    /// Reverse lookup from token to feature index.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl IngredientVocabulary {
    /// Builds a vocabulary from per-recipe ingredient lists.
    ///
    /// Counts each token once per recipe (presence, not multiplicity)
    /// and keeps tokens occurring in at least `min_occurrences` recipes.
    ///
    /// # Errors
    ///
    /// Returns an error if no token survives the occurrence floor.
    pub fn build(corpus: &[Vec<String>], min_occurrences: usize) -> Result<Self> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for ingredients in corpus {
            let mut seen: Vec<&str> = Vec::with_capacity(ingredients.len());
            for token in ingredients {
                if !seen.contains(&token.as_str()) {
                    seen.push(token);
                    *counts.entry(token).or_insert(0) += 1;
                }
            }
        }

        let tokens: Vec<String> = counts
            .into_iter()
            .filter(|&(_, n)| n >= min_occurrences)
            .map(|(token, _)| token.to_string())
            .collect();

        if tokens.is_empty() {
            return Err(DespensaError::Other(format!(
                "empty vocabulary: no ingredient occurs in at least {min_occurrences} recipe(s)"
            )));
        }

        Ok(Self::from_tokens(tokens))
    }

    fn from_tokens(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { tokens, index }
    }

    /// Rebuilds the reverse lookup after deserialization.
    #[must_use]
    pub fn rebuild_index(mut self) -> Self {
        self.index = self
            .tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        self
    }

    /// Number of tokens, i.e. the feature dimensionality `V`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the vocabulary has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in feature-index order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Feature index of a token, if present.
    #[must_use]
    pub fn position(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Extracts a 0/1 indicator feature vector for one ingredient list.
    ///
    /// Tokens outside the vocabulary are ignored; the result always has
    /// length `V`.
    #[must_use]
    pub fn extract(&self, ingredients: &[String]) -> Vector<f32> {
        let mut features = Vector::zeros(self.tokens.len());
        for token in ingredients {
            if let Some(pos) = self.position(token) {
                features[pos] = 1.0;
            }
        }
        features
    }

    /// Extracts one feature row per ingredient list.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting matrix cannot be assembled
    /// (cannot happen for a fixed vocabulary; defensive).
    pub fn extract_matrix(&self, corpus: &[Vec<String>]) -> Result<Matrix<f32>> {
        let v = self.tokens.len();
        let mut data = Vec::with_capacity(corpus.len() * v);
        for ingredients in corpus {
            data.extend_from_slice(self.extract(ingredients).as_slice());
        }
        Matrix::from_vec(corpus.len(), v, data)
            .map_err(|e| DespensaError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Vec<String>> {
        vec![
            vec!["pasta".into(), "tomato".into(), "basil".into()],
            vec!["pasta".into(), "tomato".into()],
            vec!["rice".into(), "chili".into()],
        ]
    }

    #[test]
    fn test_build_orders_tokens_lexicographically() {
        let vocab = IngredientVocabulary::build(&corpus(), 1).expect("vocab");
        assert_eq!(
            vocab.tokens(),
            &["basil", "chili", "pasta", "rice", "tomato"]
        );
    }

    #[test]
    fn test_min_occurrences_filters_rare_tokens() {
        let vocab = IngredientVocabulary::build(&corpus(), 2).expect("vocab");
        assert_eq!(vocab.tokens(), &["pasta", "tomato"]);
    }

    #[test]
    fn test_build_empty_vocabulary_fails() {
        let result = IngredientVocabulary::build(&corpus(), 10);
        assert!(result.is_err());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("empty vocabulary"));
    }

    #[test]
    fn test_duplicate_tokens_count_once_per_recipe() {
        let corpus = vec![vec!["salt".to_string(), "salt".to_string()]];
        let result = IngredientVocabulary::build(&corpus, 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_indicator_vector() {
        let vocab = IngredientVocabulary::build(&corpus(), 1).expect("vocab");
        let features = vocab.extract(&["pasta".to_string(), "chili".to_string()]);
        assert_eq!(features.len(), 5);
        assert_eq!(features[vocab.position("pasta").expect("pasta")], 1.0);
        assert_eq!(features[vocab.position("chili").expect("chili")], 1.0);
        assert_eq!(features.iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_extract_ignores_unknown_tokens() {
        let vocab = IngredientVocabulary::build(&corpus(), 1).expect("vocab");
        let features = vocab.extract(&["durian".to_string()]);
        assert!(features.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_extract_matrix_shape() {
        let vocab = IngredientVocabulary::build(&corpus(), 1).expect("vocab");
        let x = vocab.extract_matrix(&corpus()).expect("matrix");
        assert_eq!(x.shape(), (3, 5));
        // Row 2 is the thai-style recipe: rice + chili only.
        assert_eq!(x.row(2).iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_serde_round_trip_rebuilds_index() {
        let vocab = IngredientVocabulary::build(&corpus(), 1).expect("vocab");
        let json = serde_json::to_string(&vocab).expect("serialize");
        let restored: IngredientVocabulary =
            serde_json::from_str(&json).expect("deserialize");
        let restored = restored.rebuild_index();
        assert_eq!(restored.tokens(), vocab.tokens());
        assert_eq!(restored.position("pasta"), vocab.position("pasta"));
    }
}
