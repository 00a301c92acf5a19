//! Cuisine embedding and the pairwise distance model.
//!
//! Aggregates training recipes into per-cuisine ingredient-usage
//! profiles, decomposes the ingredient-by-cuisine matrix with a thin
//! SVD, and keeps just enough singular components to cover a configured
//! share of the spectrum. Each cuisine gets a low-dimensional coordinate;
//! Euclidean distances between coordinates drive the planner's
//! diversity objective.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DespensaError, Result};
use crate::primitives::Matrix;

/// Default share of singular-value mass the kept components must cover.
pub const DEFAULT_VARIANCE_THRESHOLD: f32 = 0.95;

/// Exponent damping each component by its singular value.
///
/// Coordinates divide the projected component by `s^0.05`. The exponent
/// is deliberately small: it softens the dominance of the leading
/// component while preserving the ordering of inter-cuisine distances.
/// Changing it changes distance ratios, so it is a constant, not a knob.
const SINGULAR_DAMPING_EXPONENT: f32 = 0.05;

/// Symmetric pairwise distance matrix between cuisines.
///
/// Indexed by cuisine label in both dimensions; labels are sorted, the
/// diagonal is zero, and entries are non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuisineDistanceMatrix {
    /// Cuisine labels in sorted order; position defines the matrix index.
    labels: Vec<String>,
    /// Row-major C x C distances.
    matrix: Matrix<f32>,
}

impl CuisineDistanceMatrix {
    fn new(labels: Vec<String>, matrix: Matrix<f32>) -> Self {
        Self { labels, matrix }
    }

    /// Cuisine labels in matrix-index order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of cuisines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the matrix indexes no cuisines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Matrix index of a cuisine label. Labels are sorted, so lookup is
    /// a binary search.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    /// Distance between two cuisines.
    ///
    /// # Errors
    ///
    /// Returns [`DespensaError::UnknownCuisine`] if either label is not
    /// in the matrix.
    pub fn distance(&self, a: &str, b: &str) -> Result<f32> {
        let ia = self.position(a).ok_or_else(|| DespensaError::UnknownCuisine {
            label: a.to_string(),
        })?;
        let ib = self.position(b).ok_or_else(|| DespensaError::UnknownCuisine {
            label: b.to_string(),
        })?;
        Ok(self.matrix.get(ia, ib))
    }

    /// Mean distance from every cuisine *outside* the reference set to
    /// the cuisines in it.
    ///
    /// A cuisine's distance to itself is never a candidate score, so
    /// reference members are excluded from the result.
    ///
    /// # Errors
    ///
    /// Returns [`DespensaError::EmptyReferenceSet`] if `reference` is
    /// empty, or [`DespensaError::UnknownCuisine`] if a reference label
    /// is not in the matrix.
    pub fn average_distances(
        &self,
        reference: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, f32>> {
        self.mean_to_reference(reference, true)
    }

    /// Mean distance from *every* cuisine (reference members included)
    /// to the reference set.
    ///
    /// Supports the planner's fallback when all cuisines are already
    /// represented, and the full-row target policy.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::average_distances`].
    pub fn average_distances_full(
        &self,
        reference: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, f32>> {
        self.mean_to_reference(reference, false)
    }

    fn mean_to_reference(
        &self,
        reference: &BTreeSet<String>,
        exclude_reference: bool,
    ) -> Result<BTreeMap<String, f32>> {
        if reference.is_empty() {
            return Err(DespensaError::EmptyReferenceSet);
        }
        let mut ref_indices = Vec::with_capacity(reference.len());
        for label in reference {
            let idx = self
                .position(label)
                .ok_or_else(|| DespensaError::UnknownCuisine {
                    label: label.clone(),
                })?;
            ref_indices.push(idx);
        }

        let mut result = BTreeMap::new();
        for (candidate, label) in self.labels.iter().enumerate() {
            if exclude_reference && reference.contains(label) {
                continue;
            }
            let sum: f32 = ref_indices
                .iter()
                .map(|&r| self.matrix.get(candidate, r))
                .sum();
            result.insert(label.clone(), sum / ref_indices.len() as f32);
        }
        Ok(result)
    }
}

/// SVD-derived low-dimensional cuisine coordinates.
///
/// # Examples
///
/// ```
/// use despensa::embedding::CuisineEmbedding;
/// use despensa::primitives::Matrix;
///
/// // Four training recipes over a three-ingredient vocabulary.
/// let features = Matrix::from_vec(4, 3, vec![
///     1.0, 1.0, 0.0,
///     1.0, 0.0, 0.0,
///     0.0, 1.0, 1.0,
///     0.0, 0.0, 1.0,
/// ]).expect("valid matrix dimensions");
/// let labels: Vec<String> = ["italian", "italian", "thai", "thai"]
///     .iter().map(|s| s.to_string()).collect();
///
/// let mut embedding = CuisineEmbedding::new();
/// embedding.fit(&features, &labels).expect("two cuisines present");
///
/// let distances = embedding.distance_matrix().expect("fitted");
/// assert!(distances.distance("italian", "thai").expect("known") > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuisineEmbedding {
    /// Cumulative singular-mass threshold selecting the component count.
    variance_threshold: f32,
    /// Cuisine labels in sorted order (set by fit).
    cuisines: Option<Vec<String>>,
    /// C x k cuisine coordinates (set by fit).
    vectors: Option<Matrix<f32>>,
    /// Pairwise distances between coordinates (set by fit).
    distances: Option<CuisineDistanceMatrix>,
}

impl Default for CuisineEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

impl CuisineEmbedding {
    /// Creates an unfitted embedding with the default variance threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
            cuisines: None,
            vectors: None,
            distances: None,
        }
    }

    /// Sets the cumulative singular-mass threshold.
    #[must_use]
    pub fn with_variance_threshold(mut self, threshold: f32) -> Self {
        self.variance_threshold = threshold;
        self
    }

    /// Fits cuisine coordinates and the distance matrix.
    ///
    /// `features` holds one 0/1 indicator row per training recipe;
    /// `labels` holds the ground-truth cuisine of the same rows.
    ///
    /// # Errors
    ///
    /// - [`DespensaError::DataMismatch`] if row and label counts differ.
    /// - [`DespensaError::InsufficientCuisines`] if fewer than two
    ///   distinct cuisines are present.
    pub fn fit(&mut self, features: &Matrix<f32>, labels: &[String]) -> Result<()> {
        use nalgebra::DMatrix;

        let (n_recipes, n_ingredients) = features.shape();
        if n_recipes != labels.len() {
            return Err(DespensaError::DataMismatch {
                features: n_recipes,
                labels: labels.len(),
            });
        }

        // Per-cuisine ingredient counts, keyed in sorted label order.
        let mut profile_sums: BTreeMap<&str, Vec<f32>> = BTreeMap::new();
        for (row, label) in labels.iter().enumerate() {
            let profile = profile_sums
                .entry(label.as_str())
                .or_insert_with(|| vec![0.0; n_ingredients]);
            for col in 0..n_ingredients {
                profile[col] += features.get(row, col);
            }
        }

        let n_cuisines = profile_sums.len();
        if n_cuisines < 2 {
            return Err(DespensaError::InsufficientCuisines { found: n_cuisines });
        }

        // Row-normalize to probability distributions over the vocabulary.
        let cuisines: Vec<String> = profile_sums.keys().map(|&s| s.to_string()).collect();
        let mut profiles = Matrix::zeros(n_cuisines, n_ingredients);
        for (row, profile) in profile_sums.values().enumerate() {
            let total: f32 = profile.iter().sum();
            if total > 0.0 {
                for (col, &count) in profile.iter().enumerate() {
                    profiles.set(row, col, count / total);
                }
            }
        }

        // Ingredients as rows, cuisines as columns.
        let profiles_t = profiles.transpose();
        let xt = DMatrix::from_row_slice(n_ingredients, n_cuisines, profiles_t.as_slice());
        let svd = xt.svd(true, false);
        let u = svd
            .u
            .as_ref()
            .ok_or_else(|| DespensaError::Other("SVD did not produce U".to_string()))?;
        let singular: Vec<f32> = svd.singular_values.iter().copied().collect();
        if singular.is_empty() {
            return Err(DespensaError::Other(
                "SVD produced no singular values; is the vocabulary empty?".to_string(),
            ));
        }

        let k = select_components(&singular, self.variance_threshold);

        // Project each left singular vector onto the cuisine profiles and
        // damp by s^0.05. A zero singular value contributes nothing.
        let mut vectors = Matrix::zeros(n_cuisines, k);
        for comp in 0..k {
            let damp = singular[comp].powf(SINGULAR_DAMPING_EXPONENT);
            if damp <= f32::EPSILON {
                continue;
            }
            for cuisine in 0..n_cuisines {
                let mut projection = 0.0;
                for ingredient in 0..n_ingredients {
                    projection += u[(ingredient, comp)] * profiles_t.get(ingredient, cuisine);
                }
                vectors.set(cuisine, comp, projection / damp);
            }
        }

        let distances = pairwise_distances(&cuisines, &vectors);

        self.cuisines = Some(cuisines);
        self.vectors = Some(vectors);
        self.distances = Some(distances);
        Ok(())
    }

    /// Cuisine labels in matrix-index order, if fitted.
    #[must_use]
    pub fn cuisines(&self) -> Option<&[String]> {
        self.cuisines.as_deref()
    }

    /// C x k cuisine coordinates, if fitted.
    #[must_use]
    pub fn vectors(&self) -> Option<&Matrix<f32>> {
        self.vectors.as_ref()
    }

    /// Number of kept singular components, if fitted.
    #[must_use]
    pub fn n_components(&self) -> Option<usize> {
        self.vectors.as_ref().map(Matrix::n_cols)
    }

    /// Pairwise cuisine distances, if fitted.
    #[must_use]
    pub fn distance_matrix(&self) -> Option<&CuisineDistanceMatrix> {
        self.distances.as_ref()
    }

    /// Saves the fitted embedding as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error on serialization or I/O failure.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads an embedding previously saved with [`Self::save_json`].
    ///
    /// # Errors
    ///
    /// Returns an error on I/O or deserialization failure.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Minimal number of components whose cumulative normalized singular
/// mass reaches the threshold, clamped to at least 1.
///
/// The clamp matters: with a tiny threshold the first cumulative term
/// already passes, and the naive argmax-style count would be zero.
fn select_components(singular: &[f32], threshold: f32) -> usize {
    let total: f32 = singular.iter().sum();
    if total <= 0.0 {
        return 1;
    }
    let mut cumulative = 0.0;
    for (i, &s) in singular.iter().enumerate() {
        cumulative += s / total;
        if cumulative >= threshold {
            return (i + 1).max(1);
        }
    }
    singular.len().max(1)
}

/// Euclidean distances between all cuisine coordinate rows.
fn pairwise_distances(cuisines: &[String], vectors: &Matrix<f32>) -> CuisineDistanceMatrix {
    let c = cuisines.len();
    let k = vectors.n_cols();
    let mut matrix = Matrix::zeros(c, c);
    for a in 0..c {
        for b in (a + 1)..c {
            let mut sum_sq = 0.0;
            for comp in 0..k {
                let diff = vectors.get(a, comp) - vectors.get(b, comp);
                sum_sq += diff * diff;
            }
            let dist = sum_sq.sqrt();
            matrix.set(a, b, dist);
            matrix.set(b, a, dist);
        }
    }
    CuisineDistanceMatrix::new(cuisines.to_vec(), matrix)
}
