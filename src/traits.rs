//! Capability traits for cuisine prediction.
//!
//! The embedding builder and the planner never see a concrete classifier.
//! They depend on these seams, so random-forest, linear-margin, or
//! lookup-table predictors are interchangeable behind dynamic dispatch.
//!
//! Two label sources flow through the crate and must not be conflated:
//! ground-truth labels train the [`crate::embedding::CuisineEmbedding`],
//! while predicted labels (from a [`CuisinePredictor`]) populate the
//! candidate recipe pool for planning.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// Predicts a cuisine label from an ingredient feature vector.
pub trait CuisinePredictor {
    /// Predicts the cuisine label for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the feature
    /// vector has the wrong dimensionality.
    fn predict(&self, features: &Vector<f32>) -> Result<String>;

    /// Predicts cuisine labels for each row of a feature matrix.
    ///
    /// # Errors
    ///
    /// Returns an error on the first row that fails to predict.
    fn predict_batch(&self, features: &Matrix<f32>) -> Result<Vec<String>> {
        (0..features.n_rows())
            .map(|i| self.predict(&features.row(i)))
            .collect()
    }
}

/// A trainable cuisine predictor.
///
/// `fit` consumes ground-truth labels; only after fitting may the model
/// be used as a [`CuisinePredictor`] over new recipes.
pub trait CuisineModel: CuisinePredictor {
    /// Fits the model on training feature rows and their true labels.
    ///
    /// # Errors
    ///
    /// Returns an error if feature rows and labels disagree in count
    /// or the training data is otherwise malformed.
    fn fit(&mut self, features: &Matrix<f32>, labels: &[String]) -> Result<()>;
}
