//! Despensa: cuisine-diverse meal planning with a shared pantry.
//!
//! Despensa recommends a small set of recipes ("a meal plan") that span
//! diverse cuisines while reusing as many ingredients as possible
//! across meals, to keep the shopping list short. Two components do the
//! work: a cuisine embedding that turns per-cuisine ingredient-usage
//! profiles into low-dimensional coordinates with pairwise distances,
//! and a greedy planner that alternates toward under-represented
//! cuisines while minimizing newly introduced ingredients.
//!
//! # Quick Start
//!
//! ```
//! use despensa::prelude::*;
//!
//! // Training recipes over a three-ingredient vocabulary, two cuisines.
//! let features = Matrix::from_vec(4, 3, vec![
//!     1.0, 1.0, 0.0,
//!     1.0, 0.0, 0.0,
//!     0.0, 1.0, 1.0,
//!     0.0, 0.0, 1.0,
//! ]).expect("valid matrix dimensions");
//! let labels: Vec<String> = ["italian", "italian", "thai", "thai"]
//!     .iter().map(|s| s.to_string()).collect();
//!
//! let mut embedding = CuisineEmbedding::new();
//! embedding.fit(&features, &labels).expect("two cuisines present");
//! let distances = embedding.distance_matrix().expect("fitted");
//! assert!(distances.distance("italian", "thai").expect("known") > 0.0);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`vocabulary`]: Ingredient vocabulary and 0/1 feature extraction
//! - [`corpus`]: Recipe corpus loading and the immutable candidate pool
//! - [`embedding`]: SVD-derived cuisine coordinates and distances
//! - [`planner`]: Greedy diversity-maximizing meal planner
//! - [`traits`]: Capability seams for interchangeable cuisine predictors
//!
//! # Design
//!
//! Planning is greedy and one-meal-at-a-time, not combinatorially
//! optimal. Each session is strictly sequential over its own
//! [`planner::MealPlanState`]; the recipe pool and distance matrix are
//! read-only, so independent sessions may share them.

pub mod corpus;
pub mod embedding;
pub mod error;
pub mod planner;
pub mod prelude;
pub mod primitives;
pub mod traits;
pub mod vocabulary;

pub use error::{DespensaError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::{CuisineModel, CuisinePredictor};
