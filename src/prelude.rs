//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use despensa::prelude::*;
//! ```

pub use crate::corpus::{Recipe, RecipePool};
pub use crate::embedding::{CuisineDistanceMatrix, CuisineEmbedding};
pub use crate::error::{DespensaError, Result};
pub use crate::planner::{
    DiversityPlanner, MealPlan, MealPlanState, PlanPhase, PlannedMeal, TargetPolicy, TieBreak,
};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{CuisineModel, CuisinePredictor};
pub use crate::vocabulary::IngredientVocabulary;
