//! Greedy cuisine-diversity meal planner.
//!
//! One planning session owns one [`MealPlanState`] and walks it through
//! a state machine, one transition per [`DiversityPlanner::select_next_meal`]
//! call: a seeded random first pick, then repeated greedy steps that
//! steer toward the cuisine farthest (on average) from everything
//! already on the plan while preferring recipes that add the fewest new
//! ingredients. The candidate pool and distance matrix are immutable
//! shared borrows, so independent sessions can run side by side; calls
//! within one session are strictly sequential.

use std::collections::{BTreeSet, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::corpus::{Recipe, RecipePool};
use crate::embedding::CuisineDistanceMatrix;
use crate::error::{DespensaError, Result};

/// How the diversity-target search treats already-selected cuisines.
///
/// Superseded iterations of this logic disagreed on the search scope;
/// both behaviors are kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetPolicy {
    /// Search only cuisines not yet on the plan; if that excludes every
    /// cuisine, fall back to the full set. The default.
    ExcludeSelected,
    /// Always score the full cuisine set, selected or not.
    FullRow,
}

/// How equal new-ingredient costs are broken between candidate recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    /// Lowest pool index wins. The default.
    LowestIndex,
    /// Highest pool index wins.
    HighestIndex,
}

/// Phase of a planning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanPhase {
    /// No meal chosen yet.
    Empty,
    /// At least one meal chosen, target not reached.
    InProgress,
    /// Target meal count reached. Terminal for the session.
    Complete,
    /// Pool ran out of unused recipes. Terminal failure.
    Exhausted,
}

/// Mutable session state, owned exclusively by one planner.
///
/// All four fields evolve together and only grow. The invariants hold
/// after every transition: one used index per selected meal, every used
/// index valid in the pool, and `accumulated_ingredients` equal to the
/// union of ingredients over the selected meals.
#[derive(Debug, Clone, Default)]
pub struct MealPlanState {
    selected_meals: Vec<usize>,
    used_indices: HashSet<usize>,
    selected_cuisines: BTreeSet<String>,
    accumulated_ingredients: BTreeSet<String>,
}

impl MealPlanState {
    fn new() -> Self {
        Self::default()
    }

    /// Pool indices of the selected meals, in selection order.
    #[must_use]
    pub fn selected_meals(&self) -> &[usize] {
        &self.selected_meals
    }

    /// Indices already chosen (repeat prevention).
    #[must_use]
    pub fn used_indices(&self) -> &HashSet<usize> {
        &self.used_indices
    }

    /// Distinct predicted cuisines already on the plan.
    #[must_use]
    pub fn selected_cuisines(&self) -> &BTreeSet<String> {
        &self.selected_cuisines
    }

    /// Union of ingredients over all selected meals.
    #[must_use]
    pub fn accumulated_ingredients(&self) -> &BTreeSet<String> {
        &self.accumulated_ingredients
    }

    /// Returns true if no meal has been selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_meals.is_empty()
    }

    /// Records a selection and returns the ingredients it newly added.
    fn record(&mut self, recipe: &Recipe) -> BTreeSet<String> {
        let new_ingredients: BTreeSet<String> = recipe
            .ingredients
            .iter()
            .filter(|token| !self.accumulated_ingredients.contains(*token))
            .cloned()
            .collect();

        self.selected_meals.push(recipe.index);
        self.used_indices.insert(recipe.index);
        self.selected_cuisines.insert(recipe.predicted_cuisine.clone());
        self.accumulated_ingredients
            .extend(new_ingredients.iter().cloned());
        new_ingredients
    }
}

/// One selected meal, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    /// Pool index of the recipe.
    pub index: usize,
    /// Recipe title.
    pub title: String,
    /// Predicted cuisine of the recipe.
    pub cuisine: String,
    /// Full ordered ingredient list of the recipe.
    pub ingredients: Vec<String>,
    /// Free-text preparation instructions.
    pub instructions: String,
    /// Ingredients this meal added beyond everything selected before it.
    pub new_ingredients: BTreeSet<String>,
}

/// An ordered plan plus its deduplicated shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    /// Meals in selection order.
    pub meals: Vec<PlannedMeal>,
    /// Union of the new-ingredient sets across the whole plan.
    pub total_ingredients: BTreeSet<String>,
}

/// Greedy diversity-maximizing planner over a borrowed recipe pool.
///
/// # Examples
///
/// ```
/// use despensa::embedding::CuisineEmbedding;
/// use despensa::corpus::{Recipe, RecipePool};
/// use despensa::planner::DiversityPlanner;
/// use despensa::primitives::{Matrix, Vector};
///
/// // Train a two-cuisine distance model.
/// let features = Matrix::from_vec(4, 3, vec![
///     1.0, 1.0, 0.0,
///     1.0, 0.0, 0.0,
///     0.0, 1.0, 1.0,
///     0.0, 0.0, 1.0,
/// ]).expect("valid matrix dimensions");
/// let labels: Vec<String> = ["italian", "italian", "thai", "thai"]
///     .iter().map(|s| s.to_string()).collect();
/// let mut embedding = CuisineEmbedding::new();
/// embedding.fit(&features, &labels).expect("two cuisines");
/// let distances = embedding.distance_matrix().expect("fitted");
///
/// let recipe = |index: usize, title: &str, cuisine: &str, ingredients: &[&str]| Recipe {
///     index,
///     title: title.to_string(),
///     ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
///     instructions: String::new(),
///     features: Vector::zeros(3),
///     predicted_cuisine: cuisine.to_string(),
/// };
/// let pool = RecipePool::from_recipes(vec![
///     recipe(0, "Pasta al pomodoro", "italian", &["pasta", "tomato"]),
///     recipe(1, "Khao pad", "thai", &["rice", "chili"]),
/// ]).expect("dense indices");
///
/// let mut planner = DiversityPlanner::new(&pool, distances).with_random_state(7);
/// let plan = planner.plan(2).expect("pool is large enough");
/// assert_eq!(plan.meals.len(), 2);
/// ```
#[derive(Debug)]
pub struct DiversityPlanner<'a> {
    pool: &'a RecipePool,
    distances: &'a CuisineDistanceMatrix,
    state: MealPlanState,
    phase: PlanPhase,
    /// Total meals this session should reach, once known.
    num_meals: Option<usize>,
    /// Seed for the first random pick.
    random_state: Option<u64>,
    target_policy: TargetPolicy,
    tie_break: TieBreak,
}

impl<'a> DiversityPlanner<'a> {
    /// Creates a planner session over a pool and a fitted distance matrix.
    #[must_use]
    pub fn new(pool: &'a RecipePool, distances: &'a CuisineDistanceMatrix) -> Self {
        Self {
            pool,
            distances,
            state: MealPlanState::new(),
            phase: PlanPhase::Empty,
            num_meals: None,
            random_state: None,
            target_policy: TargetPolicy::ExcludeSelected,
            tie_break: TieBreak::LowestIndex,
        }
    }

    /// Sets the random seed for the first pick, for reproducible plans.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Sets the diversity-target search policy.
    #[must_use]
    pub fn with_target_policy(mut self, policy: TargetPolicy) -> Self {
        self.target_policy = policy;
        self
    }

    /// Sets the equal-cost tie-break rule.
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Sets the session's target meal count up front, for callers
    /// driving [`Self::select_next_meal`] directly.
    #[must_use]
    pub fn with_num_meals(mut self, num_meals: usize) -> Self {
        self.num_meals = Some(num_meals);
        self
    }

    /// Current session phase.
    #[must_use]
    pub fn phase(&self) -> PlanPhase {
        self.phase
    }

    /// Read access to the session state.
    #[must_use]
    pub fn state(&self) -> &MealPlanState {
        &self.state
    }

    /// Meals selected so far, with per-step new-ingredient sets replayed
    /// from the state.
    ///
    /// Useful after [`DespensaError::PoolExhausted`]: the partial plan
    /// stays readable instead of being discarded.
    #[must_use]
    pub fn meals(&self) -> Vec<PlannedMeal> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        self.state
            .selected_meals
            .iter()
            .map(|&index| {
                let recipe = self.pool.get(index);
                let new_ingredients: BTreeSet<String> = recipe
                    .ingredients
                    .iter()
                    .filter(|token| !seen.contains(*token))
                    .cloned()
                    .collect();
                seen.extend(new_ingredients.iter().cloned());
                planned(recipe, new_ingredients)
            })
            .collect()
    }

    /// Performs one state-machine transition and returns the selection.
    ///
    /// The first call picks uniformly at random from the full pool
    /// (seeded via [`Self::with_random_state`]). Every later call finds
    /// the cuisine with maximum average distance to the cuisines already
    /// selected (label order breaks ties), restricts candidates to
    /// unused recipes of that cuisine, relaxing to any unused recipe if
    /// none exists since completing the plan outranks the diversity
    /// target, and takes the candidate adding the fewest new
    /// ingredients.
    ///
    /// # Errors
    ///
    /// - [`DespensaError::PoolExhausted`] when no unused recipe remains;
    ///   terminal for the session.
    /// - [`DespensaError::Other`] when called on a completed session.
    pub fn select_next_meal(&mut self) -> Result<PlannedMeal> {
        match self.phase {
            PlanPhase::Complete => {
                return Err(DespensaError::Other(
                    "planning session already complete".to_string(),
                ))
            }
            PlanPhase::Exhausted => {
                return Err(DespensaError::PoolExhausted {
                    selected: self.state.selected_meals.len(),
                })
            }
            PlanPhase::Empty | PlanPhase::InProgress => {}
        }

        let recipe = if self.state.is_empty() {
            self.pick_first()?
        } else {
            self.pick_greedy()?
        };

        let new_ingredients = self.state.record(recipe);
        let meal = planned(recipe, new_ingredients);

        self.phase = match self.num_meals {
            Some(n) if self.state.selected_meals.len() >= n => PlanPhase::Complete,
            _ => PlanPhase::InProgress,
        };
        Ok(meal)
    }

    /// Builds a `num_meals`-meal plan by driving
    /// [`Self::select_next_meal`] exactly that many times.
    ///
    /// # Errors
    ///
    /// Propagates [`DespensaError::PoolExhausted`] if the pool runs out
    /// first; the meals selected before the failure remain available via
    /// [`Self::meals`] and [`Self::state`].
    pub fn plan(&mut self, num_meals: usize) -> Result<MealPlan> {
        self.num_meals = Some(self.state.selected_meals.len() + num_meals);
        if self.phase == PlanPhase::Complete {
            self.phase = if self.state.is_empty() {
                PlanPhase::Empty
            } else {
                PlanPhase::InProgress
            };
        }

        let mut meals = Vec::with_capacity(num_meals);
        for _ in 0..num_meals {
            meals.push(self.select_next_meal()?);
        }

        let mut total_ingredients = BTreeSet::new();
        for meal in &meals {
            total_ingredients.extend(meal.new_ingredients.iter().cloned());
        }
        Ok(MealPlan {
            meals,
            total_ingredients,
        })
    }

    /// Uniform random pick over the full pool.
    fn pick_first(&mut self) -> Result<&'a Recipe> {
        if self.pool.is_empty() {
            self.phase = PlanPhase::Exhausted;
            return Err(DespensaError::PoolExhausted { selected: 0 });
        }
        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let index = rng.gen_range(0..self.pool.len());
        Ok(self.pool.get(index))
    }

    /// One greedy step: diversity target, candidate filter with
    /// fallback, minimum new-ingredient cost.
    fn pick_greedy(&mut self) -> Result<&'a Recipe> {
        let target = self.target_cuisine()?;

        let mut candidates: Vec<&Recipe> = self
            .pool
            .iter()
            .filter(|r| {
                !self.state.used_indices.contains(&r.index) && r.predicted_cuisine == target
            })
            .collect();

        // Diversity target is advisory; finishing the plan is not.
        if candidates.is_empty() {
            candidates = self
                .pool
                .iter()
                .filter(|r| !self.state.used_indices.contains(&r.index))
                .collect();
        }

        if candidates.is_empty() {
            self.phase = PlanPhase::Exhausted;
            return Err(DespensaError::PoolExhausted {
                selected: self.state.selected_meals.len(),
            });
        }

        let mut best: Option<(&Recipe, usize)> = None;
        for candidate in candidates {
            let cost = self.new_ingredient_cost(candidate);
            let wins = match (&best, self.tie_break) {
                (None, _) => true,
                (Some((_, best_cost)), TieBreak::LowestIndex) => cost < *best_cost,
                (Some((_, best_cost)), TieBreak::HighestIndex) => cost <= *best_cost,
            };
            if wins {
                best = Some((candidate, cost));
            }
        }
        // Candidates were non-empty, so best is set.
        let (recipe, _) = best.ok_or_else(|| {
            DespensaError::Other("candidate selection produced no recipe".to_string())
        })?;
        Ok(recipe)
    }

    /// Number of distinct ingredients a candidate would add.
    fn new_ingredient_cost(&self, candidate: &Recipe) -> usize {
        let new: BTreeSet<&str> = candidate
            .ingredients
            .iter()
            .map(String::as_str)
            .filter(|token| !self.state.accumulated_ingredients.contains(*token))
            .collect();
        new.len()
    }

    /// Cuisine with maximum average distance to the selected cuisines.
    ///
    /// Ties resolve to the lexicographically smallest label: the score
    /// map iterates in label order and only a strictly greater score
    /// displaces the incumbent.
    fn target_cuisine(&self) -> Result<String> {
        let reference = &self.state.selected_cuisines;
        let averages = match self.target_policy {
            TargetPolicy::ExcludeSelected => {
                let scores = self.distances.average_distances(reference)?;
                if scores.is_empty() {
                    // Every cuisine is already on the plan.
                    self.distances.average_distances_full(reference)?
                } else {
                    scores
                }
            }
            TargetPolicy::FullRow => self.distances.average_distances_full(reference)?,
        };

        let mut best: Option<(&String, f32)> = None;
        for (label, &score) in &averages {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((label, score));
            }
        }
        best.map(|(label, _)| label.clone()).ok_or_else(|| {
            DespensaError::Other("distance matrix indexes no cuisines".to_string())
        })
    }
}

fn planned(recipe: &Recipe, new_ingredients: BTreeSet<String>) -> PlannedMeal {
    PlannedMeal {
        index: recipe.index,
        title: recipe.title.clone(),
        cuisine: recipe.predicted_cuisine.clone(),
        ingredients: recipe.ingredients.clone(),
        instructions: recipe.instructions.clone(),
        new_ingredients,
    }
}
