//! Recipe corpus loading and the immutable candidate pool.
//!
//! Raw corpus files are JSON objects keyed by opaque record ids, each
//! record carrying a title, an ingredient list, and instructions. The
//! loader drops incomplete records, deduplicates by title, and assigns
//! stable dense indices. The resulting [`RecipePool`] is immutable for
//! the duration of any planning session; planners borrow it.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DespensaError, Result};
use crate::primitives::Vector;
use crate::traits::CuisinePredictor;
use crate::vocabulary::IngredientVocabulary;

/// One raw corpus record, as found in the JSON source files.
///
/// All fields are optional because the raw dumps contain partial
/// records; [`RecipePool::from_records`] drops anything incomplete.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeRecord {
    /// Recipe title.
    pub title: Option<String>,
    /// Ingredient tokens; some sources store a single joined string.
    pub ingredients: Option<IngredientField>,
    /// Free-text preparation instructions.
    pub instructions: Option<String>,
}

/// Ingredients as stored on disk: either a token list or one string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IngredientField {
    /// Ordered token list (the common layout).
    List(Vec<String>),
    /// A single pre-joined string; kept as one token, never split.
    Joined(String),
}

impl IngredientField {
    fn into_tokens(self) -> Vec<String> {
        match self {
            IngredientField::List(tokens) => tokens,
            IngredientField::Joined(s) => vec![s],
        }
    }
}

/// Loads raw records from a JSON corpus file.
///
/// The file layout is a JSON object mapping record ids to records.
/// Records are returned in id order so repeated loads of the same file
/// produce the same sequence.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RecipeRecord>> {
    let raw = fs::read_to_string(path)?;
    let by_id: BTreeMap<String, RecipeRecord> = serde_json::from_str(&raw)?;
    Ok(by_id.into_values().collect())
}

/// One recipe in the candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable, dense index within the pool.
    pub index: usize,
    /// Recipe title.
    pub title: String,
    /// Ordered ingredient tokens.
    pub ingredients: Vec<String>,
    /// Free-text preparation instructions.
    pub instructions: String,
    /// 0/1 indicator features over the ingredient vocabulary.
    pub features: Vector<f32>,
    /// Cuisine label predicted by the classifier (not ground truth).
    pub predicted_cuisine: String,
}

/// Ordered, deduplicated pool of candidate recipes.
///
/// Indices are dense: `pool.get(i).index == i` for every `i` in
/// `0..pool.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePool {
    recipes: Vec<Recipe>,
}

impl RecipePool {
    /// Builds a pool from raw records.
    ///
    /// Records missing a title, ingredients, or instructions are
    /// dropped, as are records whose title was already seen. Each kept
    /// recipe gets its feature vector from `vocab` and its cuisine from
    /// `predictor`.
    ///
    /// # Errors
    ///
    /// Returns an error if cuisine prediction fails for any recipe.
    pub fn from_records(
        records: Vec<RecipeRecord>,
        vocab: &IngredientVocabulary,
        predictor: &dyn CuisinePredictor,
    ) -> Result<Self> {
        let mut seen_titles: HashSet<String> = HashSet::new();
        let mut recipes = Vec::new();

        for record in records {
            let (Some(title), Some(ingredients), Some(instructions)) =
                (record.title, record.ingredients, record.instructions)
            else {
                continue;
            };
            if title.trim().is_empty() || !seen_titles.insert(title.clone()) {
                continue;
            }
            let ingredients = ingredients.into_tokens();
            if ingredients.is_empty() {
                continue;
            }

            let features = vocab.extract(&ingredients);
            let predicted_cuisine = predictor.predict(&features)?;
            recipes.push(Recipe {
                index: recipes.len(),
                title,
                ingredients,
                instructions,
                features,
                predicted_cuisine,
            });
        }

        Ok(Self { recipes })
    }

    /// Builds a pool directly from prepared recipes.
    ///
    /// # Errors
    ///
    /// Returns an error if recipe indices are not dense and in order.
    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self> {
        for (i, recipe) in recipes.iter().enumerate() {
            if recipe.index != i {
                return Err(DespensaError::Other(format!(
                    "recipe at position {i} has index {}, pool indices must be dense",
                    recipe.index
                )));
            }
        }
        Ok(Self { recipes })
    }

    /// Number of recipes in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if the pool has no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Recipe at a pool index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> &Recipe {
        &self.recipes[index]
    }

    /// All recipes in index order.
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Iterates over recipes in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Recipe> {
        self.recipes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Test double: always predicts the same cuisine.
    struct ConstantPredictor(&'static str);

    impl CuisinePredictor for ConstantPredictor {
        fn predict(&self, _features: &Vector<f32>) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn vocab() -> IngredientVocabulary {
        IngredientVocabulary::build(
            &[
                vec!["pasta".into(), "tomato".into()],
                vec!["rice".into(), "chili".into()],
            ],
            1,
        )
        .expect("vocab")
    }

    fn record(title: &str, ingredients: &[&str]) -> RecipeRecord {
        RecipeRecord {
            title: Some(title.to_string()),
            ingredients: Some(IngredientField::List(
                ingredients.iter().map(|s| s.to_string()).collect(),
            )),
            instructions: Some("Cook it.".to_string()),
        }
    }

    #[test]
    fn test_from_records_assigns_dense_indices() {
        let records = vec![
            record("Pasta al pomodoro", &["pasta", "tomato"]),
            record("Khao pad", &["rice", "chili"]),
        ];
        let pool = RecipePool::from_records(records, &vocab(), &ConstantPredictor("italian"))
            .expect("pool");
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).index, 0);
        assert_eq!(pool.get(1).index, 1);
        assert_eq!(pool.get(1).title, "Khao pad");
    }

    #[test]
    fn test_from_records_drops_incomplete() {
        let mut incomplete = record("No instructions", &["salt"]);
        incomplete.instructions = None;
        let records = vec![incomplete, record("Khao pad", &["rice"])];
        let pool = RecipePool::from_records(records, &vocab(), &ConstantPredictor("thai"))
            .expect("pool");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0).title, "Khao pad");
    }

    #[test]
    fn test_from_records_deduplicates_by_title() {
        let records = vec![
            record("Khao pad", &["rice", "chili"]),
            record("Khao pad", &["rice"]),
        ];
        let pool = RecipePool::from_records(records, &vocab(), &ConstantPredictor("thai"))
            .expect("pool");
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0).ingredients.len(), 2);
    }

    #[test]
    fn test_from_records_populates_features_and_cuisine() {
        let records = vec![record("Pasta al pomodoro", &["pasta", "tomato"])];
        let v = vocab();
        let pool =
            RecipePool::from_records(records, &v, &ConstantPredictor("italian")).expect("pool");
        let recipe = pool.get(0);
        assert_eq!(recipe.predicted_cuisine, "italian");
        assert_eq!(recipe.features.len(), v.len());
        assert_eq!(recipe.features.iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_from_recipes_rejects_sparse_indices() {
        let v = vocab();
        let recipe = Recipe {
            index: 3,
            title: "Khao pad".to_string(),
            ingredients: vec!["rice".to_string()],
            instructions: "Fry.".to_string(),
            features: v.extract(&["rice".to_string()]),
            predicted_cuisine: "thai".to_string(),
        };
        assert!(RecipePool::from_recipes(vec![recipe]).is_err());
    }

    #[test]
    fn test_load_records_map_layout() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "id-b": {{"title": "Khao pad", "ingredients": ["rice", "chili"], "instructions": "Fry."}},
                "id-a": {{"title": "Pasta", "ingredients": "pasta tomato", "instructions": "Boil."}}
            }}"#
        )
        .expect("write");

        let records = load_records(file.path()).expect("load");
        assert_eq!(records.len(), 2);
        // BTreeMap ordering: id-a before id-b.
        assert_eq!(records[0].title.as_deref(), Some("Pasta"));
        match records[0].ingredients.as_ref().expect("ingredients") {
            IngredientField::Joined(s) => assert_eq!(s, "pasta tomato"),
            IngredientField::List(_) => panic!("expected joined string"),
        }
        match records[1].ingredients.as_ref().expect("ingredients") {
            IngredientField::List(tokens) => assert_eq!(tokens.len(), 2),
            IngredientField::Joined(_) => panic!("expected token list"),
        }
    }

    #[test]
    fn test_load_records_missing_file() {
        let result = load_records("/nonexistent/recipes.json");
        assert!(matches!(result, Err(DespensaError::Io(_))));
    }
}
