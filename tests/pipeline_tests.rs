//! Full pipeline: corpus file -> vocabulary -> pool -> embedding -> plan.

use std::io::Write;

use despensa::corpus::{load_records, RecipePool};
use despensa::embedding::CuisineEmbedding;
use despensa::error::Result;
use despensa::planner::DiversityPlanner;
use despensa::primitives::Vector;
use despensa::traits::CuisinePredictor;
use despensa::vocabulary::IngredientVocabulary;

/// Test double keyed on a signature ingredient per cuisine.
struct SignaturePredictor {
    vocab: IngredientVocabulary,
}

impl CuisinePredictor for SignaturePredictor {
    fn predict(&self, features: &Vector<f32>) -> Result<String> {
        let hot = |token: &str| {
            self.vocab
                .position(token)
                .is_some_and(|pos| features[pos] > 0.0)
        };
        Ok(if hot("pasta") {
            "italian".to_string()
        } else if hot("tortilla") {
            "mexican".to_string()
        } else {
            "thai".to_string()
        })
    }
}

const CORPUS_JSON: &str = r#"{
    "r1": {"title": "Pasta al pomodoro", "ingredients": ["pasta", "tomato"], "instructions": "Boil, toss."},
    "r2": {"title": "Pasta al basilico", "ingredients": ["pasta", "basil"], "instructions": "Boil, toss."},
    "r3": {"title": "Khao pad", "ingredients": ["rice", "chili"], "instructions": "Fry."},
    "r4": {"title": "Tom kha", "ingredients": ["rice", "coconut", "chili"], "instructions": "Simmer."},
    "r5": {"title": "Tacos", "ingredients": ["tortilla", "chili", "tomato"], "instructions": "Assemble."},
    "r6": {"title": "Tacos", "ingredients": ["tortilla"], "instructions": "Duplicate title, dropped."},
    "r7": {"title": "Broken", "instructions": "No ingredients, dropped."}
}"#;

/// Ground-truth labels for the training half of the pipeline, matching
/// the corpus records in title order.
fn training_labels() -> Vec<String> {
    ["italian", "italian", "thai", "thai", "mexican"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_corpus_to_plan() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(CORPUS_JSON.as_bytes()).expect("write corpus");

    // Corpus: incomplete and duplicate records dropped.
    let records = load_records(file.path()).expect("load");
    assert_eq!(records.len(), 7);

    // Vocabulary over every well-formed ingredient list.
    let ingredient_lists: Vec<Vec<String>> = vec![
        vec!["pasta".into(), "tomato".into()],
        vec!["pasta".into(), "basil".into()],
        vec!["rice".into(), "chili".into()],
        vec!["rice".into(), "coconut".into(), "chili".into()],
        vec!["tortilla".into(), "chili".into(), "tomato".into()],
    ];
    let vocab = IngredientVocabulary::build(&ingredient_lists, 1).expect("vocab");

    // Pool: predicted labels come from the classifier seam.
    let predictor = SignaturePredictor {
        vocab: vocab.clone(),
    };
    let pool = RecipePool::from_records(records, &vocab, &predictor).expect("pool");
    assert_eq!(pool.len(), 5);
    assert_eq!(pool.get(0).predicted_cuisine, "italian");
    assert_eq!(pool.get(4).predicted_cuisine, "mexican");

    // Embedding: trained on ground-truth labels, never predictions.
    let features = vocab.extract_matrix(&ingredient_lists).expect("features");
    let mut embedding = CuisineEmbedding::new();
    embedding.fit(&features, &training_labels()).expect("fit");
    let distances = embedding.distance_matrix().expect("fitted");

    // Plan all five meals; every cuisine shows up.
    let mut planner = DiversityPlanner::new(&pool, distances).with_random_state(17);
    let plan = planner.plan(5).expect("pool holds five recipes");
    assert_eq!(plan.meals.len(), 5);

    let cuisines: std::collections::BTreeSet<&str> =
        plan.meals.iter().map(|m| m.cuisine.as_str()).collect();
    assert_eq!(cuisines.len(), 3);

    // The shopping list is deduplicated across meals.
    assert_eq!(plan.total_ingredients.len(), 7);
}

#[test]
fn test_embedding_round_trip_preserves_planning() {
    let ingredient_lists: Vec<Vec<String>> = vec![
        vec!["pasta".into(), "tomato".into()],
        vec!["pasta".into()],
        vec!["rice".into(), "chili".into()],
        vec!["rice".into()],
    ];
    let vocab = IngredientVocabulary::build(&ingredient_lists, 1).expect("vocab");
    let features = vocab.extract_matrix(&ingredient_lists).expect("features");
    let labels: Vec<String> = ["italian", "italian", "thai", "thai"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut embedding = CuisineEmbedding::new();
    embedding.fit(&features, &labels).expect("fit");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cuisine_embedding.json");
    embedding.save_json(&path).expect("save");
    let restored = CuisineEmbedding::load_json(&path).expect("load");

    let d0 = embedding.distance_matrix().expect("fitted");
    let d1 = restored.distance_matrix().expect("fitted");
    assert_eq!(
        d0.distance("italian", "thai").expect("known"),
        d1.distance("italian", "thai").expect("known"),
    );
}
