//! Core compute primitives (Vector, Matrix).
//!
//! These types carry feature vectors, cuisine profiles, and distance
//! matrices throughout the crate.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
