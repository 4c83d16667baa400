//! Builds RAILGUN recipes: ordered steps that unshield balances, act on them through
//! contract calls and shield what's left, threading every balance from one step to the next.

pub mod errors;
pub mod recipes;
pub mod steps;

#[cfg(test)]
mod testing;

pub use errors::{RecipeError, StepError};
pub use recipes::{Recipe, RecipeInput, RecipeOutput};
pub use steps::{Step, StepInput, StepOutput};
