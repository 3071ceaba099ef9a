//! MongoDB aggregation pipeline compiler for querygen.
//!
//! Every scenario compiles to a pipeline over the `point_data` collection
//! that starts with a `$match` on the measurement, the sampled entities and
//! (for windowed scenarios) the sampled time range.

pub mod intel;
pub mod stages;

pub use intel::{Mongo, COLLECTION};
