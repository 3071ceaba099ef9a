//! ClickHouse SQL compiler for querygen.
//!
//! Compiles every benchmark scenario into a single SQL statement against the
//! `intel` table. Tag layout is a construction-time choice, see
//! [`TagStorage`]:
//!
//! ```text
//! Separate:  intel(created_at, tags_id, <metrics>)  +  tags(id, hostname, clusterName, ..)
//! Inlined:   intel(created_at, hostname, clusterName, .., <metrics>)
//! ```

pub mod intel;
pub mod tags;

pub use intel::{ClickHouse, TABLE, TIME_COLUMN, TIME_FORMAT};
pub use tags::TagStorage;
