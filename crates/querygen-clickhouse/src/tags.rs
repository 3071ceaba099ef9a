//! Tag storage strategies.
//!
//! The loader can either keep tags in a separate `tags` table referenced by
//! `intel.tags_id`, or inline every tag as a column of `intel`. The choice is
//! made once per generator; every query builder goes through this type
//! instead of branching on its own.

use serde::{Deserialize, Serialize};

/// Table holding the tag sets when tags are stored separately.
pub const TAGS_TABLE: &str = "tags";

/// How tags are laid out in the ClickHouse schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStorage {
    /// `intel.tags_id` references `tags.id`.
    #[default]
    Separate,
    /// Tags are columns of `intel`.
    Inlined,
}

impl TagStorage {
    /// Map the loader's `use_tags` flag to a strategy.
    pub fn from_use_tags(use_tags: bool) -> Self {
        if use_tags {
            TagStorage::Separate
        } else {
            TagStorage::Inlined
        }
    }

    /// WHERE-clause fragment selecting rows whose tag `column` is one of
    /// `names`. `WHERE` itself is not included.
    ///
    /// ```text
    /// Separate: tags_id IN (SELECT id FROM tags WHERE hostname IN ('host_1','host_2'))
    /// Inlined:  (hostname = 'host_1' OR hostname = 'host_2')
    /// ```
    pub fn entity_filter(&self, column: &str, names: &[String]) -> String {
        assert!(
            !names.is_empty(),
            "entity filter on '{column}' needs at least one name"
        );

        match self {
            TagStorage::Separate => {
                let values: Vec<String> = names.iter().map(|n| quote(n)).collect();
                format!(
                    "tags_id IN (SELECT id FROM {TAGS_TABLE} WHERE {column} IN ({}))",
                    values.join(",")
                )
            }
            TagStorage::Inlined => {
                let clauses: Vec<String> = names
                    .iter()
                    .map(|n| format!("{column} = {}", quote(n)))
                    .collect();
                format!("({})", clauses.join(" OR "))
            }
        }
    }

    /// JOIN bringing tag columns into scope for a query over `source`.
    /// Empty when tags are inlined.
    pub fn join(&self, source: &str) -> String {
        match self {
            TagStorage::Separate => {
                format!("ANY INNER JOIN {TAGS_TABLE} AS t ON {source}.tags_id = t.id")
            }
            TagStorage::Inlined => String::new(),
        }
    }

    /// Expression naming tag `column` once [`join`](Self::join) is applied.
    pub fn tag_column(&self, column: &str) -> String {
        match self {
            TagStorage::Separate => format!("t.{column}"),
            TagStorage::Inlined => column.to_string(),
        }
    }

    /// Column `column` of data table `table` once [`join`](Self::join) is
    /// applied. The tags table has its own `created_at`, so data columns
    /// shared with it must be qualified.
    pub fn data_column(&self, table: &str, column: &str) -> String {
        match self {
            TagStorage::Separate => format!("{table}.{column}"),
            TagStorage::Inlined => column.to_string(),
        }
    }

    /// Column identifying one series (one host) in the data table.
    pub fn series_key(&self) -> &'static str {
        match self {
            TagStorage::Separate => "tags_id",
            TagStorage::Inlined => "hostname",
        }
    }
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
