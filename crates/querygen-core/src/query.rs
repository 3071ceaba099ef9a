//! The query envelope a backend fills in.

use bson::Document;
use serde::Serialize;

/// Backend-specific body of a generated query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Not filled yet.
    #[default]
    Empty,

    /// A single SQL statement against `table`.
    Sql { table: String, sql: String },

    /// An aggregation pipeline against `collection`, stages in order.
    Pipeline {
        collection: String,
        stages: Vec<Document>,
    },

    /// A metric selector evaluated over `[start, end)` (unix seconds) every
    /// `step_secs` seconds.
    Selector {
        expr: String,
        start: i64,
        end: i64,
        step_secs: u64,
    },
}

/// One generated query.
///
/// The caller creates an envelope per query, hands it to exactly one
/// compilation call, then passes it on. Envelopes are never reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Query {
    pub id: u64,
    /// Single-line summary: backend, scenario and cardinality.
    pub human_label: String,
    /// The label plus the sampled window start.
    pub human_description: String,
    pub payload: Payload,
}

impl Query {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Fill the envelope in place.
    pub fn fill(
        &mut self,
        human_label: impl Into<String>,
        human_description: impl Into<String>,
        payload: Payload,
    ) {
        self.human_label = human_label.into();
        self.human_description = human_description.into();
        self.payload = payload;
    }

    pub fn is_filled(&self) -> bool {
        !matches!(self.payload, Payload::Empty)
    }

    pub fn sql(&self) -> Option<&str> {
        match &self.payload {
            Payload::Sql { sql, .. } => Some(sql),
            _ => None,
        }
    }

    pub fn pipeline(&self) -> Option<&[Document]> {
        match &self.payload {
            Payload::Pipeline { stages, .. } => Some(stages),
            _ => None,
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match &self.payload {
            Payload::Selector { expr, .. } => Some(expr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_new_query_is_empty() {
        let q = Query::new(7);
        assert_eq!(q.id, 7);
        assert!(!q.is_filled());
        assert!(q.sql().is_none());
    }

    #[test]
    fn test_fill_sql() {
        let mut q = Query::new(0);
        q.fill(
            "label",
            "label: 2016-01-01T00:00:00Z",
            Payload::Sql {
                table: "intel".into(),
                sql: "SELECT 1".into(),
            },
        );
        assert!(q.is_filled());
        assert_eq!(q.sql(), Some("SELECT 1"));
        assert!(q.pipeline().is_none());
    }

    #[test]
    fn test_serialize_pipeline() {
        let mut q = Query::new(1);
        q.fill(
            "l",
            "d",
            Payload::Pipeline {
                collection: "point_data".into(),
                stages: vec![doc! { "$match": { "measurement": "intel" } }],
            },
        );
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["payload"]["kind"], "pipeline");
        assert_eq!(
            json["payload"]["stages"][0]["$match"]["measurement"],
            "intel"
        );
    }
}
