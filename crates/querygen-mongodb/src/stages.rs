//! Aggregation stage builders.
//!
//! Points are stored one document per reading:
//!
//! ```text
//! { measurement: "intel", time: Date, tags: { hostname, clusterName, .. }, fields: { <metric>: n, .. } }
//! ```

use bson::{doc, Bson, DateTime, Document};
use querygen_core::{TimeInterval, MEASUREMENT};

/// `$match` on the measurement plus optional entity, window and replica
/// state constraints.
pub fn match_stage(
    entity: Option<(&str, &[String])>,
    window: Option<&TimeInterval>,
    primaries_only: bool,
) -> Document {
    let mut filter = doc! { "measurement": MEASUREMENT };

    if let Some((key, names)) = entity {
        assert!(!names.is_empty(), "$match on '{key}' needs at least one name");
        filter.insert(tag_path(key), doc! { "$in": names.to_vec() });
    }
    if let Some(window) = window {
        filter.insert(
            "time",
            doc! {
                "$gte": DateTime::from_chrono(window.start()),
                "$lt": DateTime::from_chrono(window.end()),
            },
        );
    }
    if primaries_only {
        filter.insert(tag_path("replicaSetState"), "PRIMARY");
    }

    doc! { "$match": filter }
}

/// `$dateTrunc` of the point time to `unit`.
pub fn truncate_time(unit: &str) -> Document {
    doc! { "$dateTrunc": { "date": "$time", "unit": unit } }
}

/// Group key made of a truncated time bucket and one tag.
pub fn bucket_key(bucket: &str, unit: &str, tag: &str) -> Document {
    let mut key = Document::new();
    key.insert(bucket, truncate_time(unit));
    key.insert(tag, tag_ref(tag));
    key
}

/// Ascending sort on the given paths, in order.
pub fn sort_ascending(paths: &[String]) -> Document {
    let mut sort = Document::new();
    for path in paths {
        sort.insert(path.as_str(), 1);
    }
    doc! { "$sort": sort }
}

/// `{ "<op>": "$fields.<metric>" }`
pub fn field_accumulator(op: &str, metric: &str) -> Document {
    let mut acc = Document::new();
    acc.insert(op, field_ref(metric));
    acc
}

pub fn tag_path(key: &str) -> String {
    format!("tags.{key}")
}

pub fn tag_ref(key: &str) -> Bson {
    Bson::String(format!("$tags.{key}"))
}

pub fn field_ref(metric: &str) -> Bson {
    Bson::String(format!("$fields.{metric}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_match_stage_with_everything() {
        let window = TimeInterval::new(
            Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2016, 1, 1, 1, 0, 0).unwrap(),
        )
        .unwrap();
        let names = vec!["host_3".to_string(), "host_9".to_string()];
        let stage = match_stage(Some(("hostname", names.as_slice())), Some(&window), true);

        let filter = stage.get_document("$match").unwrap();
        assert_eq!(filter.get_str("measurement").unwrap(), "intel");
        assert_eq!(
            filter
                .get_document("tags.hostname")
                .unwrap()
                .get_array("$in")
                .unwrap(),
            &vec![Bson::from("host_3"), Bson::from("host_9")]
        );
        let time = filter.get_document("time").unwrap();
        assert_eq!(
            time.get_datetime("$gte").unwrap().to_chrono(),
            window.start()
        );
        assert_eq!(time.get_datetime("$lt").unwrap().to_chrono(), window.end());
        assert_eq!(filter.get_str("tags.replicaSetState").unwrap(), "PRIMARY");
    }

    #[test]
    fn test_match_stage_measurement_only() {
        let stage = match_stage(None, None, false);
        assert_eq!(stage, doc! { "$match": { "measurement": "intel" } });
    }

    #[test]
    #[should_panic(expected = "at least one name")]
    fn test_empty_names_is_a_bug() {
        let names: Vec<String> = Vec::new();
        match_stage(Some(("hostname", names.as_slice())), None, false);
    }

    #[test]
    fn test_bucket_key() {
        assert_eq!(
            bucket_key("hour", "hour", "hostname"),
            doc! {
                "hour": { "$dateTrunc": { "date": "$time", "unit": "hour" } },
                "hostname": "$tags.hostname",
            }
        );
    }

    #[test]
    fn test_sort_keeps_order() {
        let stage = sort_ascending(&["_id.hour".to_string(), "_id.hostname".to_string()]);
        let keys: Vec<&String> = stage.get_document("$sort").unwrap().keys().collect();
        assert_eq!(keys, ["_id.hour", "_id.hostname"]);
    }
}
