//! Series selector construction.
//!
//! Series are named `<prefix>_<metric>` and carry the point tags as labels.

use querygen_core::{MetricCatalog, MetricCount, QueryGenError, MEASUREMENT};

/// Prefix of every series name.
pub const METRIC_PREFIX: &str = MEASUREMENT;

/// `key='v'` for one value, `key=~'v1|v2'` for several.
pub fn tag_matcher(key: &str, values: &[String]) -> String {
    match values {
        [] => panic!("tag matcher on '{key}' needs at least one value"),
        [only] => format!("{key}='{only}'"),
        many => format!("{key}=~'{}'", many.join("|")),
    }
}

/// Full series name of `metric`.
pub fn series_name(metric: &str) -> String {
    format!("{METRIC_PREFIX}_{metric}")
}

/// Selector for `metrics` restricted by the label matchers in `tags`.
///
/// ```text
/// All          {__name__=~'intel_.*', hostname='host_1'}
/// one metric   intel_<m>{hostname='host_1'}
/// several      {__name__=~'intel_(m1|m2)', hostname='host_1'}
/// ```
pub fn select(metrics: MetricCount, tags: &str) -> Result<String, QueryGenError> {
    if metrics.is_all() {
        return Ok(format!("{{__name__=~'{METRIC_PREFIX}_.*', {tags}}}"));
    }

    let names = MetricCatalog::resolve(metrics)?;
    Ok(match names {
        [] => panic!("selector over zero metrics"),
        [only] => format!("{}{{{tags}}}", series_name(only)),
        many => format!(
            "{{__name__=~'{METRIC_PREFIX}_({})', {tags}}}",
            many.join("|")
        ),
    })
}

/// Selector for a single named metric.
pub fn select_one(metric: &str, tags: &str) -> String {
    format!("{}{{{tags}}}", series_name(metric))
}
