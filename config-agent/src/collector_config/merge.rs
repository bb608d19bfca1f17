use serde_yaml::{Mapping, Value};
use tracing::trace;

/// Deep merges `patch` into `target`.
///
/// Only mapping values are merged recursively, and only when the key already holds a mapping in
/// `target`. Any other value (scalars, sequences, mappings for absent keys or onto non-mapping
/// values) overwrites the stored one, so an incoming sequence always replaces the existing
/// sequence wholesale.
///
/// # Example
/// ```
/// # use otel_config_agent::collector_config::merge::merge;
/// let mut target: serde_yaml::Mapping =
///     serde_yaml::from_str("hostmetrics: {interval: 5s, scrapers: [cpu]}").unwrap();
/// let patch: serde_yaml::Mapping =
///     serde_yaml::from_str("hostmetrics: {interval: 1s}\nkubeletstats: {interval: 1s}").unwrap();
/// merge(patch, &mut target);
/// let expected: serde_yaml::Mapping = serde_yaml::from_str(
///     "hostmetrics: {interval: 1s, scrapers: [cpu]}\nkubeletstats: {interval: 1s}",
/// )
/// .unwrap();
/// assert_eq!(target, expected);
/// ```
pub fn merge(patch: Mapping, target: &mut Mapping) {
    for (key, value) in patch {
        match value {
            Value::Mapping(inner_patch) => match target.get_mut(&key) {
                Some(Value::Mapping(inner_target)) => merge(inner_patch, inner_target),
                _ => {
                    trace!(key = ?key, "inserting mapping");
                    target.insert(key, Value::Mapping(inner_patch));
                }
            },
            value => {
                trace!(key = ?key, "overwriting value");
                target.insert(key, value);
            }
        }
    }
}

/// Inserts every entry of `patch` into `target`, replacing whole values instead of merging them.
pub fn replace_entries(patch: Mapping, target: &mut Mapping) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn yaml(content: &str) -> Mapping {
        serde_yaml::from_str(content).unwrap()
    }

    #[rstest]
    #[case::insert_absent_key("a: 1", "b: 2", "{a: 1, b: 2}")]
    #[case::overwrite_scalar("a: 1", "a: 2", "a: 2")]
    #[case::deep_merge_mappings(
        "a: {b: 1, c: 2}",
        "a: {c: 3, d: 4}",
        "a: {b: 1, c: 3, d: 4}"
    )]
    #[case::sequence_replaced_wholesale("a: [x, y, z]", "a: [w]", "a: [w]")]
    #[case::mapping_onto_scalar_replaces("a: 1", "a: {b: 2}", "a: {b: 2}")]
    #[case::mapping_onto_sequence_replaces("a: [x]", "a: {b: 2}", "a: {b: 2}")]
    #[case::scalar_onto_mapping_replaces("a: {b: 2}", "a: text", "a: text")]
    #[case::null_overwrites("a: {b: 2}", "a: null", "a: null")]
    #[case::absent_mapping_inserted_as_is("a: 1", "b: {c: {d: 1}}", "{a: 1, b: {c: {d: 1}}}")]
    fn test_merge(#[case] target: &str, #[case] patch: &str, #[case] expected: &str) {
        let mut target = yaml(target);
        merge(yaml(patch), &mut target);
        assert_eq!(target, yaml(expected));
    }

    #[test]
    fn test_merge_empty_patch_is_identity() {
        let original = yaml("a: {b: 1}\nc: [1, 2]\nd: ''");
        let mut target = original.clone();
        merge(Mapping::new(), &mut target);
        assert_eq!(target, original);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = yaml("a: {b: {c: 1}, e: [1, 2]}\nf: text");
        let mut once = yaml("a: {b: {c: 0, d: 2}}\ng: 1");
        merge(patch.clone(), &mut once);
        let mut twice = once.clone();
        merge(patch, &mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_existing_order_and_appends_new_keys() {
        let mut target = yaml("z: 1\ny: 2");
        merge(yaml("a: 3\nz: 4"), &mut target);
        let keys: Vec<_> = target.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["z", "y", "a"]);
    }

    #[test]
    fn test_replace_entries_does_not_merge() {
        let mut target = yaml("a: {b: 1, c: 2}\nd: 1");
        replace_entries(yaml("a: {c: 3}"), &mut target);
        assert_eq!(target, yaml("a: {c: 3}\nd: 1"));
    }
}
