use serde_yaml::{Mapping, Value};

/// Drops, bottom-up, every entry of `node` whose value is vacuous: `null`, an empty sequence, an
/// empty string, or a mapping that is empty once pruned itself.
///
/// Sequences are only checked for emptiness, their elements are left untouched.
pub fn prune(node: &mut Mapping) {
    node.retain(|_, value| !is_vacuous(value));
}

/// Same as [prune], except that the second level entries for which `keep(section, entry)` holds
/// are left exactly as they are, contents included.
pub fn prune_keeping<F>(root: &mut Mapping, keep: F)
where
    F: Fn(&Value, &Value) -> bool,
{
    root.retain(|section, value| {
        let Value::Mapping(entries) = value else {
            return !is_vacuous(value);
        };
        entries.retain(|entry, value| keep(section, entry) || !is_vacuous(value));
        !entries.is_empty()
    });
}

fn is_vacuous(value: &mut Value) -> bool {
    match value {
        Value::Mapping(mapping) => {
            prune(mapping);
            mapping.is_empty()
        }
        Value::Null => true,
        Value::Sequence(sequence) => sequence.is_empty(),
        Value::String(string) => string.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::Tagged(_) => false,
    }
}
