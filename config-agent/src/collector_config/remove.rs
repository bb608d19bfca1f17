use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

/// Removes from `target` everything that `spec` describes.
///
/// For every key present in both trees:
/// - mapping against mapping descends, keeping the parent key even when it ends up empty.
///   Dropping the emptied entries is left to the pruner.
/// - sequence against sequence removes every element of `spec` from the stored sequence,
///   keeping the relative order of the remaining elements. Elements missing from the stored
///   sequence are ignored.
/// - any other pair deletes the key when the stored value equals the `spec` value.
///
/// Keys missing from `target` and shape mismatches are ignored.
pub fn remove(spec: &Mapping, target: &mut Mapping) {
    remove_protecting(spec, target, &[]);
}

/// Same as [remove], but the `protected` keys at this level of `target` are never deleted, not
/// even when their stored value equals the `spec` value.
pub fn remove_protecting(spec: &Mapping, target: &mut Mapping, protected: &[&str]) {
    for (key, removal) in spec {
        let Some(current) = target.get_mut(key) else {
            trace!(key = ?key, "key not present, nothing to remove");
            continue;
        };

        let is_protected = key.as_str().is_some_and(|key| protected.contains(&key));
        let delete_key = match (removal, current) {
            (Value::Mapping(inner_spec), Value::Mapping(inner_target)) => {
                remove(inner_spec, inner_target);
                false
            }
            (Value::Sequence(elements), Value::Sequence(stored)) => {
                stored.retain(|element| !elements.contains(element));
                false
            }
            (removal, current) => removal == &*current,
        };

        if !delete_key {
            continue;
        }
        if is_protected {
            debug!(key = ?key, "skipping removal of protected key");
            continue;
        }
        trace!(key = ?key, "removing key");
        target.shift_remove(key);
    }
}
