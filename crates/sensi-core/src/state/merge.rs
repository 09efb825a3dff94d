use serde_json::Value;

/// Merge `incoming` into `target`.
///
/// Two objects merge key by key, recursively. Anything else (arrays,
/// scalars, `null`, or a type mismatch) replaces the target wholesale.
/// Keys absent from `incoming` are left untouched.
pub fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (target, incoming) => *target = incoming,
    }
}
