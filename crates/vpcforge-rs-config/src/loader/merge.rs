//! JSON merge helpers for layered configuration.

use serde_json::{Map, Value};

/// Deep-merge `overlay` into `base`; objects merge key by key, anything else replaces.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    if let (Value::Object(base_map), Value::Object(overlay_map)) = (&mut *base, overlay) {
        for (key, value) in overlay_map {
            match base_map.get_mut(key) {
                Some(existing) => merge_json_values(existing, value),
                None => {
                    base_map.insert(key.clone(), value.clone());
                }
            }
        }
        return;
    }
    *base = overlay.clone();
}

/// Deep-merge `overlay` into `base`, leaving every leaf pinned by `constraints` untouched.
///
/// A constraint object descends into the matching key; a constraint leaf locks
/// the whole subtree under that key.
pub(super) fn merge_json_with_constraints(
    base: &mut Value,
    overlay: &Value,
    constraints: Option<&Value>,
) {
    let Some(constraints) = constraints else {
        merge_json_values(base, overlay);
        return;
    };
    let (Value::Object(constraint_map), Value::Object(overlay_map)) = (constraints, overlay) else {
        // Locked leaf, or a non-object overlay against a constrained object.
        return;
    };
    if !base.is_object() {
        *base = Value::Object(Map::new());
    }
    let Value::Object(base_map) = base else {
        return;
    };
    for (key, value) in overlay_map {
        let slot = base_map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        match constraint_map.get(key) {
            None => merge_json_values(slot, value),
            Some(nested @ Value::Object(_)) => {
                merge_json_with_constraints(slot, value, Some(nested));
            }
            Some(_) => {}
        }
    }
}
