//! @acp:module "Profile Merge"
//! @acp:summary "Recursive JSON merge used for profile inheritance"
//! @acp:domain build
//! @acp:layer config

use serde_json::Value;

/// Merge `overlay` into `base`:
/// 1. Objects merge key by key, recursively
/// 2. Arrays concatenate (base entries first)
/// 3. Any other value in `overlay` replaces the base value
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (Value::Array(mut base), Value::Array(overlay)) => {
            base.extend(overlay);
            Value::Array(base)
        }
        (_, overlay) => overlay,
    }
}
