//! Field-by-field merging of a parsed config document onto an existing config.
//!
//! The document is overlaid onto the JSON form of the current config, so only
//! the keys the file actually names change. Mappings merge recursively;
//! sequences and scalars replace; an explicit `null` means "not specified".

use serde_json::Value;

/// Overlay `overlay` onto `base` in place.
///
/// Returns the dotted paths of every leaf the overlay set, in key order.
///
/// # Example
/// ```
/// use serde_json::json;
/// use swarm_sim_config::config::overlay_value;
///
/// let mut base = json!({"swarm_behavior": {"formation": "distributed", "wave_count": 3}});
/// let set = overlay_value(&mut base, json!({"swarm_behavior": {"wave_count": 5}}));
/// assert_eq!(base, json!({"swarm_behavior": {"formation": "distributed", "wave_count": 5}}));
/// assert_eq!(set, vec!["swarm_behavior.wave_count".to_string()]);
/// ```
pub fn overlay_value(base: &mut Value, overlay: Value) -> Vec<String> {
    let mut set = Vec::new();
    overlay_at(base, overlay, &mut String::new(), &mut set);
    set
}

fn overlay_at(base: &mut Value, overlay: Value, path: &mut String, set: &mut Vec<String>) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let len = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&key);

                match base_map.get_mut(&key) {
                    Some(slot) => overlay_at(slot, value, path, set),
                    None => {
                        // Unknown to the base shape; keep it so deserialization can reject it.
                        if !value.is_null() {
                            set.push(path.clone());
                            base_map.insert(key, value);
                        }
                    }
                }
                path.truncate(len);
            }
        }
        (slot, value) => {
            set.push(path.clone());
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overlay_nested_objects() {
        let mut base = json!({
            "numeric_defaults": {"defender_count": 5, "center": {"latitude": 1.0, "longitude": 2.0}},
            "advanced": {"verbose_logging": false}
        });
        let set = overlay_value(
            &mut base,
            json!({"numeric_defaults": {"center": {"longitude": 9.5}}}),
        );
        assert_eq!(
            base,
            json!({
                "numeric_defaults": {"defender_count": 5, "center": {"latitude": 1.0, "longitude": 9.5}},
                "advanced": {"verbose_logging": false}
            })
        );
        assert_eq!(set, vec!["numeric_defaults.center.longitude"]);
    }

    #[test]
    fn test_sequences_replaced_not_concatenated() {
        let mut base = json!({"termination": {"success": ["a", "b"]}});
        overlay_value(&mut base, json!({"termination": {"success": ["c"]}}));
        assert_eq!(base, json!({"termination": {"success": ["c"]}}));
    }

    #[test]
    fn test_null_preserves_base() {
        let mut base = json!({"logging": {"enable_aar": true, "aar_format": "json"}});
        let set = overlay_value(
            &mut base,
            json!({"logging": {"enable_aar": null}, "advanced": null}),
        );
        assert_eq!(
            base,
            json!({"logging": {"enable_aar": true, "aar_format": "json"}})
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_carried_through() {
        let mut base = json!({"logging": {"enable_aar": true}});
        let set = overlay_value(&mut base, json!({"logging": {"colour": "always"}}));
        assert_eq!(base["logging"]["colour"], json!("always"));
        assert_eq!(set, vec!["logging.colour"]);
    }

    #[test]
    fn test_scalar_replaced_by_object_and_back() {
        let mut base = json!({"value": 42});
        overlay_value(&mut base, json!({"value": {"nested": true}}));
        assert_eq!(base, json!({"value": {"nested": true}}));

        overlay_value(&mut base, json!({"value": 7}));
        assert_eq!(base, json!({"value": 7}));
    }

    #[test]
    fn test_role_multiplier_map_extends() {
        let mut base = json!({"target_priority": {"role_multipliers": {"scout": 0.8}}});
        let set = overlay_value(
            &mut base,
            json!({"target_priority": {"role_multipliers": {"bomber": 2.0}}}),
        );
        assert_eq!(
            base["target_priority"]["role_multipliers"],
            json!({"scout": 0.8, "bomber": 2.0})
        );
        assert_eq!(set, vec!["target_priority.role_multipliers.bomber"]);
    }
}
