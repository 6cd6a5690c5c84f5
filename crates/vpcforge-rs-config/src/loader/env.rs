//! Environment variable overrides.

use log::debug;
use serde_json::{Map, Value, json};

/// Variables recognised as overrides, mapped to their config path.
const ENV_OVERRIDES: &[(&str, &[&str])] = &[
    ("VPCFORGE_BIND", &["server", "bind"]),
    ("VPCFORGE_API_KEY", &["server", "api_key"]),
    ("VPC_TABLE_NAME", &["store", "table_name"]),
    ("VPCFORGE_STORE_PATH", &["store", "path"]),
    ("AWS_REGION", &["provider", "region"]),
];

/// Build a JSON overlay from recognised environment variables.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe a
/// file setting.
pub(super) fn env_overlay<I>(vars: I) -> Value
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = Map::new();
    for (name, value) in vars {
        let Some((_, path)) = ENV_OVERRIDES.iter().find(|(key, _)| *key == name) else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }
        debug!("env override (var={name})");
        insert_path(&mut root, path, json!(value));
    }
    Value::Object(root)
}

fn insert_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut cursor = root;
    for segment in parents {
        let entry = cursor
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        cursor = next;
    }
    cursor.insert(last.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::env_overlay;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn maps_known_variables_and_skips_others() {
        let overlay = env_overlay(vec![
            ("AWS_REGION".to_string(), "eu-west-1".to_string()),
            ("VPC_TABLE_NAME".to_string(), "vpc-metadata-test".to_string()),
            ("HOME".to_string(), "/root".to_string()),
            ("VPCFORGE_API_KEY".to_string(), "  ".to_string()),
        ]);
        assert_eq!(
            overlay,
            json!({
                "provider": { "region": "eu-west-1" },
                "store": { "table_name": "vpc-metadata-test" }
            })
        );
    }
}
