use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Read a YAML file into `values`. A missing file is not an error.
pub(crate) fn load_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    load_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten_yaml("", &yaml, values);
    Ok(())
}

/// Flatten a YAML tree into dot-separated keys.
///
/// Sequences are stored whole under their key and element-wise under
/// `key.0`, `key.1`, ... so environment variables can override one element.
fn flatten_yaml(prefix: &str, value: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => format!("{other:?}"),
                };
                let full_key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten_yaml(&full_key, v, out);
            }
        }
        serde_yaml::Value::Sequence(seq) if !prefix.is_empty() => {
            out.insert(
                prefix.to_string(),
                ConfigValue::List(seq.iter().map(ConfigValue::from_yaml).collect()),
            );
            for (i, item) in seq.iter().enumerate() {
                flatten_yaml(&format!("{prefix}.{i}"), item, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
        }
        _ => {}
    }
}

/// Overlay process environment variables: `BACKEND_URL` becomes `backend.url`.
pub(crate) fn overlay_env(values: &mut HashMap<String, ConfigValue>) {
    for (env_key, env_val) in std::env::vars() {
        values.insert(env_key_to_config_key(&env_key), ConfigValue::String(env_val));
    }
}

pub(crate) fn env_key_to_config_key(env_key: &str) -> String {
    env_key.to_lowercase().replace('_', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_nested_mappings() {
        let mut values = HashMap::new();
        load_yaml_str("backend:\n  url: https://x.supabase.co\n  timeout:\n    secs: 5\n", &mut values)
            .unwrap();
        assert_eq!(
            values.get("backend.url"),
            Some(&ConfigValue::String("https://x.supabase.co".into()))
        );
        assert_eq!(values.get("backend.timeout.secs"), Some(&ConfigValue::Integer(5)));
    }

    #[test]
    fn sequences_are_indexed() {
        let mut values = HashMap::new();
        load_yaml_str("tags:\n  - a\n  - b\n", &mut values).unwrap();
        assert!(matches!(values.get("tags"), Some(ConfigValue::List(items)) if items.len() == 2));
        assert_eq!(values.get("tags.1"), Some(&ConfigValue::String("b".into())));
    }

    #[test]
    fn env_keys_map_to_dotted_keys() {
        assert_eq!(env_key_to_config_key("CACHE_TTL_LIST_SECS"), "cache.ttl.list.secs");
    }
}
