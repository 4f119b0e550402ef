use mise_core::{ConfigProperties, ConfigValue, MiseConfig};
use mise_data::{BackendConfig, RetryPolicy};
use std::time::Duration;

#[test]
fn backend_validity_rules() {
    assert!(BackendConfig::new("https://abcd.supabase.co", "anon-key").is_valid());
    assert!(!BackendConfig::default().is_valid());
    assert!(!BackendConfig::new("", "anon-key").is_valid());
    assert!(!BackendConfig::new("https://abcd.supabase.co", "  ").is_valid());
    assert!(!BackendConfig::new("https://your-project-id.supabase.co", "anon-key").is_valid());
    assert!(!BackendConfig::new("https://abcd.supabase.co", "your-anon-key-here").is_valid());
    assert!(!BackendConfig::new("https://api.example.com", "anon-key").is_valid());
}

#[test]
fn backend_from_yaml() {
    let config = MiseConfig::from_yaml_str(
        "backend:\n  url: https://abcd.supabase.co\n  key: anon\n  timeout:\n    secs: 3\n",
        "test",
    )
    .unwrap();
    let backend = BackendConfig::from_config(&config).unwrap();
    assert_eq!(backend.url.as_deref(), Some("https://abcd.supabase.co"));
    assert_eq!(backend.timeout, Duration::from_secs(3));
    assert!(backend.is_valid());
}

#[test]
fn blank_backend_values_are_absent() {
    let mut config = MiseConfig::empty();
    config.set("backend.url", ConfigValue::String(String::new()));
    let backend = BackendConfig::from_config(&config).unwrap();
    assert_eq!(backend, BackendConfig::default());
}

#[test]
fn retry_policy_defaults_and_overrides() {
    assert_eq!(
        RetryPolicy::from_config(&MiseConfig::empty()).unwrap(),
        RetryPolicy::new(3, Duration::from_millis(1000))
    );

    let mut config = MiseConfig::empty();
    config.set("retry.max.attempts", ConfigValue::String("5".into()));
    config.set("retry.base.delay.ms", ConfigValue::Integer(250));
    let policy = RetryPolicy::from_config(&config).unwrap();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
}

#[test]
fn retry_policy_rejects_garbage() {
    let mut config = MiseConfig::empty();
    config.set("retry.max.attempts", ConfigValue::String("many".into()));
    assert!(RetryPolicy::from_config(&config).is_err());
}
