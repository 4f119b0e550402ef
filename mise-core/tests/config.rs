use mise_core::config::{
    ConfigError, ConfigProperties, ConfigValue, DefaultSecretResolver, MiseConfig, PropertyMeta,
};
use serial_test::serial;

#[test]
fn empty_config() {
    let config = MiseConfig::empty();
    assert!(matches!(
        config.get::<String>("backend.url"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn set_and_get() {
    let mut config = MiseConfig::empty();
    config.set("recipes.page.size", ConfigValue::Integer(12));
    assert_eq!(config.get::<u64>("recipes.page.size").unwrap(), 12);
    assert_eq!(config.get::<String>("recipes.page.size").unwrap(), "12");
}

#[test]
fn get_or_default() {
    let config = MiseConfig::empty();
    assert_eq!(config.get_or("retry.max.attempts", 3u32), 3);
}

#[test]
fn get_opt_treats_blank_as_missing() {
    let mut config = MiseConfig::empty();
    config.set("backend.key", ConfigValue::String("  ".into()));
    assert_eq!(config.get_opt::<String>("backend.key").unwrap(), None);
    assert_eq!(config.get_opt::<String>("backend.url").unwrap(), None);
}

#[test]
fn type_mismatch() {
    let mut config = MiseConfig::empty();
    config.set("cache.ttl.list.secs", ConfigValue::String("five".into()));
    assert!(matches!(
        config.get::<u64>("cache.ttl.list.secs"),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn negative_value_rejected_for_unsigned() {
    let mut config = MiseConfig::empty();
    config.set("recipes.page.size", ConfigValue::Integer(-1));
    assert!(config.get::<u64>("recipes.page.size").is_err());
}

#[test]
fn flatten_yaml() {
    let yaml = r#"
backend:
  url: "https://abc.supabase.co"
  timeout:
    secs: 5
recipes:
  page:
    size: 24
"#;
    let config = MiseConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(
        config.get::<String>("backend.url").unwrap(),
        "https://abc.supabase.co"
    );
    assert_eq!(config.get::<u64>("backend.timeout.secs").unwrap(), 5);
    assert_eq!(config.get::<usize>("recipes.page.size").unwrap(), 24);
}

#[test]
fn list_from_yaml_and_comma_string() {
    let yaml = r#"
explore:
  cuisines:
    - Italian
    - French
"#;
    let mut config = MiseConfig::from_yaml_str(yaml, "test").unwrap();
    let cuisines: Vec<String> = config.get("explore.cuisines").unwrap();
    assert_eq!(cuisines, vec!["Italian", "French"]);

    config.set("explore.dietary", ConfigValue::String("Vegan, Vegetarian".into()));
    let dietary: Vec<String> = config.get("explore.dietary").unwrap();
    assert_eq!(dietary, vec!["Vegan", "Vegetarian"]);
}

#[test]
fn invalid_yaml_is_load_error() {
    let result = MiseConfig::from_yaml_str("backend: [unclosed", "test");
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

// ── Typed sections ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct PagingConfig {
    page_size: usize,
    featured_limit: usize,
}

impl ConfigProperties for PagingConfig {
    fn prefix() -> &'static str {
        "recipes"
    }

    fn properties_metadata() -> Vec<PropertyMeta> {
        vec![PropertyMeta {
            key: "recipes.page.size",
            type_name: "usize",
            description: "page size",
        }]
    }

    fn from_config(config: &MiseConfig) -> Result<Self, ConfigError> {
        Ok(PagingConfig {
            page_size: config.get("recipes.page.size")?,
            featured_limit: config.get_or("recipes.featured.limit", 6),
        })
    }
}

#[test]
fn typed_section_reads_values() {
    let config =
        MiseConfig::from_yaml_str("recipes:\n  page:\n    size: 12\n", "staging").unwrap();
    let paging = PagingConfig::from_config(&config).unwrap();
    assert_eq!(paging.page_size, 12);
    assert_eq!(paging.featured_limit, 6);
    assert_eq!(config.profile(), "staging");
}

#[test]
fn property_env_var_and_missing_section() {
    let meta = PagingConfig::properties_metadata();
    assert_eq!(meta[0].env_var(), "RECIPES_PAGE_SIZE");
    assert!(PagingConfig::from_config(&MiseConfig::empty()).is_err());
}

// ── Layered loading ────────────────────────────────────────────────────

#[test]
#[serial]
fn profile_file_overrides_base() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "recipes:\n  page:\n    size: 12\nbackend:\n  url: https://base.supabase.co\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("application-prod.yaml"),
        "recipes:\n  page:\n    size: 30\n",
    )
    .unwrap();

    std::env::remove_var("MISE_PROFILE");
    let config = MiseConfig::load_from(dir.path(), "prod", &DefaultSecretResolver).unwrap();
    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<u64>("recipes.page.size").unwrap(), 30);
    assert_eq!(
        config.get::<String>("backend.url").unwrap(),
        "https://base.supabase.co"
    );
}

#[test]
#[serial]
fn env_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("application.yaml"), "mise:\n  test:\n    flag: yaml\n")
        .unwrap();

    std::env::set_var("MISE_TEST_FLAG", "env");
    let config = MiseConfig::load_from(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    std::env::remove_var("MISE_TEST_FLAG");

    assert_eq!(config.get::<String>("mise.test.flag").unwrap(), "env");
}

#[test]
#[serial]
fn profile_env_var_wins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application-staging.yaml"),
        "mise:\n  stage:\n    marker: staging\n",
    )
    .unwrap();

    std::env::set_var("MISE_PROFILE", "staging");
    let config = MiseConfig::load_from(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    std::env::remove_var("MISE_PROFILE");

    assert_eq!(config.profile(), "staging");
    assert_eq!(config.get::<String>("mise.stage.marker").unwrap(), "staging");
}

#[test]
#[serial]
fn placeholders_resolved_from_env() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "mise:\n  placeholder:\n    url: \"https://${MISE_TEST_PROJECT}.supabase.co\"\n",
    )
    .unwrap();

    std::env::set_var("MISE_TEST_PROJECT", "abcd");
    let config = MiseConfig::load_from(dir.path(), "dev", &DefaultSecretResolver).unwrap();
    std::env::remove_var("MISE_TEST_PROJECT");

    assert_eq!(
        config.get::<String>("mise.placeholder.url").unwrap(),
        "https://abcd.supabase.co"
    );
}

#[test]
#[serial]
fn dotenv_does_not_override_existing_env() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "MISE_DOTENV_ONLY=from-file\nMISE_DOTENV_SHADOWED=from-file\n",
    )
    .unwrap();

    std::env::set_var("MISE_DOTENV_SHADOWED", "from-env");
    let config = MiseConfig::load_from(dir.path(), "dev", &DefaultSecretResolver).unwrap();

    assert_eq!(config.get::<String>("mise.dotenv.only").unwrap(), "from-file");
    assert_eq!(config.get::<String>("mise.dotenv.shadowed").unwrap(), "from-env");

    std::env::remove_var("MISE_DOTENV_SHADOWED");
    std::env::remove_var("MISE_DOTENV_ONLY");
}
