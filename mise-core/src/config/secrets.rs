use super::ConfigError;

/// Resolves the `reference` part of a `${reference}` placeholder.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Resolves `${VAR}`, `${env:VAR}` and `${file:/path}` references.
///
/// File contents are trimmed so a trailing newline in a mounted secret does
/// not end up in the backend key.
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        let reference = reference.trim();
        if let Some(path) = reference.strip_prefix("file:") {
            let path = path.trim();
            return std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .map_err(|e| ConfigError::Load(format!("secret file '{path}': {e}")));
        }
        let var = reference.strip_prefix("env:").map(str::trim).unwrap_or(reference);
        std::env::var(var).map_err(|_| ConfigError::NotFound(format!("env:{var}")))
    }
}

/// Replace every `${...}` placeholder in `value`.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let end = rest[start..]
            .find('}')
            .ok_or_else(|| ConfigError::Load(format!("unclosed placeholder in: {value}")))?;
        out.push_str(&rest[..start]);
        out.push_str(&resolver.resolve(&rest[start + 2..start + end])?);
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SecretResolver for Fixed {
        fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
            match reference {
                "HOST" => Ok("abc.supabase.co".into()),
                other => Err(ConfigError::NotFound(other.into())),
            }
        }
    }

    #[test]
    fn replaces_embedded_placeholder() {
        let out = resolve_placeholders("https://${HOST}/rest", &Fixed).unwrap();
        assert_eq!(out, "https://abc.supabase.co/rest");
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(resolve_placeholders("plain", &Fixed).unwrap(), "plain");
    }

    #[test]
    fn unclosed_placeholder_fails() {
        assert!(resolve_placeholders("${HOST", &Fixed).is_err());
    }

    #[test]
    fn unknown_reference_fails() {
        assert!(matches!(
            resolve_placeholders("${NOPE}", &Fixed),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn reads_trimmed_secret_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anon-key");
        std::fs::write(&path, "secret-key\n").unwrap();
        let out =
            resolve_placeholders(&format!("${{file:{}}}", path.display()), &DefaultSecretResolver)
                .unwrap();
        assert_eq!(out, "secret-key");
    }
}
