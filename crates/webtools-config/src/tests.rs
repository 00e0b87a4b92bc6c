#[cfg(test)]
mod tests {
    use super::super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.user, "webtools");
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.history.default_limit, 50);
        assert_eq!(config.history.max_items, 100);
        assert_eq!(config.prompts.default_limit, 100);
        assert!(config.database.min_connections <= config.database.max_connections);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 8080

            [ollama]
            model = "qwen2.5"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.ollama.model, "qwen2.5");
        assert_eq!(config.ollama.host, "http://localhost:11434");
        assert_eq!(config.database.name, "webtools");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("API_PORT", "4000"),
                ("DB_HOST", "db.internal"),
                ("DB_ENABLED", "false"),
                ("OLLAMA_HOST", "http://gpu:11434/"),
                ("DB_NAME", "  "),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.host, "db.internal");
        assert!(!config.database.enabled);
        assert_eq!(config.ollama.host, "http://gpu:11434");
        assert_eq!(config.database.name, "webtools");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("API_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "API_PORT"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("webtools.toml");
        std::fs::write(&path, "[database]\nenabled = false\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(!config.database.enabled);
        assert!(Config::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_display_url_masks_password() {
        let db = DatabaseConfig::default();
        assert!(!db.display_url().contains("webtools123"));
    }
}
