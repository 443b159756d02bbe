//! Tests for config file discovery and loading.
//!
//! Every test runs inside a `figment::Jail` so that the env override test
//! cannot leak `CLEFT_*` variables into its neighbours.

use cleft_config::{AllowlistValue, ConfigDiscovery, ConfigError, LintConfig, TableOverrides};
use figment::Jail;

#[test]
fn discovers_cleft_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "cleft.toml",
            r#"
trace_dependencies = true
trace_depth = 2

[allowlist]
"@acme/ui" = true
"swr" = ["useSWRConfig"]
"#,
        )?;

        let discovery = ConfigDiscovery::new(jail.directory());
        let found = discovery.find().expect("config file");
        assert_eq!(found.file_name().unwrap(), "cleft.toml");

        let config = discovery.load().map_err(|e| e.to_string())?;
        assert_eq!(config.effective_trace_depth(), 2);
        assert_eq!(config.allowlist["@acme/ui"], AllowlistValue::All(true));
        assert_eq!(
            config.allowlist["swr"],
            AllowlistValue::Exports(vec!["useSWRConfig".to_string()])
        );
        Ok(())
    });
}

#[test]
fn discovers_package_json() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "package.json",
            r#"{
  "name": "test",
  "cleft": {
    "rules": { "prefer_named_imports": false },
    "named_import_modules": ["react", "preact/hooks"]
  }
}"#,
        )?;

        let discovery = ConfigDiscovery::new(jail.directory());
        assert_eq!(
            discovery.find().expect("config file").file_name().unwrap(),
            "package.json"
        );

        let config = discovery.load().map_err(|e| e.to_string())?;
        assert!(!config.rules.prefer_named_imports);
        assert!(config.rules.require_use_client);
        assert_eq!(config.named_import_modules.len(), 2);
        Ok(())
    });
}

#[test]
fn package_json_without_section_is_ignored() {
    Jail::expect_with(|jail| {
        jail.create_file("package.json", r#"{ "name": "test", "cleft": null }"#)?;

        let discovery = ConfigDiscovery::new(jail.directory());
        assert!(discovery.find().is_none());
        assert!(matches!(discovery.load(), Err(ConfigError::NotFound)));
        Ok(())
    });
}

#[test]
fn toml_takes_precedence_over_package_json() {
    Jail::expect_with(|jail| {
        jail.create_file("cleft.toml", "trace_depth = 9\n")?;
        jail.create_file("package.json", r#"{ "cleft": { "trace_depth": 1 } }"#)?;

        let config = ConfigDiscovery::new(jail.directory())
            .load()
            .map_err(|e| e.to_string())?;
        assert_eq!(config.trace_depth, 9);
        Ok(())
    });
}

#[test]
fn missing_config_falls_back_to_defaults() {
    Jail::expect_with(|jail| {
        let config = ConfigDiscovery::new(jail.directory())
            .load_or_default()
            .map_err(|e| e.to_string())?;
        assert_eq!(config, LintConfig::default());
        Ok(())
    });
}

#[test]
fn tables_path_is_relative_to_root() {
    Jail::expect_with(|jail| {
        jail.create_file("cleft.toml", r#"tables_path = "cleft.tables.json""#)?;
        jail.create_file(
            "cleft.tables.json",
            r#"{ "clientOnlyHooks": ["useWindowSize"] }"#,
        )?;

        let discovery = ConfigDiscovery::new(jail.directory());
        let config = discovery.load().map_err(|e| e.to_string())?;
        assert_eq!(
            config.tables_path,
            Some(jail.directory().join("cleft.tables.json"))
        );

        let tables = TableOverrides::load(config.tables_path.as_deref().unwrap());
        assert_eq!(tables.client_only_hooks, vec!["useWindowSize".to_string()]);
        Ok(())
    });
}

#[test]
fn env_overrides_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file("cleft.toml", "trace_depth = 4\ntrace_dependencies = false\n")?;
        jail.set_env("CLEFT_TRACE_DEPENDENCIES", "true");
        jail.set_env("CLEFT_RULES__NO_MIXED_APIS", "false");

        let config = ConfigDiscovery::new(jail.directory())
            .load()
            .map_err(|e| e.to_string())?;

        assert!(config.trace_dependencies);
        assert_eq!(config.trace_depth, 4);
        assert!(!config.rules.no_mixed_apis);
        assert!(config.rules.require_use_client);
        Ok(())
    });
}
