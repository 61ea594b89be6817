// SPDX-FileCopyrightText: 2026 Vibrato Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Vibrato configuration system.

use vibrato_config::diagnostic::{ConfigError, suggest_key};
use vibrato_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_vibrato_config() {
    let toml = r#"
[agent]
name = "test-bot"
log_level = "debug"

[owner]
user_id = 4242

[storage]
data_dir = "/tmp/vibrato-test"
flush_interval_secs = 30
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-bot");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.owner.user_id, 4242);
    assert_eq!(config.storage.data_dir, "/tmp/vibrato-test");
    assert_eq!(config.storage.flush_interval_secs, 30);
}

/// Unknown field in [agent] section produces an UnknownField error.
#[test]
fn unknown_field_in_agent_produces_error() {
    let toml = r#"
[agent]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "vibrato");
    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.owner.user_id, 0);
    assert_eq!(config.storage.flush_interval_secs, 120);
}

/// The validating entry point converts unknown keys into rich diagnostics
/// with a typo suggestion.
#[test]
fn unknown_key_gets_suggestion_diagnostic() {
    let toml = r#"
[storage]
data_dri = "/tmp/x"
"#;

    let errors = load_and_validate_str(toml).expect_err("typo must be rejected");
    assert!(!errors.is_empty());
    match &errors[0] {
        ConfigError::UnknownKey { key, suggestion, .. } => {
            assert_eq!(key, "data_dri");
            assert_eq!(suggestion.as_deref(), Some("data_dir"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Semantic validation runs after successful deserialization.
#[test]
fn semantic_validation_catches_bad_values() {
    let toml = r#"
[storage]
flush_interval_secs = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero interval must be rejected");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Wrong value type surfaces as an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[owner]
user_id = "not-a-number"
"#;

    let errors = load_and_validate_str(toml).expect_err("string user_id must be rejected");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "expected an InvalidType diagnostic, got {errors:?}"
    );
}

/// Suggestion engine is exposed for reuse and behaves sensibly.
#[test]
fn suggestion_engine_threshold() {
    assert_eq!(
        suggest_key("flush_interval_sec", &["flush_interval_secs", "data_dir"]),
        Some("flush_interval_secs".to_string())
    );
    assert_eq!(suggest_key("xyzzy", &["data_dir"]), None);
}
