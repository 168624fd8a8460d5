//! Tests for rglookup-core: kinds, requests, errors, payloads, config

use rglookup_core::*;
use std::io::Write;

// ===========================================================================
// EntityKind / IdentifierKind
// ===========================================================================

#[test]
fn entity_kind_labels_round_trip() {
    for kind in EntityKind::ALL {
        assert_eq!(EntityKind::from_label(kind.label()), Some(kind));
        assert_eq!(kind.to_string(), kind.label());
    }
    assert_eq!(EntityKind::from_label("person"), None);
    assert_eq!(EntityKind::from_label("Publication"), None);
}

#[test]
fn identifier_kind_properties() {
    assert_eq!(IdentifierKind::Doi.property(), "doi");
    assert_eq!(IdentifierKind::Purl.property(), "purl");
    assert_eq!(IdentifierKind::Orcid.property(), "orcid");
    assert_eq!(IdentifierKind::from_property("orcid"), Some(IdentifierKind::Orcid));
    assert_eq!(IdentifierKind::from_property("isbn"), None);
    assert_eq!(IdentifierKind::Doi.display_name(), "DOI");
}

#[test]
fn kinds_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&EntityKind::Researcher).unwrap(), r#""researcher""#);
    assert_eq!(serde_json::to_string(&IdentifierKind::Purl).unwrap(), r#""purl""#);
}

#[test]
fn lookup_requests_get_distinct_ids() {
    let a = LookupRequest::new(EntityKind::Grant, IdentifierKind::Purl, "http://example.org/g1");
    let b = LookupRequest::new(EntityKind::Grant, IdentifierKind::Purl, "http://example.org/g1");
    assert_ne!(a.id, b.id);
    assert_eq!(a.raw_value, "http://example.org/g1");
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_codes_and_client_classification() {
    let invalid = Error::invalid_format("DOI contains invalid symbols");
    assert_eq!(invalid.code(), "Neo.ClientError.Request.InvalidFormat");
    assert!(invalid.is_client_error());
    assert_eq!(invalid.to_string(), "invalid identifier: DOI contains invalid symbols");

    let kind = Error::not_found_kind("grant", "doi");
    assert!(kind.code().ends_with("NotFoundKind"));
    assert!(kind.is_client_error());
    assert_eq!(kind.to_string(), "no lookup for grant by doi");

    let integrity = Error::data_integrity("k1", "title");
    assert!(!integrity.is_client_error());
    assert_eq!(integrity.to_string(), "entity k1 is missing property `title`");

    let timeout = Error::timeout("query", std::time::Duration::from_millis(250));
    assert_eq!(timeout.to_string(), "query timed out after 250ms");
    assert!(timeout.code().ends_with("Timeout"));
}

#[test]
fn error_from_io() {
    let err: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
    assert!(matches!(err, Error::IoError(_)));
}

// ===========================================================================
// Payloads
// ===========================================================================

#[test]
fn error_response_shape() {
    let body = ErrorResponse::from(&Error::invalid_format("DOI contains invalid symbols"));
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["message"], "invalid identifier: DOI contains invalid symbols");
    assert_eq!(json["errors"][0]["code"], "Neo.ClientError.Request.InvalidFormat");
    assert_eq!(json["errors"][0]["message"], json["message"]);
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_defaults() {
    let config = LookupConfig::default();
    assert_eq!(config.gateway.port, 8474);
    assert_eq!(config.gateway.bind, BindMode::Loopback);
    assert_eq!(config.limits.query_timeout().as_millis(), 10_000);
    assert_eq!(config.limits.write_timeout().as_millis(), 30_000);
    assert_eq!(config.limits.max_identifier_len, 512);
    assert!(config.store.seed_path.is_none());
}

#[test]
fn config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = LookupConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.gateway.port, 8474);
}

#[test]
fn config_partial_file_keeps_other_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[gateway]\nport = 9000\nbind = \"lan\"\n\n[limits]\nquery_timeout_ms = 500").unwrap();
    let config = LookupConfig::load(file.path()).unwrap();
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.bind, BindMode::Lan);
    assert_eq!(config.limits.query_timeout_ms, 500);
    assert_eq!(config.limits.write_timeout_ms, 30_000);
}

#[test]
fn config_malformed_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[gateway\nport = ").unwrap();
    assert!(matches!(LookupConfig::load(file.path()), Err(Error::ConfigError(_))));
}

#[test]
fn config_env_overrides() {
    let mut config = LookupConfig::default();
    config
        .apply_env_from(|key| match key {
            "RGLOOKUP_PORT" => Some("9100".into()),
            "RGLOOKUP_BIND" => Some("0.0.0.0".into()),
            "RGLOOKUP_SEED" => Some("/data/seed.json".into()),
            _ => None,
        })
        .unwrap();
    assert_eq!(config.gateway.port, 9100);
    assert_eq!(config.gateway.bind, BindMode::Lan);
    assert_eq!(config.store.seed_path.as_deref(), Some(std::path::Path::new("/data/seed.json")));

    let bad = config.apply_env_from(|key| (key == "RGLOOKUP_PORT").then(|| "http".to_string()));
    assert!(matches!(bad, Err(Error::ConfigError(_))));
}

#[test]
fn config_toml_round_trip() {
    let mut config = LookupConfig::default();
    config.gateway.port = 1234;
    let text = config.to_toml();
    let back: LookupConfig = toml::from_str(&text).unwrap();
    assert_eq!(back.gateway.port, 1234);
}
