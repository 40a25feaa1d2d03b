//! Options serialization, enabled with the `serde` feature.

#![cfg(feature = "serde")]

use oxilzp::{LzpConfig, Options, PpmConfig};

#[test]
fn test_options_json_roundtrip() {
    let options = Options::new(
        LzpConfig::new(3, 18),
        LzpConfig::new(7, 21),
        PpmConfig::new(1, 4, 32, 12000),
    )
    .unwrap();

    let json = serde_json::to_string(&options).unwrap();
    assert!(json.contains("\"context_length\":3"));
    assert!(json.contains("\"limit\":12000"));

    let parsed: Options = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, options);
}

#[test]
fn test_default_options_json() {
    let json = serde_json::to_value(Options::default()).unwrap();
    assert_eq!(json["low"]["mask_size"], 24);
    assert_eq!(json["high"]["context_length"], 8);
    assert_eq!(json["ppm"]["order"], 2);
}

#[test]
fn test_invalid_options_rejected() {
    // High context shorter than low.
    let json = r#"{
        "low": {"context_length": 6, "mask_size": 20},
        "high": {"context_length": 4, "mask_size": 22},
        "ppm": {"order": 2, "init": 1, "step": 60, "limit": 30000}
    }"#;
    let err = serde_json::from_str::<Options>(json).unwrap_err();
    assert!(err.to_string().contains("context lengths"));

    // Limit below init * 256.
    let json = r#"{
        "low": {"context_length": 4, "mask_size": 20},
        "high": {"context_length": 8, "mask_size": 22},
        "ppm": {"order": 2, "init": 10, "step": 60, "limit": 100}
    }"#;
    assert!(serde_json::from_str::<Options>(json).is_err());
}

#[test]
fn test_missing_field_rejected() {
    let json = r#"{"low": {"context_length": 4, "mask_size": 20}}"#;
    assert!(serde_json::from_str::<Options>(json).is_err());
}
