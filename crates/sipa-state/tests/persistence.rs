//! File-backed storage tests for sipa-state

use std::fs;
use std::path::PathBuf;

use sipa_codec::{Handle, RegExp, Value};
use sipa_state::{StateError, Storage};

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sipa-state-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = fs::remove_file(&path);
    path
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_values_survive_reload() {
    let path = temp_file("reload.json");
    let date = Value::date_from_millis(1_704_164_645_678).unwrap();
    let pattern = Value::RegExp(RegExp::new("^a+$", "i"));

    {
        let mut storage = Storage::local(&path).unwrap();
        storage.set("when", &date).unwrap();
        storage.set("pattern", &pattern).unwrap();
        storage.set("count", &Value::from(3)).unwrap();
    }

    let storage = Storage::local(&path).unwrap();
    assert_eq!(storage.len(), 3);
    assert_eq!(storage.get("when"), Some(date));
    assert_eq!(storage.get("pattern"), Some(pattern));
    assert_eq!(storage.get("count"), Some(Value::from(3)));
}

#[test]
fn test_file_is_json_object_of_strings() {
    let path = temp_file("format.json");
    let mut storage = Storage::local(&path).unwrap();
    storage.set("limit", &Value::Number(f64::INFINITY)).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["limit"], serde_json::Value::String("::Infinity::".to_string()));
}

#[test]
fn test_missing_file_starts_empty() {
    let path = temp_file("missing.json");
    let storage = Storage::local(&path).unwrap();
    assert!(storage.is_empty());
    assert!(!path.exists());
    assert_eq!(storage.path(), Some(path.as_path()));
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_malformed_file_is_an_error() {
    let path = temp_file("broken.json");
    fs::write(&path, "key\tvalue").unwrap();
    assert!(matches!(Storage::local(&path), Err(StateError::Format { .. })));
}

#[test]
fn test_handles_are_not_storable() {
    let mut storage = Storage::session();
    let err = storage.set("child", &Value::Handle(Handle(1))).unwrap_err();
    assert!(matches!(err, StateError::Codec(_)));
    assert!(storage.is_empty());
}
