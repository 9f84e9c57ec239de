//! Storage-safe serialization
//!
//! Values JSON cannot express are replaced by reserved string tokens before
//! the container goes through `serde_json`, and recognised again on the way
//! back. A stored string that happens to equal a token deserializes as the
//! token's value.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as Json;

use crate::{CodecError, FunctionSource, Map, RegExp, Value};

pub const UNDEFINED: &str = "::undefined::";
pub const NAN: &str = "::NaN::";
pub const INFINITY: &str = "::Infinity::";
pub const NEG_INFINITY: &str = "::-Infinity::";
pub const EMPTY: &str = "::empty::";
pub const DATE_PREFIX: &str = "::Date::";
pub const REGEXP_PREFIX: &str = "::RegExp::";

const REGEXP_FLAGS: &str = "dgimsuvy";

/// Serialize a value into its storable string form.
///
/// `Null` passes through as `None`.
pub fn serialize(value: &Value) -> Result<Option<String>, CodecError> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::Function(f) => f.source().to_string(),
        Value::Array(_) | Value::Object(_) | Value::Bool(_) | Value::String(_) => {
            serde_json::to_string(&escape(value, "$")?)?
        }
        Value::Number(n) if n.is_finite() => serde_json::to_string(&escape(value, "$")?)?,
        Value::Handle(_) => return Err(CodecError::not_storable("$", value)),
        special => token(special).unwrap_or_default(),
    };
    tracing::trace!("serialized {} into {} byte(s)", value.type_name(), text.len());
    Ok(Some(text))
}

/// Serialize, mapping `Null` to the JSON literal `null`
pub fn to_storage_string(value: &Value) -> Result<String, CodecError> {
    Ok(serialize(value)?.unwrap_or_else(|| "null".to_string()))
}

/// Turn a stored string back into a value.
///
/// Text that is neither a token, a function nor JSON is returned unchanged
/// as a string.
pub fn deserialize(text: &str) -> Value {
    if let Some(value) = parse_token(text) {
        return value;
    }
    if let Some(function) = FunctionSource::parse(text) {
        return Value::Function(function);
    }
    match serde_json::from_str::<Json>(text) {
        Ok(json) => unescape(json),
        Err(_) => Value::String(text.to_string()),
    }
}

/// Counterpart of [`serialize`] that accepts the `None` it produces for `Null`
pub fn deserialize_opt(text: Option<&str>) -> Value {
    text.map(deserialize).unwrap_or(Value::Null)
}

/// Token form of a value that JSON cannot express
fn token(value: &Value) -> Option<String> {
    match value {
        Value::Undefined => Some(UNDEFINED.to_string()),
        Value::Empty => Some(EMPTY.to_string()),
        Value::Number(n) if n.is_nan() => Some(NAN.to_string()),
        Value::Number(n) if n.is_infinite() && *n > 0.0 => Some(INFINITY.to_string()),
        Value::Number(n) if n.is_infinite() => Some(NEG_INFINITY.to_string()),
        Value::Date(date) => Some(format!(
            "{DATE_PREFIX}{}",
            date.to_rfc3339_opts(SecondsFormat::Millis, true)
        )),
        Value::RegExp(re) => Some(format!("{REGEXP_PREFIX}{}/{}", re.source, re.flags)),
        Value::Function(f) => Some(f.source().to_string()),
        _ => None,
    }
}

/// Deep-escaped JSON clone of a value
fn escape(value: &Value, path: &str) -> Result<Json, CodecError> {
    if let Some(token) = token(value) {
        return Ok(Json::String(token));
    }
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => number(*n),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| escape(item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, item) in map.iter() {
                out.insert(key.to_string(), escape(item, &format!("{path}.{key}"))?);
            }
            Json::Object(out)
        }
        Value::Handle(_) => return Err(CodecError::not_storable(path, value)),
        // Every other variant has a token
        _ => Json::Null,
    })
}

/// Integral numbers print without a fraction, like JavaScript
fn number(n: f64) -> Json {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

/// Recognise a reserved token or prefixed payload
fn parse_token(text: &str) -> Option<Value> {
    match text {
        UNDEFINED => return Some(Value::Undefined),
        NAN => return Some(Value::Number(f64::NAN)),
        INFINITY => return Some(Value::Number(f64::INFINITY)),
        NEG_INFINITY => return Some(Value::Number(f64::NEG_INFINITY)),
        EMPTY => return Some(Value::Empty),
        _ => {}
    }
    if let Some(iso) = text.strip_prefix(DATE_PREFIX) {
        return DateTime::parse_from_rfc3339(iso)
            .ok()
            .map(|d| Value::Date(d.with_timezone(&Utc)));
    }
    if let Some(body) = text.strip_prefix(REGEXP_PREFIX) {
        let (source, flags) = body.rsplit_once('/')?;
        if flags.chars().all(|c| REGEXP_FLAGS.contains(c)) {
            return Some(Value::RegExp(RegExp::new(source, flags)));
        }
    }
    None
}

fn unescape(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => parse_token(&s)
            .or_else(|| FunctionSource::parse(&s).map(Value::Function))
            .unwrap_or(Value::String(s)),
        Json::Array(items) => Value::Array(items.into_iter().map(unescape).collect()),
        Json::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k, unescape(v)))
                .collect::<Map>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ser(value: &Value) -> String {
        serialize(value).unwrap().unwrap()
    }

    #[test]
    fn test_special_tokens() {
        assert_eq!(ser(&Value::Undefined), "::undefined::");
        assert_eq!(ser(&Value::Number(f64::NAN)), "::NaN::");
        assert_eq!(ser(&Value::Number(f64::INFINITY)), "::Infinity::");
        assert_eq!(ser(&Value::Number(f64::NEG_INFINITY)), "::-Infinity::");
        assert_eq!(ser(&Value::Empty), "::empty::");
    }

    #[test]
    fn test_null_passes_through() {
        assert_eq!(serialize(&Value::Null).unwrap(), None);
        assert_eq!(deserialize_opt(None), Value::Null);
        assert_eq!(to_storage_string(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn test_date_and_regexp_forms() {
        let date = Value::date_from_millis(1_704_164_645_678).unwrap();
        assert_eq!(ser(&date), "::Date::2024-01-02T03:04:05.678Z");
        assert_eq!(deserialize("::Date::2024-01-02T03:04:05.678Z"), date);

        let re = Value::RegExp(RegExp::new("a/b+c", "gi"));
        assert_eq!(ser(&re), "::RegExp::a/b+c/gi");
        assert_eq!(deserialize("::RegExp::a/b+c/gi"), re);
    }

    #[test]
    fn test_plain_json() {
        assert_eq!(ser(&Value::from(42)), "42");
        assert_eq!(ser(&Value::from(1.5)), "1.5");
        assert_eq!(ser(&Value::from("hi")), "\"hi\"");
        assert_eq!(ser(&Value::from(true)), "true");
    }

    #[test]
    fn test_nested_escapes() {
        let value = Value::Array(vec![
            Value::from(1),
            Value::Empty,
            Value::Undefined,
            Value::Null,
            Value::Number(f64::NAN),
        ]);
        assert_eq!(ser(&value), r#"[1,"::empty::","::undefined::",null,"::NaN::"]"#);
    }

    #[test]
    fn test_not_json_is_returned_unchanged() {
        assert_eq!(deserialize("hello world"), Value::from("hello world"));
        assert_eq!(deserialize("::Date::not a date"), Value::from("::Date::not a date"));
        assert_eq!(deserialize("::RegExp::abc/xyz"), Value::from("::RegExp::abc/xyz"));
    }

    #[test]
    fn test_handle_is_not_storable() {
        let value = Value::Object([("child", Value::Handle(crate::Handle(7)))].into_iter().collect());
        let err = serialize(&value).unwrap_err();
        assert!(matches!(err, CodecError::NotStorable { ref path, .. } if path == "$.child"));
    }
}
