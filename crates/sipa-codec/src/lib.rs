//! Sipa Codec
//!
//! Value model for component data and a serializer that round-trips values
//! JSON cannot express (`undefined`, `NaN`, `±Infinity`, dates, regular
//! expressions, functions, sparse array slots) through plain strings.
//!
//! | Value | Serialized form |
//! |---|---|
//! | `undefined` | `::undefined::` |
//! | `NaN` | `::NaN::` |
//! | `Infinity` / `-Infinity` | `::Infinity::` / `::-Infinity::` |
//! | sparse array slot | `::empty::` |
//! | date | `::Date::<ISO8601>` |
//! | regular expression | `::RegExp::<source>/<flags>` |
//! | function | its source text |
//! | anything else | JSON, with the above applied to nested values |
//!
//! # Example
//! ```rust
//! use sipa_codec::{deserialize, serialize, Value};
//!
//! let value = Value::Array(vec![Value::Undefined, Value::Number(f64::NAN)]);
//! let stored = serialize(&value).unwrap().unwrap();
//! assert_eq!(stored, r#"["::undefined::","::NaN::"]"#);
//! assert_eq!(deserialize(&stored), value);
//! ```

mod value;
mod function;
mod serializer;
mod literal;
#[cfg(feature = "trusted-eval")]
mod eval;

pub use value::{Handle, Map, RegExp, Value};
pub use function::{detect as detect_function, is_function_source, FunctionKind, FunctionSource};
pub use serializer::{
    deserialize, deserialize_opt, serialize, to_storage_string, DATE_PREFIX, EMPTY, INFINITY, NAN,
    NEG_INFINITY, REGEXP_PREFIX, UNDEFINED,
};
pub use literal::{parse_literal, try_parse_literal, LiteralParser};

/// Codec errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("references are not storable at this level: {kind} at {path}")]
    NotStorable { path: String, kind: &'static str },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid literal at byte {pos}: {message}")]
    Literal { pos: usize, message: String },

    #[error("function evaluation failed: {0}")]
    Eval(String),
}

impl CodecError {
    pub(crate) fn not_storable(path: &str, value: &Value) -> Self {
        Self::NotStorable {
            path: path.to_string(),
            kind: value.type_name(),
        }
    }
}
