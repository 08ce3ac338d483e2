//! # YAML to JSON Conversion
//!
//! Structural validation runs on JSON values, so every parsed YAML
//! document is converted first. The conversion is where the dialect
//! revision takes effect: under YAML 1.1, unquoted `yes`/`no`/`on`/`off`
//! scalars become booleans; under 1.2 they remain strings.
//!
//! `serde_yaml` does not report whether a string scalar was quoted, so the
//! caller supplies a predicate answering that question by JSON pointer
//! from the source outline.

use serde_json::Value;
use yedit_core::DialectVersion;

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// `is_plain(pointer)` must return true when the scalar at `pointer` was
/// written unquoted. It is only consulted for YAML 1.1 boolean spellings.
pub fn yaml_to_json_value(
    yaml: &serde_yaml::Value,
    dialect: DialectVersion,
    is_plain: &dyn Fn(&str) -> bool,
) -> Result<Value, String> {
    convert(yaml, dialect, is_plain, &mut String::new())
}

/// Convert with YAML 1.2 rules, where no predicate is needed.
pub fn yaml_to_json_value_1_2(yaml: &serde_yaml::Value) -> Result<Value, String> {
    yaml_to_json_value(yaml, DialectVersion::V1_2, &|_: &str| false)
}

fn convert(
    yaml: &serde_yaml::Value,
    dialect: DialectVersion,
    is_plain: &dyn Fn(&str) -> bool,
    pointer: &mut String,
) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => match dialect.extra_boolean(s) {
            Some(b) if is_plain(pointer) => Ok(Value::Bool(b)),
            _ => Ok(Value::String(s.clone())),
        },
        serde_yaml::Value::Sequence(seq) => {
            let mut items = Vec::with_capacity(seq.len());
            for (idx, item) in seq.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&idx.to_string());
                items.push(convert(item, dialect, is_plain, pointer)?);
                pointer.truncate(len);
            }
            Ok(Value::Array(items))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&escape_pointer_segment(&key));
                let value = convert(v, dialect, is_plain, pointer)?;
                pointer.truncate(len);
                json_map.insert(key, value);
            }
            Ok(Value::Object(json_map))
        }
        // Tags carry no meaning for structural validation.
        serde_yaml::Value::Tagged(tagged) => convert(&tagged.value, dialect, is_plain, pointer),
    }
}

/// Escape one JSON pointer segment (RFC 6901).
pub fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Unescape one JSON pointer segment (RFC 6901).
pub fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
