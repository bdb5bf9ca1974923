//! Structural validation of parsed payloads.
//!
//! # Responsibilities
//! - Cheap structural DoS guards that run before the parser allocates
//! - Recursive walk of parsed JSON values: operator keys, string leaves,
//!   wildcard values
//!
//! # Design Decisions
//! - The pre-guard is a single byte scan with a fixed-size depth stack;
//!   no allocation happens before the payload passes it
//! - Values are walked as an explicit tagged union (`serde_json::Value`),
//!   not via runtime type dispatch
//! - `$`-prefixed object keys are rejected outright: the wrapped API has
//!   no legitimate operator-key vocabulary

use serde_json::Value;

use super::{Category, InjectionEngine, InjectionMatch};

/// Ceilings applied before parsing.
#[derive(Debug, Clone, Copy)]
pub struct StructuralLimits {
    /// Maximum raw body size in bytes.
    pub max_bytes: usize,
    /// Maximum brace/bracket nesting depth.
    pub max_depth: usize,
    /// Maximum number of elements in any single array.
    pub max_array_elements: usize,
}

impl Default for StructuralLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_depth: 100,
            max_array_elements: 10_000,
        }
    }
}

/// Why a structured payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredViolation {
    /// Raw body exceeds the size ceiling.
    TooLarge { bytes: usize },
    /// Nesting deeper than the ceiling.
    TooDeep { depth: usize },
    /// A single array with more elements than the ceiling.
    ArrayTooLong { elements: usize },
    /// An object key carrying an operator sigil.
    OperatorKey { key: String },
    /// A trailing-wildcard string value (directory/LDAP wildcard risk).
    WildcardValue { key: String },
    /// A signature hit inside a key or string leaf.
    Signature(InjectionMatch),
}

impl StructuredViolation {
    /// The error code carried by the rejection body and audit event.
    pub fn code(&self) -> &'static str {
        match self {
            StructuredViolation::TooLarge { .. } => "payload_too_large",
            StructuredViolation::TooDeep { .. } => "nesting_too_deep",
            StructuredViolation::ArrayTooLong { .. } => "array_too_long",
            StructuredViolation::OperatorKey { .. } => Category::Nosql.as_str(),
            StructuredViolation::WildcardValue { .. } => Category::Ldap.as_str(),
            StructuredViolation::Signature(m) => m.category.as_str(),
        }
    }
}

// Depth stack entry counts elements of the array open at that depth.
// Objects use the same slot with counting disabled.
const DEPTH_STACK: usize = 128;

/// Allocation-free structural guard over the raw bytes. Runs before the
/// payload is handed to the JSON parser.
pub fn precheck(raw: &[u8], limits: &StructuralLimits) -> Result<(), StructuredViolation> {
    if raw.len() > limits.max_bytes {
        return Err(StructuredViolation::TooLarge { bytes: raw.len() });
    }

    let mut depth = 0usize;
    let mut counts = [0u32; DEPTH_STACK];
    let mut is_array = [false; DEPTH_STACK];
    let mut in_string = false;
    let mut escaped = false;

    for &b in raw {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limits.max_depth || depth >= DEPTH_STACK {
                    return Err(StructuredViolation::TooDeep { depth });
                }
                is_array[depth] = b == b'[';
                counts[depth] = 0;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
            }
            b',' => {
                if depth > 0 && is_array[depth] {
                    counts[depth] += 1;
                    // commas = elements - 1
                    if counts[depth] as usize >= limits.max_array_elements {
                        return Err(StructuredViolation::ArrayTooLong {
                            elements: counts[depth] as usize + 1,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Recursive walk over a parsed value. Object keys with an operator sigil
/// reject outright; keys and string leaves run through the signature
/// engine; trailing-wildcard strings are flagged.
pub fn validate_value(engine: &InjectionEngine, value: &Value) -> Result<(), StructuredViolation> {
    walk(engine, None, value)
}

fn walk(
    engine: &InjectionEngine,
    key: Option<&str>,
    value: &Value,
) -> Result<(), StructuredViolation> {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k.starts_with('$') {
                    return Err(StructuredViolation::OperatorKey { key: k.clone() });
                }
                if let Some(m) = engine.first_match(k) {
                    return Err(StructuredViolation::Signature(m));
                }
                walk(engine, Some(k.as_str()), v)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                walk(engine, key, item)?;
            }
            Ok(())
        }
        Value::String(s) => {
            if let Some(m) = engine.first_match(s) {
                return Err(StructuredViolation::Signature(m));
            }
            if s.len() > 1 && s.ends_with('*') {
                return Err(StructuredViolation::WildcardValue {
                    key: key.unwrap_or("<root>").to_string(),
                });
            }
            Ok(())
        }
        // Numbers, booleans, and null carry no injectable text.
        Value::Number(_) | Value::Bool(_) | Value::Null => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> InjectionEngine {
        InjectionEngine::new()
    }

    #[test]
    fn precheck_rejects_oversized_body() {
        let limits = StructuralLimits {
            max_bytes: 16,
            ..Default::default()
        };
        let err = precheck(&[b'a'; 17], &limits).unwrap_err();
        assert!(matches!(err, StructuredViolation::TooLarge { bytes: 17 }));
    }

    #[test]
    fn precheck_rejects_deep_nesting() {
        let mut payload = Vec::new();
        payload.extend(std::iter::repeat(b'[').take(150));
        let err = precheck(&payload, &StructuralLimits::default()).unwrap_err();
        assert!(matches!(err, StructuredViolation::TooDeep { .. }));
    }

    #[test]
    fn precheck_rejects_huge_array() {
        let limits = StructuralLimits {
            max_array_elements: 10,
            ..Default::default()
        };
        let payload = format!("[{}]", vec!["1"; 50].join(","));
        let err = precheck(payload.as_bytes(), &limits).unwrap_err();
        assert!(matches!(err, StructuredViolation::ArrayTooLong { .. }));
    }

    #[test]
    fn precheck_ignores_braces_inside_strings() {
        let payload = br#"{"note": "lots of {{{{ and [[[[ inside a string"}"#;
        assert!(precheck(payload, &StructuralLimits::default()).is_ok());
    }

    #[test]
    fn precheck_accepts_normal_document() {
        let payload = br#"{"parser_id": "rust-v2", "args": [1, 2, 3]}"#;
        assert!(precheck(payload, &StructuralLimits::default()).is_ok());
    }

    #[test]
    fn rejects_operator_keys() {
        let value = json!({"filter": {"$where": "this.a == 1"}});
        let err = validate_value(&engine(), &value).unwrap_err();
        assert!(matches!(err, StructuredViolation::OperatorKey { .. }));
    }

    #[test]
    fn rejects_injection_in_string_leaf() {
        let value = json!({"parser_id": "' OR '1'='1"});
        let err = validate_value(&engine(), &value).unwrap_err();
        assert_eq!(err.code(), "sql_injection");
    }

    #[test]
    fn rejects_injection_in_nested_array() {
        let value = json!({"steps": [["echo ok"], ["x; rm -rf /"]]});
        let err = validate_value(&engine(), &value).unwrap_err();
        assert!(matches!(err, StructuredViolation::Signature(_)));
    }

    #[test]
    fn flags_trailing_wildcard() {
        let value = json!({"artifact": "builds/release-*"});
        let err = validate_value(&engine(), &value).unwrap_err();
        assert!(matches!(err, StructuredViolation::WildcardValue { .. }));
    }

    #[test]
    fn accepts_clean_document() {
        let value = json!({
            "parser_id": "rust-v2",
            "replicas": 3,
            "cached": true,
            "env": {"RUST_LOG": "info"}
        });
        assert!(validate_value(&engine(), &value).is_ok());
    }
}
