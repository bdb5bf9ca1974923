//! The shared policy-document shape.
//!
//! IAM, bucket, and endpoint policies all carry the same statement
//! structure; `Action`/`Resource` accept both a single string and an
//! array, as the source documents do.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default)]
    pub version: Option<String>,
    #[serde(rename = "Statement", deserialize_with = "one_or_many")]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Statement {
    #[serde(rename = "Sid", default)]
    pub sid: Option<String>,
    #[serde(rename = "Effect")]
    pub effect: String,
    #[serde(rename = "Principal", default)]
    pub principal: Option<Value>,
    #[serde(rename = "Action", default, deserialize_with = "one_or_many")]
    pub actions: Vec<String>,
    #[serde(rename = "Resource", default, deserialize_with = "one_or_many")]
    pub resources: Vec<String>,
    #[serde(rename = "Condition", default)]
    pub condition: Option<Value>,
}

impl Statement {
    pub fn is_allow(&self) -> bool {
        self.effect.eq_ignore_ascii_case("allow")
    }

    /// True when the principal is the `"*"` or `{"AWS": "*"}` wildcard.
    pub fn has_wildcard_principal(&self) -> bool {
        match &self.principal {
            Some(Value::String(s)) => s == "*",
            Some(Value::Object(map)) => map.values().any(|v| match v {
                Value::String(s) => s == "*",
                Value::Array(items) => items.iter().any(|i| i == "*"),
                _ => false,
            }),
            _ => false,
        }
    }
}

impl PolicyDocument {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Accept `"x"` or `["x", "y"]`.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(v) => vec![v],
        OneOrMany::Many(v) => v,
    })
}
