//! Serde helpers for Splunk's inconsistent JSON typing.
//!
//! Responsibilities:
//! - Provide deserializers that accept either JSON numbers or strings for numeric fields.
//! - Accept the several shapes Splunk uses for booleans and job messages.
//!
//! Explicitly does NOT handle:
//! - Validating higher-level semantics (ranges, required/optional business rules).
//!
//! Invariants / assumptions:
//! - Splunk may return numeric fields as `"123"` strings or as `123` numbers depending on endpoint/version.
//! - These helpers must not log or print secrets; errors should be generic parse errors.

use serde::Deserialize;
use serde::de::Error as _;
use std::collections::BTreeMap;

use crate::models::{MessageType, SplunkMessage};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum U64OrString {
    U64(u64),
    I64(i64),
    String(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    U64(u64),
    I64(i64),
    F64(f64),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    U64(u64),
    String(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessagesShape {
    List(Vec<SplunkMessage>),
    ByType(BTreeMap<String, Vec<String>>),
}

pub fn usize_from_string_or_number<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = U64OrString::deserialize(deserializer)?;
    match value {
        U64OrString::U64(v) => usize::try_from(v).map_err(D::Error::custom),
        U64OrString::I64(v) => usize::try_from(v).map_err(D::Error::custom),
        U64OrString::String(s) => s.trim().parse::<usize>().map_err(D::Error::custom),
    }
}

pub fn f64_from_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = StringOrNumber::deserialize(deserializer)?;
    match value {
        StringOrNumber::String(s) => s.trim().parse::<f64>().map_err(D::Error::custom),
        StringOrNumber::U64(v) => Ok(v as f64),
        StringOrNumber::I64(v) => Ok(v as f64),
        StringOrNumber::F64(v) => Ok(v),
    }
}

/// Accepts `true`/`false`, `0`/`1`, and their string forms.
pub fn bool_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match BoolLike::deserialize(deserializer)? {
        BoolLike::Bool(b) => Ok(b),
        BoolLike::U64(n) => Ok(n != 0),
        BoolLike::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "t" => Ok(true),
            "0" | "false" | "f" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid boolean value '{other}'"))),
        },
    }
}

/// Job messages arrive either as `[{"type": .., "text": ..}]` or as
/// `{"error": ["..."], "warn": ["..."]}`; both become a flat list.
pub fn messages_from_list_or_map<'de, D>(deserializer: D) -> Result<Vec<SplunkMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<MessagesShape>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(MessagesShape::List(list)) => list,
        Some(MessagesShape::ByType(map)) => map
            .into_iter()
            .flat_map(|(kind, texts)| {
                let message_type = MessageType::from_label(&kind);
                texts.into_iter().map(move |text| SplunkMessage {
                    message_type,
                    text,
                })
            })
            .collect(),
    })
}
