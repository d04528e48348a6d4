//! Serde adapters for the catalog's loosely typed columns.
//!
//! The catalog backend hands back identifiers as numbers or strings, flags as
//! `0`/`1`/`"1"`/`true`, and the season's owning show as the legacy string
//! `["7"]`. Everything is normalized here so the rest of the crate only sees
//! plain Rust types.

use super::EntityId;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::sync::LazyLock;

static SHOW_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\[?\s*"?\s*(\d+)\s*"?\s*\]?\s*$"#).expect("valid regex"));

/// Extracts the show identifier from the legacy `["7"]` reference text.
///
/// Bare `7`, quoted `"7"` and unquoted `[7]` are accepted as well; anything
/// else yields `None`.
pub fn extract_show_id(raw: &str) -> Option<EntityId> {
    SHOW_REF
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map(EntityId)
}

/// Encodes a show identifier the way the catalog stores it: `["7"]`.
pub fn encode_show_ref(id: EntityId) -> String {
    format!("[\"{}\"]", id.0)
}

pub(crate) fn id_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Foreign keys: `null` or an unparseable value reads as `0`, which matches
/// no row.
pub fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(EntityId(id_from_value(&value).unwrap_or_default()))
}

pub fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

pub fn loose_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

pub fn required_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value)
        .map(EntityId)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid identifier: {value}")))
}

/// `0`/`1` on the wire, `bool` in memory.
pub mod flag {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" | "" => false,
                other => other.parse::<f64>().map(|f| f != 0.0).unwrap_or(false),
            },
            _ => false,
        })
    }
}

/// The season's owning show: `["7"]` on the wire, `Option<EntityId>` in memory.
pub mod show_ref {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<EntityId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serialize_id(id, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn serialize_id<S: Serializer>(id: &EntityId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_show_ref(*id))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<EntityId>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().map(EntityId),
            Value::String(s) => extract_show_id(&s),
            Value::Array(items) => items.first().and_then(id_from_value).map(EntityId),
            _ => None,
        })
    }
}

/// MySQL-style `YYYY-MM-DD HH:MM:SS` timestamps; RFC 3339 is read too.
pub mod timestamp {
    use super::*;
    use chrono::{DateTime, NaiveDateTime};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => parse(&s),
            _ => None,
        })
    }

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }
}
