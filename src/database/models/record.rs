use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::database::object_id::ObjectId;

/// A stored demographic survey entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: RecordFields,
}

/// Record contents as persisted. `age` is `None` when the supplied value was
/// absent or could not be read as an integer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordFields {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub sex: Option<String>,
    pub address: Option<String>,
    pub part_no: Option<String>,
    pub society: Option<String>,
    pub caste: Option<String>,
}

/// Store-ready partial update. The outer `Option` tracks presence in the
/// request; `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<Option<String>>,
    pub age: Option<Option<i32>>,
    pub sex: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub part_no: Option<Option<String>>,
    pub society: Option<Option<String>>,
    pub caste: Option<Option<String>>,
}

/// Create-record request body. String fields tolerate numbers and booleans.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordInput {
    #[serde(default, deserialize_with = "loose_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default, deserialize_with = "loose_string")]
    pub sex: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub part_no: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub society: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub caste: Option<String>,
}

/// Update-record request body with per-field presence tracking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPatchInput {
    #[serde(default, deserialize_with = "present_loose_string")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_value")]
    pub age: Option<Value>,
    #[serde(default, deserialize_with = "present_loose_string")]
    pub sex: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_loose_string")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_loose_string")]
    pub part_no: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_loose_string")]
    pub society: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_loose_string")]
    pub caste: Option<Option<String>>,
}

impl From<RecordInput> for RecordFields {
    fn from(input: RecordInput) -> Self {
        Self {
            name: input.name,
            age: input.age.as_ref().and_then(coerce_age),
            sex: input.sex,
            address: input.address,
            part_no: input.part_no,
            society: input.society,
            caste: input.caste,
        }
    }
}

impl From<RecordPatchInput> for RecordPatch {
    fn from(input: RecordPatchInput) -> Self {
        Self {
            name: input.name,
            age: input.age.as_ref().map(coerce_age),
            sex: input.sex,
            address: input.address,
            part_no: input.part_no,
            society: input.society,
            caste: input.caste,
        }
    }
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.sex.is_none()
            && self.address.is_none()
            && self.part_no.is_none()
            && self.society.is_none()
            && self.caste.is_none()
    }

    /// Overwrite only the fields present in the patch.
    pub fn apply(&self, fields: &mut RecordFields) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<Option<T>>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut fields.name, &self.name);
        set(&mut fields.age, &self.age);
        set(&mut fields.sex, &self.sex);
        set(&mut fields.address, &self.address);
        set(&mut fields.part_no, &self.part_no);
        set(&mut fields.society, &self.society);
        set(&mut fields.caste, &self.caste);
    }
}

/// Read an age as an integer.
///
/// Integers pass through, finite floats truncate toward zero and strings
/// yield their leading integer (`"42 yrs"` -> 42). Anything else, including
/// values outside the `i32` range, is `None` rather than zero.
pub fn coerce_age(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).ok(),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(f64::trunc)
                .filter(|f| *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                .map(|f| f as i32),
        },
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..end].parse().ok()?;
    i32::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn value_to_string<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(E::custom(format!("expected a string, got {}", other))),
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_string(Value::deserialize(deserializer)?)
}

fn present_loose_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_string(Value::deserialize(deserializer)?).map(Some)
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
