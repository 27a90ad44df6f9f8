//! Badge records returned by the Badgr API.
//!
//! The API sends camelCase objects. A `Badge` pulls the fields every badge
//! carries into typed members and keeps the full attribute map, so any field
//! (including ones this crate does not model) can be read by its original
//! key or by its snake_case name.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::api::{BadgrError, Result};
use crate::utils::format::{parse_timestamp, to_snake_case};

/// Public page for an awarded assertion.
const PUBLIC_ASSERTION_URL: &str = "https://badgr.io/public/assertions";

/// Fields the server includes on every badge object.
pub const REQUIRED_ATTRIBUTES: [&str; 10] = [
    "entity_id",
    "expires",
    "entity_type",
    "extensions",
    "open_badge_id",
    "created_by",
    "issuer",
    "image",
    "issuer_open_badge_id",
    "created_at",
];

/// Required fields that only count as present when they hold a string.
const REQUIRED_STRINGS: [&str; 5] = [
    "entity_id",
    "entity_type",
    "open_badge_id",
    "issuer",
    "issuer_open_badge_id",
];

/// `createdAt` as sent by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatedAt {
    Timestamp(DateTime<Utc>),
    /// Non-string value, kept untouched
    Raw(Value),
}

impl CreatedAt {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => parse_timestamp(s).map(CreatedAt::Timestamp).ok_or_else(|| {
                BadgrError::ProtocolViolation(format!("Unrecognized createdAt timestamp: {}", s))
            }),
            other => Ok(CreatedAt::Raw(other.clone())),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            CreatedAt::Timestamp(ts) => Some(*ts),
            CreatedAt::Raw(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub entity_id: String,
    pub entity_type: String,
    pub open_badge_id: String,
    pub created_at: CreatedAt,
    pub created_by: Option<String>,
    pub issuer: String,
    pub issuer_open_badge_id: String,
    pub image: Option<String>,
    /// Either a timestamp or an `{amount, duration}` object; kept opaque.
    pub expires: Option<Value>,
    pub extensions: Value,
    pub name: Option<String>,
    pub description: Option<String>,
    pub criteria_url: Option<String>,
    pub criteria_narrative: Option<String>,
    pub tags: Vec<String>,
    pub alignments: Vec<Value>,
    attributes: Map<String, Value>,
}

impl Badge {
    /// Build a badge from the attribute map of one API object.
    pub fn from_attributes(attributes: Map<String, Value>) -> Result<Self> {
        let missing: Vec<String> = REQUIRED_ATTRIBUTES
            .iter()
            .filter(|name| match lookup(&attributes, name) {
                None => true,
                Some(value) => REQUIRED_STRINGS.contains(*name) && !value.is_string(),
            })
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BadgrError::RequiredAttributesMissing(missing));
        }

        let required = |name: &str| lookup(&attributes, name).unwrap_or(&Value::Null);
        let required_string = |name: &str| required(name).as_str().unwrap_or_default().to_string();

        Ok(Self {
            entity_id: required_string("entity_id"),
            entity_type: required_string("entity_type"),
            open_badge_id: required_string("open_badge_id"),
            created_at: CreatedAt::from_value(required("created_at"))?,
            created_by: optional_string(Some(required("created_by"))),
            issuer: required_string("issuer"),
            issuer_open_badge_id: required_string("issuer_open_badge_id"),
            image: optional_string(Some(required("image"))),
            expires: match required("expires") {
                Value::Null => None,
                other => Some(other.clone()),
            },
            extensions: required("extensions").clone(),
            name: optional_string(lookup(&attributes, "name")),
            description: optional_string(lookup(&attributes, "description")),
            criteria_url: optional_string(lookup(&attributes, "criteria_url")),
            criteria_narrative: optional_string(lookup(&attributes, "criteria_narrative")),
            tags: lookup(&attributes, "tags")
                .and_then(Value::as_array)
                .map(|tags| tags.iter().filter_map(|t| t.as_str().map(String::from)).collect())
                .unwrap_or_default(),
            alignments: lookup(&attributes, "alignments")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            attributes,
        })
    }

    /// Build a badge from a JSON value that must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(attributes) => Self::from_attributes(attributes),
            other => Err(BadgrError::ProtocolViolation(format!(
                "Expected a badge object, got {}",
                other
            ))),
        }
    }

    /// Look up any attribute by its original key or its snake_case name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .get(key)
            .or_else(|| lookup(&self.attributes, &to_snake_case(key)))
    }

    /// Attributes that have no typed member, keyed by snake_case name.
    pub fn extras(&self) -> impl Iterator<Item = (String, &Value)> {
        self.attributes.iter().filter_map(|(key, value)| {
            let name = to_snake_case(key);
            if KNOWN_ATTRIBUTES.contains(&name.as_str()) {
                None
            } else {
                Some((name, value))
            }
        })
    }

    /// The attribute map exactly as the server sent it.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn public_url(&self) -> String {
        format!("{}/{}", PUBLIC_ASSERTION_URL, self.entity_id)
    }
}

/// Every attribute with a typed member on `Badge`.
const KNOWN_ATTRIBUTES: [&str; 16] = [
    "entity_id",
    "entity_type",
    "open_badge_id",
    "created_at",
    "created_by",
    "issuer",
    "issuer_open_badge_id",
    "image",
    "expires",
    "extensions",
    "name",
    "description",
    "criteria_url",
    "criteria_narrative",
    "tags",
    "alignments",
];

fn lookup<'a>(attributes: &'a Map<String, Value>, snake_name: &str) -> Option<&'a Value> {
    attributes
        .iter()
        .find(|(key, _)| to_snake_case(key) == snake_name)
        .map(|(_, value)| value)
}

fn optional_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(String::from)
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}",
            self.entity_id,
            self.public_url(),
            self.name.as_deref().unwrap_or("<No name>")
        )
    }
}

impl Serialize for Badge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}
