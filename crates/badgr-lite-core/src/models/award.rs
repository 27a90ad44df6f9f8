use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of an assertion (award) request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AwardRequest {
    pub recipient: Recipient,
    #[serde(default)]
    pub notify: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
    /// Any additional assertion fields, passed through as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub identity: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub identity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl AwardRequest {
    /// Award to a recipient identity (usually an email address).
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            recipient: Recipient {
                identity: identity.into(),
                identity_type: None,
                hashed: None,
            },
            notify: false,
            evidence: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn with_evidence(mut self, url: impl Into<String>, narrative: impl Into<String>) -> Self {
        self.evidence.push(Evidence {
            url: Some(url.into()),
            narrative: Some(narrative.into()),
        });
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
