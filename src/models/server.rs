//! Measurement server records: directory candidates, resolved identities
//! and the persisted pin.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identity of the server a measurement pass is bound to.
///
/// `extra` carries every other attribute the directory supplied (host, url,
/// coordinates, ...) so a pinned record survives a save/load cycle intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerIdentity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerIdentity {
    pub fn new<S: Into<String>>(id: S, sponsor: S, name: S, country: S) -> Self {
        Self {
            id: id.into(),
            sponsor: sponsor.into(),
            name: name.into(),
            country: country.into(),
            extra: Map::new(),
        }
    }

    /// Attach an additional directory attribute
    pub fn with_attribute<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Look up an additional directory attribute as a string
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// "sponsor - name (country)", dropping the country part when unknown
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            format!("{} - {}", self.sponsor, self.name)
        } else {
            format!("{} - {} ({})", self.sponsor, self.name, self.country)
        }
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// One entry of a server directory search. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerCandidate {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Remaining directory attributes, verbatim
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

impl ServerCandidate {
    /// Identity to persist or bind to for this candidate
    pub fn identity(&self) -> ServerIdentity {
        self.clone().into()
    }
}

impl From<ServerCandidate> for ServerIdentity {
    fn from(candidate: ServerCandidate) -> Self {
        Self {
            id: candidate.id,
            sponsor: candidate.sponsor,
            name: candidate.name,
            country: candidate.country,
            extra: candidate.raw,
        }
    }
}

/// Persisted pin as read back from disk.
///
/// Every field is optional because older setups wrote `null` or partial
/// records. Any non-empty `id` makes it a pin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinnedServerConfig {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PinnedServerConfig {
    /// The "no pin, auto-select" state
    pub fn unpinned() -> Self {
        Self::default()
    }

    pub fn pinned(identity: ServerIdentity) -> Self {
        Self {
            id: Some(identity.id),
            sponsor: Some(identity.sponsor),
            name: Some(identity.name),
            country: Some(identity.country),
            extra: identity.extra,
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Reconstruct the pinned identity, or None when the record carries no id
    pub fn server(&self) -> Option<ServerIdentity> {
        if !self.is_pinned() {
            return None;
        }

        Some(ServerIdentity {
            id: self.id.clone().unwrap_or_default(),
            sponsor: self.sponsor.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            country: self.country.clone().unwrap_or_default(),
            extra: self.extra.clone(),
        })
    }
}

impl From<ServerIdentity> for PinnedServerConfig {
    fn from(identity: ServerIdentity) -> Self {
        Self::pinned(identity)
    }
}

// Directories disagree on whether ids are strings or numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_from_directory_json() {
        let value = json!({
            "url": "http://speedtest.example.net:8080/speedtest/upload.php",
            "lat": "51.5171",
            "lon": "-0.1062",
            "distance": 12,
            "name": "London",
            "country": "United Kingdom",
            "cc": "GB",
            "sponsor": "Example Networks",
            "id": "12345",
            "host": "speedtest.example.net:8080"
        });

        let candidate: ServerCandidate = serde_json::from_value(value).unwrap();
        assert_eq!(candidate.id, "12345");
        assert_eq!(candidate.sponsor, "Example Networks");
        assert_eq!(candidate.name, "London");
        assert_eq!(candidate.country, "United Kingdom");
        assert_eq!(candidate.raw.get("cc"), Some(&json!("GB")));
        assert!(!candidate.raw.contains_key("id"));
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let candidate: ServerCandidate =
            serde_json::from_value(json!({"id": 987, "sponsor": "A", "name": "B", "country": "C"})).unwrap();
        assert_eq!(candidate.id, "987");
    }

    #[test]
    fn test_candidate_without_id_is_rejected() {
        let result: Result<ServerCandidate, _> =
            serde_json::from_value(json!({"sponsor": "A", "name": "B", "country": "C"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_candidate_missing_text_fields_default_to_empty() {
        let candidate: ServerCandidate = serde_json::from_value(json!({"id": "1"})).unwrap();
        assert_eq!(candidate.sponsor, "");
        assert_eq!(candidate.name, "");
        assert_eq!(candidate.country, "");
    }

    #[test]
    fn test_identity_keeps_raw_attributes() {
        let candidate: ServerCandidate = serde_json::from_value(json!({
            "id": "7", "sponsor": "S", "name": "N", "country": "C", "host": "h:8080"
        }))
        .unwrap();

        let identity = candidate.identity();
        assert_eq!(identity.id, "7");
        assert_eq!(identity.attribute("host"), Some("h:8080"));
    }

    #[test]
    fn test_display_name() {
        let identity = ServerIdentity::new("1", "Acme", "Madrid", "Spain");
        assert_eq!(identity.display_name(), "Acme - Madrid (Spain)");

        let no_country = ServerIdentity::new("1", "Acme", "Madrid", "");
        assert_eq!(no_country.to_string(), "Acme - Madrid");
    }

    #[test]
    fn test_pinned_config_requires_non_empty_id() {
        assert!(!PinnedServerConfig::unpinned().is_pinned());

        let empty = PinnedServerConfig {
            id: Some(String::new()),
            sponsor: Some("Acme".to_string()),
            ..Default::default()
        };
        assert!(!empty.is_pinned());
        assert!(empty.server().is_none());

        // Whitespace is still an id; a bad one fails later at bind
        let spaces = PinnedServerConfig {
            id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(spaces.is_pinned());
        assert_eq!(spaces.server().unwrap().id, "  ");

        let pinned = PinnedServerConfig::pinned(ServerIdentity::new("42", "Acme", "Oslo", "Norway"));
        assert!(pinned.is_pinned());
        assert_eq!(pinned.server().unwrap().id, "42");
    }

    #[test]
    fn test_pinned_config_without_id_parses_as_unpinned() {
        let config: PinnedServerConfig =
            serde_json::from_value(json!({"sponsor": "Acme", "name": "Oslo", "country": "Norway"})).unwrap();
        assert!(config.server().is_none());
    }

    #[test]
    fn test_pinned_config_null_id() {
        let config: PinnedServerConfig = serde_json::from_value(json!({"id": null})).unwrap();
        assert!(config.id.is_none());
        assert!(!config.is_pinned());
    }

    #[test]
    fn test_identity_json_matches_flat_record() {
        let identity = ServerIdentity::new("5", "Acme", "Lima", "Peru").with_attribute("cc", "PE");
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(
            value,
            json!({"id": "5", "sponsor": "Acme", "name": "Lima", "country": "Peru", "cc": "PE"})
        );
    }
}
