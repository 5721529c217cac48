use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::map::LatLng;

/// Stable issue identifier (numeric or textual on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueId(String);

impl IssueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for IssueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for IssueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IssueId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => IssueId(n.to_string()),
            RawId::Text(s) => IssueId(s),
        })
    }
}

/// A reported issue as supplied by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, rename = "type", alias = "category", deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(default, alias = "image_url", deserialize_with = "lenient_optional_text")]
    pub image_url: Option<String>,
}

impl Issue {
    /// Position when both coordinates are finite numbers
    pub fn position(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// Numbers decode as-is; null, strings and anything else decode as absent
fn lenient_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_optional_text(deserializer)?.unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Issue with just the fields the map cares about
#[cfg(test)]
pub fn test_issue(id: &str, lat: Option<f64>, lng: Option<f64>, category: &str) -> Issue {
    Issue {
        id: IssueId::from(id),
        title: format!("Issue {}", id),
        location: String::from("MG Road"),
        lat,
        lng,
        status: String::from("open"),
        category: category.to_string(),
        image_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_record() {
        let json = r#"{
            "id": 7,
            "title": "Broken streetlight",
            "location": "MG Road",
            "lat": 12.97,
            "lng": 77.59,
            "status": "pending",
            "type": "streetlight",
            "imageUrl": "https://img.example/7.jpg"
        }"#;

        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id.as_str(), "7");
        assert_eq!(issue.category, "streetlight");
        assert_eq!(issue.image_url.as_deref(), Some("https://img.example/7.jpg"));
        assert_eq!(issue.position(), Some(LatLng::new(12.97, 77.59)));
    }

    #[test]
    fn test_non_numeric_coordinates_are_absent() {
        let json = r#"[
            {"id": 1, "lat": null, "lng": 77.6},
            {"id": 2, "lat": "12.97", "lng": 77.6},
            {"id": 3, "lng": 77.6},
            {"id": 4, "lat": true, "lng": {"x": 1}}
        ]"#;

        let issues: Vec<Issue> = serde_json::from_str(json).unwrap();
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|i| i.lat.is_none()));
        assert!(issues.iter().all(|i| i.position().is_none()));
        assert_eq!(issues[0].lng, Some(77.6));
    }

    #[test]
    fn test_aliases_and_missing_fields() {
        let json = r#"{"id": "abc", "category": "water", "image_url": "", "status": null}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();

        assert_eq!(issue.id, IssueId::from("abc"));
        assert_eq!(issue.category, "water");
        assert_eq!(issue.image_url, None);
        assert_eq!(issue.status, "");
        assert_eq!(issue.title, "");
    }

    #[test]
    fn test_position_rejects_non_finite() {
        let issue = test_issue("1", Some(f64::NAN), Some(77.6), "road");
        assert!(issue.position().is_none());

        let issue = test_issue("1", Some(12.9), Some(f64::INFINITY), "road");
        assert!(issue.position().is_none());

        let issue = test_issue("1", Some(12.9), None, "road");
        assert!(issue.position().is_none());
    }
}
