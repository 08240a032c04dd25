use serde::{Deserialize, Serialize};

use super::{require, Resource, ResourceKind, ValidationError};

/// Lowest and highest rating the remote schema accepts.
const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct Testimonial {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Held as text while editing; a JSON number on the wire.
    #[serde(with = "rating_text")]
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub rating: String,
    pub included: bool,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Testimonial {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            category: String::new(),
            description: String::new(),
            rating: String::new(),
            included: true,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Testimonial {
    /// Parsed rating, if the text is a number
    pub fn rating_value(&self) -> Option<f64> {
        self.rating.trim().parse().ok()
    }
}

impl Resource for Testimonial {
    const KIND: ResourceKind = ResourceKind::Testimonial;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn included(&self) -> bool {
        self.included
    }

    fn set_included(&mut self, included: bool) {
        self.included = included;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("category", &self.category)?;
        require("description", &self.description)?;
        require("rating", &self.rating)?;

        match self.rating_value() {
            Some(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Ok(()),
            Some(r) => Err(ValidationError::Invalid {
                field: "rating",
                reason: format!("{} is outside {}-{}", r, MIN_RATING, MAX_RATING),
            }),
            None => Err(ValidationError::Invalid {
                field: "rating",
                reason: format!("{:?} is not a number", self.rating.trim()),
            }),
        }
    }
}

/// Rating text <-> JSON number. Blank text goes out as `null`; integers
/// stay integers. Numbers, numeric strings, and `null` are accepted in.
mod rating_text {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return serializer.serialize_none();
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return serializer.serialize_i64(n);
        }
        match trimmed.parse::<f64>() {
            Ok(n) => serializer.serialize_f64(n),
            Err(_) => Err(S::Error::custom(format!("rating {:?} is not a number", trimmed))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(D::Error::custom(format!("unexpected rating value: {}", other))),
        }
    }
}
