use serde::{Deserialize, Serialize};

use super::{require, Resource, ResourceKind, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    /// Free-form date text as entered by the admin (e.g. "12 March 2025")
    pub date: String,
    pub description: String,
    /// Image URL shown on the event card
    pub image: String,
    pub link: String,
    pub included: bool,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            date: String::new(),
            description: String::new(),
            image: String::new(),
            link: String::new(),
            included: true,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Resource for Event {
    const KIND: ResourceKind = ResourceKind::Event;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn included(&self) -> bool {
        self.included
    }

    fn set_included(&mut self, included: bool) {
        self.included = included;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("date", &self.date)?;
        require("description", &self.description)?;
        require("image", &self.image)?;
        require("link", &self.link)
    }
}
