use serde::{Deserialize, Serialize};

use super::{require, Resource, ResourceKind, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct Newsletter {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub summary: String,
    /// Markdown body
    pub content: String,
    pub included: bool,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Newsletter {
    fn default() -> Self {
        Self {
            id: None,
            title: String::new(),
            summary: String::new(),
            content: String::new(),
            included: true,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Resource for Newsletter {
    const KIND: ResourceKind = ResourceKind::Newsletter;

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
        require("summary", &self.summary)?;
        require("content", &self.content)
    }
}
