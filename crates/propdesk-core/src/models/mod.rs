//! Data models for the agency's managed collections.
//!
//! This module contains the record types the admin panel edits and the
//! public pages display:
//!
//! - `Event`: sponsorships and in-person events
//! - `Webinar`: scheduled online sessions
//! - `Newsletter`: published newsletter issues
//! - `Testimonial`: client reviews with a 1-5 rating
//!
//! Every record type implements [`Resource`], which carries the per-type
//! configuration (endpoint, cache key, validator) the generic collection
//! store needs.

pub mod event;
pub mod newsletter;
pub mod testimonial;
pub mod webinar;

use std::fmt;
use std::str::FromStr;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use event::Event;
pub use newsletter::Newsletter;
pub use testimonial::Testimonial;
pub use webinar::Webinar;

/// The four independently cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Event,
    Webinar,
    Newsletter,
    Testimonial,
}

/// Sort direction the remote store applies to `GET` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOrder {
    NewestFirst,
    OldestFirst,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Event,
        ResourceKind::Webinar,
        ResourceKind::Newsletter,
        ResourceKind::Testimonial,
    ];

    /// Path of the remote collection endpoint, relative to the site root.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ResourceKind::Event => "/api/events",
            ResourceKind::Webinar => "/api/webinars",
            ResourceKind::Newsletter => "/api/newsletters",
            ResourceKind::Testimonial => "/api/testimonials",
        }
    }

    /// Durable cache slot key. These match the keys the web front end uses.
    pub fn cache_key(&self) -> &'static str {
        match self {
            ResourceKind::Event => "eventsCache",
            ResourceKind::Webinar => "webinarsCache",
            ResourceKind::Newsletter => "newslettersCache",
            ResourceKind::Testimonial => "testimonialsCache",
        }
    }

    pub fn remote_order(&self) -> RemoteOrder {
        match self {
            ResourceKind::Testimonial => RemoteOrder::OldestFirst,
            _ => RemoteOrder::NewestFirst,
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Event => "events",
            ResourceKind::Webinar => "webinars",
            ResourceKind::Newsletter => "newsletters",
            ResourceKind::Testimonial => "testimonials",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Event => write!(f, "event"),
            ResourceKind::Webinar => write!(f, "webinar"),
            ResourceKind::Newsletter => write!(f, "newsletter"),
            ResourceKind::Testimonial => write!(f, "testimonial"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| lower == kind.plural() || lower == kind.to_string())
            .ok_or_else(|| format!("Unknown collection: {}", s))
    }
}

/// A record failed local validation before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Blank(&'static str),

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Blank(field) => field,
            ValidationError::Invalid { field, .. } => field,
        }
    }
}

/// A record type managed by a cached collection store.
pub trait Resource:
    Clone + fmt::Debug + PartialEq + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    /// Identifier assigned by the remote store; `None` until created.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);

    /// Title or name shown in lists, used by search and delete confirmation.
    fn display_name(&self) -> &str;

    fn included(&self) -> bool;

    fn set_included(&mut self, included: bool);

    /// Check required fields. Blank means empty after trimming.
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank(field))
    } else {
        Ok(())
    }
}
