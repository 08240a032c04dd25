//! Core library for propdesk.
//!
//! Keeps client-side copies of the agency site's managed collections
//! (events, webinars, newsletters, testimonials) in a durable local cache
//! with a time-to-live, and applies admin edits to the remote store and the
//! local copy together.
//!
//! - [`api`]: REST client for the site's `/api/<collection>` endpoints
//! - [`cache`]: durable cache slots and their storage backends
//! - [`store`]: the generic cached collection store
//! - [`models`]: record types
//! - [`config`]: configuration file and environment overrides

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod models;
pub mod store;

pub use api::{ApiError, HttpResourceClient, ResourceClient};
pub use cache::{CacheManager, MemoryStorage, SlotStorage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use models::{Event, Newsletter, Resource, ResourceKind, Testimonial, ValidationError, Webinar};
pub use store::{AgencyStores, CollectionStore, DeleteConfirmation, StoreConfig, StoreError, StoreState};
