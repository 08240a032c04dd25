//! Cached collection stores.
//!
//! One generic `CollectionStore` handles all four collections; the only
//! per-collection differences (endpoint, cache key, required fields,
//! remote order) come from the record type's `Resource` impl.
//!
//! `AgencyStores` wires up the four stores over one client and one
//! storage backend, the way the admin panel and public pages use them.

pub mod collection;
pub mod confirm;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::api::ResourceClient;
use crate::cache::SlotStorage;
use crate::clock::Clock;
use crate::models::{Event, Newsletter, Testimonial, Webinar};

pub use collection::{
    ActivateOutcome, CollectionStore, DataSource, StoreConfig, StoreError, StoreState, DEFAULT_TTL,
};
pub use confirm::DeleteConfirmation;

pub type EventStore<C> = CollectionStore<Event, C>;
pub type WebinarStore<C> = CollectionStore<Webinar, C>;
pub type NewsletterStore<C> = CollectionStore<Newsletter, C>;
pub type TestimonialStore<C> = CollectionStore<Testimonial, C>;

/// The four collection stores, sharing a client, storage, and clock.
pub struct AgencyStores<C> {
    pub events: EventStore<C>,
    pub webinars: WebinarStore<C>,
    pub newsletters: NewsletterStore<C>,
    pub testimonials: TestimonialStore<C>,
}

impl<C> AgencyStores<C>
where
    C: Clone
        + ResourceClient<Event>
        + ResourceClient<Webinar>
        + ResourceClient<Newsletter>
        + ResourceClient<Testimonial>,
{
    pub fn new(
        config: StoreConfig,
        client: C,
        storage: Arc<dyn SlotStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events: CollectionStore::new(config, client.clone(), storage.clone(), clock.clone()),
            webinars: CollectionStore::new(config, client.clone(), storage.clone(), clock.clone()),
            newsletters: CollectionStore::new(config, client.clone(), storage.clone(), clock.clone()),
            testimonials: CollectionStore::new(config, client, storage, clock),
        }
    }
}
