//! In-memory stand-ins for the remote collection and the cache storage.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use tokio::sync::Notify;

use crate::api::{ApiError, DeleteReceipt, ResourceClient};
use crate::cache::SlotStorage;
use crate::models::{Event, RemoteOrder, Resource, Testimonial};

pub fn event(id: &str, title: &str) -> Event {
    Event {
        id: Some(id.to_string()),
        title: title.to_string(),
        date: "1 July 2025".to_string(),
        description: "Details".to_string(),
        image: "https://cdn.example.com/e.jpg".to_string(),
        link: "https://example.com/e".to_string(),
        ..Default::default()
    }
}

pub fn testimonial(id: &str, name: &str) -> Testimonial {
    Testimonial {
        id: Some(id.to_string()),
        name: name.to_string(),
        category: "Home Buyer".to_string(),
        description: "Great service".to_string(),
        rating: "5".to_string(),
        ..Default::default()
    }
}

#[derive(Default)]
struct Calls {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

struct Shared<R> {
    remote: Mutex<Vec<R>>,
    calls: Calls,
    fail: AtomicBool,
    next_id: AtomicUsize,
    pause: Mutex<Option<Arc<Notify>>>,
}

/// Remote collection held in memory. Clones share state, so a test can
/// keep a handle while the store owns another.
pub struct FakeClient<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for FakeClient<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: Resource> FakeClient<R> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                remote: Mutex::new(Vec::new()),
                calls: Calls::default(),
                fail: AtomicBool::new(false),
                next_id: AtomicUsize::new(1),
                pause: Mutex::new(None),
            }),
        }
    }

    pub fn seed(&self, records: Vec<R>) {
        *self.shared.remote.lock().unwrap() = records;
    }

    pub fn remote(&self) -> Vec<R> {
        self.shared.remote.lock().unwrap().clone()
    }

    /// Make every call fail with a 500 until switched off
    pub fn fail_with_server_error(&self, fail: bool) {
        self.shared.fail.store(fail, Ordering::SeqCst);
    }

    /// Hold the next `list` call until the returned gate is notified
    pub fn pause_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.shared.pause.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn list_calls(&self) -> usize {
        self.shared.calls.list.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.shared.calls.create.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.shared.calls.update.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.shared.calls.delete.load(Ordering::SeqCst)
    }

    fn check_fail(&self, what: &str) -> Result<(), ApiError> {
        if self.shared.fail.load(Ordering::SeqCst) {
            Err(ApiError::ServerError(format!("Failed to {}", what)))
        } else {
            Ok(())
        }
    }
}

impl<R: Resource> ResourceClient<R> for FakeClient<R> {
    async fn list(&self) -> Result<Vec<R>, ApiError> {
        self.shared.calls.list.fetch_add(1, Ordering::SeqCst);
        let gate = self.shared.pause.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_fail("fetch")?;
        Ok(self.remote())
    }

    async fn create(&self, record: &R) -> Result<R, ApiError> {
        self.shared.calls.create.fetch_add(1, Ordering::SeqCst);
        self.check_fail("add")?;

        let mut created = record.clone();
        let n = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        created.set_id(Some(format!("srv-{}", n)));

        let mut remote = self.shared.remote.lock().unwrap();
        match R::KIND.remote_order() {
            RemoteOrder::NewestFirst => remote.insert(0, created.clone()),
            RemoteOrder::OldestFirst => remote.push(created.clone()),
        }
        Ok(created)
    }

    async fn update(&self, record: &R) -> Result<R, ApiError> {
        self.shared.calls.update.fetch_add(1, Ordering::SeqCst);
        self.check_fail("update")?;

        let id = record.id().ok_or(ApiError::MissingId)?;
        let mut remote = self.shared.remote.lock().unwrap();
        let existing = remote
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| ApiError::NotFound(format!("{} not found", R::KIND)))?;
        *existing = record.clone();
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<DeleteReceipt, ApiError> {
        self.shared.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.check_fail("delete")?;

        let mut remote = self.shared.remote.lock().unwrap();
        let before = remote.len();
        remote.retain(|r| r.id() != Some(id));
        if remote.len() == before {
            return Err(ApiError::NotFound(format!("{} not found", R::KIND)));
        }
        Ok(DeleteReceipt {
            message: Some(format!("{} deleted successfully", R::KIND)),
        })
    }
}

/// Storage whose writes always fail, as when the disk is full.
pub struct FailingStorage;

impl SlotStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("No space left on device writing {}", key))
    }
}
