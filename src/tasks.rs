//! Async task management for non-blocking API operations.
//!
//! Requests run in background tokio tasks while the UI keeps rendering.
//! Results come back through an unbounded channel as `ApiMessage`s; the
//! main loop drains them with `try_recv()` between frames.
//!
//! Every message carries enough context (resource, page, row id) for the
//! receiver to discard answers that arrive after the user moved on, and
//! errors stay typed so the receiver can tell critical ones apart.

use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::api::{ApiError, CondoClient, Page, Resource};
use crate::grid::{Row, RowId};

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// A listing page was fetched.
    PageFetched {
        resource: Resource,
        page: u32,
        search: String,
        result: Result<Page, ApiError>,
    },

    /// A row update finished.
    RowSaved {
        resource: Resource,
        id: RowId,
        /// The payload that was sent, kept so a failed edit can be resumed.
        payload: Row,
        result: Result<(), ApiError>,
    },

    /// A record was created.
    RowCreated {
        resource: Resource,
        payload: Row,
        result: Result<Value, ApiError>,
    },

    /// A record was deleted.
    RowDeleted {
        resource: Resource,
        id: RowId,
        result: Result<(), ApiError>,
    },

    /// Occupied dates of a space for one month.
    AvailabilityFetched {
        space_id: RowId,
        month: NaiveDate,
        result: Result<Vec<String>, ApiError>,
    },
}

/// Spawns background tasks for async operations.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Spawn a task to fetch one page of `resource`.
    pub fn spawn_fetch_page(
        &self,
        client: &CondoClient,
        resource: Resource,
        page: u32,
        search: String,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.list(resource, page, &search).await;
            let _ = tx.send(ApiMessage::PageFetched {
                resource,
                page,
                search,
                result,
            });
        });
    }

    /// Spawn a task to save the edited fields of one row.
    pub fn spawn_save_row(
        &self,
        client: &CondoClient,
        resource: Resource,
        id: RowId,
        payload: Row,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.patch(resource, &id, &payload).await.map(|_| ());
            let _ = tx.send(ApiMessage::RowSaved {
                resource,
                id,
                payload,
                result,
            });
        });
    }

    /// Spawn a task to create a record from `payload`.
    pub fn spawn_create_row(&self, client: &CondoClient, resource: Resource, payload: Row) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.create(resource, &payload).await;
            let _ = tx.send(ApiMessage::RowCreated {
                resource,
                payload,
                result,
            });
        });
    }

    /// Spawn a task to delete one record.
    pub fn spawn_delete_row(&self, client: &CondoClient, resource: Resource, id: RowId) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.delete(resource, &id).await;
            let _ = tx.send(ApiMessage::RowDeleted {
                resource,
                id,
                result,
            });
        });
    }

    /// Spawn a task to fetch the occupied dates of a space.
    pub fn spawn_fetch_availability(
        &self,
        client: &CondoClient,
        space_id: RowId,
        month: NaiveDate,
    ) {
        let tx = self.tx.clone();
        let client = client.clone();
        tokio::spawn(async move {
            let result = client.availability(&space_id, month).await;
            let _ = tx.send(ApiMessage::AvailabilityFetched {
                space_id,
                month,
                result,
            });
        });
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
