// ABOUTME: Local-to-hosted data synchronization with one-time migration semantics
// ABOUTME: Includes a debounced writer that coalesces rapid edits into single writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Sync Service
//!
//! Accounts start out with data living only on the device. On first sync the
//! service reconciles: if the hosted side is empty and the device holds data,
//! the device snapshot is imported exactly once; in every other case the
//! hosted copy wins. The migration flag is consumed by the first reconcile,
//! so a second device connecting later cannot clobber hosted data.
//!
//! Ongoing edits arrive in bursts (every keystroke in the inventory editor),
//! so whole-snapshot writes go through [`DebouncedWriter`]: only the last
//! snapshot within the debounce window hits the database.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{FamilyMember, Ingredient, Recipe};

/// Default debounce window for snapshot writes
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything a device holds locally for one account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSnapshot {
    /// Ingredient inventory
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Family member profiles
    #[serde(default)]
    pub family: Vec<FamilyMember>,
    /// Saved recipes
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl LocalSnapshot {
    /// Whether the snapshot carries any data at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.family.is_empty() && self.recipes.is_empty()
    }
}

/// Result of a reconcile call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The device snapshot was imported into the hosted store
    Imported,
    /// The hosted store already holds the source of truth
    HostedWins,
}

/// Reconciles device data with the hosted store
pub struct SyncService {
    database: Database,
    writer: DebouncedWriter<(Uuid, LocalSnapshot)>,
}

impl SyncService {
    /// Create a sync service with the default debounce window
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self::with_debounce(database, DEFAULT_DEBOUNCE)
    }

    /// Create a sync service with a custom debounce window
    #[must_use]
    pub fn with_debounce(database: Database, debounce: Duration) -> Self {
        let write_db = database.clone();
        let writer = DebouncedWriter::new(debounce, move |(user_id, snapshot)| {
            let db = write_db.clone();
            async move { write_snapshot(&db, user_id, &snapshot).await }
        });
        Self { database, writer }
    }

    /// Reconcile a device snapshot against the hosted store
    ///
    /// The one-time import runs only when the hosted store is empty, the
    /// device holds data, and the account has never migrated. Reconciles with
    /// an empty snapshot leave the migration window open, so a fresh install
    /// checking in before the user's real device does not forfeit its data.
    /// The flag is consumed by the first reconcile that carries local data;
    /// a compare-and-set in the users table keeps concurrent calls from
    /// importing twice.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown user, or a database error
    pub async fn reconcile(&self, user_id: Uuid, local: &LocalSnapshot) -> AppResult<SyncOutcome> {
        let user = self
            .database
            .users()
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id}")))?;

        if user.local_migrated || local.is_empty() {
            return Ok(SyncOutcome::HostedWins);
        }

        let hosted_empty = self.database.inventory().count(user_id).await? == 0
            && self.database.recipes().count(user_id).await? == 0
            && self.database.family().list(user_id).await?.is_empty();

        // Closes the window whether or not the import runs; hosted data
        // present at this point wins permanently.
        let first_attempt = self.database.users().mark_local_migrated(user_id).await?;

        if first_attempt && hosted_empty {
            write_snapshot(&self.database, user_id, local).await?;
            info!(
                user_id = %user_id,
                ingredients = local.ingredients.len(),
                family = local.family.len(),
                recipes = local.recipes.len(),
                "Imported local data into hosted store"
            );
            return Ok(SyncOutcome::Imported);
        }

        Ok(SyncOutcome::HostedWins)
    }

    /// Queue a whole-snapshot write; bursts collapse to the last snapshot
    pub fn queue_write(&self, user_id: Uuid, snapshot: LocalSnapshot) {
        self.writer.submit((user_id, snapshot));
    }
}

/// Persist a device snapshot, replacing every hosted collection
async fn write_snapshot(db: &Database, user_id: Uuid, snapshot: &LocalSnapshot) -> AppResult<()> {
    db.inventory()
        .replace_all(user_id, &snapshot.ingredients)
        .await?;
    db.family().replace_all(user_id, &snapshot.family).await?;
    db.recipes().replace_all(user_id, &snapshot.recipes).await?;
    Ok(())
}

/// Coalesces rapid submissions into one write after a quiet period
///
/// Last write wins: any value submitted while the window is open replaces the
/// pending one. Write failures are logged, never propagated to the submitter,
/// since the device keeps its own copy and will sync again.
pub struct DebouncedWriter<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> DebouncedWriter<T> {
    /// Spawn the debounce worker with the given window and write callback
    pub fn new<F, Fut>(window: Duration, write: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut pending = first;
                // Keep replacing the pending value until the window stays quiet
                loop {
                    match timeout(window, rx.recv()).await {
                        Ok(Some(next)) => pending = next,
                        Ok(None) => {
                            if let Err(e) = write(pending).await {
                                error!(error = %e, "Debounced write failed during shutdown");
                            }
                            return;
                        }
                        Err(_) => break,
                    }
                }
                if let Err(e) = write(pending).await {
                    error!(error = %e, "Debounced write failed");
                }
            }
        });

        Self { tx }
    }

    /// Submit a value for eventual writing
    pub fn submit(&self, value: T) {
        if self.tx.send(value).is_err() {
            warn!("Debounce worker is gone; dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_debounce_keeps_last_write() {
        let writes = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(0_u32));

        let writes_clone = Arc::clone(&writes);
        let last_clone = Arc::clone(&last);
        let writer = DebouncedWriter::new(Duration::from_millis(20), move |value: u32| {
            let writes = Arc::clone(&writes_clone);
            let last = Arc::clone(&last_clone);
            async move {
                writes.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap() = value;
                Ok(())
            }
        });

        writer.submit(1);
        writer.submit(2);
        writer.submit(3);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert_eq!(*last.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_debounce_separate_bursts_write_twice() {
        let writes = Arc::new(AtomicUsize::new(0));
        let writes_clone = Arc::clone(&writes);
        let writer = DebouncedWriter::new(Duration::from_millis(10), move |_: u32| {
            let writes = Arc::clone(&writes_clone);
            async move {
                writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        writer.submit(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        writer.submit(2);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(writes.load(Ordering::SeqCst), 2);
    }
}
