// Contestant store: owns the canonical collection and persists every change.
//
// Mutations run one at a time. The mutation guard is held across the save so
// a second mutation always starts from the result of the first, while readers
// only take the list lock and are never blocked by a slow back end.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};

use crate::contestant::{self, Contestant};
use crate::error::StoreError;
use crate::metrics;
use crate::persistence::PersistenceAdapter;

/// Hands out strictly increasing, timestamp-like contestant ids.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max(now_millis, last + 1)`.
    pub fn next_id(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }

    /// Make sure future ids are greater than `id`.
    pub fn observe(&self, id: i64) {
        self.last.fetch_max(id, Ordering::Relaxed);
    }
}

/// Result of [`ContestantStore::add_score_if_active`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreUpdate {
    Missing,
    KnockedOut(Contestant),
    Updated(Contestant),
}

pub struct ContestantStore {
    adapter: Arc<dyn PersistenceAdapter>,
    contestants: RwLock<Vec<Contestant>>,
    mutation: Mutex<()>,
    ids: IdGenerator,
    in_sync: AtomicBool,
}

impl ContestantStore {
    /// An empty store. Call [`ContestantStore::load`] to hydrate it.
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self {
            adapter,
            contestants: RwLock::new(Vec::new()),
            mutation: Mutex::new(()),
            ids: IdGenerator::new(),
            in_sync: AtomicBool::new(true),
        }
    }

    pub fn backend(&self) -> String {
        self.adapter.describe()
    }

    /// Replace the in-memory collection with the stored one. On failure the
    /// collection becomes empty; the error is logged, not returned.
    pub async fn load(&self) -> Vec<Contestant> {
        let _guard = self.mutation.lock().await;

        let started = Instant::now();
        let result = self.adapter.load().await;
        metrics::PERSISTENCE_DURATION_SECONDS
            .with_label_values(&["load"])
            .observe(started.elapsed().as_secs_f64());

        let loaded = match result {
            Ok(list) => {
                tracing::info!("Loaded {} contestants from {}", list.len(), self.backend());
                self.in_sync.store(true, Ordering::Relaxed);
                list
            }
            Err(e) => {
                let err = StoreError::LoadFailure(e);
                tracing::error!("{err}; starting with an empty leaderboard");
                metrics::PERSISTENCE_FAILURES_TOTAL
                    .with_label_values(&["load"])
                    .inc();
                Vec::new()
            }
        };

        for c in &loaded {
            self.ids.observe(c.id);
        }
        metrics::record_collection(&loaded);
        *self.contestants.write().await = loaded.clone();
        loaded
    }

    /// Append a new contestant. Returns `None` without touching anything when
    /// the name is blank.
    pub async fn add(&self, name: &str, faction: &str) -> Option<Contestant> {
        if name.trim().is_empty() {
            return None;
        }
        let ids = &self.ids;
        self.mutate("add", move |list| {
            let created = Contestant::new(ids.next_id(), name, faction);
            list.push(created.clone());
            Some(created)
        })
        .await
    }

    /// Add `delta` (possibly negative) to a contestant's score.
    pub async fn add_score(&self, id: i64, delta: i64) -> Option<Contestant> {
        self.mutate("add_score", move |list| {
            let c = list.iter_mut().find(|c| c.id == id)?;
            c.score = c.score.saturating_add(delta);
            Some(c.clone())
        })
        .await
    }

    /// Add `delta` only while the contestant is still active. The status check
    /// and the write happen under the same mutation guard, so a knockout that
    /// is already queued always wins.
    pub async fn add_score_if_active(&self, id: i64, delta: i64) -> ScoreUpdate {
        let mut knocked_out = None;
        let updated = self
            .mutate("add_score", |list| {
                let c = list.iter_mut().find(|c| c.id == id)?;
                if !c.active {
                    knocked_out = Some(c.clone());
                    return None;
                }
                c.score = c.score.saturating_add(delta);
                Some(c.clone())
            })
            .await;
        match (updated, knocked_out) {
            (Some(c), _) => ScoreUpdate::Updated(c),
            (None, Some(c)) => ScoreUpdate::KnockedOut(c),
            (None, None) => ScoreUpdate::Missing,
        }
    }

    /// Mark a contestant as knocked out. Knocking out twice is harmless.
    pub async fn knock_out(&self, id: i64) -> Option<Contestant> {
        self.mutate("knock_out", move |list| {
            let c = list.iter_mut().find(|c| c.id == id)?;
            c.active = false;
            Some(c.clone())
        })
        .await
    }

    /// Contestants in canonical (insertion) order.
    pub async fn snapshot(&self) -> Vec<Contestant> {
        self.contestants.read().await.clone()
    }

    /// Contestants ranked by score, highest first, ties in insertion order.
    pub async fn display_order(&self) -> Vec<Contestant> {
        contestant::display_order(&self.contestants.read().await)
    }

    pub async fn get(&self, id: i64) -> Option<Contestant> {
        self.contestants
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// False after a failed save, until the next successful save or load.
    pub fn is_in_sync(&self) -> bool {
        self.in_sync.load(Ordering::Relaxed)
    }

    /// Apply `change` to a copy of the collection; if it reports a change,
    /// publish the copy and persist it. Memory is updated even when the save
    /// fails.
    async fn mutate<F>(&self, op: &'static str, change: F) -> Option<Contestant>
    where
        F: FnOnce(&mut Vec<Contestant>) -> Option<Contestant>,
    {
        let _guard = self.mutation.lock().await;

        let mut updated = self.contestants.read().await.clone();
        let affected = change(&mut updated)?;

        *self.contestants.write().await = updated.clone();
        metrics::MUTATIONS_TOTAL.with_label_values(&[op]).inc();
        metrics::record_collection(&updated);
        tracing::debug!(op, id = affected.id, "applied contestant mutation");

        if let Err(e) = self.persist(&updated).await {
            tracing::error!("{e}; in-memory leaderboard kept");
        }
        Some(affected)
    }

    async fn persist(&self, contestants: &[Contestant]) -> Result<(), StoreError> {
        let started = Instant::now();
        let result = self.adapter.save(contestants).await;
        metrics::PERSISTENCE_DURATION_SECONDS
            .with_label_values(&["save"])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(()) => {
                self.in_sync.store(true, Ordering::Relaxed);
                Ok(())
            }
            Err(e) => {
                self.in_sync.store(false, Ordering::Relaxed);
                metrics::PERSISTENCE_FAILURES_TOTAL
                    .with_label_values(&["save"])
                    .inc();
                Err(StoreError::SaveFailure(e))
            }
        }
    }
}
