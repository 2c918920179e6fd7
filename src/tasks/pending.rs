use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle};

use crate::domain::Verdict;

/// Resolves to the authoritative verdict of one background pass.
#[derive(Debug, Clone)]
pub struct PendingVerdict {
    receiver: watch::Receiver<Option<Verdict>>,
}

impl PendingVerdict {
    /// `None` when the pass was cancelled before it finished.
    pub async fn wait(mut self) -> Option<Verdict> {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(value) => *value,
            Err(_) => None,
        }
    }
}

#[derive(Debug)]
struct PendingEntry {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Background authoritative passes keyed by the comment that owns them.
#[derive(Debug, Default)]
pub struct PendingClassifications {
    tasks: Mutex<HashMap<String, PendingEntry>>,
    generation: AtomicU64,
}

impl PendingClassifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `work` for `comment_id`, aborting any pass it replaces.
    pub fn spawn<F>(self: &Arc<Self>, comment_id: &str, work: F) -> PendingVerdict
    where
        F: Future<Output = Verdict> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(None);
        // Held across spawn so the task cannot finish before it is registered.
        let mut tasks = self.tasks.lock();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(self);
        let owner = comment_id.to_string();
        let handle = tokio::spawn(async move {
            let verdict = work.await;
            let _ = sender.send(Some(verdict));
            registry.finish(&owner, generation);
        });

        if let Some(previous) = tasks.insert(
            comment_id.to_string(),
            PendingEntry { generation, handle },
        ) {
            previous.handle.abort();
            tracing::debug!(
                target: "tasks",
                comment_id,
                "superseded pending classification"
            );
        }

        PendingVerdict { receiver }
    }

    /// Aborts the pass owned by `comment_id`. Returns `false` when nothing was
    /// still running.
    pub fn cancel(&self, comment_id: &str) -> bool {
        let Some(entry) = self.tasks.lock().remove(comment_id) else {
            return false;
        };
        let running = !entry.handle.is_finished();
        entry.handle.abort();
        if running {
            tracing::debug!(target: "tasks", comment_id, "pending classification cancelled");
        }
        running
    }

    pub fn abort_all(&self) -> usize {
        let drained: Vec<PendingEntry> = self.tasks.lock().drain().map(|(_, e)| e).collect();
        for entry in &drained {
            entry.handle.abort();
        }
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    fn finish(&self, comment_id: &str, generation: u64) {
        let mut tasks = self.tasks.lock();
        if tasks
            .get(comment_id)
            .is_some_and(|entry| entry.generation == generation)
        {
            tasks.remove(comment_id);
        }
    }
}
