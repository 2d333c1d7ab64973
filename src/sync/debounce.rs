use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

struct Pending {
    generation: u64,
    handle: AbortHandle,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<String, Pending>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// Per-key cancellable timers
///
/// Scheduling a key again aborts its pending task and restarts the quiet
/// period. Once a task's timer fires it is no longer cancellable.
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    pending: PendingMap,
    next_generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            pending: Arc::default(),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` once `key` has been quiet for the delay
    pub fn schedule<F>(&self, key: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let owned_key = key.to_string();

        // Held across spawn so the task cannot look itself up before it is inserted
        let mut map = lock(&self.pending);
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut map = lock(&pending);
                match map.get(&owned_key) {
                    Some(p) if p.generation == generation => {
                        map.remove(&owned_key);
                    }
                    // Superseded between wake-up and here
                    _ => return,
                }
            }
            task.await;
        });

        let replaced = map.insert(
            key.to_string(),
            Pending {
                generation,
                handle: join.abort_handle(),
            },
        );
        if let Some(previous) = replaced {
            previous.handle.abort();
        }
    }

    /// Drop the pending task for `key`. Returns true if one was waiting.
    pub fn cancel(&self, key: &str) -> bool {
        match lock(&self.pending).remove(key) {
            Some(previous) => {
                previous.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.pending).contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        for (_, pending) in lock(&self.pending).drain() {
            pending.handle.abort();
        }
    }
}
