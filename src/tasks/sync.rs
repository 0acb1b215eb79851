//! Optimistic mirroring of the task collection to a remote store
//!
//! Pushes are fire-and-forget: local state is authoritative and a failed push is
//! logged and dropped. Changes reported before the restoration delay after start
//! has passed are skipped, so state restored at startup never overwrites the
//! remote copy. A push only happens while the session provider reports a
//! signed-in user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Task;
use crate::timer::Scheduled;

/// Restoration window used when the caller has no better estimate
pub const DEFAULT_RESTORE_DELAY: Duration = Duration::from_secs(1);

/// Remote copy of the task collection
#[async_trait]
pub trait RemoteTaskMirror: Send + Sync {
    /// Replace the remote collection with `tasks`
    async fn push(&self, tasks: Vec<Task>) -> anyhow::Result<()>;
}

/// Signed-in user as reported by the session provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
}

pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;
}

/// Session provider with nobody signed in
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSession;

impl SessionProvider for AnonymousSession {
    fn current_user(&self) -> Option<UserIdentity> {
        None
    }
}

struct Shared {
    mirror: Arc<dyn RemoteTaskMirror>,
    session: Arc<dyn SessionProvider>,
    ready: AtomicBool,
}

impl Shared {
    fn push(&self, tasks: Vec<Task>) {
        let Some(user) = self.session.current_user() else {
            tracing::debug!("No signed-in user, skipping task mirror push");
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime available, skipping task mirror push");
            return;
        };

        let mirror = self.mirror.clone();
        runtime.spawn(async move {
            let count = tasks.len();
            match mirror.push(tasks).await {
                Ok(()) => tracing::debug!("Mirrored {} tasks for {}", count, user.id),
                Err(e) => tracing::warn!("Failed to mirror tasks for {}: {:#}", user.id, e),
            }
        });
    }
}

/// Pushes task snapshots to a [`RemoteTaskMirror`]
pub struct MirrorSync {
    shared: Arc<Shared>,
    _gate: Scheduled,
}

impl MirrorSync {
    /// Start syncing; changes are skipped for `restore_delay`
    pub fn start(
        mirror: Arc<dyn RemoteTaskMirror>,
        session: Arc<dyn SessionProvider>,
        restore_delay: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            mirror,
            session,
            ready: AtomicBool::new(false),
        });

        let gate_shared = shared.clone();
        let gate = Scheduled::after(restore_delay, move || {
            tracing::debug!("Restoration period over, task mirroring enabled");
            gate_shared.ready.store(true, Ordering::SeqCst);
        });

        Self {
            shared,
            _gate: gate,
        }
    }

    /// Whether the restoration delay has passed
    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst)
    }

    /// Mirror the latest task collection; skipped during restoration
    pub fn on_tasks_changed(&self, tasks: &[Task]) {
        if !self.is_ready() {
            tracing::debug!("Still in restoration period, skipping task mirror push");
            return;
        }
        self.shared.push(tasks.to_vec());
    }
}
