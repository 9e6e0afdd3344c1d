//! Request correlation identifier.
//!
//! The [`crate::middleware::Trace`] middleware mints one [`TraceId`] per
//! request and runs the handler inside [`TraceId::scope`]. Anything executed
//! on that task, such as services, repositories or error constructors, can read
//! it back with [`TraceId::current`] instead of threading it through every
//! signature.
//!
//! Task-locals do not follow work onto other threads. Blocking filesystem or
//! migration work goes through [`TraceId::spawn_blocking`], which re-enters
//! the scope on the blocking thread.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task::JoinHandle;
use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// Correlation id echoed in the `trace-id` header and in failure envelopes.
///
/// # Examples
/// ```
/// use devcamper::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "6f1c2f4e-8d0a-4b8e-9a53-2d4f4c1e7a10".parse().expect("uuid");
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Mint a fresh random identifier.
    #[must_use]
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The identifier in scope on this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Drive `fut` with `trace_id` in scope.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }

    /// Run `work` on the blocking pool, carrying the current identifier.
    pub fn spawn_blocking<F, R>(work: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        match Self::current() {
            Some(id) => tokio::task::spawn_blocking(move || CURRENT.sync_scope(id, work)),
            None => tokio::task::spawn_blocking(work),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
