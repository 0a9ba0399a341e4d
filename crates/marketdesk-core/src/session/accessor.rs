use crate::{
    entity::Payload,
    obs::{MetricsEvent, MetricsSink, global_sink},
    platform::{Platform, PlatformError},
    retry::{RetryOutcome, RetryPolicy, cancellable, run_with_retry},
    session::{SessionError, SessionStatus, SessionUser, UserType},
};
use serde_json::Value;
use std::sync::{
    Arc, Mutex as StdMutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Slot {
    // Outer None: not fetched (or invalidated). Inner None: nobody signed in.
    cached: Option<Option<SessionUser>>,
    last_failure: Option<SessionError>,
}

///
/// SessionAccessor
///
/// Memoized "who is signed in". At most one fetch is in flight; callers
/// that arrive while it runs wait for it and share its outcome, success or
/// failure. A successful result is kept until `logout` or `invalidate`.
///

pub struct SessionAccessor {
    platform: Arc<dyn Platform>,
    retry: RetryPolicy,
    sink: Arc<dyn MetricsSink>,
    slot: Mutex<Slot>,
    completed: AtomicU64,
    status: StdMutex<SessionStatus>,
}

impl SessionAccessor {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>, retry: RetryPolicy) -> Self {
        Self {
            platform,
            retry,
            sink: global_sink(),
            slot: Mutex::new(Slot::default()),
            completed: AtomicU64::new(0),
            status: StdMutex::new(SessionStatus::Checking),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Snapshot for the permission gate; never waits on the network.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current session, fetching it on first access.
    pub async fn current(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<SessionUser>, SessionError> {
        let observed = self.completed.load(Ordering::Acquire);
        let Some(mut slot) = cancellable(cancel, self.slot.lock()).await else {
            return Err(SessionError::Cancelled);
        };

        if let Some(user) = &slot.cached {
            return Ok(user.clone());
        }
        // A fetch finished while we waited on the lock: share its failure.
        if self.completed.load(Ordering::Acquire) != observed
            && let Some(err) = &slot.last_failure
        {
            return Err(err.clone());
        }

        self.set_status(SessionStatus::Checking);
        let platform = &self.platform;
        let outcome = run_with_retry(self.retry, cancel, PlatformError::is_transient, || {
            platform.me()
        })
        .await;

        let result = match outcome {
            RetryOutcome::Done { value, attempts } => {
                tracing::debug!(attempts, signed_in = value.is_some(), "session.fetch");
                self.sink.record(MetricsEvent::SessionFetch { attempts, ok: true });
                slot.cached = Some(value.clone());
                slot.last_failure = None;
                Ok(value)
            }
            RetryOutcome::Failed { error, attempts } => {
                tracing::warn!(attempts, error = %error, "session.fetch failed");
                self.sink.record(MetricsEvent::SessionFetch { attempts, ok: false });
                let err = SessionError::Fetch {
                    attempts,
                    source: error,
                };
                slot.last_failure = Some(err.clone());
                Err(err)
            }
            RetryOutcome::Cancelled => return Err(SessionError::Cancelled),
        };

        self.completed.fetch_add(1, Ordering::AcqRel);
        self.set_status(SessionStatus::from(result.clone()));

        result
    }

    /// Sign out on the platform and drop the cached session.
    pub async fn logout(&self, cancel: &CancellationToken) -> Result<(), SessionError> {
        let Some(mut slot) = cancellable(cancel, self.slot.lock()).await else {
            return Err(SessionError::Cancelled);
        };

        match cancellable(cancel, self.platform.logout()).await {
            None => Err(SessionError::Cancelled),
            Some(Err(source)) => Err(SessionError::Logout { source }),
            Some(Ok(())) => {
                tracing::debug!("session.logout");
                *slot = Slot::default();
                self.set_status(SessionStatus::Ready(None));
                Ok(())
            }
        }
    }

    /// Forget the cached session so the next access refetches it.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = Slot::default();
        self.set_status(SessionStatus::Checking);
    }

    /// Patch the signed-in user's own profile and refresh the cached session.
    pub async fn update_me(
        &self,
        patch: Payload,
        cancel: &CancellationToken,
    ) -> Result<SessionUser, SessionError> {
        let Some(mut slot) = cancellable(cancel, self.slot.lock()).await else {
            return Err(SessionError::Cancelled);
        };

        match cancellable(cancel, self.platform.update_me(patch)).await {
            None => Err(SessionError::Cancelled),
            Some(Err(source)) => Err(SessionError::Update { source }),
            Some(Ok(user)) => {
                slot.cached = Some(Some(user.clone()));
                slot.last_failure = None;
                self.set_status(SessionStatus::Ready(Some(user.clone())));
                Ok(user)
            }
        }
    }

    /// Finish onboarding by choosing a marketplace side.
    pub async fn complete_setup(
        &self,
        user_type: UserType,
        cancel: &CancellationToken,
    ) -> Result<SessionUser, SessionError> {
        if user_type == UserType::Indefinido {
            return Err(SessionError::InvalidUserType(user_type));
        }

        let mut patch = Payload::new();
        patch.insert("user_type".into(), Value::String(user_type.to_string()));

        self.update_me(patch, cancel).await
    }

    fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

///
/// TESTS
///
