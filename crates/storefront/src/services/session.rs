//! Session service: identity plus the inactivity monitor.
//!
//! A session is a uuid token mapped to a user id. The token in the
//! `pepsa_session` cookie is the sole authentication signal; nothing about
//! expiry is stored with the identity itself.
//!
//! The inactivity monitor arms one timer per session. Every activity event
//! (any authenticated request calls [`SessionService::touch`]) aborts the
//! previous timer and arms a fresh one, so overlapping activity never
//! leaves duplicate timers running. When a timer fires with its session
//! still present, the session is removed and exactly one
//! [`SessionEvent::Expired`] is broadcast.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use uuid::Uuid;

use pepsa_core::UserId;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session hit the idle limit and was removed.
    Expired { token: String, message: String },
}

struct SessionEntry {
    user_id: UserId,
    /// Bumped on every re-arm; a firing timer only acts if its generation
    /// still matches.
    generation: u64,
    timer: Option<AbortHandle>,
}

struct SessionInner {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    events: broadcast::Sender<SessionEvent>,
    idle_timeout: Duration,
}

/// In-process session registry with idle expiry.
#[derive(Clone)]
pub struct SessionService {
    inner: Arc<SessionInner>,
}

impl SessionService {
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                sessions: Mutex::new(HashMap::new()),
                events,
                idle_timeout,
            }),
        }
    }

    /// Subscribe to session lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Mint a session for a user and arm its idle timer.
    #[must_use]
    pub fn login(&self, user_id: UserId) -> String {
        let token = Uuid::new_v4().to_string();
        {
            let mut sessions = self.lock();
            sessions.insert(
                token.clone(),
                SessionEntry {
                    user_id,
                    generation: 0,
                    timer: None,
                },
            );
        }
        self.arm(&token);
        token
    }

    /// The user behind a token, if the session is live.
    #[must_use]
    pub fn current(&self, token: &str) -> Option<UserId> {
        self.lock().get(token).map(|entry| entry.user_id.clone())
    }

    /// Record activity: re-arm the idle timer for a live session.
    ///
    /// Returns `false` if no such session exists.
    pub fn touch(&self, token: &str) -> bool {
        if !self.lock().contains_key(token) {
            return false;
        }
        self.arm(token);
        true
    }

    /// Remove a session and cancel its pending timer.
    pub fn logout(&self, token: &str) {
        let removed = self.lock().remove(token);
        if let Some(entry) = removed
            && let Some(timer) = entry.timer
        {
            timer.abort();
        }
    }

    /// Abort the previous timer for the token and schedule exactly one new
    /// one.
    fn arm(&self, token: &str) {
        let generation;
        {
            let mut sessions = self.lock();
            let Some(entry) = sessions.get_mut(token) else {
                return;
            };
            if let Some(old) = entry.timer.take() {
                old.abort();
            }
            entry.generation += 1;
            generation = entry.generation;
        }

        let inner = Arc::clone(&self.inner);
        let token = token.to_owned();
        let timer_token = token.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(inner.idle_timeout).await;
            expire(&inner, &timer_token, generation);
        })
        .abort_handle();

        let mut sessions = self.lock();
        if let Some(entry) = sessions.get_mut(&token) {
            // A concurrent re-arm already superseded this timer
            if entry.generation == generation {
                entry.timer = Some(handle);
            } else {
                handle.abort();
            }
        } else {
            handle.abort();
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.inner
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Remove the session if the firing timer is still the current one, and
/// broadcast the expiry exactly once.
fn expire(inner: &SessionInner, token: &str, generation: u64) {
    let removed = {
        let mut sessions = inner
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match sessions.get(token) {
            Some(entry) if entry.generation == generation => sessions.remove(token),
            _ => None,
        }
    };

    if removed.is_some() {
        tracing::info!(token, "session timed out");
        let _ = inner.events.send(SessionEvent::Expired {
            token: token.to_owned(),
            message: "session timed out".to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(60);

    fn advance_past_idle() -> impl std::future::Future<Output = ()> {
        tokio::time::sleep(IDLE + Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires_once() {
        let sessions = SessionService::new(IDLE);
        let mut events = sessions.subscribe();

        let token = sessions.login(UserId::new("uid1"));
        assert!(sessions.current(&token).is_some());

        advance_past_idle().await;

        assert!(sessions.current(&token).is_none());
        let event = events.recv().await.expect("expiry event");
        assert_eq!(
            event,
            SessionEvent::Expired {
                token: token.clone(),
                message: "session timed out".to_owned(),
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_resets_the_timer() {
        let sessions = SessionService::new(IDLE);
        let token = sessions.login(UserId::new("uid1"));

        // Stay just inside the limit, then touch
        tokio::time::sleep(IDLE - Duration::from_secs(5)).await;
        assert!(sessions.touch(&token));

        // The original deadline passes without expiry
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(sessions.current(&token).is_some());

        // The reset deadline expires
        advance_past_idle().await;
        assert!(sessions.current(&token).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_touches_never_stack_timers() {
        let sessions = SessionService::new(IDLE);
        let mut events = sessions.subscribe();
        let token = sessions.login(UserId::new("uid1"));

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert!(sessions.touch(&token));
        }

        advance_past_idle().await;

        // Exactly one expiry despite six armings
        assert!(events.recv().await.is_ok());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_cancels_the_timer() {
        let sessions = SessionService::new(IDLE);
        let mut events = sessions.subscribe();
        let token = sessions.login(UserId::new("uid1"));

        sessions.logout(&token);
        assert!(sessions.current(&token).is_none());

        advance_past_idle().await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_unknown_token() {
        let sessions = SessionService::new(IDLE);
        assert!(!sessions.touch("no-such-token"));
    }
}
