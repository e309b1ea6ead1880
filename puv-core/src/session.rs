use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use puv_catalog::VehicleType;
use puv_shared::models::events::SessionChangedEvent;
use puv_shared::Masked;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::validation::{
    ForgotPasswordForm, ProfileForm, SignInForm, SignUpForm, UserType, Validatable,
    ValidationErrors,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub username: Option<String>,
    pub user_type: UserType,
    pub vehicle_type: Option<VehicleType>,
    pub plate_number: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A signed-in session as issued by an [`AuthProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user: User,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("We couldn't find an account with this email.")]
    AccountNotFound,

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Session expired or signed out")]
    SessionNotFound,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Auth provider failure: {0}")]
    Internal(String),
}

/// Account and session lifecycle owned by an external identity service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, form: &SignUpForm) -> Result<User, AuthError>;

    async fn sign_out(&self, session_id: Uuid) -> Result<(), AuthError>;

    /// Start the reset flow; fails with `AccountNotFound` for unknown emails.
    async fn request_password_reset(&self, form: &ForgotPasswordForm) -> Result<(), AuthError>;

    async fn is_session_active(&self, session_id: Uuid) -> bool;

    async fn user(&self, user_id: Uuid) -> Result<User, AuthError>;

    async fn update_profile(&self, user_id: Uuid, form: &ProfileForm) -> Result<User, AuthError>;
}

pub type SessionListener = Arc<dyn Fn(&SessionChangedEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The signed-in state of one client, passed explicitly to whatever needs it.
pub struct SessionContext {
    provider: Arc<dyn AuthProvider>,
    session: RwLock<Option<AuthSession>>,
    listeners: Mutex<Vec<(ListenerId, SessionListener)>>,
    next_listener: AtomicU64,
}

impl SessionContext {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self {
            provider,
            session: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn session_id(&self) -> Option<Uuid> {
        self.session.read().await.as_ref().map(|s| s.session_id)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Validate the form, sign in and notify listeners.
    ///
    /// A failed attempt leaves any existing session in place.
    pub async fn login(&self, form: &SignInForm) -> Result<User, AuthError> {
        form.validate()?;

        let issued = self.provider.sign_in(form).await.map_err(|e| {
            tracing::warn!("Login failed: {}", e);
            e
        })?;
        let user = issued.user.clone();

        let previous = self.session.write().await.replace(issued);
        if let Some(previous) = previous {
            if let Err(e) = self.provider.sign_out(previous.session_id).await {
                tracing::warn!("Failed to close replaced session {}: {}", previous.session_id, e);
            }
            self.notify(&SessionChangedEvent::SignedOut {
                user_id: previous.user.id,
                timestamp: Utc::now().timestamp(),
            });
        }

        tracing::info!("User {} signed in", user.id);
        self.notify(&SessionChangedEvent::SignedIn {
            user_id: user.id,
            timestamp: Utc::now().timestamp(),
        });
        Ok(user)
    }

    /// Sign out the current session. A no-op when nobody is signed in.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let Some(current) = self.session.write().await.take() else {
            return Ok(());
        };

        let result = self.provider.sign_out(current.session_id).await;
        if let Err(e) = &result {
            tracing::error!("Logout failed: {}", e);
        }

        tracing::info!("User {} signed out", current.user.id);
        self.notify(&SessionChangedEvent::SignedOut {
            user_id: current.user.id,
            timestamp: Utc::now().timestamp(),
        });
        result
    }

    pub fn on_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SessionChangedEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Listeners run outside the lock so they may register or remove listeners.
    fn notify(&self, event: &SessionChangedEvent) {
        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Accepts a single hard-coded account.
    struct FixedAuthProvider {
        user: User,
        active: Mutex<HashSet<Uuid>>,
    }

    impl FixedAuthProvider {
        fn new() -> Self {
            Self {
                user: User {
                    id: Uuid::new_v4(),
                    full_name: "Juan dela Cruz".to_string(),
                    email: Masked::from("juan@example.com"),
                    phone: Masked::from("09171234567"),
                    username: None,
                    user_type: UserType::Passenger,
                    vehicle_type: None,
                    plate_number: None,
                    location: None,
                    created_at: Utc::now(),
                },
                active: Mutex::new(HashSet::new()),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for FixedAuthProvider {
        async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession, AuthError> {
            if form.email != *self.user.email.expose() || form.password.expose() != "secret1" {
                return Err(AuthError::InvalidCredentials);
            }
            let session_id = Uuid::new_v4();
            self.active.lock().unwrap().insert(session_id);
            Ok(AuthSession { session_id, user: self.user.clone(), issued_at: Utc::now() })
        }

        async fn sign_up(&self, _form: &SignUpForm) -> Result<User, AuthError> {
            Err(AuthError::EmailTaken)
        }

        async fn sign_out(&self, session_id: Uuid) -> Result<(), AuthError> {
            if self.active.lock().unwrap().remove(&session_id) {
                Ok(())
            } else {
                Err(AuthError::SessionNotFound)
            }
        }

        async fn request_password_reset(&self, _form: &ForgotPasswordForm) -> Result<(), AuthError> {
            Ok(())
        }

        async fn is_session_active(&self, session_id: Uuid) -> bool {
            self.active.lock().unwrap().contains(&session_id)
        }

        async fn user(&self, user_id: Uuid) -> Result<User, AuthError> {
            if user_id == self.user.id {
                Ok(self.user.clone())
            } else {
                Err(AuthError::UserNotFound(user_id))
            }
        }

        async fn update_profile(&self, user_id: Uuid, _form: &ProfileForm) -> Result<User, AuthError> {
            self.user(user_id).await
        }
    }

    fn credentials(password: &str) -> SignInForm {
        SignInForm { email: "juan@example.com".to_string(), password: Masked::from(password) }
    }

    #[tokio::test]
    async fn test_login_logout_notifies_listeners() {
        let provider = Arc::new(FixedAuthProvider::new());
        let context = SessionContext::new(provider.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        context.on_change(move |event| sink.lock().unwrap().push(event.clone()));

        assert!(!context.is_authenticated().await);
        let user = context.login(&credentials("secret1")).await.unwrap();
        assert_eq!(context.current_user().await, Some(user.clone()));

        let session_id = context.session_id().await.unwrap();
        assert!(provider.is_session_active(session_id).await);

        context.logout().await.unwrap();
        assert!(!context.is_authenticated().await);
        assert!(!provider.is_session_active(session_id).await);

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SessionChangedEvent::SignedIn { .. }));
        assert!(matches!(events[1], SessionChangedEvent::SignedOut { .. }));
        assert_eq!(events[1].user_id(), user.id);
    }

    #[tokio::test]
    async fn test_failed_login_changes_nothing() {
        let context = SessionContext::new(Arc::new(FixedAuthProvider::new()));
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        context.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(
            context.login(&credentials("wrong-pass")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            context.login(&credentials("123")).await,
            Err(AuthError::Validation(_))
        ));

        assert!(!context.is_authenticated().await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_removed_listener_is_silent() {
        let context = SessionContext::new(Arc::new(FixedAuthProvider::new()));
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let id = context.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(context.remove_listener(id));
        assert!(!context.remove_listener(id));

        context.login(&credentials("secret1")).await.unwrap();
        context.logout().await.unwrap();
        context.logout().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listener_can_unsubscribe_itself() {
        let context = Arc::new(SessionContext::new(Arc::new(FixedAuthProvider::new())));
        let calls = Arc::new(AtomicU64::new(0));
        let own_id: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&context);
        let counter = Arc::clone(&calls);
        let slot = Arc::clone(&own_id);
        let id = context.on_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let (Some(context), Some(id)) = (weak.upgrade(), slot.lock().unwrap().take()) {
                assert!(context.remove_listener(id));
                context.on_change(|_| {});
            }
        });
        *own_id.lock().unwrap() = Some(id);

        context.login(&credentials("secret1")).await.unwrap();
        context.logout().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
