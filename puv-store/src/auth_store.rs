use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use puv_core::session::{AuthError, AuthProvider, AuthSession, User};
use puv_core::validation::{ForgotPasswordForm, ProfileForm, SignInForm, SignUpForm, Validatable};
use puv_shared::Masked;
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
pub struct PasswordResetRequest {
    pub token: Uuid,
    pub user_id: Uuid,
    pub requested_at: DateTime<Utc>,
}

#[derive(Default)]
struct AuthState {
    users: HashMap<Uuid, StoredUser>,
    by_email: HashMap<String, Uuid>,
    sessions: HashMap<Uuid, Uuid>,
    resets: Vec<PasswordResetRequest>,
}

/// Account registry kept in process memory, for development and tests.
pub struct InMemoryAuthProvider {
    bcrypt_cost: u32,
    state: RwLock<AuthState>,
}

impl InMemoryAuthProvider {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            bcrypt_cost,
            state: RwLock::new(AuthState::default()),
        }
    }

    pub async fn pending_resets(&self) -> Vec<PasswordResetRequest> {
        self.state.read().await.resets.clone()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_in(&self, form: &SignInForm) -> Result<AuthSession, AuthError> {
        form.validate()?;

        let (user, password_hash) = {
            let state = self.state.read().await;
            let stored = state
                .by_email
                .get(&email_key(&form.email))
                .and_then(|id| state.users.get(id))
                .ok_or(AuthError::InvalidCredentials)?;
            (stored.user.clone(), stored.password_hash.clone())
        };

        let password = form.password.expose().clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let session_id = Uuid::new_v4();
        self.state.write().await.sessions.insert(session_id, user.id);

        tracing::info!("Session {} opened for user {}", session_id, user.id);
        Ok(AuthSession {
            session_id,
            user,
            issued_at: Utc::now(),
        })
    }

    async fn sign_up(&self, form: &SignUpForm) -> Result<User, AuthError> {
        form.validate()?;

        let key = email_key(&form.email);
        let password = form.password.expose().clone();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let mut state = self.state.write().await;
        if state.by_email.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            full_name: form.full_name.clone(),
            email: Masked(form.email.trim().to_string()),
            phone: form.phone_number.clone(),
            username: None,
            user_type: form.user_type,
            vehicle_type: form.vehicle_type,
            plate_number: form.plate_number.clone(),
            location: None,
            created_at: Utc::now(),
        };

        state.by_email.insert(key, user.id);
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );

        tracing::info!("Registered {:?} account {} ({})", user.user_type, user.id, user.email);
        Ok(user)
    }

    async fn sign_out(&self, session_id: Uuid) -> Result<(), AuthError> {
        self.state
            .write()
            .await
            .sessions
            .remove(&session_id)
            .map(|_| ())
            .ok_or(AuthError::SessionNotFound)
    }

    async fn request_password_reset(&self, form: &ForgotPasswordForm) -> Result<(), AuthError> {
        form.validate()?;

        let mut state = self.state.write().await;
        let user_id = *state
            .by_email
            .get(&email_key(&form.email))
            .ok_or(AuthError::AccountNotFound)?;

        let request = PasswordResetRequest {
            token: Uuid::new_v4(),
            user_id,
            requested_at: Utc::now(),
        };
        tracing::info!("Password reset requested for user {}", user_id);
        state.resets.push(request);
        Ok(())
    }

    async fn is_session_active(&self, session_id: Uuid) -> bool {
        self.state.read().await.sessions.contains_key(&session_id)
    }

    async fn user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.state
            .read()
            .await
            .users
            .get(&user_id)
            .map(|stored| stored.user.clone())
            .ok_or(AuthError::UserNotFound(user_id))
    }

    async fn update_profile(&self, user_id: Uuid, form: &ProfileForm) -> Result<User, AuthError> {
        form.validate()?;

        let mut state = self.state.write().await;
        let new_key = email_key(&form.email);
        if let Some(owner) = state.by_email.get(&new_key) {
            if *owner != user_id {
                return Err(AuthError::EmailTaken);
            }
        }

        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or(AuthError::UserNotFound(user_id))?;
        let old_key = email_key(stored.user.email.expose());

        stored.user.full_name = form.full_name.clone();
        stored.user.email = Masked(form.email.trim().to_string());
        stored.user.phone = form.phone.clone();
        stored.user.username = Some(form.username.clone());
        stored.user.location = form.location.clone();
        let user = stored.user.clone();

        if old_key != new_key {
            state.by_email.remove(&old_key);
            state.by_email.insert(new_key, user_id);
        }

        tracing::info!("Profile updated for user {}", user_id);
        Ok(user)
    }
}
