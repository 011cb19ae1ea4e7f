//! Session bootstrap
//!
//! Runs once at application start: obtain a bearer token from the backend,
//! resolve the acting user, and expose the `(user, backend_online)` pair.
//! When the backend is unreachable the session degrades silently to a
//! synthetic offline user — after bootstrap completes there is never a
//! "logged in but no user" state.

use crate::client::ApiClient;
use crate::core::config::SessionConfig;
use crate::core::error::{AdminError, Result};
use crate::core::event_bus::{EventSource, RevalidationBus};
use crate::gateway::Served;
use crate::models::{RecordId, Role, User, UserPatch};
use crate::session::token::{CookieAttributes, TokenStore};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Token-issuance endpoint
const TOKEN_ENDPOINT: &str = "/jwt";
/// Users endpoint, also used to resolve the acting profile
const USERS_ENDPOINT: &str = "/users";
/// Tag published when the session ends, so the UI returns to sign-in
const SESSION_TAG: &str = "session";

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    AuthenticatedOnline,
    AuthenticatedOffline,
    Terminated,
}

/// The bootstrapped session handed to the rest of the application
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: Option<String>,
    pub backend_online: bool,
}

/// Establishes and owns the process-lifetime session.
pub struct SessionBootstrapper {
    client: ApiClient,
    tokens: Arc<TokenStore>,
    bus: Arc<RevalidationBus>,
    cookie_attributes: CookieAttributes,
    offline_user_name: String,
    offline_user_email: String,
    state: RwLock<SessionState>,
    session: RwLock<Option<Session>>,
}

impl SessionBootstrapper {
    pub fn new(
        client: ApiClient,
        tokens: Arc<TokenStore>,
        bus: Arc<RevalidationBus>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            client,
            tokens,
            bus,
            cookie_attributes: CookieAttributes::from_config(config),
            offline_user_name: config.offline_user_name.clone(),
            offline_user_email: config.offline_user_email.clone(),
            state: RwLock::new(SessionState::Initializing),
            session: RwLock::new(None),
        }
    }

    /// Establish the session. Runs the online path first and degrades
    /// silently to the synthetic offline user on any failure.
    ///
    /// Re-bootstrapping is not supported: a second call returns the
    /// existing session unchanged.
    pub async fn bootstrap(&self) -> Result<Session> {
        {
            let state = self.state.read().await;
            if *state != SessionState::Initializing {
                if let Some(existing) = self.session.read().await.clone() {
                    tracing::warn!("Bootstrap called twice, returning existing session");
                    return Ok(existing);
                }
                return Err(AdminError::SessionTerminated);
            }
        }

        let session = match self.try_online().await {
            Ok(session) => {
                tracing::info!(
                    user = %session.user.display_name,
                    role = session.user.role.as_str(),
                    "Session established against live backend"
                );
                *self.state.write().await = SessionState::AuthenticatedOnline;
                session
            }
            Err(e) => {
                // Degrade silently: the synthetic user still satisfies the
                // session contract the rest of the app expects.
                tracing::warn!(error = %e, "Backend bootstrap failed, entering offline session");
                if let Err(clear_err) = self.tokens.clear().await {
                    tracing::warn!(error = %clear_err, "Failed to clear token while degrading offline");
                }
                let session = Session {
                    user: self.synthetic_user(),
                    token: None,
                    backend_online: false,
                };
                *self.state.write().await = SessionState::AuthenticatedOffline;
                session
            }
        };

        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn try_online(&self) -> Result<Session> {
        let token = self.client.request_token(TOKEN_ENDPOINT).await?;
        self.tokens
            .set(token.clone(), self.cookie_attributes.clone())
            .await?;

        let users: Vec<User> = self
            .client
            .get_json(USERS_ENDPOINT, Some(token.clone()))
            .await?;

        let user = users
            .iter()
            .find(|u| u.role == Role::Admin)
            .or_else(|| users.first())
            .cloned()
            .ok_or_else(|| {
                AdminError::MalformedResponse("backend returned no users".to_string())
            })?;

        Ok(Session {
            user,
            token: Some(token),
            backend_online: true,
        })
    }

    fn synthetic_user(&self) -> User {
        let now = Utc::now();
        User {
            id: RecordId::from("offline-admin"),
            display_name: self.offline_user_name.clone(),
            email: self.offline_user_email.clone(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the acting user's profile.
    ///
    /// Online sessions round-trip through the backend and adopt the
    /// normalized response; offline sessions merge the patch into the
    /// synthetic user directly and report success.
    pub async fn update_profile(&self, patch: UserPatch) -> Result<Served<User>> {
        let (user, backend_online) = {
            let session = self.session.read().await;
            let session = session.as_ref().ok_or(AdminError::SessionTerminated)?;
            (session.user.clone(), session.backend_online)
        };

        if backend_online {
            let token = self.tokens.get().await.ok_or(AdminError::Unauthenticated)?;
            let path = format!("{}/{}", USERS_ENDPOINT, user.id);
            let body = serde_json::to_value(&patch)?;

            match self.client.put_json::<User>(&path, Some(token), body).await {
                Ok(updated) => {
                    if let Some(session) = self.session.write().await.as_mut() {
                        session.user = updated.clone();
                    }
                    tracing::info!(id = %updated.id, "Profile updated on backend");
                    self.bus
                        .publish("users", EventSource::Session(updated.id.to_string()))
                        .await;
                    Ok(Served::live(updated))
                }
                Err(e) if e.is_auth_rejection() => {
                    tracing::warn!(error = %e, "Token rejected during profile update, terminating session");
                    self.terminate().await?;
                    Err(e)
                }
                Err(e) => Err(e),
            }
        } else {
            let mut updated = user;
            updated.merge_patch(&patch, Utc::now());
            if let Some(session) = self.session.write().await.as_mut() {
                session.user = updated.clone();
            }
            tracing::info!(id = %updated.id, "Profile merged into offline session");
            Ok(Served::fallback(updated))
        }
    }

    /// End the session: clear the token, drop the in-memory session, and
    /// publish the session tag so the caller navigates to sign-in.
    pub async fn logout(&self) -> Result<()> {
        if *self.state.read().await == SessionState::Terminated {
            return Ok(());
        }
        self.terminate().await?;
        tracing::info!("Session terminated by logout");
        Ok(())
    }

    async fn terminate(&self) -> Result<()> {
        self.tokens.clear().await?;
        *self.session.write().await = None;
        *self.state.write().await = SessionState::Terminated;
        self.bus.publish(SESSION_TAG, EventSource::System).await;
        Ok(())
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    pub async fn backend_online(&self) -> bool {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.backend_online)
            .unwrap_or(false)
    }
}
