use std::sync::Arc;

use mise_data::{DataError, DataGateway, Gateway, NewUser, Session, User, UserPatch};
use mise_security::{Permissions, SessionView};
use tokio::sync::RwLock;

use crate::notice::{NoticeReceiver, Notifier};

#[derive(Debug, Clone)]
struct AuthState {
    user: Option<User>,
    is_loading: bool,
    access_token: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
            access_token: None,
        }
    }
}

/// The signed-in user, as seen by the rest of the application.
///
/// Starts out loading; [`initialize`](AuthSession::initialize) resolves it.
pub struct AuthSession<G: DataGateway = Gateway> {
    gateway: Arc<G>,
    state: RwLock<AuthState>,
    notifier: Notifier,
}

impl<G: DataGateway> AuthSession<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            state: RwLock::new(AuthState::default()),
            notifier: Notifier::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn subscribe(&self) -> NoticeReceiver {
        self.notifier.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            user: state.user.clone(),
            is_loading: state.is_loading,
            access_token: state.access_token.clone(),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    /// Resolve the session left over from a previous run. Any failure is
    /// treated as signed out; loading always ends.
    pub async fn initialize(&self) {
        let resolved = match self.gateway.get_session().await {
            Ok(Some(session)) => match self.gateway.get_user(&session.user_id).await {
                Ok(user) => Some((user, session.access_token)),
                Err(err) => {
                    tracing::warn!(user_id = %session.user_id, error = %err, "session without a profile");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "could not restore session");
                None
            }
        };

        let mut state = self.state.write().await;
        match resolved {
            Some((user, token)) => {
                tracing::info!(user_id = %user.id, "session restored");
                state.user = Some(user);
                state.access_token = token;
            }
            None => {
                state.user = None;
                state.access_token = None;
            }
        }
        state.is_loading = false;
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, DataError> {
        let outcome = match self.gateway.sign_in(email, password).await {
            Ok(session) => self.establish(session).await,
            Err(err) => Err(err),
        };
        match &outcome {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "signed in");
                self.notifier.success("Welcome back!");
            }
            Err(err) => self.notifier.error(err.user_message()),
        }
        outcome
    }

    /// Create an account and its profile row. New profiles are plain users.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
        full_name: Option<&str>,
    ) -> Result<User, DataError> {
        let outcome = self.register(email, password, username, full_name).await;
        match &outcome {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account created");
                self.notifier.success("Account created successfully!");
            }
            Err(err) => self.notifier.error(err.user_message()),
        }
        outcome
    }

    /// Sign out. Local state is cleared even when the backend call fails.
    pub async fn sign_out(&self) -> Result<(), DataError> {
        let result = self.gateway.sign_out().await;
        {
            let mut state = self.state.write().await;
            state.user = None;
            state.access_token = None;
        }
        match &result {
            Ok(()) => self.notifier.success("Signed out successfully"),
            Err(err) => {
                tracing::warn!(error = %err, "sign-out failed on the backend");
                self.notifier.error("Error signing out");
            }
        }
        result
    }

    /// Apply `patch` to the signed-in user's profile.
    pub async fn update_profile(&self, patch: &UserPatch) -> Result<User, DataError> {
        let Some(user_id) = self.state.read().await.user.as_ref().map(|u| u.id.clone()) else {
            return Err(DataError::Unauthenticated);
        };

        if let Err(err) = self.gateway.update_user(&user_id, patch).await {
            tracing::warn!(%user_id, error = %err, "profile update failed");
            self.notifier.error("Error updating profile");
            return Err(err);
        }

        let mut state = self.state.write().await;
        let Some(user) = state.user.as_mut().filter(|u| u.id == user_id) else {
            // Signed out while the update was in flight.
            return Err(DataError::Unauthenticated);
        };
        patch.apply(user);
        let updated = user.clone();
        drop(state);
        self.notifier.success("Profile updated successfully");
        Ok(updated)
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
        full_name: Option<&str>,
    ) -> Result<User, DataError> {
        if self.gateway.find_user_by_username(username).await?.is_some() {
            return Err(DataError::Conflict("Username is already taken".into()));
        }

        let session = self.gateway.sign_up(email, password).await?;
        let profile = NewUser::new(
            session.user_id.clone(),
            email,
            username,
            full_name.map(str::to_string),
        );
        let user = self.gateway.create_user(&profile).await.map_err(|err| {
            tracing::error!(user_id = %session.user_id, error = %err, "profile insert failed");
            err
        })?;

        // Without a token the account still awaits email confirmation.
        if session.access_token.is_some() {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
            state.access_token = session.access_token;
        }
        Ok(user)
    }

    async fn establish(&self, session: Session) -> Result<User, DataError> {
        let user = self.gateway.get_user(&session.user_id).await?;
        let mut state = self.state.write().await;
        state.user = Some(user.clone());
        state.access_token = session.access_token;
        state.is_loading = false;
        Ok(user)
    }
}

/// Point-in-time view of an [`AuthSession`], usable with the route guard.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_loading: bool,
    pub access_token: Option<String>,
}

impl SessionSnapshot {
    pub fn permissions(&self) -> Permissions<'_, User> {
        Permissions::new(self.user.as_ref())
    }
}

impl SessionView for SessionSnapshot {
    type User = User;

    fn is_loading(&self) -> bool {
        self.is_loading
    }

    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
