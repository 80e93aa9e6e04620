use anyhow::Result;
use async_trait::async_trait;
use interview_core::identity::{AuthEvent, AuthProvider, IdentityCredential, Principal};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;

/// Auth provider backed by a fixed identity from the environment.
///
/// The principal is signed in from startup when a user id is configured. It
/// never changes, so subscribers only ever see the initial state.
pub struct EnvAuthProvider {
    principal: Option<Principal>,
    id_token: Option<SecretString>,
    events: broadcast::Sender<AuthEvent>,
}

impl EnvAuthProvider {
    pub fn new(user_id: Option<String>, id_token: Option<SecretString>) -> Self {
        let (events, _) = broadcast::channel(4);
        Self {
            principal: user_id.map(Principal::new),
            id_token,
            events,
        }
    }

    /// Signs the principal out. Holders of the token cache drop the credential.
    pub fn sign_out(&self) {
        if self.events.send(AuthEvent::SignedOut).is_err() {
            tracing::debug!("sign-out with no subscribers");
        }
    }
}

#[async_trait]
impl AuthProvider for EnvAuthProvider {
    fn current_principal(&self) -> Option<Principal> {
        self.principal.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    async fn fetch_credential(
        &self,
        principal: &Principal,
        _force_refresh: bool,
    ) -> Result<IdentityCredential> {
        match &self.id_token {
            Some(token) => Ok(IdentityCredential::new(token.expose_secret())),
            None => Err(anyhow::anyhow!("no ID_TOKEN configured for {}", principal.uid())),
        }
    }
}
