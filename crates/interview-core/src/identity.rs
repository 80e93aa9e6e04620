//! Identity token cache.
//!
//! Follows the authentication collaborator's sign-in state and keeps the most
//! recent identity credential available to the feedback handoff. The cache is
//! the only writer; everyone else holds a [`CredentialReader`].

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// An authenticated user as reported by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    uid: String,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

/// Short-lived proof of identity. Never logged, never persisted.
pub struct IdentityCredential {
    token: SecretString,
}

impl IdentityCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }
}

impl fmt::Debug for IdentityCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityCredential([REDACTED])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Principal),
    SignedOut,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The principal signed in right now, if any.
    fn current_principal(&self) -> Option<Principal>;

    /// Subscribes to sign-in state changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    async fn fetch_credential(
        &self,
        principal: &Principal,
        force_refresh: bool,
    ) -> Result<IdentityCredential>;
}

pub type SharedCredential = Option<Arc<IdentityCredential>>;

/// Read-only view of the cached credential.
#[derive(Clone)]
pub struct CredentialReader {
    rx: watch::Receiver<SharedCredential>,
}

impl CredentialReader {
    /// The most recent credential known, or `None` when signed out.
    pub fn current(&self) -> SharedCredential {
        self.rx.borrow().clone()
    }

    /// Waits for the next change. Errors once the cache is gone.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

pub struct TokenCache {
    tx: watch::Sender<SharedCredential>,
}

impl TokenCache {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    pub fn reader(&self) -> CredentialReader {
        CredentialReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Applies one auth-state change.
    ///
    /// A failed fetch leaves the cache empty: a credential for a previous
    /// principal must not outlive a new sign-in.
    pub async fn apply<P>(&self, provider: &P, event: AuthEvent)
    where
        P: AuthProvider + ?Sized,
    {
        match event {
            AuthEvent::SignedIn(principal) => {
                match provider.fetch_credential(&principal, false).await {
                    Ok(credential) => {
                        tracing::debug!("cached credential for {}", principal.uid());
                        self.tx.send_replace(Some(Arc::new(credential)));
                    }
                    Err(e) => {
                        tracing::warn!(
                            "failed to fetch credential for {}: {:?}. Continuing without one.",
                            principal.uid(),
                            e
                        );
                        self.tx.send_replace(None);
                    }
                }
            }
            AuthEvent::SignedOut => {
                tracing::debug!("signed out, clearing credential");
                self.tx.send_replace(None);
            }
        }
    }

    /// Starts following `provider`. The returned guard owns the subscription;
    /// dropping it stops the follower task.
    pub fn activate<P>(self, provider: Arc<P>) -> AuthSubscription
    where
        P: AuthProvider + 'static,
    {
        let reader = self.reader();
        let mut events = provider.subscribe();

        let handle = tokio::spawn(async move {
            if let Some(principal) = provider.current_principal() {
                self.apply(&*provider, AuthEvent::SignedIn(principal)).await;
            }
            loop {
                match events.recv().await {
                    Ok(event) => self.apply(&*provider, event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("auth follower lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        AuthSubscription { handle, reader }
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped auth-state subscription. Released on drop.
pub struct AuthSubscription {
    handle: JoinHandle<()>,
    reader: CredentialReader,
}

impl AuthSubscription {
    pub fn reader(&self) -> CredentialReader {
        self.reader.clone()
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
