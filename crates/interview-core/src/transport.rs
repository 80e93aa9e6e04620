use anyhow::Result;
use async_trait::async_trait;
use interview_types::{StartRequest, TransportEvent};
#[cfg(test)]
use mockall::automock;
use tokio::sync::broadcast;

/// The real-time call collaborator.
///
/// One handle is owned per session and injected into the call state machine,
/// so independent sessions never share a connection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send {
    /// Places a call with the remote agent described by `request`.
    async fn start(&mut self, request: StartRequest) -> Result<()>;

    /// Hangs up the live call, if any.
    async fn stop(&mut self) -> Result<()>;

    /// Subscribes to transport events. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}
