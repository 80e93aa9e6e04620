use anyhow::{Context, Result};
use async_trait::async_trait;
use interview_core::transport::Transport;
use interview_types::{StartRequest, TransportEvent};
use tokio::sync::broadcast;
use vapi_realtime::{Config, ServerRx};

/// The slice of the voice agent client the adapter drives. Lets the adapter be
/// tested against a mock.
#[async_trait]
pub trait VapiClient: Send {
    async fn start(&mut self, request: StartRequest) -> Result<()>;
    async fn stop(&mut self) -> Result<()>;
    fn server_events(&self) -> Result<ServerRx>;
}

#[async_trait]
impl VapiClient for vapi_realtime::Client {
    async fn start(&mut self, request: StartRequest) -> Result<()> {
        vapi_realtime::Client::start(self, request).await
    }

    async fn stop(&mut self) -> Result<()> {
        vapi_realtime::Client::stop(self).await
    }

    fn server_events(&self) -> Result<ServerRx> {
        vapi_realtime::Client::server_events(self)
    }
}

/// Implements the session's `Transport` over a voice agent client.
pub struct VapiAdapter<C: VapiClient> {
    client: C,
    events: ServerRx,
}

impl VapiAdapter<vapi_realtime::Client> {
    pub async fn connect(config: Config) -> Result<Self> {
        let client = vapi_realtime::connect_with_config(1024, config)
            .await
            .context("Failed to connect to the voice agent")?;
        Self::new(client)
    }
}

impl<C: VapiClient> VapiAdapter<C> {
    pub fn new(client: C) -> Result<Self> {
        let events = client
            .server_events()
            .context("Failed to get server events channel")?;
        Ok(Self { client, events })
    }
}

#[async_trait]
impl<C: VapiClient> Transport for VapiAdapter<C> {
    async fn start(&mut self, request: StartRequest) -> Result<()> {
        tracing::debug!("placing call: {:?}", request.target());
        self.client
            .start(request)
            .await
            .context("Adapter failed to send start request")
    }

    async fn stop(&mut self) -> Result<()> {
        self.client
            .stop()
            .await
            .context("Adapter failed to send stop request")
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.resubscribe()
    }
}
