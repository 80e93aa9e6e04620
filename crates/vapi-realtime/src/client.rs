use crate::events::{parse_server_frame, ClientEvent};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use interview_types::{StartRequest, TransportEvent};
use tokio_tungstenite::tungstenite::Message;

mod config;
mod consts;
mod utils;

pub use config::{Config, ConfigBuilder};

pub type ClientTx = tokio::sync::mpsc::Sender<ClientEvent>;
type ServerTx = tokio::sync::broadcast::Sender<TransportEvent>;
pub type ServerRx = tokio::sync::broadcast::Receiver<TransportEvent>;

// Channel capacity, configuration and the client/server transmitters once connected.
pub struct Client {
    capacity: usize,
    config: Config,
    c_tx: Option<ClientTx>,
    s_tx: Option<ServerTx>,
}

impl Client {
    fn new(capacity: usize, config: Config) -> Self {
        Self {
            capacity,
            config,
            c_tx: None,
            s_tx: None,
        }
    }

    async fn connect(&mut self) -> Result<()> {
        if self.c_tx.is_some() {
            return Err(anyhow::anyhow!("already connected"));
        }

        let request = utils::build_request(&self.config)?;
        let (ws_stream, _) = tokio_tungstenite::connect_async(request).await?;
        let (mut write, mut read) = ws_stream.split();

        let (c_tx, mut c_rx) = tokio::sync::mpsc::channel::<ClientEvent>(self.capacity);
        let (s_tx, _) = tokio::sync::broadcast::channel(self.capacity);

        self.c_tx = Some(c_tx);
        self.s_tx = Some(s_tx.clone());

        // Writer: serialize outbound events onto the socket.
        tokio::spawn(async move {
            while let Some(event) = c_rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            tracing::error!("failed to send message: {}", e);
                        }
                    }
                    Err(e) => {
                        tracing::error!("failed to serialize event: {}", e);
                    }
                }
            }
            if let Err(e) = write.close().await {
                tracing::debug!("socket already closed: {}", e);
            }
        });

        // Reader: map inbound frames to transport events and broadcast them.
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = match message {
                    Err(e) => {
                        tracing::error!("failed to read message: {}", e);
                        break;
                    }
                    Ok(message) => message,
                };
                match message {
                    Message::Text(text) => {
                        let Some(event) = parse_server_frame(&text) else {
                            continue;
                        };
                        tracing::debug!("received event: {:?}", event);
                        if let Err(e) = s_tx.send(event) {
                            tracing::error!("failed to send event: {}", e);
                        }
                    }
                    Message::Binary(bin) => {
                        tracing::warn!("unexpected binary message: {} bytes", bin.len());
                    }
                    Message::Close(reason) => {
                        tracing::info!("connection closed: {:?}", reason);
                        break;
                    }
                    _ => {}
                }
            }
            // A dropped connection ends whatever call is in progress. Sessions
            // that are already finished ignore the extra call-end.
            if let Err(e) = s_tx.send(TransportEvent::CallEnd) {
                tracing::error!("failed to send close event: {}", e);
            }
        });
        Ok(())
    }

    // Get a receiver for inbound transport events.
    pub fn server_events(&self) -> Result<ServerRx> {
        match self.s_tx {
            Some(ref tx) => Ok(tx.subscribe()),
            None => Err(anyhow::anyhow!("not connected yet")),
        }
    }

    async fn send_client_event(&mut self, event: ClientEvent) -> Result<()> {
        match self.c_tx {
            Some(ref tx) => {
                tx.send(event).await?;
                Ok(())
            }
            None => Err(anyhow::anyhow!("not connected yet")),
        }
    }

    /// Asks the agent to place a call.
    pub async fn start(&mut self, request: StartRequest) -> Result<()> {
        self.send_client_event(ClientEvent::Start(request)).await
    }

    /// Asks the agent to hang up. The call ends when `call-end` arrives.
    pub async fn stop(&mut self) -> Result<()> {
        self.send_client_event(ClientEvent::Stop).await
    }
}

pub async fn connect_with_config(capacity: usize, config: Config) -> Result<Client> {
    let mut client = Client::new(capacity, config);
    client.connect().await?;
    Ok(client)
}

pub async fn connect() -> Result<Client> {
    connect_with_config(1024, Config::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{AgentTarget, StartOptions};
    use secrecy::SecretString;
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn start_request() -> StartRequest {
        StartRequest::new(
            AgentTarget::Workflow {
                workflow_id: "wf".to_string(),
            },
            StartOptions::transcripts(),
        )
    }

    async fn next_event(events: &mut ServerRx) -> TransportEvent {
        tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event stream closed")
    }

    #[tokio::test]
    async fn dropped_socket_ends_a_restarted_call() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            // First call runs to a clean end.
            ws.next().await.unwrap().unwrap();
            ws.send(Message::Text(r#"{"type":"call-start"}"#.to_string())).await.unwrap();
            ws.send(Message::Text(r#"{"type":"call-end"}"#.to_string())).await.unwrap();

            // Second call starts, then the socket vanishes.
            ws.next().await.unwrap().unwrap();
            ws.send(Message::Text(r#"{"type":"call-start"}"#.to_string())).await.unwrap();
            drop(ws);
        });

        let config = Config::builder()
            .with_base_url(&format!("ws://{addr}"))
            .with_public_key(SecretString::from("pk"))
            .build();
        let mut client = connect_with_config(16, config).await.unwrap();
        let mut events = client.server_events().unwrap();

        client.start(start_request()).await.unwrap();
        assert_eq!(next_event(&mut events).await, TransportEvent::CallStart);
        assert_eq!(next_event(&mut events).await, TransportEvent::CallEnd);

        client.start(start_request()).await.unwrap();
        assert_eq!(next_event(&mut events).await, TransportEvent::CallStart);
        assert_eq!(next_event(&mut events).await, TransportEvent::CallEnd);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn unconnected_client_refuses_traffic() {
        let mut client = Client::new(8, Config::new());
        assert!(client.server_events().is_err());
        assert!(client.stop().await.is_err());
    }
}
