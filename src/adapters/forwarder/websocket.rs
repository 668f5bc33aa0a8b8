//! WebSocket forwarder: pushes events to a live consumer connection.

use std::sync::Arc;

use async_trait::async_trait;
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::errors::WebhookError;
use crate::domain::payment::{ProviderEventData, PurchaseStatus};
use crate::ports::{Catalog, Forwarder};

pub const DEFAULT_WEBSOCKET_URL: &str = "ws://localhost:8765";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Forwards events over a single lazily-established WebSocket connection.
///
/// Marks the order `sent_to_websocket` before attempting delivery. The
/// connection is opened on first use and kept for subsequent events; a
/// send failure drops it and retries once on a fresh connection.
pub struct WebSocketForwarder {
    catalog: Arc<dyn Catalog>,
    url: String,
    connection: Mutex<Option<WsStream>>,
}

impl WebSocketForwarder {
    pub fn new(catalog: Arc<dyn Catalog>, url: impl Into<String>) -> Self {
        Self {
            catalog,
            url: url.into(),
            connection: Mutex::new(None),
        }
    }

    async fn connect(&self) -> Result<WsStream, WebhookError> {
        let (stream, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            WebhookError::CollaboratorFault(format!("websocket connect failed: {e}"))
        })?;
        tracing::debug!(url = %self.url, "websocket connection established");
        Ok(stream)
    }

    async fn send_on(
        connection: &mut Option<WsStream>,
        payload: &str,
    ) -> Result<(), tokio_tungstenite::tungstenite::Error> {
        match connection.as_mut() {
            Some(stream) => stream.send(Message::Text(payload.into())).await,
            None => Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed),
        }
    }
}

#[async_trait]
impl Forwarder for WebSocketForwarder {
    async fn forward_event(&self, event: &ProviderEventData) -> Result<(), WebhookError> {
        self.catalog
            .update_order_status(&event.order_reference(), PurchaseStatus::SentToWebsocket)
            .await?;

        let payload = serde_json::to_string(event)
            .map_err(|e| WebhookError::Validation(format!("event not serializable: {e}")))?;

        let mut connection = self.connection.lock().await;
        if connection.is_none() {
            *connection = Some(self.connect().await?);
        }

        if let Err(first) = Self::send_on(&mut connection, &payload).await {
            // Stale connection; reconnect once and retry
            tracing::warn!(error = %first, "websocket send failed, reconnecting");
            *connection = Some(self.connect().await?);
            if let Err(e) = Self::send_on(&mut connection, &payload).await {
                *connection = None;
                return Err(WebhookError::CollaboratorFault(format!(
                    "websocket relay failed: {e}"
                )));
            }
        }

        tracing::info!(
            provider = %event.provider,
            transaction_id = %event.transaction_id,
            "event relayed over websocket"
        );
        Ok(())
    }
}
