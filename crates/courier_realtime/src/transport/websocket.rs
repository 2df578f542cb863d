use futures::{FutureExt, SinkExt, StreamExt, future::BoxFuture};
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::debug;

use crate::{
    error::TransportError,
    transport::connector::{Connector, Link},
};

pub struct WebSocketConnector {
    url: String,
}

impl WebSocketConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Connector for WebSocketConnector {
    fn connect(&self) -> BoxFuture<'static, Result<Link, TransportError>> {
        let url = self.url.clone();

        async move {
            let (stream, response) = connect_async(url.as_str()).await?;
            debug!(url = %url, status = %response.status(), "WebSocket handshake completed");

            let (sink, stream) = stream.split();

            let sink = sink
                .sink_map_err(TransportError::from)
                .with(|frame: String| {
                    futures::future::ready(Ok::<_, TransportError>(WsMessage::text(frame)))
                });

            // Control frames are handled by tungstenite, only data frames are surfaced.
            let stream = stream.filter_map(|message| {
                futures::future::ready(match message {
                    Ok(WsMessage::Text(text)) => Some(Ok(text.as_str().to_owned())),
                    Ok(WsMessage::Binary(bytes)) => {
                        Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                    }
                    Ok(WsMessage::Close(_)) => Some(Err(TransportError::Closed)),
                    Ok(_) => None,
                    Err(error) => Some(Err(TransportError::from(error))),
                })
            });

            Ok(Link::new(sink, stream))
        }
        .boxed()
    }
}
