//! Remote scoring server client

use crate::{ScoreInput, ScoringBackend, ScoringError};
use blindsketch_ipc::{ScoreReport, ScorerReply};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::debug;

/// Scoring client that connects to a WebSocket server.
///
/// One connection per drawing: the request goes out as JSON text, the PNG
/// as a binary frame, and the first text frame back is the reply.
pub struct RemoteScorer {
    server_url: String,
}

impl RemoteScorer {
    pub fn new(server_url: String) -> Self {
        Self { server_url }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

impl ScoringBackend for RemoteScorer {
    async fn score(&mut self, input: &ScoreInput) -> Result<ScoreReport, ScoringError> {
        let (ws_stream, _) = connect_async(self.server_url.as_str())
            .await
            .map_err(|e| ScoringError::Connection(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        let request_json =
            serde_json::to_string(&input.request).map_err(|e| ScoringError::InvalidResponse(e.to_string()))?;

        write
            .send(Message::Text(request_json.into()))
            .await
            .map_err(|e| ScoringError::Connection(e.to_string()))?;
        write
            .send(Message::Binary(input.png.clone().into()))
            .await
            .map_err(|e| ScoringError::Connection(e.to_string()))?;

        let mut reply: Option<ScorerReply> = None;

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let parsed = serde_json::from_str::<ScorerReply>(&text)
                        .map_err(|e| ScoringError::InvalidResponse(e.to_string()))?;
                    reply = Some(parsed);
                    break;
                }
                Ok(Message::Close(_)) => break,
                Err(e) => return Err(ScoringError::Connection(e.to_string())),
                _ => {}
            }
        }

        if let Err(e) = write.send(Message::Close(None)).await {
            debug!(error = %e, "scorer close handshake failed");
        }

        match reply {
            Some(ScorerReply::Score(submission)) => submission
                .into_report()
                .map_err(|e| ScoringError::InvalidResponse(e.to_string())),
            Some(ScorerReply::Error { message }) => Err(ScoringError::Scoring(message)),
            None => Err(ScoringError::InvalidResponse("No reply received".into())),
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
