//! Wire protocol for announcing improvements to a node
//!
//! Builds the announcement envelope from an accepted optimae and issues a
//! single HTTP POST to the node's message endpoint. A 2xx-class status is
//! success; anything else is a failure, logged by the caller and never
//! retried at this layer so step latency stays bounded.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::{Optimae, Parameters};

/// Message type tag on the wire envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "OPTIMAE_ANNOUNCEMENT")]
    OptimaeAnnouncement,
}

/// The wire envelope sent to a node's `/message` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub msg_type: MessageType,
    pub sender_id: String,
    pub payload: serde_json::Value,
}

/// Payload of an optimae announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimaeAnnouncement {
    pub domain_id: String,
    pub optimae_id: Uuid,
    pub parameters: Parameters,
    pub reported_performance: f64,
    /// Best performance before this improvement, for audit/reconciliation
    /// by the receiver. Absent for the first accepted candidate.
    pub previous_best_performance: Option<f64>,
}

impl OptimaeAnnouncement {
    pub fn from_optimae(optimae: &Optimae, previous_best_performance: Option<f64>) -> Self {
        Self {
            domain_id: optimae.domain_id.clone(),
            optimae_id: optimae.id,
            parameters: optimae.parameters.clone(),
            reported_performance: optimae.reported_performance,
            previous_best_performance,
        }
    }
}

/// Errors from submitting an announcement
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Node rejected announcement: HTTP {status}")]
    Rejected { status: u16 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// HTTP client for one node's message endpoint
///
/// Owned by the runner for the duration of a run; a single step at a time
/// uses it, so no synchronization is needed beyond what reqwest provides.
pub struct NodeClient {
    http: Client,
    endpoint: String,
}

impl NodeClient {
    /// Build a client with a bounded per-request timeout
    pub fn connect(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SubmissionError> {
        let endpoint = endpoint.into();
        debug!(%endpoint, ?timeout, "NodeClient::connect: called");
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SubmissionError::Network)?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Announce an accepted optimae to the node
    ///
    /// `previous_best` is the tracker's best before this improvement was
    /// recorded. One request, no retries; any non-2xx status is a rejection.
    pub async fn announce_optimae(
        &self,
        optimae: &Optimae,
        previous_best: Option<f64>,
        sender_id: &str,
    ) -> Result<(), SubmissionError> {
        let announcement = OptimaeAnnouncement::from_optimae(optimae, previous_best);
        let message = Message {
            msg_type: MessageType::OptimaeAnnouncement,
            sender_id: sender_id.to_string(),
            payload: serde_json::to_value(&announcement)?,
        };

        let url = format!("http://{}/message", self.endpoint);
        debug!(%url, optimae_id = %optimae.id, "announce_optimae: posting");

        let response = self.http.post(&url).json(&message).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "announce_optimae: rejected");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!("announce_optimae: accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn sample_optimae() -> Optimae {
        let parameters: Parameters = [
            ("w".to_string(), serde_json::json!(1)),
            ("bias".to_string(), serde_json::json!(0.1)),
        ]
        .into_iter()
        .collect();
        Optimae::new("test-domain", "peer-1", parameters, 0.55, 0.0)
    }

    /// Serve exactly one request with a canned status line, returning the
    /// listener's address.
    async fn spawn_node(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain the request so the client finishes writing its body
            let mut buf = vec![0u8; 65536];
            let mut total = 0;
            loop {
                let n = socket.read(&mut buf[total..]).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                total += n;
                let head = String::from_utf8_lossy(&buf[..total]);
                if let Some(header_end) = head.find("\r\n\r\n") {
                    let content_length = head
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().to_string())
                        })
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    if total >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        addr.to_string()
    }

    #[test]
    fn test_message_matches_wire_contract() {
        let optimae = sample_optimae();
        let announcement = OptimaeAnnouncement::from_optimae(&optimae, Some(0.5));
        let message = Message {
            msg_type: MessageType::OptimaeAnnouncement,
            sender_id: "peer-1".to_string(),
            payload: serde_json::to_value(&announcement).unwrap(),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["msg_type"], "OPTIMAE_ANNOUNCEMENT");
        assert_eq!(value["sender_id"], "peer-1");
        assert_eq!(value["payload"]["domain_id"], "test-domain");
        assert_eq!(value["payload"]["optimae_id"], optimae.id.to_string());
        assert_eq!(value["payload"]["parameters"]["w"], 1);
        assert_eq!(value["payload"]["reported_performance"], 0.55);
        assert_eq!(value["payload"]["previous_best_performance"], 0.5);
    }

    #[test]
    fn test_first_announcement_has_null_previous_best() {
        let announcement = OptimaeAnnouncement::from_optimae(&sample_optimae(), None);
        let value = serde_json::to_value(&announcement).unwrap();
        assert!(value["previous_best_performance"].is_null());
    }

    #[tokio::test]
    async fn test_announce_succeeds_on_2xx() {
        let endpoint = spawn_node("202 Accepted").await;
        let client = NodeClient::connect(endpoint, Duration::from_secs(5)).unwrap();

        client
            .announce_optimae(&sample_optimae(), None, "peer-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_announce_rejected_on_500() {
        let endpoint = spawn_node("500 Internal Server Error").await;
        let client = NodeClient::connect(endpoint, Duration::from_secs(5)).unwrap();

        let err = client
            .announce_optimae(&sample_optimae(), Some(0.5), "peer-1")
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Rejected { status: 500 }));
    }

    #[tokio::test]
    async fn test_announce_network_fault() {
        // Nothing is listening here
        let client = NodeClient::connect("127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let err = client
            .announce_optimae(&sample_optimae(), None, "peer-1")
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Network(_)));
    }
}
