//! End-to-end runner tests against a local mock node

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use don_optimizer::{
    ImprovementTracker, NodeClient, Optimae, OptimizationRunner, OptimizerConfig, Parameters, RunnerState,
};

/// Mock node: accepts connections, records every JSON body it receives,
/// and answers each request with the given status line.
async fn spawn_node(status_line: &'static str) -> (String, Arc<Mutex<Vec<serde_json::Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 65536];
                let mut total = 0;
                let body_start = loop {
                    let n = socket.read(&mut buf[total..]).await.unwrap_or(0);
                    if n == 0 {
                        return;
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
                            break header_end + 4;
                        }
                    }
                };

                if let Ok(body) = serde_json::from_slice::<serde_json::Value>(&buf[body_start..total]) {
                    sink.lock().unwrap().push(body);
                }

                let response =
                    format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr.to_string(), received)
}

fn make_config(node_endpoint: String) -> OptimizerConfig {
    OptimizerConfig {
        domain_id: "sum-of-squares".to_string(),
        strategy: "hill-climb".to_string(),
        strategy_config: serde_json::json!({"dimensions": 2, "init_range": 1.0}),
        node_endpoint,
        step_interval_secs: 0.0,
        max_steps: Some(5),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_loop_announces_improvements_to_node() {
    let (endpoint, received) = spawn_node("200 OK").await;

    let mut runner = OptimizationRunner::new(make_config(endpoint), None);
    runner.load_strategy().unwrap();
    let peer_id = runner.peer_id().to_string();

    let (_tx, rx) = mpsc::channel(1);
    tokio::time::timeout(Duration::from_secs(30), runner.start(rx))
        .await
        .unwrap()
        .unwrap();

    let stats = runner.stats();
    assert_eq!(stats.steps_completed, 5);
    assert_eq!(stats.state, RunnerState::Stopped);
    // The first step always bootstraps an improvement
    assert!(stats.improvements_found >= 1);
    assert!(stats.best_performance.is_some());

    let messages = received.lock().unwrap();
    assert!(!messages.is_empty());

    let first = &messages[0];
    assert_eq!(first["msg_type"], "OPTIMAE_ANNOUNCEMENT");
    assert_eq!(first["sender_id"], peer_id);
    assert_eq!(first["payload"]["domain_id"], "sum-of-squares");
    // Nothing preceded the first accepted candidate
    assert!(first["payload"]["previous_best_performance"].is_null());
    assert!(first["payload"]["parameters"].is_object());
}

#[tokio::test]
async fn test_rejecting_node_does_not_block_local_progress() {
    let (endpoint, received) = spawn_node("500 Internal Server Error").await;

    let mut runner = OptimizationRunner::new(make_config(endpoint), None);
    runner.load_strategy().unwrap();

    let (_tx, rx) = mpsc::channel(1);
    tokio::time::timeout(Duration::from_secs(30), runner.start(rx))
        .await
        .unwrap()
        .unwrap();

    // Every announcement was rejected, yet the local best advanced and the
    // loop ran to its bound
    let stats = runner.stats();
    assert_eq!(stats.steps_completed, 5);
    assert!(stats.improvements_found >= 1);
    assert!(stats.best_performance.is_some());
    assert!(!received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_resubmission_does_not_mutate_local_state() {
    // Acceptance is the mutation point, not submission: announcing the same
    // optimae twice leaves the tracker exactly where it was
    let (endpoint, received) = spawn_node("200 OK").await;
    let client = NodeClient::connect(endpoint, Duration::from_secs(5)).unwrap();

    let params: Parameters = std::iter::once(("w".to_string(), serde_json::json!(1))).collect();
    let mut tracker = ImprovementTracker::new(true);
    tracker.offer(params.clone(), 0.55).unwrap();

    let optimae = Optimae::new("sum-of-squares", "peer-1", params.clone(), 0.55, 0.0);
    client.announce_optimae(&optimae, None, "peer-1").await.unwrap();
    client.announce_optimae(&optimae, None, "peer-1").await.unwrap();

    assert_eq!(tracker.best_performance(), Some(0.55));
    assert_eq!(tracker.best_params(), Some(&params));
    assert_eq!(received.lock().unwrap().len(), 2);
}
