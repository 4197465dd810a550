//! Raw line loop.
//!
//! Reads `{"method": <operation>, "params": {...}}` objects, one per line,
//! and answers each with the operation's response envelope, or with
//! `{"error": "..."}` when the line itself is unusable. Runs until the input
//! ends; a bad line never stops the loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::handlers::Response;
use crate::transport::LineChannel;

#[derive(Debug, Deserialize)]
struct RawRequest {
    method: Option<Value>,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RawReply {
    Error { error: String },
    Response(Response),
}

impl RawReply {
    fn error(message: impl Into<String>) -> Self {
        RawReply::Error {
            error: message.into(),
        }
    }
}

/// Serve requests from `reader` until end of input.
pub async fn run<R, W>(dispatcher: &Dispatcher, reader: R, writer: W) -> std::io::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut channel = LineChannel::new(reader, writer);
    info!("Raw stdio loop running");

    while let Some(line) = channel.next_line().await? {
        let reply = handle_line(dispatcher, &line).await;
        channel.send(&reply).await?;
    }

    info!("Input closed, shutting down");
    Ok(channel.into_writer())
}

async fn handle_line(dispatcher: &Dispatcher, line: &str) -> RawReply {
    let request: RawRequest = match serde_json::from_str(line) {
        Ok(req) => req,
        Err(e) => {
            warn!("Invalid JSON on input: {}", e);
            return RawReply::error(format!("Invalid JSON: {}", e));
        }
    };

    let method = match request.method {
        Some(Value::String(method)) => method,
        _ => return RawReply::error("Missing method"),
    };

    RawReply::Response(dispatcher.dispatch(&method, &request.params).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::FakeStore;
    use std::sync::Arc;

    async fn run_lines(input: &str) -> Vec<Value> {
        let dispatcher = Dispatcher::new(Arc::new(FakeStore::new()));
        let out = run(&dispatcher, input.as_bytes(), Vec::new()).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_stop_loop() {
        let input = concat!(
            "{\"method\": \"create_collection\", \"params\": {\"name\": \"docs\"}}\n",
            "{not json\n",
            "{\"method\": \"list_collections\"}\n",
        );
        let replies = run_lines(input).await;
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["success"], true);
        assert!(replies[1]["error"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(replies[2]["success"], true);
        assert_eq!(replies[2]["collections"][0]["name"], "docs");
    }

    #[tokio::test]
    async fn test_missing_method() {
        let replies = run_lines("{\"params\": {}}\n{\"method\": 7}\n").await;
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["error"], "Missing method");
        assert_eq!(replies[1]["error"], "Missing method");
    }

    #[tokio::test]
    async fn test_unknown_method_is_envelope() {
        let replies = run_lines("{\"method\": \"vacuum\", \"params\": {}}\n").await;
        assert_eq!(replies[0]["success"], false);
        assert_eq!(replies[0]["message"], "Unknown operation: vacuum");
    }

    #[tokio::test]
    async fn test_one_reply_per_request_in_order() {
        let input = concat!(
            "{\"method\": \"create_collection\", \"params\": {\"name\": \"docs\", \"metadata\": {\"k\": \"v\"}}}\n",
            "{\"method\": \"add_documents\", \"params\": {\"collection_name\": \"docs\", \"documents\": [\"a\", \"b\"], \"ids\": [\"1\", \"2\"]}}\n",
            "\n",
            "{\"method\": \"query_collection\", \"params\": {\"collection_name\": \"docs\", \"query_texts\": [\"a\"], \"n_results\": 1}}\n",
            "{\"method\": \"delete_collection\", \"params\": {\"collection_name\": \"docs\"}}\n",
            "{\"method\": \"get_collection_info\", \"params\": {\"collection_name\": \"docs\"}}\n",
        );
        let replies = run_lines(input).await;
        assert_eq!(replies.len(), 5);
        assert_eq!(replies[0]["count"], 0);
        assert_eq!(replies[1]["count"], 2);
        assert_eq!(replies[2]["results"][0]["results"][0]["document"], "a");
        assert_eq!(replies[3]["success"], true);
        assert_eq!(replies[4]["error_kind"], "NotFound");
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(run_lines("").await.is_empty());
    }
}
