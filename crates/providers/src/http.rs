//! Shared HTTP plumbing.

use crate::error::{ErrorKind, Result};
use emberly_library::Identifiers;
use exn::ResultExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("emberly/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every provider.
///
/// No retries are configured: a failed request fails, and callers decide
/// how to degrade.
pub fn client(timeout: Duration) -> Result<Client> {
    Client::builder().timeout(timeout).user_agent(USER_AGENT).build().or_raise(|| ErrorKind::Client)
}

/// Send a request, failing on transport errors only.
pub(crate) async fn send(request: RequestBuilder, label: &str) -> Result<Response> {
    request.send().await.or_raise(|| ErrorKind::Request(label.to_string()))
}

/// Send a request and decode a successful JSON response.
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder, label: &str) -> Result<T> {
    let response = send(request, label).await?;
    let status = response.status();
    if !status.is_success() {
        exn::bail!(ErrorKind::Status(status.as_u16(), label.to_string()));
    }
    read_json(response, label).await
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, label: &str) -> Result<T> {
    let body = response.bytes().await.or_raise(|| ErrorKind::Request(label.to_string()))?;
    decode(&body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).or_raise(|| ErrorKind::Decode)
}

/// Identifier value as a string. Upstreams mix numbers and strings, and use
/// `null` for unknown ids.
pub(crate) fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize a provider's `key -> id` map. Unknown keys are ignored.
pub(crate) fn identifiers<'a>(ids: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Identifiers {
    let mut identifiers = Identifiers::new();
    for (key, value) in ids {
        if let Some(value) = id_value(value) {
            identifiers.insert_key(key, value);
        }
    }
    identifiers
}

/// A local HTTP server answering with canned responses, for tests.
#[cfg(test)]
pub(crate) mod scripted {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Answer one connection per `(status, body)` pair, in order, and return
    /// the server's base URL. Every response closes its connection.
    pub(crate) async fn serve(responses: Vec<(u16, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {status} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\
                     connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    /// Consume the request head and body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = socket.read(&mut chunk).await.unwrap_or(0);
            if read == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..read]);
            let Some(end) = buf.windows(4).position(|window| window == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}
