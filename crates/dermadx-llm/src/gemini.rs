//! HTTP client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{LlmConfig, LlmError, TextGenerator};

/// Gemini text-generation client.
///
/// Each request is bounded by the configured timeout. A transient failure
/// (connect error, timeout, 429, 5xx) is retried exactly once after the
/// configured backoff.
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let raw = resp.text().await.map_err(|e| self.classify_transport(e))?;
        response_text(serde_json::from_str(&raw)?)
    }

    fn classify_transport(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout.as_secs())
        } else {
            LlmError::Http(e)
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending prompt");

        let text = match self.generate_once(prompt).await {
            Ok(text) => text,
            Err(e) if e.is_transient() => {
                warn!(error = %e, backoff_ms = self.config.retry_backoff.as_millis() as u64, "transient failure, retrying once");
                tokio::time::sleep(self.config.retry_backoff).await;
                self.generate_once(prompt).await?
            }
            Err(e) => return Err(e),
        };

        info!(model = %self.config.model, response_chars = text.len(), "generation complete");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(resp: GenerateResponse) -> Result<String, LlmError> {
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const OK_BODY: &str =
        r#"{"candidates":[{"content":{"parts":[{"text":"Eczema"}],"role":"model"}}]}"#;

    /// Serve one canned HTTP response per accepted connection, in order.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut sock, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut sock).await;
                let reply = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                sock.write_all(reply.as_bytes()).await.unwrap();
                sock.shutdown().await.ok();
            }
        });

        (format!("http://{addr}"), hits)
    }

    async fn read_request(sock: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new(
            LlmConfig::new("test-key")
                .with_base_url(base_url)
                .with_timeout(Duration::from_secs(5))
                .with_retry_backoff(Duration::from_millis(10)),
        )
        .unwrap()
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#
        );
    }

    #[test]
    fn endpoint_includes_model() {
        let c = client("http://localhost:9");
        assert_eq!(
            c.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn empty_api_key_rejected() {
        assert!(matches!(
            GeminiClient::new(LlmConfig::new("  ")),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn response_text_joins_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Q1?\n"},{"text":"Q2?"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response_text(resp).unwrap(), "Q1?\nQ2?");
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let resp: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(response_text(resp), Err(LlmError::EmptyResponse)));
    }

    #[tokio::test]
    async fn successful_generation() {
        let (url, hits) = serve(vec![(200, OK_BODY)]).await;
        let text = client(&url).generate("prompt").await.unwrap();
        assert_eq!(text, "Eczema");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_once_on_server_error() {
        let (url, hits) = serve(vec![(503, "{}"), (200, OK_BODY)]).await;
        let text = client(&url).generate("prompt").await.unwrap();
        assert_eq!(text, "Eczema");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_one_retry() {
        let (url, hits) = serve(vec![(500, "{}"), (502, "bad gateway")]).await;
        let err = client(&url).generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Server { status: 502, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn client_error_not_retried() {
        let (url, hits) = serve(vec![(400, r#"{"error":"bad request"}"#)]).await;
        let err = client(&url).generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Server { status: 400, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_error() {
        let (url, _) = serve(vec![(200, "<html>oops</html>")]).await;
        let err = client(&url).generate("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Json(_)));
    }
}
