use std::time::Duration;

use async_trait::async_trait;
use lexi_config::dictionary::DictionaryConfig;
use lexi_core::{Raced, race_deadline};
use lexi_types::{Entry, LookupResult, Meaning};
use serde::Deserialize;

use crate::{DefinitionProvider, FETCH_FAILED, FetchError, NO_DEFINITION, ProviderMetadata, TIMED_OUT};

/// Client for the Free Dictionary API (dictionaryapi.dev)
#[derive(Clone)]
pub struct FreeDictionaryClient {
    client: reqwest::Client,
    api_base: String,
    timeout: Duration,
}

impl FreeDictionaryClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            timeout,
        }
    }

    pub fn from_config(config: &DictionaryConfig) -> Self {
        Self::new(config.api_base.clone(), config.timeout())
    }

    /// Entry URL for `text`, percent-encoded as a single path segment
    pub fn entry_url(&self, text: &str) -> String {
        format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(text)
        )
    }

    async fn fetch(&self, text: &str) -> Result<LookupResult, FetchError> {
        let url = self.entry_url(text);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let reason = format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
            return Ok(LookupResult::failure(reason.trim_end()));
        }

        let json: serde_json::Value = response.json().await?;
        parse_entries(json)
    }
}

#[async_trait]
impl DefinitionProvider for FreeDictionaryClient {
    async fn lookup(&self, text: &str) -> LookupResult {
        match race_deadline(self.fetch(text), self.timeout).await {
            Raced::Settled(Ok(result)) => result,
            Raced::Settled(Err(e)) => {
                tracing::warn!("Definition fetch for '{}' failed: {}", text, e);
                LookupResult::failure(FETCH_FAILED)
            }
            Raced::TimedOut => {
                tracing::warn!(
                    "Definition fetch for '{}' timed out after {:?}",
                    text,
                    self.timeout
                );
                LookupResult::failure(TIMED_OUT)
            }
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Free Dictionary API".to_string(),
            requires_api_key: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEntry {
    word: String,
    #[serde(default)]
    phonetic: Option<String>,
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: Option<String>,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Deserialize)]
struct ApiDefinition {
    definition: String,
}

impl From<ApiEntry> for Entry {
    fn from(entry: ApiEntry) -> Self {
        Entry {
            word: entry.word,
            phonetic: entry.phonetic,
            meanings: entry
                .meanings
                .into_iter()
                .map(|m| Meaning {
                    part_of_speech: m.part_of_speech,
                    definitions: m.definitions.into_iter().map(|d| d.definition).collect(),
                })
                .collect(),
        }
    }
}

/// Only the first entry of a non-empty array counts
fn parse_entries(json: serde_json::Value) -> Result<LookupResult, FetchError> {
    let first = match json {
        serde_json::Value::Array(mut entries) if !entries.is_empty() => entries.swap_remove(0),
        _ => return Ok(LookupResult::failure(NO_DEFINITION)),
    };

    let entry: ApiEntry = serde_json::from_value(first)?;
    Ok(LookupResult::Success(entry.into()))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    const SERENDIPITY: &str = r#"[
        {
            "word": "serendipity",
            "phonetic": "/ˌsɛɹ.ənˈdɪp.ɪ.ti/",
            "meanings": [
                {
                    "partOfSpeech": "noun",
                    "definitions": [
                        {"definition": "A combination of events which have come together by chance to make a surprisingly good or wonderful outcome.", "synonyms": []}
                    ]
                }
            ]
        },
        {"word": "serendipity", "meanings": []}
    ]"#;

    /// Serve one canned HTTP response; yields the request line that was received
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{addr}/api/v2/entries/en"), rx)
    }

    fn client(base: String) -> FreeDictionaryClient {
        FreeDictionaryClient::new(base, Duration::from_secs(5))
    }

    #[test]
    fn entry_url_encodes_text() {
        let c = client("https://api.dictionaryapi.dev/api/v2/entries/en/".to_string());
        assert_eq!(
            c.entry_url("ice cream"),
            "https://api.dictionaryapi.dev/api/v2/entries/en/ice%20cream"
        );
        assert_eq!(
            c.entry_url("rock'n'roll"),
            "https://api.dictionaryapi.dev/api/v2/entries/en/rock%27n%27roll"
        );
    }

    #[tokio::test]
    async fn success_uses_first_entry_only() {
        let (base, request) = serve_once("200 OK", SERENDIPITY).await;
        let result = client(base).lookup("serendipity").await;

        let LookupResult::Success(entry) = result else {
            panic!("expected success, got {result:?}");
        };
        assert_eq!(entry.word, "serendipity");
        assert_eq!(entry.meanings.len(), 1);
        assert_eq!(entry.meanings[0].part_of_speech.as_deref(), Some("noun"));
        assert!(entry.meanings[0].definitions[0].starts_with("A combination of events"));

        let request_line = request.await.unwrap();
        assert_eq!(request_line, "GET /api/v2/entries/en/serendipity HTTP/1.1");
    }

    #[tokio::test]
    async fn empty_array_is_no_definition() {
        let (base, _) = serve_once("200 OK", "[]").await;
        let result = client(base).lookup("zzzxxqq").await;
        assert_eq!(result, LookupResult::failure(NO_DEFINITION));
    }

    #[tokio::test]
    async fn non_array_is_no_definition() {
        let (base, _) = serve_once("200 OK", r#"{"title": "odd"}"#).await;
        let result = client(base).lookup("odd").await;
        assert_eq!(result, LookupResult::failure(NO_DEFINITION));
    }

    #[tokio::test]
    async fn http_error_reports_status_line() {
        let body = r#"{"title":"No Definitions Found"}"#;
        let (base, _) = serve_once("404 Not Found", body).await;
        let result = client(base).lookup("zzzxxqq").await;
        assert_eq!(result, LookupResult::failure("404 Not Found"));
    }

    #[tokio::test]
    async fn invalid_json_is_fetch_failure() {
        let (base, _) = serve_once("200 OK", "<html>").await;
        let result = client(base).lookup("word").await;
        assert_eq!(result, LookupResult::failure(FETCH_FAILED));
    }

    #[tokio::test]
    async fn malformed_entry_is_fetch_failure() {
        let (base, _) = serve_once("200 OK", r#"[{"meanings": 3}]"#).await;
        let result = client(base).lookup("word").await;
        assert_eq!(result, LookupResult::failure(FETCH_FAILED));
    }

    #[tokio::test]
    async fn refused_connection_is_fetch_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(format!("http://{addr}")).lookup("word").await;
        assert_eq!(result, LookupResult::failure(FETCH_FAILED));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let c = FreeDictionaryClient::new(format!("http://{addr}"), Duration::from_millis(100));
        let result = tokio::time::timeout(Duration::from_secs(2), c.lookup("slow"))
            .await
            .expect("lookup should finish at its own deadline");
        assert_eq!(result, LookupResult::failure(TIMED_OUT));

        hold.abort();
    }
}
