use std::{future::Future, time::Duration};

use api_types::transaction::{Transaction, TransactionsResponse};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::error::{AppError, Result};

/// How often and how patiently a failed request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("{message}")]
    Network { message: String },
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        payload: Option<String>,
    },
    #[error("{message}")]
    Parse {
        message: String,
        payload: Option<String>,
    },
}

impl FetchError {
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::Server { message, .. }
            | Self::Parse { message, .. } => message,
        }
    }

    /// HTTP status, present only when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Server { payload, .. } | Self::Parse { payload, .. } => payload.as_deref(),
            Self::Network { .. } => None,
        }
    }

    fn network(err: reqwest::Error) -> Self {
        Self::Network {
            message: format!("Error: {err}"),
        }
    }

    fn server(status: StatusCode, body: String) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|res| res.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| {
                format!(
                    "Error {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown error")
                )
            });
        Self::Server {
            status: status.as_u16(),
            message,
            payload: (!body.is_empty()).then_some(body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// HTTP client of the transactions endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl Client {
    pub fn new(base_url: &str, retry: RetryPolicy) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| invalid_base_url(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid_base_url(format!(
                "invalid base_url: {base_url} cannot hold a path"
            )));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("txdash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url,
            http,
            retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET {base_url}`, unwrapping the `data` list.
    pub async fn fetch_all(&self) -> std::result::Result<Vec<Transaction>, FetchError> {
        let url = self.base_url.clone();
        let response: TransactionsResponse =
            with_retry(self.retry, "fetch transactions", || self.get_json(url.clone())).await?;
        debug!(count = response.data.len(), "transactions fetched");
        Ok(response.data)
    }

    /// `GET {base_url}/{id}`.
    pub async fn fetch_one(&self, id: &str) -> std::result::Result<Transaction, FetchError> {
        let url = self.transaction_url(id);
        with_retry(self.retry, "fetch transaction", || self.get_json(url.clone())).await
    }

    fn transaction_url(&self, id: &str) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> std::result::Result<T, FetchError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FetchError::network)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::network)?;

        if !status.is_success() {
            return Err(FetchError::server(status, body));
        }

        serde_json::from_str(&body).map_err(|err| FetchError::Parse {
            message: format!("Error: {err}"),
            payload: Some(body),
        })
    }
}

fn invalid_base_url(message: String) -> AppError {
    AppError::Config(::config::ConfigError::Message(message))
}

/// Runs `op` until it succeeds or the policy is exhausted, sleeping
/// `policy.delay` between attempts. Every kind of failure is retried.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
) -> std::result::Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, FetchError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts() => {
                warn!(
                    attempt,
                    attempts = policy.attempts(),
                    status = ?err.status(),
                    "{what} failed, retrying: {err}"
                );
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
            Err(err) => {
                error!(
                    attempts = policy.attempts(),
                    status = ?err.status(),
                    payload = ?err.payload(),
                    "{what} failed: {err}"
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    const ONE: &str = r#"{"id":"GZEN23784UBV2","status":"SUCCESSFUL","paymentMethod":"CARD","salesType":"TERMINAL","createdAt":1728950400000,"transactionReference":7310,"amount":1000}"#;

    fn immediate(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            delay: Duration::ZERO,
        }
    }

    /// Serves one canned response per connection, in order, then stops.
    async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let read = socket.read(&mut buf).await.unwrap();
                    if read == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..read]);
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        (format!("http://{addr}/api/transactions"), hits)
    }

    #[tokio::test]
    async fn fetch_all_unwraps_data() {
        let (url, hits) = serve(vec![(200, format!(r#"{{"data":[{ONE}]}}"#))]).await;
        let client = Client::new(&url, immediate(3)).unwrap();

        let transactions = client.fetch_all().await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, "GZEN23784UBV2");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (url, hits) = serve(vec![
            (503, String::new()),
            (200, format!(r#"{{"data":[{ONE},{ONE}]}}"#)),
        ])
        .await;
        let client = Client::new(&url, immediate(3)).unwrap();

        let transactions = client.fetch_all().await.unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn server_error_after_exhausting_retries() {
        let body = r#"{"error":"boom"}"#.to_string();
        let (url, hits) = serve(vec![(500, body.clone()); 4]).await;
        let client = Client::new(&url, immediate(3)).unwrap();

        let err = client.fetch_all().await.unwrap_err();
        assert_eq!(hits.load(Ordering::SeqCst), 4);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message(), "Error 500: Internal Server Error");
        assert_eq!(err.payload(), Some(body.as_str()));
    }

    #[tokio::test]
    async fn server_message_field_wins() {
        let (url, _) = serve(vec![(404, r#"{"message":"Transacción no encontrada"}"#.to_string())]).await;
        let client = Client::new(&url, immediate(0)).unwrap();

        let err = client.fetch_one("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "Transacción no encontrada");
    }

    #[tokio::test]
    async fn fetch_one_appends_id() {
        let (url, _) = serve(vec![(200, ONE.to_string())]).await;
        let client = Client::new(&url, immediate(0)).unwrap();
        assert_eq!(
            client.transaction_url("GZEN23784UBV2").as_str(),
            format!("{url}/GZEN23784UBV2")
        );

        let transaction = client.fetch_one("GZEN23784UBV2").await.unwrap();
        assert_eq!(transaction.transaction_reference, 7310);
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let (url, hits) = serve(vec![(200, "{\"data\":".to_string()); 2]).await;
        let client = Client::new(&url, immediate(1)).unwrap();

        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert_eq!(err.status(), None);
        assert_eq!(err.payload(), Some("{\"data\":"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(&format!("http://{addr}/api"), immediate(2)).unwrap();
        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(err.status(), None);
        assert_eq!(err.payload(), None);
        assert!(err.message().starts_with("Error"));
    }

    #[tokio::test]
    async fn retry_gives_up_after_policy_attempts() {
        let calls = AtomicUsize::new(0);
        let result: std::result::Result<(), FetchError> = with_retry(immediate(3), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(FetchError::Network {
                    message: "down".to_string(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(Client::new("not a url", RetryPolicy::default()).is_err());
        assert!(Client::new("mailto:someone@example.com", RetryPolicy::default()).is_err());
    }
}
