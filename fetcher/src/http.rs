use std::io::Read;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use url::Url;

use crate::error::{BoxError, FetchError};

/// A response whose body has not been read yet.
pub struct HttpResponse {
    pub status: u16,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn text(mut self) -> std::io::Result<String> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Plain GET requests. Implemented over reqwest for real runs.
pub trait Transport: Sync {
    fn get(&self, url: &Url) -> Result<HttpResponse, BoxError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// `None` disables the request timeout entirely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, BoxError> {
        let response = self.client.get(url.clone()).send()?;
        Ok(HttpResponse {
            status: response.status().as_u16(),
            body: Box::new(response),
        })
    }
}

/// Extra attempts for transport failures and 5xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy::default()
    }

    fn should_retry(&self, attempt: u32, result: &Result<HttpResponse, BoxError>) -> bool {
        if attempt >= self.retries {
            return false;
        }
        match result {
            Ok(response) => response.status >= 500,
            Err(_) => true,
        }
    }
}

/// GET with the retry policy applied. The last attempt's result is returned.
pub fn get_with_retry<T: Transport + ?Sized>(
    transport: &T,
    url: &Url,
    policy: &RetryPolicy,
) -> Result<HttpResponse, FetchError> {
    let mut attempt = 0;
    loop {
        log::debug!("GET {}", url);
        let result = transport.get(url);
        if !policy.should_retry(attempt, &result) {
            return result.map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            });
        }

        attempt += 1;
        match &result {
            Ok(response) => log::warn!(
                "HTTP {} from {}, retrying ({}/{})",
                response.status,
                url,
                attempt,
                policy.retries
            ),
            Err(e) => log::warn!(
                "Request to {} failed: {}, retrying ({}/{})",
                url,
                e,
                attempt,
                policy.retries
            ),
        }
        drop(result);
        if !policy.backoff.is_zero() {
            thread::sleep(policy.backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Replays a fixed sequence of results, one per call.
    struct Scripted {
        results: Mutex<Vec<Result<u16, &'static str>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut results: Vec<Result<u16, &'static str>>) -> Self {
            results.reverse();
            Scripted {
                results: Mutex::new(results),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl Transport for Scripted {
        fn get(&self, _url: &Url) -> Result<HttpResponse, BoxError> {
            *self.calls.lock().unwrap() += 1;
            match self.results.lock().unwrap().pop().expect("no scripted result left") {
                Ok(status) => Ok(HttpResponse {
                    status,
                    body: Box::new(Cursor::new(Vec::new())),
                }),
                Err(message) => Err(message.into()),
            }
        }
    }

    fn url() -> Url {
        Url::parse("http://archive.test/movies/").unwrap()
    }

    #[test]
    fn test_no_retry_by_default() {
        let transport = Scripted::new(vec![Err("connection refused")]);
        let result = get_with_retry(&transport, &url(), &RetryPolicy::none());
        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("connection refused"));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_retries_transport_errors_and_server_errors() {
        let transport = Scripted::new(vec![Err("reset"), Ok(503), Ok(200)]);
        let policy = RetryPolicy {
            retries: 2,
            backoff: Duration::ZERO,
        };
        let response = get_with_retry(&transport, &url(), &policy).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let transport = Scripted::new(vec![Ok(404)]);
        let policy = RetryPolicy {
            retries: 3,
            backoff: Duration::ZERO,
        };
        let response = get_with_retry(&transport, &url(), &policy).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_gives_up_after_retries() {
        let transport = Scripted::new(vec![Ok(500), Ok(502)]);
        let policy = RetryPolicy {
            retries: 1,
            backoff: Duration::ZERO,
        };
        let response = get_with_retry(&transport, &url(), &policy).unwrap();
        assert_eq!(response.status, 502);
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_text_is_lossy() {
        let response = HttpResponse {
            status: 200,
            body: Box::new(Cursor::new(b"<a href=\"x.mp4\">\xff</a>".to_vec())),
        };
        assert!(response.text().unwrap().contains("x.mp4"));
    }
}
