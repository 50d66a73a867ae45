//! reqwest-backed implementation of [`HttpClient`]

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{HttpClient, HttpRequest, Method, RawResponse};
use crate::error::{ConfigError, FetchError};

/// Shared connection pool; per-call timeouts come from each request
#[derive(Clone)]
pub struct ReqwestClient {
    http: Client,
}

impl ReqwestClient {
    pub fn new(user_agent: &str) -> Result<Self, ConfigError> {
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, FetchError> {
        // parse_with_params leaves a bare '?' when there are no pairs
        let parsed = if request.query.is_empty() {
            Url::parse(&request.url)
        } else {
            Url::parse_with_params(&request.url, &request.query)
        };
        let url = parsed.map_err(|e| FetchError::InvalidUrl {
            url: request.url.clone(),
            message: e.to_string(),
        })?;
        let url_text = url.to_string();
        let timeout = request.timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }
        builder = builder.timeout(timeout);

        tracing::debug!(
            target: "company_intel::http",
            "{} {} (timeout {}ms)",
            request.method,
            url_text,
            timeout_ms
        );

        // The outer bound also covers body streaming
        let exchange = async {
            let response = builder.send().await.map_err(|e| classify(&url_text, timeout_ms, e))?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url_text.clone(),
                        timeout_ms,
                    }
                } else {
                    FetchError::Body {
                        url: url_text.clone(),
                        source: e,
                    }
                }
            })?;
            Ok::<_, FetchError>(RawResponse { status, body })
        };

        let outcome = tokio::time::timeout(timeout, exchange).await;
        match outcome {
            Ok(result) => {
                if let Ok(response) = &result {
                    tracing::debug!(
                        target: "company_intel::http",
                        "{} {} -> {} ({} bytes)",
                        request.method,
                        url_text,
                        response.status,
                        response.body.len()
                    );
                }
                result
            }
            Err(_) => Err(FetchError::Timeout {
                url: url_text,
                timeout_ms,
            }),
        }
    }
}

fn classify(url: &str, timeout_ms: u64, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms,
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
