//! Scripted in-memory transport for pipeline tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::{HttpClient, HttpRequest, Method, RawResponse};
use crate::error::FetchError;

enum Reply {
    Response(RawResponse),
    Timeout,
    Refused,
}

struct Route {
    method: Method,
    url_suffix: String,
    params: Vec<(String, String)>,
    reply: Reply,
}

/// Matches requests against routes in registration order; unmatched requests
/// are refused like a closed port.
#[derive(Default)]
pub struct FixtureClient {
    routes: Vec<Route>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl FixtureClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(mut self, method: Method, url_suffix: &str, params: &[(&str, &str)], reply: Reply) -> Self {
        self.routes.push(Route {
            method,
            url_suffix: url_suffix.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reply,
        });
        self
    }

    pub fn respond(
        self,
        method: Method,
        url_suffix: &str,
        params: &[(&str, &str)],
        status: u16,
        body: &str,
    ) -> Self {
        self.route(
            method,
            url_suffix,
            params,
            Reply::Response(RawResponse::new(status, body)),
        )
    }

    pub fn time_out(self, method: Method, url_suffix: &str, params: &[(&str, &str)]) -> Self {
        self.route(method, url_suffix, params, Reply::Timeout)
    }

    pub fn refuse(self, method: Method, url_suffix: &str, params: &[(&str, &str)]) -> Self {
        self.route(method, url_suffix, params, Reply::Refused)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FixtureClient {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, FetchError> {
        self.seen.lock().unwrap().push(request.clone());

        let route = self.routes.iter().find(|r| {
            r.method == request.method
                && request.url.ends_with(&r.url_suffix)
                && r
                    .params
                    .iter()
                    .all(|(k, v)| request.param(k) == Some(v.as_str()))
        });

        match route.map(|r| &r.reply) {
            Some(Reply::Response(response)) => Ok(response.clone()),
            Some(Reply::Timeout) => Err(FetchError::Timeout {
                url: request.url.clone(),
                timeout_ms: request.timeout.as_millis() as u64,
            }),
            Some(Reply::Refused) | None => Err(FetchError::Other {
                url: request.url.clone(),
                message: "connection refused".to_string(),
            }),
        }
    }
}
