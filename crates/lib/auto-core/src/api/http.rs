use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use super::{ApiError, ApiMethod, ApiRequest, ApiResult, ApiTransport};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `{instance}/api` with any trailing slashes on the instance removed.
#[must_use]
pub fn api_base_url(instance_url: &str) -> String {
    format!("{}/api", instance_url.trim_end_matches('/'))
}

/// Connection settings for [`HttpTransport`].
#[derive(Clone)]
pub struct HttpTransportConfig {
    pub instance_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransportConfig")
            .field("instance_url", &self.instance_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransportConfig {
    pub fn new(
        instance_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let instance_url: String = instance_url.into();
        Self {
            instance_url: instance_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed transport using HTTP Basic authentication.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    stream_client: Client,
    instance_url: String,
    api_url: String,
    username: String,
    password: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Builds the HTTP clients.
    ///
    /// # Errors
    /// Returns `ApiError::Unexpected` if the TLS backend cannot be initialised.
    pub fn new(config: HttpTransportConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Unexpected(format!("failed to build HTTP client: {err}")))?;
        // Long-lived event streams only bound the connect phase.
        let stream_client = Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Unexpected(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            stream_client,
            api_url: api_base_url(&config.instance_url),
            instance_url: config.instance_url,
            username: config.username,
            password: config.password,
        })
    }

    #[must_use]
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Opens a streaming GET whose body is consumed incrementally.
    pub(crate) async fn open_stream(&self, path: &str) -> ApiResult<Response> {
        let url = format!("{}{path}", self.api_url);
        let response = self
            .stream_client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .send()
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(status_error(response).await)
        }
    }

    pub(crate) fn map_transport_error(&self, err: &reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unreachable {
                base_url: self.instance_url.clone(),
            }
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_request() || err.is_body() {
            ApiError::Network {
                base_url: self.instance_url.clone(),
            }
        } else {
            ApiError::Unexpected(err.to_string())
        }
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<Option<Value>> {
        let method = match request.method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        };
        let url = format!("{}{}", self.api_url, request.path);
        let mut builder = self.authorized(self.client.request(method, url));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.map_transport_error(&err))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

/// Turns a non-success response into `ApiError::Status`, preferring the
/// body's `message`, then `error`, then the reason phrase.
async fn status_error(response: Response) -> ApiError {
    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|value| {
            ["message", "error"].into_iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|text| !text.trim().is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
