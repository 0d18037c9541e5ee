//! Shared HTTP transport for the GitHub and Gitea clients
//!
//! Wraps a `reqwest` client with the platform base URL, the authorization
//! header, request pacing and the mapping of HTTP status codes onto
//! [`ApiError`]. Requests are never retried here.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::pagination::{PAGE_SIZE, Page, next_page_from_link};
use crate::error::{ApiError, Result};

/// Per-request timeout. The run-wide deadline is enforced by the caller.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fallback wait reported when a rate-limit response carries no hint.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Options for building an [`ApiTransport`]
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// API root, e.g. `https://api.github.com` or `https://gitea.com/api/v1`
    pub base_url: String,
    /// Full `Authorization` header value
    pub authorization: String,
    /// Accept invalid TLS certificates
    pub skip_verify: bool,
    /// Client-side pacing of outgoing requests
    pub requests_per_second: u32,
}

/// Authenticated, rate-paced HTTP transport for one platform
pub struct ApiTransport {
    http: HttpClient,
    base_url: String,
    authorization: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl ApiTransport {
    /// Create a new transport
    pub fn new(options: TransportOptions) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("hub2tea/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(options.skip_verify)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(options.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            authorization: options.authorization,
            rate_limiter,
        })
    }

    /// GET a single resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_query(path, &[]).await
    }

    /// GET a single resource with query parameters
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .send(self.request(Method::GET, path).query(query), path)
            .await?;
        parse_json(response).await
    }

    /// GET one page of a listing.
    ///
    /// Sends both `per_page` (GitHub) and `limit` (Gitea) so the same call
    /// works against either platform.
    pub async fn get_page<T: DeserializeOwned>(&self, path: &str, page: u32) -> Result<Page<T>> {
        let query = [
            ("per_page", PAGE_SIZE.to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];
        let response = self
            .send(self.request(Method::GET, path).query(&query), path)
            .await?;

        let next_page = next_page(response.headers());
        let items = parse_json(response).await?;
        Ok(Page { items, next_page })
    }

    /// POST a JSON body and parse the created resource
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body), path)
            .await?;
        parse_json(response).await
    }

    /// POST a JSON body, ignoring the response body
    pub async fn post_no_content<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(self.request(Method::POST, path).json(body), path)
            .await?;
        Ok(())
    }

    /// PUT with an optional JSON body, ignoring the response body
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let mut request = self.request(Method::PUT, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send(request, path).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header("Authorization", &self.authorization)
            .header("Accept", "application/json")
    }

    /// Pace, send and map non-success statuses to errors
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = retry_after(response.headers());
        let rate_limited = is_rate_limited(status, response.headers());
        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body);

        let err = match status {
            _ if rate_limited => ApiError::RateLimit(retry_after),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Unprocessable(message),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            status if status.is_server_error() => {
                ApiError::ServerError(format!("{}: {}", status, message))
            }
            status => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
        };
        Err(err.into())
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let data = response
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
    Ok(data)
}

fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(LINK)
        .and_then(|v| v.to_str().ok())
        .and_then(next_page_from_link)
}

fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs)
}

/// GitHub reports an exhausted quota as 403 with zero remaining requests.
fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

/// Pull the human-readable message out of an error body.
///
/// Both platforms answer errors with `{"message": "..."}`; anything else is
/// returned verbatim.
pub fn extract_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.trim().to_string(),
    }
}
