//! WooCommerce REST API client
//!
//! This module provides the HTTP client for the WooCommerce REST API. It
//! handles authentication, error classification and single-page requests;
//! walking the pages of a list endpoint is done by [`Paginator`].

use super::pagination::{Page, Paginator};
use super::query::{list_params, FetchFilter};
use super::retry::{parse_retry_after, RetryPolicy};
use crate::config::StoreConfig;
use crate::config::SecretString;
use crate::domain::ids::Endpoint;
use crate::domain::{FetchError, Result, StrataError};
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Response header carrying the number of pages of a list endpoint
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Error body returned by the WordPress REST API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// WooCommerce REST API client
///
/// # Example
///
/// ```no_run
/// use strata::adapters::woocommerce::{FetchFilter, WooCommerceClient};
/// use strata::config::load_config;
/// use strata::domain::Endpoint;
///
/// # async fn example() -> strata::domain::Result<()> {
/// let config = load_config("strata.toml")?;
/// let client = WooCommerceClient::connect(&config.store).await?;
///
/// let mut pages = client.fetch(Endpoint::Orders, &FetchFilter::All, 100);
/// while let Some(page) = pages.next_page().await? {
///     println!("page {} has {} orders", page.number, page.records.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct WooCommerceClient {
    /// HTTP client for making requests
    client: Client,

    /// `{url}/wp-json/{api_version}/`
    api_root: Url,

    consumer_key: SecretString,
    consumer_secret: SecretString,
    query_string_auth: bool,

    policy: RetryPolicy,
}

impl WooCommerceClient {
    /// Create a client without contacting the store
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Configuration`] if the URL cannot be turned into
    /// an API root or the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let api_root = api_root(&config.url, &config.api_version)?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("strata/", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the store");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            StrataError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            api_root,
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            query_string_auth: config.query_string_auth,
            policy: RetryPolicy::from_config(&config.retry),
        })
    }

    /// Create a client and open a session
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Authentication`] if the store rejects the
    /// credentials, or any fetch error that survives the retry policy.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.start_session().await?;
        Ok(client)
    }

    /// Probe the API index to verify connectivity and credentials
    ///
    /// A 401 here is never retried.
    pub async fn start_session(&self) -> std::result::Result<(), FetchError> {
        let url = &self.api_root;
        self.policy
            .run(move || async move { self.send(url, &[]).await.map(|_| ()) })
            .await?;

        tracing::info!(api_root = %self.api_root, "Connected to store");
        Ok(())
    }

    /// Lazily fetch the pages of a list endpoint
    pub fn fetch(&self, endpoint: Endpoint, filter: &FetchFilter, page_size: u32) -> Paginator<'_> {
        Paginator::new(self, endpoint, list_params(endpoint, filter, page_size))
    }

    /// Fetch one page of a list endpoint, applying the retry policy
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidResponse`] if the body is not a JSON array
    /// or the total-pages header is not a number.
    pub async fn get_page(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        page: u32,
    ) -> std::result::Result<Page, FetchError> {
        let url = self.endpoint_url(endpoint)?;
        let mut params = params.to_vec();
        params.push(("page".to_string(), page.to_string()));

        let url = &url;
        let params = &params;
        self.policy
            .run(move || async move {
                let response = self.send(url, params).await?;
                let total_pages = parse_total_pages(response.headers())?;
                let body = response.text().await.map_err(|e| {
                    FetchError::Connectivity(format!("Failed to read response body: {e}"))
                })?;
                let records = parse_records(&body)?;
                Ok(Page {
                    number: page,
                    records,
                    total_pages,
                })
            })
            .await
    }

    /// Base URL of the REST API
    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> std::result::Result<Url, FetchError> {
        self.api_root.join(endpoint.path()).map_err(|e| {
            FetchError::InvalidResponse(format!("Invalid endpoint URL for {endpoint}: {e}"))
        })
    }

    /// Build authorization for a request
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let key: &str = self.consumer_key.expose_secret().as_ref();
        let secret: &str = self.consumer_secret.expose_secret().as_ref();

        if self.query_string_auth {
            request.query(&[("consumer_key", key), ("consumer_secret", secret)])
        } else {
            let credentials = format!("{key}:{secret}");
            let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
            request.header(AUTHORIZATION, format!("Basic {encoded}"))
        }
    }

    /// Send one GET request and classify the status
    async fn send(
        &self,
        url: &Url,
        params: &[(String, String)],
    ) -> std::result::Result<reqwest::Response, FetchError> {
        let request = self.authorize(self.client.get(url.clone()).query(params));

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Connectivity(format!("Request to {url} timed out"))
            } else {
                FetchError::Connectivity(format!("Request to {url} failed: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        Err(classify_status(status, retry_after.as_deref(), &body))
    }
}

/// Build the API root URL, always ending in `/`
fn api_root(base_url: &str, api_version: &str) -> Result<Url> {
    let root = format!(
        "{}/wp-json/{}/",
        base_url.trim_end_matches('/'),
        api_version.trim_matches('/')
    );
    Url::parse(&root)
        .map_err(|e| StrataError::Configuration(format!("Invalid store URL '{root}': {e}")))
}

/// Map a non-success status to a fetch error
fn classify_status(status: StatusCode, retry_after: Option<&str>, body: &str) -> FetchError {
    let message = error_message(body);
    match status {
        StatusCode::UNAUTHORIZED => FetchError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited {
            retry_after_secs: parse_retry_after(retry_after),
        },
        s if s.is_server_error() => FetchError::Server {
            status: s.as_u16(),
            message,
        },
        s => FetchError::Client {
            status: s.as_u16(),
            message,
        },
    }
}

/// Extract a readable message from an error body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{message} ({code})"),
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ => body.chars().take(200).collect(),
    }
}

/// Read the total page count
///
/// A missing header means the endpoint is not paginated.
fn parse_total_pages(headers: &HeaderMap) -> std::result::Result<Option<u32>, FetchError> {
    let Some(value) = headers.get(TOTAL_PAGES_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .map(Some)
        .ok_or_else(|| {
            FetchError::InvalidResponse(format!(
                "Unparsable {TOTAL_PAGES_HEADER} header: {value:?}"
            ))
        })
}

/// Parse a page body into its records
fn parse_records(body: &str) -> std::result::Result<Vec<Value>, FetchError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(records)) => Ok(records),
        Ok(other) => Err(FetchError::InvalidResponse(format!(
            "Expected a JSON array of records, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(FetchError::InvalidResponse(format!(
            "Response body is not JSON: {e}"
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, RetryConfig};
    use reqwest::header::HeaderValue;

    fn store_config(url: &str) -> StoreConfig {
        StoreConfig {
            url: url.to_string(),
            consumer_key: secret_string("ck_test".to_string()),
            consumer_secret: secret_string("cs_test".to_string()),
            api_version: "wc/v3".to_string(),
            query_string_auth: false,
            timeout_seconds: 5,
            tls_verify: true,
            retry: RetryConfig {
                max_attempts: 5,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
                rate_limit_multiplier: 2.0,
            },
        }
    }

    #[test]
    fn test_api_root() {
        let root = api_root("https://shop.example.com/", "/wc/v3/").unwrap();
        assert_eq!(root.as_str(), "https://shop.example.com/wp-json/wc/v3/");
        assert_eq!(
            root.join("orders").unwrap().as_str(),
            "https://shop.example.com/wp-json/wc/v3/orders"
        );
    }

    #[test]
    fn test_client_creation() {
        let client = WooCommerceClient::new(&store_config("https://shop.example.com")).unwrap();
        assert_eq!(
            client.api_root().as_str(),
            "https://shop.example.com/wp-json/wc/v3/"
        );
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, None, ""),
            FetchError::Authentication(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some("4"), ""),
            FetchError::RateLimited { retry_after_secs } if retry_after_secs == 4.0
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, None, ""),
            FetchError::Server { status: 502, .. }
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, None, ""),
            FetchError::Client { status: 404, .. }
        ));
    }

    #[test]
    fn test_error_message_from_wordpress_body() {
        let body = r#"{"code":"woocommerce_rest_cannot_view","message":"Sorry, you cannot list resources.","data":{"status":401}}"#;
        assert_eq!(
            error_message(body),
            "Sorry, you cannot list resources. (woocommerce_rest_cannot_view)"
        );
        assert_eq!(error_message("<html>oops</html>"), "<html>oops</html>");
    }

    #[test]
    fn test_parse_total_pages() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_total_pages(&headers).unwrap(), None);

        headers.insert("X-WP-TotalPages", HeaderValue::from_static("7"));
        assert_eq!(parse_total_pages(&headers).unwrap(), Some(7));

        headers.insert("X-WP-TotalPages", HeaderValue::from_static("many"));
        assert!(matches!(
            parse_total_pages(&headers),
            Err(FetchError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_records_requires_array() {
        assert_eq!(parse_records(r#"[{"id":1},{"id":2}]"#).unwrap().len(), 2);
        assert!(parse_records(r#"{"id":1}"#).is_err());
        assert!(parse_records("not json").is_err());
    }

    #[tokio::test]
    async fn test_start_session_unauthorized_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/wp-json/wc/v3/")
            .with_status(401)
            .with_body(r#"{"code":"woocommerce_rest_authentication_error","message":"Invalid signature"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = WooCommerceClient::new(&store_config(&server.url())).unwrap();
        let result = client.start_session().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_basic_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let expected = format!(
            "Basic {}",
            general_purpose::STANDARD.encode("ck_test:cs_test")
        );
        let mock = server
            .mock("GET", "/wp-json/wc/v3/")
            .match_header("authorization", expected.as_str())
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = WooCommerceClient::new(&store_config(&server.url())).unwrap();
        client.start_session().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_string_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/wp-json/wc/v3/")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("consumer_key".into(), "ck_test".into()),
                mockito::Matcher::UrlEncoded("consumer_secret".into(), "cs_test".into()),
            ]))
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let mut config = store_config(&server.url());
        config.query_string_auth = true;
        let client = WooCommerceClient::new(&config).unwrap();
        client.start_session().await.unwrap();
        mock.assert_async().await;
    }
}
