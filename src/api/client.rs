//! Backend API client implementation.
//!
//! Handles authentication, request/response processing, error handling and
//! retry logic for the condominium REST API.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::auth::{is_public_route, Auth};
use super::error::{error_message, ApiError, Result};
use super::types::{occupied_dates, Page, Resource};
use crate::config::Profile;
use crate::grid::{Row, RowId};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Availability endpoint for space reservations.
const AVAILABILITY_PATH: &str = "cadastros/espacos/reservas/disponibilidade/";

/// The backend API client.
#[derive(Debug, Clone)]
pub struct CondoClient {
    client: Client,
    base_url: String,
    /// Missing when no token is configured; protected routes then answer 401.
    auth: Option<Auth>,
    page_size: u32,
    /// Base delay of the retry backoff.
    retry_delay: Duration,
}

impl CondoClient {
    /// Create a client from a profile, resolving its token.
    ///
    /// A missing token is not an error here: requests go out without
    /// credentials and the backend's 401 is reported to the user.
    #[instrument(skip(profile), fields(profile_name = %profile.name))]
    pub fn new(profile: &Profile, page_size: u32) -> Result<Self> {
        let auth = match Auth::for_profile(&profile.name) {
            Ok(auth) => Some(auth),
            Err(err) => {
                warn!(error = %err, "Continuing without API token");
                None
            }
        };
        info!(url = %profile.url, "Creating API client");
        Self::build(&profile.url, auth, page_size)
    }

    /// Create a client with an explicit token.
    pub fn with_token(base_url: &str, token: Option<&str>, page_size: u32) -> Result<Self> {
        Self::build(base_url, token.map(Auth::new), page_size)
    }

    fn build(base_url: &str, auth: Option<Auth>, page_size: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            auth,
            page_size,
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
        })
    }

    /// Change the base delay between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the JSON and authorization headers.
    fn prepare(&self, request: RequestBuilder, path: &str) -> RequestBuilder {
        let request = request
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        match &self.auth {
            Some(auth) if !is_public_route(path) => {
                request.header(header::AUTHORIZATION, auth.header_value())
            }
            _ => request,
        }
    }

    /// Fetch one page of a resource.
    ///
    /// Calls `GET /<resource>/?page=N&search=S`.
    #[instrument(skip(self), fields(resource = %resource))]
    pub async fn list(&self, resource: Resource, page: u32, search: &str) -> Result<Page> {
        let path = resource.list_path();
        let url = format!(
            "{}?page={}&search={}",
            self.url(&path),
            page,
            urlencoding::encode(search)
        );
        let value = self.get(&url, &path).await?;
        let page = Page::from_value(value, self.page_size)?;
        debug!(rows = page.rows.len(), total_pages = page.total_pages, "Fetched page");
        Ok(page)
    }

    fn patch_request(&self, resource: Resource, id: &RowId, payload: &Row) -> RequestBuilder {
        let path = resource.update_path(id);
        self.prepare(self.client.patch(self.url(&path)), &path)
            .json(payload)
    }

    fn create_request(&self, resource: Resource, payload: &Row) -> RequestBuilder {
        let path = resource.create_path();
        self.prepare(self.client.post(self.url(&path)), &path)
            .json(payload)
    }

    fn delete_request(&self, resource: Resource, id: &RowId) -> Result<RequestBuilder> {
        let path = resource.delete_path(id).ok_or_else(|| {
            ApiError::Validation(format!("{} não podem ser excluídos", resource.title()))
        })?;
        Ok(self.prepare(self.client.delete(self.url(&path)), &path))
    }

    /// Partially update one record.
    ///
    /// Not retried: a timed-out PATCH may already have been applied.
    #[instrument(skip(self, payload), fields(resource = %resource, id = %id))]
    pub async fn patch(&self, resource: Resource, id: &RowId, payload: &Row) -> Result<Value> {
        debug!(fields = payload.len(), "Sending update");
        let response = self.patch_request(resource, id, payload).send().await?;
        let value = self.handle_response(response).await?;
        info!("Record updated");
        Ok(value)
    }

    /// Create one record, returning the backend's representation of it.
    ///
    /// Calls `POST /<resource>/create/`. Not retried.
    #[instrument(skip(self, payload), fields(resource = %resource))]
    pub async fn create(&self, resource: Resource, payload: &Row) -> Result<Value> {
        debug!(fields = payload.len(), "Creating record");
        let response = self.create_request(resource, payload).send().await?;
        let value = self.handle_response(response).await?;
        info!("Record created");
        Ok(value)
    }

    /// Delete one record.
    ///
    /// Calls `DELETE /<resource>/<id>/delete/`.
    #[instrument(skip(self), fields(resource = %resource, id = %id))]
    pub async fn delete(&self, resource: Resource, id: &RowId) -> Result<()> {
        let response = self.delete_request(resource, id)?.send().await?;
        self.handle_response(response).await?;
        info!("Record deleted");
        Ok(())
    }

    /// Dates on which a space is already booked during `month`.
    #[instrument(skip(self), fields(space = %space_id))]
    pub async fn availability(&self, space_id: &RowId, month: NaiveDate) -> Result<Vec<String>> {
        let url = format!(
            "{}?espaco={}&mes={}",
            self.url(AVAILABILITY_PATH),
            urlencoding::encode(&space_id.to_string()),
            month.format("%Y-%m")
        );
        let value = self.get(&url, AVAILABILITY_PATH).await?;
        Ok(occupied_dates(&value))
    }

    /// Perform a GET request with retry on transient failures.
    #[instrument(skip(self, path), fields(url = %url))]
    async fn get(&self, url: &str, path: &str) -> Result<Value> {
        let mut attempts = 0;
        let mut last_error: Option<ApiError> = None;

        while attempts < MAX_RETRIES {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            let result = match self.prepare(self.client.get(url), path).send().await {
                Ok(response) => self.handle_response(response).await,
                Err(err) => Err(ApiError::Network(err)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                    let delay = calculate_retry_delay(self.retry_delay, attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts,
                        delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(ApiError::ServerError("Max retries exceeded".to_string())))
    }

    /// Check the status and parse the JSON body.
    async fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status();
        let url = response.url().to_string();

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        if status.is_success() {
            response
                .json::<Value>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", body);
            Err(error_from_response(status, &url, &body))
        }
    }
}

/// Build an error, preferring the backend's own message as context.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    let context = error_message(body).unwrap_or_else(|| url.to_string());
    ApiError::from_status(status, &context)
}

/// Retry delay with exponential backoff.
fn calculate_retry_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt - 1)
}

/// Remove trailing slashes, warning about plain HTTP outside localhost.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_removes_trailing_slashes() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/api///"),
            "http://localhost:8000/api"
        );
    }

    #[test]
    fn test_url_joins_paths() {
        let client = CondoClient::with_token("http://localhost:8000/api/", None, 10).unwrap();
        assert_eq!(
            client.url("/cadastros/unidades/"),
            "http://localhost:8000/api/cadastros/unidades/"
        );
    }

    #[test]
    fn test_error_from_response_uses_backend_message() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            "http://x/api/cadastros/unidades/1/update/",
            r#"{"error": "Número já cadastrado"}"#,
        );
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "Número já cadastrado"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_from_response_falls_back_to_url() {
        let err = error_from_response(StatusCode::NOT_FOUND, "http://x/api/a/", "");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "http://x/api/a/"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_retry_delay_exponential() {
        let base = Duration::from_millis(RETRY_DELAY_MS);
        assert_eq!(calculate_retry_delay(base, 1), Duration::from_millis(1000));
        assert_eq!(calculate_retry_delay(base, 2), Duration::from_millis(2000));
        assert_eq!(calculate_retry_delay(base, 3), Duration::from_millis(4000));
        assert_eq!(calculate_retry_delay(Duration::ZERO, 3), Duration::ZERO);
    }

    fn client() -> CondoClient {
        CondoClient::with_token("http://localhost:8000/api", Some("abc"), 10).unwrap()
    }

    fn json_body(request: &reqwest::Request) -> Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    fn reservation() -> Row {
        Row::from_value(serde_json::json!({"espaco": 3, "data_reserva": "2099-01-15"})).unwrap()
    }

    #[test]
    fn test_patch_request() {
        let request = client()
            .patch_request(Resource::Units, &RowId::Int(4), &reservation())
            .build()
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::PATCH);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/cadastros/unidades/4/update/"
        );
        assert_eq!(request.headers()[header::AUTHORIZATION], "Token abc");
    }

    #[test]
    fn test_create_request() {
        let request = client()
            .create_request(Resource::Reservations, &reservation())
            .build()
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/cadastros/espacos/reservas/create/"
        );
        assert_eq!(
            json_body(&request),
            serde_json::json!({"espaco": 3, "data_reserva": "2099-01-15"})
        );
    }

    #[test]
    fn test_delete_request() {
        let request = client()
            .delete_request(Resource::Visitors, &RowId::Int(8))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/cadastros/visitantes/8/delete/"
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_users_cannot_be_deleted() {
        match client().delete_request(Resource::Users, &RowId::Int(1)) {
            Err(ApiError::Validation(msg)) => assert!(msg.contains("Usuários")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
