//! HTTP client for the school-holiday dataset.
//!
//! One GET per fetch, no retries. The query always asks for the single record
//! with the earliest start among the periods that end after `today`.

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};

use vacances_core::{Query, QueryTarget};

use crate::config::ApiConfig;
use crate::error::{FetchError, FetchResult};
use crate::record::RawRecord;
use crate::source::{BoxFuture, HolidaySource};

/// HTTP client for the school-holiday calendar API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Client validating TLS certificates.
    strict: Client,
    /// Client accepting any certificate, used when a query disables verification.
    insecure: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: ApiConfig) -> FetchResult<Self> {
        let build = |verify: bool| {
            Client::builder()
                .danger_accept_invalid_certs(!verify)
                .timeout(config.timeout)
                .user_agent(&config.user_agent)
                .build()
                .map_err(|e| FetchError::transport(format!("failed to create HTTP client: {}", e)))
        };

        let strict = build(true)?;
        let insecure = build(false)?;

        Ok(Self {
            strict,
            insecure,
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Builds the request URL for a query.
    ///
    /// The result only depends on the endpoint, the query target and `today`.
    pub fn build_url(&self, query: &Query, today: NaiveDate) -> String {
        let refine = match query.target() {
            QueryTarget::Location(name) => format!("location:{}", name),
            QueryTarget::Zone(zone) => format!("zones:{}", zone.as_str()),
        };
        let filter = format!("end_date>\"{}\"", today.format("%Y-%m-%d"));

        format!(
            "{}?where={}&order_by={}&limit=1&refine={}",
            self.config.endpoint_str(),
            urlencoding::encode(&filter),
            urlencoding::encode("start_date ASC"),
            urlencoding::encode(&refine),
        )
    }

    /// Performs the GET request and extracts the first record.
    pub async fn fetch_record(&self, query: &Query, today: NaiveDate) -> FetchResult<RawRecord> {
        let url = self.build_url(query, today);
        let http = if query.verify_ssl() {
            &self.strict
        } else {
            &self.insecure
        };

        debug!(target_query = %query.target(), %today, "Fetching holiday period");
        trace!(url = %url, "Sending request");

        let response = http
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        trace!(status = %status, "Received response");

        if status != StatusCode::OK {
            warn!(status = %status, "Unexpected response status");
            return Err(FetchError::ApiStatus {
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        RawRecord::from_body(&body)
    }
}

impl HolidaySource for ApiClient {
    fn name(&self) -> &str {
        "education.gouv.fr"
    }

    fn fetch(&self, query: &Query, today: NaiveDate) -> BoxFuture<'_, FetchResult<RawRecord>> {
        let query = query.clone();
        Box::pin(async move { self.fetch_record(&query, today).await })
    }
}
