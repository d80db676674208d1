//! ApiClient against a local stub of the dataset endpoint.
//!
//! Each test starts an axum server on a random port that answers the records
//! route with a canned status and body, and records how it was called.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use chrono::{NaiveDate, TimeZone, Utc};
use tokio::net::TcpListener;

use vacances_api::{ApiClient, ApiConfig, FetchError, HolidaySource, normalize_record};
use vacances_core::{Query, Zone};

const NOEL: &str = r#"{
  "total_count": 1,
  "results": [{
    "description": "Noël",
    "population": "-",
    "start_date": "2024-12-21",
    "end_date": "2025-01-05",
    "location": "Paris",
    "zones": "Zone C",
    "annee_scolaire": "2024-2025"
  }]
}"#;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
}

impl Stub {
    fn new(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
            hits: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(None)),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

async fn records(State(stub): State<Stub>, RawQuery(query): RawQuery) -> (StatusCode, String) {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    *stub.last_query.lock().unwrap() = query;
    if !stub.delay.is_zero() {
        tokio::time::sleep(stub.delay).await;
    }
    (stub.status, stub.body.clone())
}

/// Starts the stub and returns its records endpoint.
async fn serve(stub: Stub) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/records", get(records))
        .with_state(stub);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/records", addr)
}

fn client_for(endpoint: &str, timeout: Duration) -> ApiClient {
    let config = ApiConfig::new(endpoint).unwrap().with_timeout(timeout);
    ApiClient::new(config).unwrap()
}

fn christmas_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
}

#[tokio::test]
async fn fetches_first_record() {
    let stub = Stub::new(StatusCode::OK, NOEL);
    let endpoint = serve(stub.clone()).await;
    let client = client_for(&endpoint, Duration::from_secs(5));

    let query = Query::location("Paris").unwrap();
    let record = client.fetch_record(&query, christmas_day()).await.unwrap();

    assert_eq!(record.description, "Noël");
    assert_eq!(record.zones, "Zone C");
    assert_eq!(stub.hits(), 1);

    let sent = stub.last_query().unwrap();
    assert!(sent.contains("where=end_date%3E%222024-12-25%22"));
    assert!(sent.contains("order_by=start_date%20ASC"));
    assert!(sent.contains("limit=1"));
    assert!(sent.ends_with("refine=location%3AParis"));
}

#[tokio::test]
async fn zone_query_refines_on_zones() {
    let stub = Stub::new(StatusCode::OK, NOEL);
    let endpoint = serve(stub.clone()).await;
    let client = client_for(&endpoint, Duration::from_secs(5));

    client
        .fetch_record(&Query::zone(Zone::C), christmas_day())
        .await
        .unwrap();

    assert!(stub.last_query().unwrap().ends_with("refine=zones%3AZone%20C"));
}

#[tokio::test]
async fn record_normalizes_to_holiday_status() {
    let endpoint = serve(Stub::new(StatusCode::OK, NOEL)).await;
    let client = client_for(&endpoint, Duration::from_secs(5));
    let source: Arc<dyn HolidaySource> = Arc::new(client);

    let now = Utc.with_ymd_and_hms(2024, 12, 25, 9, 0, 0).unwrap();
    let query = Query::location("Paris").unwrap();
    let record = source.fetch(&query, now.date_naive()).await.unwrap();
    let status = normalize_record(&record, now).unwrap();

    assert!(status.on_vacation);
    assert_eq!(status.description, "Noël");
    assert_eq!(status.fetched_at, now);
}

#[tokio::test]
async fn server_error_status() {
    let endpoint = serve(Stub::new(StatusCode::INTERNAL_SERVER_ERROR, "oops")).await;
    let client = client_for(&endpoint, Duration::from_secs(5));

    let err = client
        .fetch_record(&Query::zone(Zone::A), christmas_day())
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::ApiStatus { code: 500 });
}

#[tokio::test]
async fn not_found_status() {
    let endpoint = serve(Stub::new(StatusCode::NOT_FOUND, "{}")).await;
    let client = client_for(&endpoint, Duration::from_secs(5));

    let err = client
        .fetch_record(&Query::zone(Zone::A), christmas_day())
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::ApiStatus { code: 404 });
}

#[tokio::test]
async fn empty_results() {
    let endpoint = serve(Stub::new(
        StatusCode::OK,
        r#"{"total_count": 0, "results": []}"#,
    ))
    .await;
    let client = client_for(&endpoint, Duration::from_secs(5));

    let err = client
        .fetch_record(&Query::location("Nowhere").unwrap(), christmas_day())
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::NoData);
}

#[tokio::test]
async fn malformed_body() {
    let endpoint = serve(Stub::new(StatusCode::OK, "not json")).await;
    let client = client_for(&endpoint, Duration::from_secs(5));

    let err = client
        .fetch_record(&Query::zone(Zone::B), christmas_day())
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::schema("body"));
}

#[tokio::test]
async fn slow_server_times_out() {
    let stub = Stub::new(StatusCode::OK, NOEL).with_delay(Duration::from_secs(5));
    let endpoint = serve(stub).await;
    let client = client_for(&endpoint, Duration::from_millis(100));

    let err = client
        .fetch_record(&Query::zone(Zone::B), christmas_day())
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}/records", addr), Duration::from_secs(5));
    let err = client
        .fetch_record(&Query::zone(Zone::B), christmas_day())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
}
