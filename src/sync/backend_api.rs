use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::reservation::{ReservationDraft, ReservationRecord};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request error: status {status}: {body}")]
    RequestError { status: u16, body: String },
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    message: &'a str,
    current_reservation: &'a ReservationDraft,
}

/// Body of a `POST /process_reservation` reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TurnResponse {
    #[serde(default)]
    pub messages: Vec<String>,
    pub reservation: Option<ReservationDraft>,
    pub reservation_complete: Option<bool>,
    pub success: Option<bool>,
    pub needs_info: Option<bool>,
    pub missing_field: Option<String>,
}

impl TurnResponse {
    pub fn is_complete(&self) -> bool {
        self.reservation_complete.unwrap_or(false)
    }

    /// The backend reports `success: false` when it failed to interpret the
    /// turn; a missing flag counts as success.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationApi: Send + Sync {
    async fn process_reservation(
        &self,
        message: &str,
        current_reservation: &ReservationDraft,
    ) -> Result<TurnResponse, TransportError>;

    async fn get_reservations(&self) -> Result<Vec<ReservationRecord>, TransportError>;
}

pub struct HttpReservationClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpReservationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::HttpError(err)
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> Result<T, TransportError> {
        let status = response.status();
        tracing::info!("{} response status: {}", operation, status);

        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            tracing::error!("{} failed. Status: {}, Body: {}", operation, status, body);
            return Err(TransportError::RequestError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("{} returned unparsable body: {}", operation, e);
            TransportError::ParseError(e.to_string())
        })
    }
}

#[async_trait]
impl ReservationApi for HttpReservationClient {
    async fn process_reservation(
        &self,
        message: &str,
        current_reservation: &ReservationDraft,
    ) -> Result<TurnResponse, TransportError> {
        let url = format!("{}/process_reservation", self.base_url);
        let payload = ProcessRequest {
            message,
            current_reservation,
        };

        tracing::debug!("POST {} with payload: {:?}", url, payload);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        self.read_json(response, "Process reservation").await
    }

    async fn get_reservations(&self) -> Result<Vec<ReservationRecord>, TransportError> {
        let url = format!("{}/get_reservations", self.base_url);

        tracing::info!("Fetching reservations from {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let records: Vec<ReservationRecord> = self.read_json(response, "Get reservations").await?;
        tracing::info!("Fetched {} reservations successfully", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn client_trims_trailing_slash() {
        let client = HttpReservationClient::new("http://localhost:5000/");

        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[test]
    fn client_has_default_timeout() {
        let client = HttpReservationClient::new("http://localhost:5000");

        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn turn_response_defaults_missing_flags() {
        let response: TurnResponse = serde_json::from_value(json!({ "messages": ["hi"] })).unwrap();

        assert!(!response.is_complete());
        assert!(response.is_success());
        assert_eq!(response.reservation, None);
    }

    #[test]
    fn turn_response_accepts_null_flags() {
        let response: TurnResponse = serde_json::from_value(json!({
            "messages": [],
            "reservation": null,
            "reservation_complete": null
        }))
        .unwrap();

        assert!(!response.is_complete());
    }

    #[tokio::test]
    async fn process_reservation_posts_message_and_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/process_reservation"))
            .and(body_json(json!({
                "message": "tomorrow at 3pm",
                "current_reservation": { "title": "John Appointment" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": ["Please enter the time for the appointment:"],
                "reservation": { "title": "John Appointment", "start": "02.01.2024" },
                "needs_info": true,
                "missing_field": "end",
                "success": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpReservationClient::new(server.uri());
        let draft = ReservationDraft::new().with_field("title", "John Appointment");

        let response = client.process_reservation("tomorrow at 3pm", &draft).await.unwrap();

        assert_eq!(response.messages, vec!["Please enter the time for the appointment:"]);
        assert_eq!(response.missing_field.as_deref(), Some("end"));
        assert!(!response.is_complete());
        assert_eq!(response.reservation.unwrap().start(), Some("02.01.2024"));
    }

    #[tokio::test]
    async fn get_reservations_parses_record_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get_reservations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "title": "John", "start": "2024-01-02T15:00:00", "end": "2024-01-02T16:00:00", "allDay": false },
                { "title": "Sarah Lee", "start": "2024-01-03T10:00:00" }
            ])))
            .mount(&server)
            .await;

        let client = HttpReservationClient::new(server.uri());

        let records = client.get_reservations().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title(), Some("Sarah Lee"));
        assert_eq!(records[1].end, None);
    }

    #[tokio::test]
    async fn server_error_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = HttpReservationClient::new(server.uri());

        match client.get_reservations().await {
            Err(TransportError::RequestError { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unparsable_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = HttpReservationClient::new(server.uri());

        let result = client.process_reservation("hi", &ReservationDraft::new()).await;

        assert!(matches!(result, Err(TransportError::ParseError(_))));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpReservationClient::new(server.uri())
            .with_timeout(Duration::from_millis(50));

        let result = client.get_reservations().await;

        assert!(matches!(result, Err(TransportError::Timeout(_))));
    }
}
