//! Booking service backed by the ticketing REST backend.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::BookingFailure;
use crate::services::booking::{BookingRequest, BookingService, Ticket};

/// Books tickets with `POST {base_url}/v1/tickets/book?eventId=..&buyerId=..`.
///
/// No timeout is applied beyond what the given [`Client`] enforces; a
/// request that never answers stalls the checkout that issued it.
#[derive(Debug, Clone)]
pub struct HttpBookingService {
    client: Client,
    base_url: String,
}

impl HttpBookingService {
    /// Creates a service for the backend at `base_url` (e.g. `http://localhost:7777/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a service with a preconfigured client.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn book_url(&self) -> String {
        format!("{}/v1/tickets/book", self.base_url)
    }
}

#[async_trait]
impl BookingService for HttpBookingService {
    #[tracing::instrument(skip(self, request), fields(event_id = %request.event_id))]
    async fn book_ticket(&self, request: &BookingRequest) -> Result<Ticket, BookingFailure> {
        let mut builder = self.client.post(self.book_url()).query(&[
            ("eventId", request.event_id.get()),
            ("buyerId", request.buyer_id.get()),
        ]);
        if let Some(token) = &request.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BookingFailure::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "booking response received");

        let body = response.text().await.map_err(|e| BookingFailure::Network {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(BookingFailure::from_status(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| BookingFailure::InvalidResponse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let service = HttpBookingService::new("http://localhost:7777/api/");
        assert_eq!(service.base_url(), "http://localhost:7777/api");
        assert_eq!(
            service.book_url(),
            "http://localhost:7777/api/v1/tickets/book"
        );
    }
}
