//! NPR→USD exchange-rate lookup for display prices.
//!
//! NPR is the canonical unit for every stored amount; USD is derived at
//! render time from a live rate. When the rate source is unreachable the
//! USD figure simply goes missing, it is never guessed.

use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct RateResponse {
    rates: HashMap<String, f64>,
}

#[derive(Clone)]
pub struct RateClient {
    client: Client,
    url: String,
}

impl RateClient {
    pub fn new(url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self { client, url }
    }

    /// USD per 1 NPR, or None when the source is unavailable.
    pub async fn usd_per_npr(&self) -> Option<f64> {
        let response = match self.client.get(&self.url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("error fetching exchange rates: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::error!("exchange rate source returned {}", response.status());
            return None;
        }

        match response.json::<RateResponse>().await {
            Ok(body) => body.rates.get("USD").copied(),
            Err(e) => {
                tracing::error!("invalid exchange rate payload: {}", e);
                None
            }
        }
    }
}

/// Two-decimal USD display string for an NPR amount, when a rate is known.
pub fn usd_display(amount_npr: i64, usd_per_npr: Option<f64>) -> Option<String> {
    usd_per_npr.map(|rate| format!("{:.2}", amount_npr as f64 * rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_usd_rate() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/latest/NPR")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"base":"NPR","rates":{"USD":0.0075,"EUR":0.0069}}"#)
            .create_async()
            .await;

        let client = RateClient::new(format!("{}/v4/latest/NPR", server.url()));
        assert_eq!(client.usd_per_npr().await, Some(0.0075));
    }

    #[tokio::test]
    async fn upstream_error_yields_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/latest/NPR")
            .with_status(500)
            .create_async()
            .await;

        let client = RateClient::new(format!("{}/v4/latest/NPR", server.url()));
        assert_eq!(client.usd_per_npr().await, None);
    }

    #[tokio::test]
    async fn malformed_payload_yields_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v4/latest/NPR")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = RateClient::new(format!("{}/v4/latest/NPR", server.url()));
        assert_eq!(client.usd_per_npr().await, None);
    }

    #[test]
    fn usd_display_formats_two_decimals() {
        assert_eq!(usd_display(240, Some(0.0075)).as_deref(), Some("1.80"));
        assert_eq!(usd_display(240, None), None);
    }
}
