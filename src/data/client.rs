use crate::data::{FetchError, Transport};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Search results beyond this many are not looked up for prices.
pub const DETAIL_LIMIT: usize = 10;

/// CoinGecko REST client.
///
/// Every operation comes in two flavours: `try_*` returns the failure so the
/// caller can tell "no data" from "request failed", and the plain variant
/// logs the failure and degrades to an empty result. Nothing is retried.
pub struct MarketClient<T> {
    base_url: String,
    transport: Arc<T>,
}

impl<T> Clone for MarketClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> MarketClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport: Arc::new(transport),
        }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let res = self.transport.get(&url, query).await?;
        if res.status != 200 {
            return Err(FetchError::Status(res.status));
        }

        Ok(serde_json::from_str(&res.body)?)
    }

    pub async fn try_fetch_top(&self, n: u32) -> Result<Vec<Value>, FetchError> {
        let query = [
            ("vs_currency", "usd".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", n.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
        ];

        match self.get_json("/coins/markets", &query).await? {
            Value::Array(coins) => Ok(coins),
            _ => Err(FetchError::Shape("listing response is not an array")),
        }
    }

    /// Top `n` coins by market cap, in API order.
    pub async fn fetch_top(&self, n: u32) -> Vec<Value> {
        self.try_fetch_top(n).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "top {} listing failed", n);
            Vec::new()
        })
    }

    /// Blank queries never reach the network.
    pub async fn try_search_coins(&self, query: &str) -> Result<Vec<Value>, FetchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut body = self
            .get_json("/search", &[("query", query.to_string())])
            .await?;
        if !body.is_object() {
            return Err(FetchError::Shape("search response is not an object"));
        }

        Ok(match body.get_mut("coins").map(Value::take) {
            Some(Value::Array(coins)) => coins,
            _ => Vec::new(),
        })
    }

    pub async fn search_coins(&self, query: &str) -> Vec<Value> {
        self.try_search_coins(query).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, query, "search failed");
            Vec::new()
        })
    }

    /// Market entry for a single coin id, `None` when the API knows no such coin.
    pub async fn try_fetch_market_detail(&self, id: &str) -> Result<Option<Value>, FetchError> {
        let query = [("vs_currency", "usd".to_string()), ("ids", id.to_string())];

        match self.get_json("/coins/markets", &query).await? {
            Value::Array(coins) => Ok(coins.into_iter().next()),
            _ => Err(FetchError::Shape("market detail response is not an array")),
        }
    }

    /// One request per id, sequentially, for the first [`DETAIL_LIMIT`] ids.
    /// A failing id is logged and left out; the rest keep their order.
    pub async fn fetch_market_details(&self, ids: &[String]) -> Vec<Value> {
        let mut details = Vec::new();

        for id in ids.iter().take(DETAIL_LIMIT) {
            if id.is_empty() {
                continue;
            }
            match self.try_fetch_market_detail(id).await {
                Ok(Some(coin)) => details.push(coin),
                Ok(None) => tracing::debug!(id = %id, "no market entry"),
                Err(e) => tracing::warn!(error = %e, id = %id, "market detail failed"),
            }
        }

        details
    }

    pub async fn try_fetch_chart(
        &self,
        coin_id: &str,
        days: u32,
        interval: Option<&str>,
    ) -> Result<Vec<Value>, FetchError> {
        let mut query = vec![("vs_currency", "usd".to_string()), ("days", days.to_string())];
        if let Some(interval) = interval {
            query.push(("interval", interval.to_string()));
        }

        let path = format!("/coins/{}/market_chart", coin_id);
        let mut body = self.get_json(&path, &query).await?;

        Ok(match body.get_mut("prices").map(Value::take) {
            Some(Value::Array(prices)) => prices,
            _ => Vec::new(),
        })
    }

    /// `[timestamp_ms, price]` pairs for the coin, empty on any failure.
    pub async fn fetch_chart(&self, coin_id: &str, days: u32, interval: Option<&str>) -> Vec<Value> {
        self.try_fetch_chart(coin_id, days, interval)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, coin_id, "market chart failed");
                Vec::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transport::fake::{ok, status, FakeTransport};

    const BASE: &str = "http://api.test/v3";

    fn client(responder: impl Fn(&str) -> crate::data::RawResponse + Send + Sync + 'static) -> MarketClient<FakeTransport> {
        MarketClient::new(BASE, FakeTransport::new(responder))
    }

    #[tokio::test]
    async fn fetch_top_sends_listing_query() {
        let client = client(|_| ok(r#"[{"id":"bitcoin"},{"id":"ethereum"}]"#));

        let coins = client.fetch_top(10).await;

        assert_eq!(coins.len(), 2);
        assert_eq!(
            client.transport().calls(),
            vec![format!(
                "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=10&page=1&sparkline=false",
                BASE
            )]
        );
    }

    #[tokio::test]
    async fn fetch_top_degrades_to_empty() {
        assert!(client(|_| status(429)).fetch_top(10).await.is_empty());
        assert!(client(|_| ok("not json")).fetch_top(10).await.is_empty());
        assert!(client(|_| ok(r#"{"error":"x"}"#)).fetch_top(10).await.is_empty());
    }

    #[tokio::test]
    async fn try_fetch_top_reports_shape() {
        let err = client(|_| ok(r#"{"status":{}}"#))
            .try_fetch_top(10)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Shape(_)));

        let err = client(|_| status(500)).try_fetch_top(10).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
    }

    #[tokio::test]
    async fn blank_search_makes_no_request() {
        let client = client(|_| ok(r#"{"coins":[{"id":"bitcoin"}]}"#));

        assert!(client.search_coins("   ").await.is_empty());
        assert!(client.search_coins("").await.is_empty());
        assert!(client.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn search_returns_coins_field() {
        let client = client(|_| ok(r#"{"coins":[{"id":"bitcoin"},{"id":"bitcoin-cash"}],"nfts":[]}"#));

        let coins = client.search_coins("  bit ").await;

        assert_eq!(coins.len(), 2);
        assert_eq!(client.transport().calls(), vec![format!("{}/search?query=bit", BASE)]);
    }

    #[tokio::test]
    async fn search_without_coins_field_is_empty() {
        assert!(client(|_| ok(r#"{"exchanges":[]}"#)).search_coins("bit").await.is_empty());
        assert!(client(|_| status(503)).search_coins("bit").await.is_empty());
    }

    #[tokio::test]
    async fn market_details_skip_failures_and_keep_order() {
        let client = client(|line| {
            let id = line.rsplit("ids=").next().unwrap_or_default();
            if id == "coin3" {
                status(500)
            } else {
                ok(&format!(r#"[{{"id":"{}","name":"{}"}}]"#, id, id.to_uppercase()))
            }
        });
        let ids: Vec<String> = (1..=10).map(|i| format!("coin{}", i)).collect();

        let details = client.fetch_market_details(&ids).await;

        let got: Vec<&str> = details.iter().filter_map(|c| c["id"].as_str()).collect();
        assert_eq!(
            got,
            vec!["coin1", "coin2", "coin4", "coin5", "coin6", "coin7", "coin8", "coin9", "coin10"]
        );
        assert_eq!(client.transport().calls().len(), 10);
    }

    #[tokio::test]
    async fn market_details_cap_and_skip_blank_ids() {
        let client = client(|_| ok("[]"));
        let mut ids: Vec<String> = (0..15).map(|i| format!("c{}", i)).collect();
        ids[2] = String::new();

        let details = client.fetch_market_details(&ids).await;

        assert!(details.is_empty());
        // first ten entries, one of them blank
        assert_eq!(client.transport().calls().len(), 9);
    }

    #[tokio::test]
    async fn fetch_chart_builds_path_and_interval() {
        let client = client(|_| ok(r#"{"prices":[[1,10.0],[2,11.5]],"total_volumes":[]}"#));

        let prices = client.fetch_chart("bitcoin", 7, Some("daily")).await;
        client.fetch_chart("bitcoin", 1, None).await;

        assert_eq!(prices.len(), 2);
        assert_eq!(
            client.transport().calls(),
            vec![
                format!("{}/coins/bitcoin/market_chart?vs_currency=usd&days=7&interval=daily", BASE),
                format!("{}/coins/bitcoin/market_chart?vs_currency=usd&days=1", BASE),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_chart_failures_are_empty() {
        assert!(client(|_| status(404)).fetch_chart("nope", 7, None).await.is_empty());
        assert!(client(|_| ok(r#"{"error":"x"}"#)).fetch_chart("x", 7, None).await.is_empty());
        assert!(client(|_| ok("<html>")).fetch_chart("x", 7, None).await.is_empty());
    }
}
