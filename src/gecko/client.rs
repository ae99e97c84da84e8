use crate::cache::{cache_key, ResponseCache, CACHE_TTL, MAX_CACHE_ENTRIES};
use crate::config::Config;
use crate::gecko::api_types::{ApiCoinDetail, ApiTrendingResponse};
use crate::gecko::params::MarketParams;
use crate::gecko::source::MarketSource;
use crate::gecko::types::{Coin, CoinDetail, TrendingCoin};
use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Header carrying the demo-plan API key
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// CoinGecko API client with a short-lived response cache
#[derive(Clone)]
pub struct GeckoClient {
  http: reqwest::Client,
  base_url: String,
  api_key: Option<String>,
  vs_currency: String,
  cache: Arc<Mutex<ResponseCache<Value>>>,
}

impl GeckoClient {
  pub fn new(config: &Config) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("coin9s/", env!("CARGO_PKG_VERSION")))
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    // Validate once so request-time failures are about the network, not config
    Url::parse(&config.api.url).map_err(|e| eyre!("Invalid API URL {}: {}", config.api.url, e))?;

    Ok(Self {
      http,
      base_url: config.api.url.trim_end_matches('/').to_string(),
      api_key: config.api.api_key.clone(),
      vs_currency: config.vs_currency.clone(),
      cache: Arc::new(Mutex::new(ResponseCache::new(MAX_CACHE_ENTRIES, CACHE_TTL))),
    })
  }

  /// GET an endpoint and decode its JSON body, going through the cache.
  ///
  /// Only bodies that decode into `T` are cached.
  pub async fn get_json<T: DeserializeOwned>(
    &self,
    endpoint: &str,
    params: &[(&str, Value)],
  ) -> Result<T> {
    let key = cache_key(endpoint, params.iter().map(|(name, value)| (*name, value)));

    if let Some(cached) = self.cached(&key)? {
      tracing::debug!(endpoint, "serving response from cache");
      return decode(endpoint, cached);
    }

    let url = self.url(endpoint, params)?;
    tracing::debug!(%url, "requesting");

    let mut request = self.http.get(url);
    if let Some(api_key) = &self.api_key {
      request = request.header(API_KEY_HEADER, api_key);
    }

    let response = request.send().await.map_err(|e| {
      tracing::warn!(endpoint, error = %e, "request failed");
      eyre!("Request to {} failed: {}", endpoint, e)
    })?;

    let status = response.status();
    if !status.is_success() {
      tracing::warn!(endpoint, status = status.as_u16(), "request rejected");
      return Err(eyre!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
      ));
    }

    let body: Value = response
      .json()
      .await
      .map_err(|e| eyre!("Invalid JSON from {}: {}", endpoint, e))?;

    let data = decode(endpoint, body.clone())?;
    self.store(key, body)?;

    Ok(data)
  }

  /// Drop every cached response
  pub fn clear_cache(&self) {
    match self.cache.lock() {
      Ok(cache) if cache.is_empty() => {}
      Ok(mut cache) => {
        tracing::info!(entries = cache.len(), "clearing response cache");
        cache.clear();
      }
      Err(e) => tracing::error!("Lock poisoned: {}", e),
    }
  }

  fn cached(&self, key: &str) -> Result<Option<Value>> {
    let mut cache = self
      .cache
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(cache.get(key))
  }

  fn store(&self, key: String, body: Value) -> Result<()> {
    let mut cache = self
      .cache
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    cache.set(key, body);
    Ok(())
  }

  fn url(&self, endpoint: &str, params: &[(&str, Value)]) -> Result<Url> {
    let raw = format!("{}{}", self.base_url, endpoint);
    let mut url = Url::parse(&raw).map_err(|e| eyre!("Invalid API URL {}: {}", raw, e))?;

    if !params.is_empty() {
      let mut pairs = url.query_pairs_mut();
      for (name, value) in params {
        match value {
          Value::String(s) => pairs.append_pair(name, s),
          other => pairs.append_pair(name, &other.to_string()),
        };
      }
    }

    Ok(url)
  }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T> {
  serde_json::from_value(body).map_err(|e| eyre!("Unexpected response from {}: {}", endpoint, e))
}

impl MarketSource for GeckoClient {
  async fn markets(&self, params: MarketParams) -> Result<Vec<Coin>> {
    self.get_json("/coins/markets", &params.query()).await
  }

  async fn trending(&self) -> Result<Vec<TrendingCoin>> {
    let response: ApiTrendingResponse = self.get_json("/search/trending", &[]).await?;
    Ok(response.into_coins())
  }

  async fn coin(&self, id: &str) -> Result<CoinDetail> {
    let endpoint = format!("/coins/{}", id);
    let params = [
      ("localization", json!(false)),
      ("tickers", json!(false)),
      ("market_data", json!(true)),
      ("community_data", json!(false)),
      ("developer_data", json!(false)),
      ("sparkline", json!(false)),
    ];

    let detail: ApiCoinDetail = self.get_json(&endpoint, &params).await?;
    Ok(detail.into_detail(&self.vs_currency))
  }

  fn clear_cache(&self) {
    GeckoClient::clear_cache(self);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::ApiConfig;
  use crate::gecko::params::MarketOrder;
  use mockito::{Matcher, Server};

  fn config(url: &str, api_key: Option<&str>) -> Config {
    Config {
      api: ApiConfig {
        url: url.to_string(),
        api_key: api_key.map(String::from),
      },
      ..Config::default()
    }
  }

  const MARKETS_BODY: &str = r#"[
    {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 65000.5,
     "market_cap": 1.2e12, "market_cap_rank": 1, "total_volume": 3.0e10,
     "price_change_percentage_24h": 2.1, "max_supply": 21000000.0,
     "last_updated": "2024-05-01T12:00:00.000Z"},
    {"id": "ethereum", "symbol": "eth", "name": "Ethereum", "current_price": 3100.0,
     "market_cap": null, "market_cap_rank": 2, "total_volume": 1.5e10,
     "price_change_percentage_24h": -0.4, "max_supply": null}
  ]"#;

  #[tokio::test]
  async fn test_markets_decodes_and_sends_params() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/coins/markets")
      .match_query(Matcher::AllOf(vec![
        Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
        Matcher::UrlEncoded("order".into(), "volume_desc".into()),
        Matcher::UrlEncoded("per_page".into(), "50".into()),
        Matcher::UrlEncoded("page".into(), "2".into()),
      ]))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(MARKETS_BODY)
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), None)).unwrap();
    let params = MarketParams::new("usd").order(MarketOrder::VolumeDesc).page(2);
    let coins = client.markets(params).await.unwrap();

    mock.assert_async().await;
    assert_eq!(coins.len(), 2);
    assert_eq!(coins[0].id, "bitcoin");
    assert_eq!(coins[0].market_cap_rank, Some(1));
    assert_eq!(coins[1].market_cap, None);
  }

  #[tokio::test]
  async fn test_second_call_is_served_from_cache() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/coins/markets")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(MARKETS_BODY)
      .expect(1)
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), None)).unwrap();
    client.markets(MarketParams::new("usd")).await.unwrap();
    let coins = client.markets(MarketParams::new("usd")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(coins.len(), 2);
  }

  #[tokio::test]
  async fn test_clear_cache_forces_refetch() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/coins/markets")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(MARKETS_BODY)
      .expect(2)
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), None)).unwrap();
    client.markets(MarketParams::new("usd")).await.unwrap();
    client.clear_cache();
    client.markets(MarketParams::new("usd")).await.unwrap();

    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_http_error_is_reported_and_not_cached() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/search/trending")
      .with_status(429)
      .with_body("{}")
      .expect(2)
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), None)).unwrap();
    let err = client.trending().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 429: Too Many Requests");

    assert!(client.trending().await.is_err());
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_unexpected_shape_is_an_error() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/coins/markets")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body(r#"{"status": "not a list"}"#)
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), None)).unwrap();
    let err = client.markets(MarketParams::new("usd")).await.unwrap_err();
    assert!(err.to_string().starts_with("Unexpected response from /coins/markets"));
  }

  #[tokio::test]
  async fn test_api_key_header_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("GET", "/search/trending")
      .match_header(API_KEY_HEADER, "demo-key")
      .with_status(200)
      .with_body(r#"{"coins": [{"item": {"id": "pepe", "name": "Pepe", "symbol": "PEPE"}}]}"#)
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), Some("demo-key"))).unwrap();
    let trending = client.trending().await.unwrap();

    mock.assert_async().await;
    assert_eq!(trending[0].name, "Pepe");
  }

  #[tokio::test]
  async fn test_coin_detail() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", "/coins/bitcoin")
      .match_query(Matcher::UrlEncoded("market_data".into(), "true".into()))
      .with_status(200)
      .with_body(
        r#"{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "market_cap_rank": 1,
            "market_data": {"current_price": {"usd": 65000.0}, "max_supply": 21000000.0}}"#,
      )
      .create_async()
      .await;

    let client = GeckoClient::new(&config(&server.url(), None)).unwrap();
    let detail = client.coin("bitcoin").await.unwrap();
    assert_eq!(detail.current_price, Some(65000.0));
    assert_eq!(detail.max_supply, Some(21000000.0));
  }

  #[tokio::test]
  async fn test_network_failure() {
    // Nothing listens on port 9 (discard) in the test environment
    let client = GeckoClient::new(&config("http://127.0.0.1:9", None)).unwrap();
    let err = client.trending().await.unwrap_err();
    assert!(err.to_string().starts_with("Request to /search/trending failed"));
  }

  #[test]
  fn test_invalid_base_url() {
    assert!(GeckoClient::new(&config("not a url", None)).is_err());
  }
}
