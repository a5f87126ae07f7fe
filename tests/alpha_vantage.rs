use portfolio_ledger::config::oracle::{OracleConfig, OracleProvider};
use portfolio_ledger::interfaces::price_oracle::{PriceOracle, Unavailable};
use portfolio_ledger::price_infra::build_oracle;
use portfolio_ledger::price_infra::connectors::alpha_vantage::AlphaVantageConnector;
use portfolio_ledger::types::price::Price;
use portfolio_ledger::types::symbol::Symbol;
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OracleConfig {
    OracleConfig {
        provider: OracleProvider::AlphaVantage,
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 1,
        cache_ttl_secs: 0,
        ..OracleConfig::default()
    }
}

fn ibm() -> Symbol {
    Symbol::parse("IBM").unwrap()
}

async fn lookup_with(response: ResponseTemplate) -> Result<Price, Unavailable> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", "GLOBAL_QUOTE"))
        .and(query_param("symbol", "IBM"))
        .and(query_param("apikey", "test-key"))
        .respond_with(response)
        .mount(&server)
        .await;

    let connector = AlphaVantageConnector::new(&config_for(&server)).unwrap();
    connector.get_price(&ibm()).await
}

#[tokio::test]
async fn quote_is_parsed_from_global_quote() {
    let body = json!({
        "Global Quote": {
            "01. symbol": "IBM",
            "05. price": "172.5800",
            "07. latest trading day": "2024-05-03"
        }
    });
    let lookup = lookup_with(ResponseTemplate::new(200).set_body_json(body)).await;
    assert_eq!(lookup, Ok(Price::new(dec!(172.58)).unwrap()));
}

#[tokio::test]
async fn http_failures_map_to_reasons() {
    assert_eq!(
        lookup_with(ResponseTemplate::new(500)).await,
        Err(Unavailable::Network)
    );
    assert_eq!(
        lookup_with(ResponseTemplate::new(429)).await,
        Err(Unavailable::RateLimited)
    );
    assert_eq!(
        lookup_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await,
        Err(Unavailable::Malformed)
    );
}

#[tokio::test]
async fn provider_messages_map_to_reasons() {
    let note = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day." });
    assert_eq!(
        lookup_with(ResponseTemplate::new(200).set_body_json(note)).await,
        Err(Unavailable::RateLimited)
    );

    let error = json!({ "Error Message": "Invalid API call." });
    assert_eq!(
        lookup_with(ResponseTemplate::new(200).set_body_json(error)).await,
        Err(Unavailable::NotFound)
    );

    let empty = json!({ "Global Quote": {} });
    assert_eq!(
        lookup_with(ResponseTemplate::new(200).set_body_json(empty)).await,
        Err(Unavailable::NotFound)
    );

    let zero = json!({ "Global Quote": { "05. price": "0.0000" } });
    assert_eq!(
        lookup_with(ResponseTemplate::new(200).set_body_json(zero)).await,
        Err(Unavailable::NonPositive)
    );
}

#[tokio::test]
async fn slow_upstream_times_out_as_network() {
    let body = json!({ "Global Quote": { "05. price": "10.00" } });
    let response = ResponseTemplate::new(200)
        .set_body_json(body)
        .set_delay(Duration::from_secs(3));
    assert_eq!(lookup_with(response).await, Err(Unavailable::Network));
}

#[tokio::test]
async fn rate_limit_suppresses_further_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let connector = AlphaVantageConnector::new(&config_for(&server)).unwrap();
    assert_eq!(connector.get_price(&ibm()).await, Err(Unavailable::RateLimited));
    assert_eq!(connector.get_price(&ibm()).await, Err(Unavailable::RateLimited));
    server.verify().await;
}

#[tokio::test]
async fn cached_stack_hits_upstream_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "Global Quote": { "05. price": "99.10" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let oracle = build_oracle(&OracleConfig {
        cache_ttl_secs: 60,
        ..config_for(&server)
    })
    .unwrap();

    for _ in 0..3 {
        assert_eq!(oracle.get_price(&ibm()).await, Ok(Price::new(dec!(99.10)).unwrap()));
    }
    server.verify().await;
}
