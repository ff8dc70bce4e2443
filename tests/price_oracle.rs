#![cfg(feature = "live-pricing")]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zakat_engine::prelude::*;

const GOLD_PAGE: &str = r#"
<html><body>
  <h2>Gold Rate in Mumbai Today</h2>
  <table>
    <thead><tr><th>Gram</th><th>Today</th><th>Yesterday</th></tr></thead>
    <tbody>
      <tr><td>1 gm</td><td>₹16,057.84</td><td>₹15,990.10</td></tr>
      <tr><td>8 gm</td><td>₹1,28,462.72</td><td>₹1,27,920.80</td></tr>
    </tbody>
  </table>
</body></html>"#;

const SILVER_PAGE: &str = r#"
<table>
  <tr><td>1 gm</td><td>₹ 277.55</td></tr>
</table>"#;

async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_reads_the_gram_row() {
    let server = MockServer::start().await;
    serve(&server, "/gold-rates-today/gold-rate-in-mumbai", 200, GOLD_PAGE).await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(5));
    let price = oracle.fetch_price_per_unit(Metal::Gold, "Mumbai").await.unwrap();
    assert_eq!(price, dec!(16057.84));
}

#[tokio::test]
async fn test_requests_carry_the_configured_client_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/silver-rates-today/silver-rate-in-navi-mumbai"))
        .and(header("user-agent", concat!("zakat-engine/", env!("CARGO_PKG_VERSION"))))
        .respond_with(ResponseTemplate::new(200).set_body_string(SILVER_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(5));
    let price = oracle.fetch_price_per_unit(Metal::Silver, "Navi  Mumbai").await.unwrap();
    assert_eq!(price, dec!(277.55));
}

#[tokio::test]
async fn test_missing_row_is_not_found() {
    let server = MockServer::start().await;
    serve(&server, "/silver-rates-today/silver-rate-in-pune", 200, "<table></table>").await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(5));
    let err = oracle.fetch_price_per_unit(Metal::Silver, "Pune").await.unwrap_err();
    assert_eq!(
        err,
        ZakatError::NotFound {
            metal: "silver".to_string(),
            locality: "Pune".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_city_page_is_not_found() {
    let server = MockServer::start().await;
    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(5));
    let err = oracle.fetch_price_per_unit(Metal::Gold, "Atlantis").await.unwrap_err();
    assert!(matches!(err, ZakatError::NotFound { .. }));
}

#[tokio::test]
async fn test_server_error_is_network_failure() {
    let server = MockServer::start().await;
    serve(&server, "/gold-rates-today/gold-rate-in-mumbai", 500, "oops").await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(5));
    let err = oracle.fetch_price_per_unit(Metal::Gold, "mumbai").await.unwrap_err();
    assert!(matches!(err, ZakatError::Network(_)));
}

#[tokio::test]
async fn test_empty_locality_is_rejected() {
    let oracle = RateTableOracle::new("http://127.0.0.1:9", Duration::from_secs(1));
    let err = oracle.fetch_price_per_unit(Metal::Gold, "  ").await.unwrap_err();
    assert!(matches!(err, ZakatError::InvalidInput { .. }));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(GOLD_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(1));
    let err = oracle.fetch_price_per_unit(Metal::Gold, "mumbai").await.unwrap_err();
    assert_eq!(err, ZakatError::Timeout { seconds: 1 });
}

#[tokio::test]
async fn test_price_book_keeps_last_rate_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(10));
    let mut book = PriceBook::new(MarketRates::snapshot(), "mumbai").with_timeout(Duration::from_millis(200));

    let notices = book.refresh(&oracle).await;

    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| matches!(n.error, ZakatError::Timeout { .. })));
    assert_eq!(book.rates(), &MarketRates::snapshot());
}

#[tokio::test]
async fn test_session_refresh_updates_what_it_can() {
    let server = MockServer::start().await;
    serve(&server, "/gold-rates-today/gold-rate-in-mumbai", 200, GOLD_PAGE).await;
    serve(&server, "/silver-rates-today/silver-rate-in-mumbai", 404, "Rate not found").await;

    let config = ZakatConfig::new(6000, 80).unwrap();
    let mut session = ZakatSession::new(&config);
    session.set_assets(
        AssetDeclaration::new().metals(MetalHoldings::new().with(MetalItem::gold(100, 24, MetalUsage::Investment))),
    );
    assert_eq!(session.result().metals.raw_gold, dec!(600000));

    let oracle = CachedPriceOracle::new(
        RateTableOracle::new(server.uri(), Duration::from_secs(5)),
        Duration::from_secs(300),
    );
    let notices = session.refresh_prices(&oracle).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].metal, Metal::Silver);
    assert_eq!(notices[0].kept, dec!(80));
    assert_eq!(session.rates().gold_per_gram, dec!(16057.84));
    assert_eq!(session.rates().silver_per_gram, dec!(80));
    assert_eq!(session.result().metals.raw_gold, dec!(1605784));
    assert!(session.rates().as_of.is_some());
}

#[tokio::test]
async fn test_full_refresh_from_both_pages() {
    let server = MockServer::start().await;
    serve(&server, "/gold-rates-today/gold-rate-in-new-delhi", 200, GOLD_PAGE).await;
    serve(&server, "/silver-rates-today/silver-rate-in-new-delhi", 200, SILVER_PAGE).await;

    let oracle = RateTableOracle::new(server.uri(), Duration::from_secs(5));
    let mut book = PriceBook::new(MarketRates::new(1, 1), "New Delhi");
    let notices = book.refresh(&oracle).await;

    assert!(notices.is_empty());
    assert_eq!(book.rates().gold_per_gram, dec!(16057.84));
    assert_eq!(book.rates().silver_per_gram, dec!(277.55));
    assert_ne!(book.rates().silver_per_gram, Decimal::ONE);
}
