//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the target site and drive the
//! full crawl cycle end-to-end: sitemap fetch, diff, page fetches,
//! extraction, and snapshot persistence.

use std::path::Path;
use stockpile::config::{
    Config, CrawlerConfig, OutputConfig, SelectorsConfig, SitemapConfig, UserAgentConfig,
};
use stockpile::crawler::crawl;
use stockpile::dataset::JsonStore;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(sitemap_url: &str, dataset_path: &Path) -> Config {
    Config {
        sitemap: SitemapConfig {
            location: sitemap_url.to_string(),
        },
        crawler: CrawlerConfig {
            accept_quota: 60,
            low_yield_threshold: 0,
            // Very short delays for testing
            pre_fetch_delay_ms: 0,
            pre_fetch_jitter_ms: 0,
            post_accept_delay_ms: 0,
            error_cooldown_ms: 0,
            fetch_timeout_secs: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            dataset_path: dataset_path.to_string_lossy().to_string(),
        },
        selectors: SelectorsConfig {
            name: None,
            title_suffix: Some(" - Test Pharmacy".to_string()),
            price: "span.price".to_string(),
            currency: "₫".to_string(),
            description: Some("div.description".to_string()),
            category: Some("td.category".to_string()),
            image: Some("img.main".to_string()),
            rating: Some("span.rating".to_string()),
            review_count: Some("span.reviews".to_string()),
            brand: Some("span.brand".to_string()),
        },
    }
}

fn sitemap_body(base_url: &str, paths: &[&str]) -> String {
    let urls: String = paths
        .iter()
        .map(|p| format!("  <url><loc>{}{}</loc></url>\n", base_url, p))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}</urlset>"#,
        urls
    )
}

fn product_page(name: &str, price: &str) -> String {
    format!(
        r#"<html><head><title>{} - Test Pharmacy</title></head>
<body>
  <span class="price">{}</span>
  <div class="description">A fine product</div>
</body></html>"#,
        name, price
    )
}

fn page_without_price(name: &str) -> String {
    format!(
        r#"<html><head><title>{} - Test Pharmacy</title></head><body></body></html>"#,
        name
    )
}

#[tokio::test]
async fn test_first_crawl_builds_dataset() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap_body(&base_url, &["/p/a", "/p/b", "/p/c"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Alpha", "100.000₫")))
        .mount(&mock_server)
        .await;

    // Middle page is gone; the crawl must carry on past it
    Mock::given(method("GET"))
        .and(path("/p/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Gamma", "50.000₫")))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("products.json");
    let config = create_test_config(&format!("{}/sitemap.xml", base_url), &dataset_path);

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.accepted, 2);
    assert_eq!(report.fetch_failures, 1);

    let dataset = JsonStore::new(&dataset_path).load();
    assert_eq!(dataset.len(), 2);

    let records = dataset.records();
    assert_eq!(records[0].id, 1);
    assert_eq!(records[0].name, "Alpha");
    assert_eq!(records[0].price, "100.000₫");
    assert_eq!(records[0].url, format!("{}/p/a", base_url));
    assert_eq!(records[1].id, 2);
    assert_eq!(records[1].name, "Gamma");
    assert!((1..=500).contains(&records[0].stock));
}

#[tokio::test]
async fn test_rerun_over_own_output_fetches_nothing_new() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Sitemap is fetched once per run
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sitemap_body(&base_url, &["/p/a", "/p/b"])),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    // Each product page is fetched exactly once across both runs
    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Alpha", "100₫")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Beta", "200₫")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("products.json");
    let sitemap_url = format!("{}/sitemap.xml", base_url);

    let first = crawl(create_test_config(&sitemap_url, &dataset_path))
        .await
        .expect("First crawl failed");
    assert_eq!(first.accepted, 2);

    let second = crawl(create_test_config(&sitemap_url, &dataset_path))
        .await
        .expect("Second crawl failed");
    assert_eq!(second.pending, 0);
    assert_eq!(second.accepted, 0);

    let dataset = JsonStore::new(&dataset_path).load();
    assert_eq!(dataset.len(), 2);

    // Ids strictly increase and no URL appears twice
    let ids: Vec<u64> = dataset.records().iter().map(|r| r.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    let urls: std::collections::HashSet<_> =
        dataset.records().iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls.len(), dataset.len());
}

#[tokio::test]
async fn test_prior_records_are_preserved_and_ids_continue() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sitemap_body(&base_url, &["/p/a", "/p/b"])),
        )
        .mount(&mock_server)
        .await;

    // The known URL must never be fetched again
    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Wrong", "1₫")))
        .expect(0)
        .mount(&mock_server)
        .await;

    // The new URL has no price, so nothing is admitted
    Mock::given(method("GET"))
        .and(path("/p/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_without_price("Beta")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("products.json");

    // Seed a prior snapshot holding /p/a under id 5
    let prior = format!(
        r#"[
  {{
    "id": 5,
    "url": "{}/p/a",
    "name": "Existing",
    "price": "1000",
    "description": "",
    "category": "Not found",
    "image": "Not found",
    "rating": 3,
    "reviewCount": 12,
    "brandName": "Not found",
    "stock": 44,
    "crawledAt": "2024-10-01T00:00:00Z"
  }}
]"#,
        base_url
    );
    std::fs::write(&dataset_path, prior).unwrap();

    let config = create_test_config(&format!("{}/sitemap.xml", base_url), &dataset_path);
    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.pending, 1);
    assert_eq!(report.accepted, 0);
    assert_eq!(report.skipped_no_product, 1);

    let dataset = JsonStore::new(&dataset_path).load();
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0].id, 5);
    assert_eq!(dataset.records()[0].name, "Existing");
    assert_eq!(dataset.next_id(), 6);
}

#[tokio::test]
async fn test_quota_stops_the_run_early() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap_body(&base_url, &["/p/a", "/p/b", "/p/c"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Alpha", "1₫")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Beta", "2₫")))
        .mount(&mock_server)
        .await;

    // Never reached: the quota is hit after two acceptances
    Mock::given(method("GET"))
        .and(path("/p/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Gamma", "3₫")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("products.json");
    let mut config = create_test_config(&format!("{}/sitemap.xml", base_url), &dataset_path);
    config.crawler.accept_quota = 2;

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.accepted, 2);
    assert_eq!(JsonStore::new(&dataset_path).load().len(), 2);
}

#[tokio::test]
async fn test_sitemap_failure_writes_no_snapshot() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("products.json");
    let config = create_test_config(&format!("{}/sitemap.xml", base_url), &dataset_path);

    let result = crawl(config).await;
    assert!(result.is_err());

    // Nothing to diff against means nothing gets written
    assert!(!dataset_path.exists());
}

#[tokio::test]
async fn test_local_sitemap_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Alpha", "9.000₫")))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let sitemap_path = dir.path().join("sitemap.xml");
    std::fs::write(&sitemap_path, sitemap_body(&base_url, &["/p/a"])).unwrap();

    let dataset_path = dir.path().join("products.json");
    let config = create_test_config(
        &format!("file://{}", sitemap_path.display()),
        &dataset_path,
    );

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.accepted, 1);

    let dataset = JsonStore::new(&dataset_path).load();
    assert_eq!(dataset.records()[0].name, "Alpha");
    assert_eq!(dataset.records()[0].price, "9.000₫");
}

#[tokio::test]
async fn test_snapshot_round_trip_is_byte_stable() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sitemap_body(&base_url, &["/p/a"])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page("Alpha", "1₫")))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("products.json");
    let config = create_test_config(&format!("{}/sitemap.xml", base_url), &dataset_path);

    crawl(config).await.expect("Crawl failed");
    let first = std::fs::read(&dataset_path).unwrap();

    let store = JsonStore::new(&dataset_path);
    store.save(&store.load()).unwrap();
    let second = std::fs::read(&dataset_path).unwrap();

    assert_eq!(first, second);
}
