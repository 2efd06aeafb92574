//! Product fetching and export against the mock Admin API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::SecretString;
use shopify_catalog::formats::{self, PRODUCTS_SHEET};
use shopify_catalog::services::{ExportOptions, fetch_and_export};
use shopify_catalog::{AdminClient, AdminShopifyError, AppError, ProductSelector, ShopifyAdminConfig};
use shopify_catalog_core::{LanguagePair, ProductRecord, to_table};
use shopify_catalog_integration_tests::{MOCK_TOKEN, MockAdmin, MockCollection, MockState, product};

fn store() -> MockState {
    MockState {
        products: vec![
            product(1, "desk-lamp", "مصباح مكتب", "<p>ضوء <b>ساطع</b></p>", &["summer", "lighting"]),
            product(2, "chair", "كرسي", "", &["summer-sale"]),
            product(3, "table", "طاولة", "<p>خشب</p>", &["summer"]),
            product(4, "rug", "سجادة", "<p>صوف</p>", &[]),
            product(5, "fan", "مروحة", "<p>هواء</p>", &["summer", "cooling"]),
        ],
        collections: vec![
            MockCollection {
                id: "gid://shopify/Collection/10".to_string(),
                title: "Living Room".to_string(),
                handle: "living-room".to_string(),
                product_ids: vec![],
            },
            MockCollection {
                id: "gid://shopify/Collection/11".to_string(),
                title: "New Arrivals".to_string(),
                handle: "new-arrivals".to_string(),
                product_ids: vec![
                    "gid://shopify/Product/5".to_string(),
                    "gid://shopify/Product/1".to_string(),
                    "gid://shopify/Product/4".to_string(),
                ],
            },
            MockCollection {
                id: "gid://shopify/Collection/12".to_string(),
                title: "Outdoor".to_string(),
                handle: "outdoor".to_string(),
                product_ids: vec![],
            },
        ],
        ..MockState::default()
    }
}

fn handles(records: &[ProductRecord]) -> Vec<&str> {
    records.iter().filter_map(|r| r.handle()).collect()
}

#[tokio::test]
async fn test_all_products_concatenates_pages_in_order() {
    let mock = MockAdmin::start(store()).await;

    let records = mock.client().fetch_all_products().await.unwrap();

    assert_eq!(handles(&records), ["desk-lamp", "chair", "table", "rug", "fan"]);
    let pages = mock
        .operations()
        .iter()
        .filter(|op| *op == "GetProducts")
        .count();
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn test_records_keep_the_api_field_set() {
    let mock = MockAdmin::start(store()).await;

    let record = mock.client().fetch_product_by_handle("desk-lamp").await.unwrap();

    assert_eq!(record.id(), Some("gid://shopify/Product/1"));
    assert_eq!(record.title(), Some("مصباح مكتب"));
    assert_eq!(record.tags(), ["summer", "lighting"]);
    assert!(record.contains("seo"));
    assert!(record.contains("publishedAt"));
}

#[tokio::test]
async fn test_tag_returns_exact_matches_in_api_order() {
    let mock = MockAdmin::start(store()).await;

    let records = mock
        .client()
        .fetch_products(&ProductSelector::Tag("summer".to_string()))
        .await
        .unwrap();

    assert_eq!(handles(&records), ["desk-lamp", "table", "fan"]);
    assert!(records.iter().all(|r| r.has_tag("summer")));
}

#[tokio::test]
async fn test_missing_handle_is_not_found() {
    let mock = MockAdmin::start(store()).await;

    let err = mock
        .client()
        .fetch_product_by_handle("does-not-exist")
        .await
        .unwrap_err();

    assert!(matches!(err, AdminShopifyError::NotFound(_)));
}

#[tokio::test]
async fn test_product_by_numeric_id() {
    let mock = MockAdmin::start(store()).await;

    let record = mock.client().fetch_product_by_id("3").await.unwrap();
    assert_eq!(record.handle(), Some("table"));

    let err = mock.client().fetch_product_by_id("999").await.unwrap_err();
    assert!(matches!(err, AdminShopifyError::NotFound(_)));
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let mock = MockAdmin::start(store()).await;

    let err = mock
        .client_with_token("shpat_wrong")
        .fetch_all_products()
        .await
        .unwrap_err();

    assert!(matches!(err, AdminShopifyError::Unauthorized(_)));
}

#[tokio::test]
async fn test_throttled_request_is_rate_limited() {
    let mut state = store();
    state.force_status = Some(429);
    state.retry_after = Some("7".to_string());
    let mock = MockAdmin::start(state).await;

    let err = mock.client().fetch_all_products().await.unwrap_err();

    assert!(matches!(err, AdminShopifyError::RateLimited(7)));
    assert_eq!(mock.operations().len(), 1);
}

#[tokio::test]
async fn test_server_error_is_a_status_error() {
    let mut state = store();
    state.force_status = Some(500);
    let mock = MockAdmin::start(state).await;

    let err = mock.client().fetch_product_by_handle("desk-lamp").await.unwrap_err();

    match err {
        AdminShopifyError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("unavailable"));
        }
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_store_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ShopifyAdminConfig {
        store_domain: addr.to_string(),
        api_version: "2025-07".to_string(),
        access_token: SecretString::from(MOCK_TOKEN.to_string()),
        request_timeout: Duration::from_secs(2),
    };
    let client = AdminClient::with_endpoint(&config, format!("http://{addr}/graphql.json"))
        .unwrap()
        .with_page_delay(Duration::ZERO);

    let err = client.fetch_all_products().await.unwrap_err();

    assert!(matches!(err, AdminShopifyError::Http(_)));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_next_page_without_cursor_is_an_error() {
    let mut state = store();
    state.drop_end_cursor = true;
    let mock = MockAdmin::start(state).await;

    let err = mock.client().fetch_all_products().await.unwrap_err();

    assert!(matches!(err, AdminShopifyError::Parse(_)));
    assert!(err.to_string().contains("no end cursor"));
}

#[tokio::test]
async fn test_collection_lookups() {
    let mock = MockAdmin::start(store()).await;
    let client = mock.client();

    for selector in [
        ProductSelector::CollectionHandle("new-arrivals".to_string()),
        ProductSelector::CollectionTitle("New Arrivals".to_string()),
        ProductSelector::CollectionId("11".to_string()),
    ] {
        let records = client.fetch_products(&selector).await.unwrap();
        assert_eq!(handles(&records), ["fan", "desk-lamp", "rug"], "{selector}");
    }

    let err = client
        .fetch_products(&ProductSelector::CollectionTitle("Kitchen".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminShopifyError::NotFound(_)));
}

#[tokio::test]
async fn test_export_annotates_every_record() {
    let mock = MockAdmin::start(store()).await;
    let dir = tempfile::tempdir().unwrap();
    let languages = LanguagePair::new("ar", "en").unwrap();

    let summary = fetch_and_export(
        &mock.client(),
        &ProductSelector::All,
        &languages,
        &ExportOptions::new(dir.path()),
    )
    .await
    .unwrap();

    assert_eq!(summary.count, 5);
    assert!(dir.path().join("products_raw.json").exists());

    let annotated = formats::read_records(&dir.path().join("products_with_lang.json"), None).unwrap();
    assert_eq!(annotated.len(), 5);
    for record in &annotated {
        assert_eq!(record.get_str("original_language"), Some("ar"));
        assert_eq!(record.get_str("target_language"), Some("en"));
        assert_eq!(record.get_str("title_en"), Some(""));
    }
    assert_eq!(annotated[0].get_str("title_ar"), Some("مصباح مكتب"));
}

#[tokio::test]
async fn test_tabular_exports_match_json() {
    let mock = MockAdmin::start(store()).await;
    let dir = tempfile::tempdir().unwrap();
    let languages = LanguagePair::new("ar", "en").unwrap();

    fetch_and_export(
        &mock.client(),
        &ProductSelector::Tag("summer".to_string()),
        &languages,
        &ExportOptions::new(dir.path()),
    )
    .await
    .unwrap();

    let json = formats::read_records(&dir.path().join("products_tag_summer_with_lang.json"), None)
        .unwrap();
    let csv = formats::read_records(&dir.path().join("products_tag_summer_with_lang.csv"), None)
        .unwrap();
    let xlsx = formats::read_records(
        &dir.path().join("products_tag_summer_with_lang.xlsx"),
        Some(PRODUCTS_SHEET),
    )
    .unwrap();

    assert_eq!(to_table(&csv), to_table(&json));
    assert_eq!(to_table(&xlsx), to_table(&json));
}

#[tokio::test]
async fn test_empty_selection_is_an_error() {
    let mock = MockAdmin::start(store()).await;
    let dir = tempfile::tempdir().unwrap();
    let languages = LanguagePair::new("ar", "en").unwrap();

    let err = fetch_and_export(
        &mock.client(),
        &ProductSelector::Tag("winter".to_string()),
        &languages,
        &ExportOptions::new(dir.path()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::NoProducts(_)));
}
