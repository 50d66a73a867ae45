//! End-to-end aggregation against a mocked tax authority and registry

use company_intel::{AggregateError, Aggregator, IntelConfig, RegistryRecord};
use httpmock::prelude::*;
use httpmock::Mock;

const COMPANY: &str = "404404404";
const MAIN: &str = "/_dea/main.php";
const TAX_SEARCH: &str = "/RsGe.Module/TaxpayersRegistry/GrdSearchTaxPayers";
const PUBLIC_INFO: &str = "/TaxPayer/PublicInfo";

const SEARCH_PAGE: &str = include_str!("fixtures/registry_search.html");
const ENTITY_PAGE: &str = include_str!("fixtures/registry_entity.html");
const APP_PAGE: &str = include_str!("fixtures/registry_application.html");

const ROW_REPLY: &str =
    r#"{"Data":{"Rows":[["აქტიური","შპს","შპს აკმე","","404404404","B10000001","","2015-03-02"]]}}"#;
const PUBLIC_REPLY: &str = r#"{
    "id": "404404404",
    "name": "შპს აკმე",
    "legal_form": "შეზღუდული პასუხისმგებლობის საზოგადოება",
    "status": "აქტიური",
    "id_date": "02.03.2015",
    "address": "თბილისი, რუსთაველის გამზ. 1",
    "Directors": [{"name": "ნინო ბერიძე", "id": "01001000001", "type": "დირექტორი"}],
    "Founders": [{"name": "გიორგი ბერიძე", "id": "01001000002", "percent": 60}]
}"#;

fn aggregator(server: &MockServer) -> Aggregator {
    let config = IntelConfig::with_base_url(&server.base_url());
    Aggregator::from_config(&config).unwrap()
}

async fn mock_tax(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TAX_SEARCH)
                .form_urlencoded_tuple("tin", COMPANY);
            then.status(200)
                .header("content-type", "application/json")
                .body(ROW_REPLY);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(PUBLIC_INFO)
                .query_param("IdentCode", COMPANY);
            then.status(200)
                .header("content-type", "application/json")
                .body(PUBLIC_REPLY);
        })
        .await;
}

async fn mock_registry<'a>(server: &'a MockServer) -> (Mock<'a>, Mock<'a>) {
    let search_referer = format!("{}?m=new_index", server.url(MAIN));
    let search = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(MAIN)
                .form_urlencoded_tuple("m", "find_legal_persons")
                .form_urlencoded_tuple("s_legal_person_idnumber", COMPANY)
                .header("origin", server.base_url())
                .header("referer", search_referer);
            then.status(200).body(SEARCH_PAGE);
        })
        .await;
    let detail = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(MAIN)
                .query_param("m", "show_legal_person")
                .query_param("legal_code_id", "778899")
                .query_param("enteredCaptcha", "1");
            then.status(200).body(ENTITY_PAGE);
        })
        .await;
    (search, detail)
}

async fn mock_applications(server: &MockServer) {
    let entity_referer = format!("{}?c=app&m=show_legal_person", server.url(MAIN));
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(MAIN)
                .query_param("m", "show_app")
                .query_param("app_id", "5001")
                .header("referer", entity_referer);
            then.status(200).body(APP_PAGE);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(MAIN)
                .query_param("m", "show_app")
                .query_param("app_id", "5003");
            then.status(500).body("internal error");
        })
        .await;
}

#[tokio::test]
async fn test_full_lookup_merges_both_sources() {
    let server = MockServer::start_async().await;
    mock_tax(&server).await;
    let (search, detail) = mock_registry(&server).await;
    mock_applications(&server).await;

    let info = aggregator(&server).lookup(COMPANY).await.unwrap();
    search.assert_async().await;
    detail.assert_async().await;

    assert_eq!(info.company_id, COMPANY);

    let tax = info.revenue_service_info.as_ref().unwrap();
    assert_eq!(tax.id, COMPANY);
    assert_eq!(tax.name, "შპს აკმე");
    assert_eq!(tax.entity_type, "შეზღუდული პასუხისმგებლობის საზოგადოება");
    assert_eq!(tax.registration_number, "B10000001");
    assert_eq!(tax.directors.len(), 1);
    assert_eq!(tax.founders[0].full_name, "გიორგი ბერიძე");

    let Some(RegistryRecord::Found {
        internal_handle,
        applications,
        ..
    }) = &info.entrepreneurial_registry_info
    else {
        panic!("expected a registry record");
    };
    assert_eq!(internal_handle, "778899");

    let ids: Vec<_> = applications.iter().map(|a| a.stub.app_id.as_str()).collect();
    assert_eq!(ids, vec!["5001", "5003"]);

    let parsed = applications[0].details.parsed().unwrap();
    assert!(!parsed.prepared_documents.is_empty());
    assert_eq!(parsed.metadata.registration_number, "B20000001");

    let failed = serde_json::to_value(&applications[1].details).unwrap();
    assert_eq!(failed["error"], "Failed to fetch details, status: 500");
}

#[tokio::test]
async fn test_repeated_lookup_is_stable() {
    let server = MockServer::start_async().await;
    mock_tax(&server).await;
    mock_registry(&server).await;
    mock_applications(&server).await;

    let aggregator = aggregator(&server);
    let first = aggregator.lookup(COMPANY).await.unwrap();
    let second = aggregator.lookup(COMPANY).await.unwrap();

    assert_eq!(first.revenue_service_info, second.revenue_service_info);
    assert_eq!(
        first.entrepreneurial_registry_info,
        second.entrepreneurial_registry_info
    );
}

#[tokio::test]
async fn test_registry_outage_keeps_tax_data() {
    let server = MockServer::start_async().await;
    mock_tax(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(MAIN);
            then.status(503).body("maintenance");
        })
        .await;

    let info = aggregator(&server).lookup(COMPANY).await.unwrap();
    assert!(info.revenue_service_info.is_some());
    assert!(info.entrepreneurial_registry_info.is_none());

    let value = serde_json::to_value(&info).unwrap();
    assert!(value["entrepreneurial_registry_info"].is_null());
}

#[tokio::test]
async fn test_unknown_company_is_no_information() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(TAX_SEARCH);
            then.status(200).body(r#"{"Data":{"Rows":[]}}"#);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(PUBLIC_INFO);
            then.status(500).body("");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(MAIN);
            then.status(200)
                .body(include_str!("fixtures/registry_search_empty.html"));
        })
        .await;

    let err = aggregator(&server).lookup(COMPANY).await.unwrap_err();
    assert!(matches!(err, AggregateError::NoInformation { ref company_id } if company_id == COMPANY));
}
