use super::*;

fn test_client(base_url: &str) -> SitesClient {
    SitesClient::new(base_url, 30, "sitescout-test/0.1").expect("client construction should not fail")
}

#[test]
fn endpoint_appends_segments_to_root() {
    let client = test_client("http://localhost:5000");
    let url = client.endpoint(&["api", "search", "paris"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/api/search/paris");
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let client = test_client("https://sites.example.com/v2/");
    let url = client.endpoint(&["api", "sites", "eiffel-1"]).unwrap();
    assert_eq!(url.as_str(), "https://sites.example.com/v2/api/sites/eiffel-1");
}

#[test]
fn endpoint_percent_encodes_segments() {
    let client = test_client("http://localhost:5000");
    let url = client.endpoint(&["api", "search", "new york/ny"]).unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/api/search/new%20york%2Fny");
}

#[test]
fn new_rejects_invalid_base_url() {
    let result = SitesClient::new("not a url", 30, "ua");
    assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
}

#[test]
fn new_rejects_non_http_scheme() {
    let result = SitesClient::new("mailto:someone@example.com", 30, "ua");
    assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
}
