use coterie_test_utils::*;

#[tokio::test]
async fn health_check_is_public() {
    let (router, _stores, _notifier) = create_test_router_and_stores().await;
    let (status, body) = send_request(&router, "GET", "/health", None, None).await;
    assert_api_ok(status, &body);
    assert_eq!(body["status"], "ok");
}
