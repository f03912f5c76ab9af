//! Stripe adapter against a local HTTP server standing in for the API.

use checkout_gateway::adapters::stripe::{StripeApiError, StripeWebhookVerifier};
use checkout_gateway::adapters::{StripeCheckoutManager, StripeConfig};
use checkout_gateway::config::PaymentConfig;
use checkout_gateway::domain::foundation::Money;
use checkout_gateway::ports::{CheckoutManager, CheckoutParams, Item, Metadata, PaymentErrorReason};
use mockito::Matcher;
use serde_json::json;
use std::error::Error;

const API_KEY: &str = "sk_test_123";
const WEBHOOK_SECRET: &str = "whsec_test_secret";

fn manager(server: &mockito::ServerGuard) -> StripeCheckoutManager {
    StripeCheckoutManager::new(StripeConfig::new(API_KEY, WEBHOOK_SECRET).with_base_url(server.url()))
}

fn params() -> CheckoutParams {
    CheckoutParams::new(
        "https://shop.example.com/return",
        vec![Item::new("Widget", Money::from_minor("EUR", 1999).unwrap()).with_quantity(3)],
    )
    .with_metadata_entry("order_id", "ord_42")
    .with_adaptive_pricing(false)
}

// ════════════════════════════════════════════════════════════════════════════════
// create_checkout
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_checkout_posts_session_form() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/checkout/sessions")
        .match_header("authorization", "Basic c2tfdGVzdF8xMjM6")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("mode".into(), "payment".into()),
            Matcher::UrlEncoded("ui_mode".into(), "embedded".into()),
            Matcher::UrlEncoded("return_url".into(), "https://shop.example.com/return".into()),
            Matcher::UrlEncoded("line_items[0][quantity]".into(), "3".into()),
            Matcher::UrlEncoded("line_items[0][price_data][currency]".into(), "eur".into()),
            Matcher::UrlEncoded("line_items[0][price_data][unit_amount]".into(), "1999".into()),
            Matcher::UrlEncoded(
                "line_items[0][price_data][product_data][name]".into(),
                "Widget".into(),
            ),
            Matcher::UrlEncoded("metadata[order_id]".into(), "ord_42".into()),
            Matcher::UrlEncoded("adaptive_pricing[enabled]".into(), "false".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "cs_test_abc",
                "object": "checkout.session",
                "client_secret": "cs_test_abc_secret_xyz",
                "payment_status": "unpaid",
                "status": "open"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let info = manager(&server).create_checkout(params()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(info.session_id, "cs_test_abc");
    assert_eq!(info.client_secret, "cs_test_abc_secret_xyz");
}

#[tokio::test]
async fn create_checkout_maps_api_error() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/checkout/sessions")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "type": "invalid_request_error",
                    "code": "parameter_invalid_empty",
                    "param": "line_items",
                    "message": "You must provide at least one line item."
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = manager(&server).create_checkout(params()).await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.reason(), PaymentErrorReason::FailedToCreateCheckoutSession);
    let api_error = err
        .source()
        .and_then(|source| source.downcast_ref::<StripeApiError>())
        .expect("cause should be the Stripe API error");
    assert_eq!(api_error.status, 400);
    assert_eq!(api_error.message, "You must provide at least one line item.");
    assert!(err.to_string().contains("You must provide at least one line item."));
}

#[tokio::test]
async fn create_checkout_without_client_secret_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/checkout/sessions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "cs_test_abc", "client_secret": null}).to_string())
        .create_async()
        .await;

    let err = manager(&server).create_checkout(params()).await.unwrap_err();

    assert_eq!(err.reason(), PaymentErrorReason::FailedToCreateCheckoutSession);
    assert!(err.source().is_some());
}

#[tokio::test]
async fn create_checkout_with_empty_session_id_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/checkout/sessions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "", "client_secret": "cs_test_abc_secret_xyz"}).to_string())
        .create_async()
        .await;

    let err = manager(&server).create_checkout(params()).await.unwrap_err();

    assert_eq!(err.reason(), PaymentErrorReason::FailedToCreateCheckoutSession);
    assert!(err.to_string().contains("empty id"));
}

#[tokio::test]
async fn create_checkout_with_unparseable_body_fails() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/checkout/sessions")
        .with_status(200)
        .with_body("<html>gateway timeout</html>")
        .create_async()
        .await;

    let err = manager(&server).create_checkout(params()).await.unwrap_err();

    assert_eq!(err.reason(), PaymentErrorReason::FailedToCreateCheckoutSession);
}

#[tokio::test]
async fn create_checkout_unreachable_api_fails() {
    let config = StripeConfig::new(API_KEY, WEBHOOK_SECRET).with_base_url("http://127.0.0.1:1");
    let manager = StripeCheckoutManager::new(config);

    let err = manager.create_checkout(params()).await.unwrap_err();

    assert_eq!(err.reason(), PaymentErrorReason::FailedToCreateCheckoutSession);
    assert!(err.source().is_some());
}

// ════════════════════════════════════════════════════════════════════════════════
// confirm_checkout
// ════════════════════════════════════════════════════════════════════════════════

fn signed(event_type: &str, payment_status: &str) -> (Vec<u8>, String) {
    let payload = json!({
        "id": "evt_1",
        "object": "event",
        "type": event_type,
        "created": chrono::Utc::now().timestamp(),
        "data": {
            "object": {
                "id": "cs_test_abc",
                "object": "checkout.session",
                "payment_status": payment_status,
                "metadata": {"order_id": "ord_42"}
            }
        },
        "livemode": false
    })
    .to_string()
    .into_bytes();

    let signature = StripeWebhookVerifier::new(WEBHOOK_SECRET)
        .sign(&payload, chrono::Utc::now().timestamp());
    (payload, signature)
}

#[tokio::test]
async fn confirm_checkout_from_payment_config() {
    let mut config = PaymentConfig::new(API_KEY, WEBHOOK_SECRET);
    config.api_base_url = "http://127.0.0.1:1".to_string();
    let manager = StripeCheckoutManager::from_config(&config);

    let (payload, signature) = signed("checkout.session.completed", "paid");
    let metadata = manager.confirm_checkout(&payload, &signature).await.unwrap();

    assert_eq!(
        metadata,
        Metadata::from([("order_id".to_string(), "ord_42".to_string())])
    );
}

#[tokio::test]
async fn confirm_checkout_expired_carries_metadata() {
    let manager = StripeCheckoutManager::new(StripeConfig::new(API_KEY, WEBHOOK_SECRET));

    let (payload, signature) = signed("checkout.session.expired", "unpaid");
    let err = manager.confirm_checkout(&payload, &signature).await.unwrap_err();

    assert_eq!(err.reason(), PaymentErrorReason::CheckoutExpired);
    assert_eq!(
        err.metadata().and_then(|m| m.get("order_id")).map(String::as_str),
        Some("ord_42")
    );
}

#[tokio::test]
async fn confirm_checkout_rejects_stale_signature() {
    let manager = StripeCheckoutManager::new(StripeConfig::new(API_KEY, WEBHOOK_SECRET));

    let (payload, _) = signed("checkout.session.completed", "paid");
    let stale = StripeWebhookVerifier::new(WEBHOOK_SECRET)
        .sign(&payload, chrono::Utc::now().timestamp() - 3600);

    let err = manager.confirm_checkout(&payload, &stale).await.unwrap_err();

    assert_eq!(err.reason(), PaymentErrorReason::SignatureValidation);
}
