//! Scenario: Order composition over HTTP.
//!
//! # Invariants under test
//!
//! - `POST /orders` prices lines from the catalog, snapshots unit prices and
//!   returns 201 with the authoritative total (`Σ price * quantity`).
//! - Missing customer/items and unknown catalog references produce the exact
//!   caller-facing error bodies.
//! - `GET /orders/{id}` returns the expanded view; set-priced lines carry
//!   their current constituent list.
//! - `GET /orders` honours the role/customer scope rules.
//!
//! All tests are pure in-process; no DB or network required.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mesa_core::cart::{normalize_cart, CartLine, CartSetItem};
use mesa_server::{routes, state::AppState};
use mesa_testkit::MemStore;
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seeded_state() -> Arc<AppState> {
    let store = MemStore::new()
        .with_customer(7, "Alice Diner")
        .with_customer(8, "Bob Booth")
        .with_menu_item(3, "Pad Thai", 12.99)
        .with_menu_item(4, "Spring Rolls", 5.5)
        .with_set_menu(9, "Lunch Set", 18.0, &[(3, 1), (4, 2)]);
    Arc::new(AppState::new(Arc::new(store)))
}

fn router(st: &Arc<AppState>) -> axum::Router {
    routes::build_router(Arc::clone(st))
}

async fn call(router: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    let json = serde_json::from_slice(&body).expect("body is not valid JSON");
    (status, json)
}

fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// Creation and pricing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_order_returns_authoritative_total() {
    let st = seeded_state();

    let body = json!({
        "customerId": 7,
        "items": [{ "menu_item_id": 3, "quantity": 2 }]
    });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Order created successfully");
    assert_eq!(json["orderId"], 1);
    assert_eq!(json["totalAmount"], 25.98);

    // The expanded view carries the priced snapshot.
    let (status, json) = call(router(&st), get_req("/orders/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["customer_id"], 7);
    assert_eq!(json["customer_name"], "Alice Diner");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["refund_status"], "none");
    assert_eq!(json["total_amount"], 25.98);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["name"], "Pad Thai");
    assert_eq!(json["items"][0]["price"], 12.99);
    assert_eq!(json["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn set_menu_line_is_priced_by_the_set_and_expanded() {
    let st = seeded_state();

    let body = json!({
        "customerId": 7,
        "items": [{ "set_menu_id": 9, "quantity": 1, "note": "no peanuts" }]
    });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["totalAmount"], 18.0);

    let (_, json) = call(router(&st), get_req("/orders/1")).await;
    let item = &json["items"][0];
    assert_eq!(item["name"], "Lunch Set");
    assert_eq!(item["note"], "no peanuts");
    let constituents = item["set_menu_items"].as_array().unwrap();
    assert_eq!(constituents.len(), 2);
    assert_eq!(constituents[0]["name"], "Pad Thai");
    assert_eq!(constituents[0]["quantity"], 1);
    assert_eq!(constituents[1]["name"], "Spring Rolls");
    assert_eq!(constituents[1]["quantity"], 2);
}

#[tokio::test]
async fn normalized_cart_submits_cleanly() {
    // End-to-end: client cart -> normalizer -> POST body. A standalone item
    // and the same item inside a set stay separate lines.
    let st = seeded_state();

    let cart = [
        CartLine::Menu {
            id: 3,
            price: 12.99,
            quantity: 2,
            note: None,
        },
        CartLine::Set {
            set_menu_id: 9,
            name: "Lunch Set".to_string(),
            price: 18.0,
            items: vec![CartSetItem {
                menu_item_id: 3,
                quantity: 1,
            }],
            quantity: 3,
            note: None,
        },
    ];
    let lines = normalize_cart(&cart);
    assert_eq!(lines.len(), 2);

    let body = json!({ "customerId": 7, "items": serde_json::to_value(&lines).unwrap() });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    // 2 * 12.99 standalone + 3 * 18.0 set-priced constituent line.
    assert_eq!(json["totalAmount"], 25.98 + 54.0);

    let (_, json) = call(router(&st), get_req("/orders/1")).await;
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["menu_item_id"], 3);
    assert!(items[0]["set_menu_id"].is_null());
    assert_eq!(items[1]["menu_item_id"], 3);
    assert_eq!(items[1]["set_menu_id"], 9);
    assert_eq!(items[1]["quantity"], 3);
}

#[tokio::test]
async fn quantities_beyond_32_bits_survive_intact() {
    // Quantities are i64 end to end: the stored line and the total must
    // agree even past i32::MAX.
    let st = seeded_state();

    let qty: i64 = 5_000_000_000;
    let body = json!({
        "customerId": 7,
        "items": [{ "menu_item_id": 4, "quantity": qty }]
    });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["totalAmount"], 5.5 * qty as f64);

    let (_, json) = call(router(&st), get_req("/orders/1")).await;
    assert_eq!(json["items"][0]["quantity"], qty);
    assert_eq!(json["total_amount"], 5.5 * qty as f64);
}

// ---------------------------------------------------------------------------
// Validation failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_customer_or_items_is_400() {
    let st = seeded_state();

    for body in [
        json!({ "items": [{ "menu_item_id": 3, "quantity": 1 }] }),
        json!({ "customerId": 7 }),
        json!({ "customerId": 7, "items": [] }),
    ] {
        let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Customer ID and order items are required");
    }
}

#[tokio::test]
async fn non_positive_quantity_is_400() {
    let st = seeded_state();

    let body = json!({
        "customerId": 7,
        "items": [{ "menu_item_id": 3, "quantity": 0 }]
    });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Each order item requires a positive quantity");
}

#[tokio::test]
async fn unparseable_body_keeps_the_error_shape() {
    let st = seeded_state();

    let req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = call(router(&st), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid order payload");
}

#[tokio::test]
async fn unknown_catalog_references_are_404() {
    let st = seeded_state();

    let body = json!({
        "customerId": 7,
        "items": [{ "menu_item_id": 99, "quantity": 1 }]
    });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Menu item with ID 99 not found");

    let body = json!({
        "customerId": 7,
        "items": [{ "set_menu_id": 42, "quantity": 1 }]
    });
    let (status, json) = call(router(&st), json_req("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Set menu with ID 42 not found");
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_order_is_404() {
    let st = seeded_state();
    let (status, json) = call(router(&st), get_req("/orders/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Order not found");

    // Non-numeric ids name no order either, and keep the error shape.
    let (status, json) = call(router(&st), get_req("/orders/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Order not found");
}

#[tokio::test]
async fn list_scopes_by_role() {
    let st = seeded_state();

    for (customer, item) in [(7, 3), (8, 4)] {
        let body = json!({
            "customerId": customer,
            "items": [{ "menu_item_id": item, "quantity": 1 }]
        });
        let (status, _) = call(router(&st), json_req("POST", "/orders", body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Customers see only their own orders.
    let (status, json) = call(router(&st), get_req("/orders?customerId=7&role=customer")).await;
    assert_eq!(status, StatusCode::OK);
    let mine = json.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["customer_id"], 7);

    // Staff and admin (and no role at all) see everything.
    for uri in ["/orders?role=staff", "/orders?role=admin", "/orders"] {
        let (status, json) = call(router(&st), get_req(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2, "uri {uri}");
    }

    // role=customer without a customer id is rejected.
    let (status, json) = call(router(&st), get_req("/orders?role=customer")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Customer ID is required");
}

#[tokio::test]
async fn health_reports_service_metadata() {
    let st = seeded_state();
    let (status, json) = call(router(&st), get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "mesa-server");
}
