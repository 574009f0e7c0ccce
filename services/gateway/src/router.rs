use crate::handlers::{aircraft, component, equipment, escrow, events, roles};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/roles/{role}",
            post(roles::grant_role).delete(roles::renounce_role),
        )
        .route("/roles/{role}/{identity}", get(roles::get_membership))
        .route("/aircraft", post(aircraft::order_aircraft))
        .route("/aircraft/{serial}", get(aircraft::get_aircraft))
        .route(
            "/aircraft/{serial}/structure",
            post(aircraft::prepare_structure),
        )
        .route("/aircraft/{serial}/receive", post(aircraft::receive_aircraft))
        .route("/equipment", post(equipment::order_equipment))
        .route("/equipment/{id}", get(equipment::get_equipment))
        .route("/equipment/{id}/pack", post(equipment::pack_equipment))
        .route(
            "/equipment/{id}/transport",
            post(equipment::transport_equipment),
        )
        .route("/equipment/{id}/receive", post(equipment::receive_equipment))
        .route("/equipment/{id}/process", post(equipment::process_equipment))
        .route("/components", post(component::receive_component))
        .route("/components/{id}", get(component::get_component))
        .route(
            "/components/{id}/process",
            post(component::process_component),
        )
        .route("/escrow/withdraw", post(escrow::withdraw))
        .route("/escrow/{identity}", get(escrow::get_pending))
        .route("/events", get(events::list_events));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, PAYMENT_HEADER};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use contracts::snapshot::Snapshot;
    use contracts::{Call, SupplyChain};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use std::time::{SystemTime, UNIX_EPOCH};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use types::ids::{Identity, Upc};
    use types::role::Role;

    const SECRET: &str = "test-secret";
    const OWNER: Identity = Identity::from_tag(0xa0);
    const SUPPLIER: Identity = Identity::from_tag(0xa1);
    const MANUFACTURER: Identity = Identity::from_tag(0xa3);
    const CUSTOMER: Identity = Identity::from_tag(0xa4);

    fn token_for(identity: Identity) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize
            + 3600;
        let claims = Claims {
            sub: identity.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn setup_state() -> AppState {
        AppState::new(SupplyChain::deploy_local(OWNER), SECRET, None)
    }

    /// A snapshot path whose parent is a regular file, so saves fail
    /// until the file is removed.
    fn setup_blocked_path(dir: &TempDir) -> (PathBuf, PathBuf) {
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        (blocker.clone(), blocker.join("chain.json"))
    }

    fn setup_ordering_chain() -> SupplyChain {
        let mut chain = SupplyChain::deploy_local(OWNER);
        chain
            .add_role(&OWNER, Role::Customer, CUSTOMER, "customer")
            .unwrap();
        chain
            .add_role(&OWNER, Role::Manufacturer, MANUFACTURER, "manufacturer")
            .unwrap();
        chain
    }

    fn decimal_field(body: &Value, field: &str) -> Decimal {
        body[field].as_str().unwrap().parse().unwrap()
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        caller: Option<Identity>,
        payment: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(identity) = caller {
            builder = builder.header("Authorization", format!("Bearer {}", token_for(identity)));
        }
        if let Some(amount) = payment {
            builder = builder.header(PAYMENT_HEADER, amount);
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn grant(app: &Router, role: &str, identity: Identity) {
        let (status, _) = send(
            app,
            Method::POST,
            &format!("/v1/roles/{role}"),
            Some(OWNER),
            None,
            Some(json!({ "identity": identity.to_string(), "name": role })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let app = create_router(setup_state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/escrow/withdraw",
            None,
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_grant_and_query_role() {
        let app = create_router(setup_state());
        grant(&app, "customer", CUSTOMER).await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/v1/roles/customer/{CUSTOMER}"),
            None,
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["held"], true);
        assert_eq!(body["name"], "customer");
    }

    #[tokio::test]
    async fn test_grant_without_role_is_403() {
        let app = create_router(setup_state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/roles/supplier",
            Some(CUSTOMER),
            None,
            Some(json!({ "identity": SUPPLIER.to_string(), "name": "s" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_order_aircraft_returns_record_array() {
        let app = create_router(setup_state());
        grant(&app, "customer", CUSTOMER).await;
        grant(&app, "manufacturer", MANUFACTURER).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/aircraft",
            Some(CUSTOMER),
            Some("1000000000000000000"),
            Some(json!({ "equipment_id": 1, "manufacturer": MANUFACTURER.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let record = body.as_array().unwrap();
        assert_eq!(record.len(), 9);
        assert_eq!(record[0], 1);
        assert_eq!(record[3], 1);
        assert_eq!(record[4], Identity::EMPTY.to_string());
        assert_eq!(record[8], CUSTOMER.to_string());

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/v1/escrow/{MANUFACTURER}"),
            None,
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let pending: Decimal = body["pending"].as_str().unwrap().parse().unwrap();
        assert_eq!(pending, Decimal::from(500_000_000_000_000_000u64));
    }

    #[tokio::test]
    async fn test_wrong_payment_is_402() {
        let app = create_router(setup_state());
        grant(&app, "customer", CUSTOMER).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/aircraft",
            Some(CUSTOMER),
            Some("1"),
            Some(json!({ "equipment_id": 1, "manufacturer": MANUFACTURER.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["error"], "PAYMENT_MISMATCH");
    }

    #[tokio::test]
    async fn test_malformed_payment_is_400() {
        let app = create_router(setup_state());
        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/aircraft",
            Some(CUSTOMER),
            Some("one ether"),
            Some(json!({ "equipment_id": 1, "manufacturer": MANUFACTURER.to_string() })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_aircraft_is_404() {
        let app = create_router(setup_state());
        let (status, body) = send(&app, Method::GET, "/v1/aircraft/9", None, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_events_since() {
        let app = create_router(setup_state());
        grant(&app, "supplier", SUPPLIER).await;

        let (status, body) = send(&app, Method::GET, "/v1/events?since=4", None, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_sequence"], 5);
        let events = body["events"].as_array().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["sequence"], 5);
        assert_eq!(events[0]["event"]["kind"], "RoleAdded");
    }

    #[tokio::test]
    async fn test_mutations_persist_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chain.json");
        let state = AppState::new(SupplyChain::deploy_local(OWNER), SECRET, Some(path.clone()));
        let app = create_router(state);

        grant(&app, "customer", CUSTOMER).await;
        let snapshot = Snapshot::load(&path).unwrap();
        let restored = SupplyChain::restore(snapshot.state, contracts::rail::LocalRail::new());
        assert!(restored.has_role(types::role::Role::Customer, &CUSTOMER));

        // Rejected calls leave the file alone
        let before = std::fs::read_to_string(&path).unwrap();
        let (status, _) = send(
            &app,
            Method::DELETE,
            "/v1/roles/transporter",
            Some(CUSTOMER),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_snapshot_rolls_back_grant() {
        let dir = TempDir::new().unwrap();
        let (blocker, path) = setup_blocked_path(&dir);
        let app = create_router(AppState::new(
            SupplyChain::deploy_local(OWNER),
            SECRET,
            Some(path.clone()),
        ));
        let body = json!({ "identity": CUSTOMER.to_string(), "name": "customer" });

        let (status, error) = send(
            &app,
            Method::POST,
            "/v1/roles/customer",
            Some(OWNER),
            None,
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error["error"], "PERSISTENCE_ERROR");

        let (_, membership) = send(
            &app,
            Method::GET,
            &format!("/v1/roles/customer/{CUSTOMER}"),
            None,
            None,
            None,
        )
        .await;
        assert_eq!(membership["held"], false);
        let (_, events) = send(&app, Method::GET, "/v1/events", None, None, None).await;
        assert_eq!(events["last_sequence"], 4);

        // Once the path is writable the same request succeeds exactly once
        std::fs::remove_file(&blocker).unwrap();
        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/roles/customer",
            Some(OWNER),
            None,
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, error) = send(
            &app,
            Method::POST,
            "/v1/roles/customer",
            Some(OWNER),
            None,
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["error"], "DUPLICATE_ID");
        assert!(Snapshot::load(&path).is_ok());
    }

    #[tokio::test]
    async fn test_failed_snapshot_rolls_back_order() {
        let dir = TempDir::new().unwrap();
        let (blocker, path) = setup_blocked_path(&dir);
        let app = create_router(AppState::new(setup_ordering_chain(), SECRET, Some(path)));
        let body = json!({ "equipment_id": 1, "manufacturer": MANUFACTURER.to_string() });
        let price = "1000000000000000000";

        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/aircraft",
            Some(CUSTOMER),
            Some(price),
            Some(body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&app, Method::GET, "/v1/aircraft/1", None, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, escrow) = send(
            &app,
            Method::GET,
            &format!("/v1/escrow/{MANUFACTURER}"),
            None,
            None,
            None,
        )
        .await;
        assert_eq!(decimal_field(&escrow, "pending"), Decimal::ZERO);

        std::fs::remove_file(&blocker).unwrap();
        let (status, record) = send(
            &app,
            Method::POST,
            "/v1/aircraft",
            Some(CUSTOMER),
            Some(price),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        // The rolled-back order never took serial 1
        assert_eq!(record[0], 1);
        let (_, escrow) = send(
            &app,
            Method::GET,
            &format!("/v1/escrow/{MANUFACTURER}"),
            None,
            None,
            None,
        )
        .await;
        assert_eq!(
            decimal_field(&escrow, "pending"),
            Decimal::from(500_000_000_000_000_000u64)
        );
    }

    #[tokio::test]
    async fn test_withdraw_kept_when_snapshot_fails() {
        let dir = TempDir::new().unwrap();
        let (_blocker, path) = setup_blocked_path(&dir);
        let mut chain = setup_ordering_chain();
        let price = chain.config().aircraft_price;
        chain
            .order_aircraft(&Call::paying(CUSTOMER, price), Upc::new(1), MANUFACTURER)
            .unwrap();
        let installment = chain.config().aircraft_installment();
        let state = AppState::new(chain, SECRET, Some(path));
        let app = create_router(state.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/escrow/withdraw",
            Some(MANUFACTURER),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal_field(&body, "amount"), installment);

        let (pending, paid) = state
            .read(|chain| {
                (
                    chain.pending_withdrawals(&MANUFACTURER),
                    chain.rail().balance_of(&MANUFACTURER),
                )
            })
            .unwrap();
        assert_eq!(pending, Decimal::ZERO);
        assert_eq!(paid, installment);
    }

    #[tokio::test]
    async fn test_malformed_requests_return_json_errors() {
        let app = create_router(setup_state());

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/roles/pilot",
            Some(OWNER),
            None,
            Some(json!({ "identity": CUSTOMER.to_string(), "name": "p" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");

        let (status, body) = send(&app, Method::GET, "/v1/escrow/0x1234", None, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");

        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/aircraft",
            Some(CUSTOMER),
            None,
            Some(json!({ "equipment_id": "one" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");

        let (status, body) =
            send(&app, Method::GET, "/v1/events?since=latest", None, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }
}
