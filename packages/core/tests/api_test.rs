//! Admin API tests
//!
//! Requests go straight through the router with `tower::ServiceExt::oneshot`;
//! no socket is bound.

#[cfg(test)]
mod api_tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use schoolsite_core::db::InMemoryStore;
    use schoolsite_core::http::create_router;
    use schoolsite_core::services::NodeService;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        create_router(NodeService::new(Arc::new(InMemoryStore::new())))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(app: &Router, body: Value) -> Value {
        let (status, node) = send(app, Method::POST, "/api/nodes", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", node);
        node
    }

    /// about -> history, plus a top-level contact page
    async fn seed(app: &Router) {
        create(
            app,
            json!({ "id": "about", "nodeType": "container", "title": "About" }),
        )
        .await;
        create(
            app,
            json!({
                "id": "history",
                "nodeType": "page",
                "title": "History",
                "parentId": "about",
                "properties": { "slug": "history" }
            }),
        )
        .await;
        create(
            app,
            json!({
                "id": "contact",
                "nodeType": "page",
                "title": "Contact",
                "properties": { "slug": "contact" }
            }),
        )
        .await;
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let app = test_app();
        seed(&app).await;

        let (status, node) = send(&app, Method::GET, "/api/nodes/history", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(node["parentId"], "about");
        assert_eq!(node["properties"]["slug"], "history");

        let (status, body) = send(&app, Method::GET, "/api/nodes/ghost", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NODE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_validation_errors_name_the_field() {
        let app = test_app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/nodes",
            Some(json!({ "nodeType": "page", "title": "No Slug" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "slug");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/nodes",
            Some(json!({ "nodeType": "link", "title": "Portal" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "href");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = test_app();
        seed(&app).await;

        let (_, roots) = send(&app, Method::GET, "/api/nodes?parent=root", None).await;
        let ids: Vec<&str> = roots
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["about", "contact"]);

        let (_, pages) = send(&app, Method::GET, "/api/nodes?type=page&parent=about", None).await;
        assert_eq!(pages.as_array().unwrap().len(), 1);
        assert_eq!(pages[0]["id"], "history");
    }

    #[tokio::test]
    async fn test_move_conflicts() {
        let app = test_app();
        seed(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/nodes/about/move",
            Some(json!({ "parentId": "history" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "CYCLE_DETECTED");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/nodes/about/move",
            Some(json!({ "parentId": "about" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "SELF_PARENT");

        // nothing moved
        let (_, history) = send(&app, Method::GET, "/api/nodes/history", None).await;
        assert_eq!(history["parentId"], "about");
    }

    #[tokio::test]
    async fn test_staff_cannot_move_under_pages() {
        let app = test_app();
        seed(&app).await;
        create(
            &app,
            json!({ "id": "head", "nodeType": "staff", "title": "Ayşe" }),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/nodes/head/move",
            Some(json!({ "parentId": "about" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field"], "parentId");

        let (_, chart) = send(&app, Method::GET, "/api/tree?type=staff", None).await;
        assert_eq!(chart[0]["id"], "head");
    }

    #[tokio::test]
    async fn test_move_to_top_level() {
        let app = test_app();
        seed(&app).await;

        let (status, moved) = send(
            &app,
            Method::POST,
            "/api/nodes/history/move",
            Some(json!({ "parentId": null, "order": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["parentId"], Value::Null);
        assert_eq!(moved["order"], 0);
    }

    #[tokio::test]
    async fn test_reorder_root_level() {
        let app = test_app();
        seed(&app).await;

        let (status, children) = send(
            &app,
            Method::POST,
            "/api/nodes/root/reorder",
            Some(json!({ "childIds": ["contact", "about"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(children[0]["id"], "contact");
        assert_eq!(children[1]["id"], "about");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/nodes/about/reorder",
            Some(json!({ "childIds": ["contact"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_patch_and_delete() {
        let app = test_app();
        seed(&app).await;

        let (status, updated) = send(
            &app,
            Method::PATCH,
            "/api/nodes/contact",
            Some(json!({ "title": "Contact Us", "showInMenu": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Contact Us");
        assert_eq!(updated["visible"], false);

        let (status, body) = send(
            &app,
            Method::DELETE,
            "/api/nodes/about?policy=restrict",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "HAS_CHILDREN");

        let (status, result) = send(
            &app,
            Method::DELETE,
            "/api/nodes/about?policy=cascade",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["existed"], true);
        assert_eq!(result["cascaded"], json!(["history"]));

        let (status, result) = send(&app, Method::DELETE, "/api/nodes/about", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["existed"], false);
    }

    #[tokio::test]
    async fn test_tree_and_menu() {
        let app = test_app();
        seed(&app).await;
        create(
            &app,
            json!({ "id": "head", "nodeType": "staff", "title": "Ayşe", "properties": { "role": "Principal" } }),
        )
        .await;

        let (_, tree) = send(&app, Method::GET, "/api/tree", None).await;
        assert_eq!(tree.as_array().unwrap().len(), 2);
        assert_eq!(tree[0]["id"], "about");
        assert_eq!(tree[0]["children"][0]["id"], "history");

        let (_, chart) = send(&app, Method::GET, "/api/tree?type=staff", None).await;
        assert_eq!(chart[0]["id"], "head");

        let (status, menu) = send(&app, Method::GET, "/api/menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menu[0]["children"][0]["target"], "/history");
        assert_eq!(menu[1]["target"], "/contact");
    }

    #[tokio::test]
    async fn test_parent_candidates_and_breadcrumbs() {
        let app = test_app();
        seed(&app).await;

        let (_, candidates) =
            send(&app, Method::GET, "/api/nodes/about/parent-candidates", None).await;
        let ids: Vec<&str> = candidates
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["node"]["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["contact"]);

        let (_, trail) = send(&app, Method::GET, "/api/nodes/history/breadcrumbs", None).await;
        assert_eq!(trail[0]["id"], "about");
        assert_eq!(trail[1]["id"], "history");
    }

    #[tokio::test]
    async fn test_slug_suggestion() {
        let app = test_app();
        seed(&app).await;

        let (status, body) = send(&app, Method::GET, "/api/slug?title=History", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "history-2");

        let (_, body) = send(
            &app,
            Method::GET,
            "/api/slug?title=History&exclude=history",
            None,
        )
        .await;
        assert_eq!(body["slug"], "history");
    }
}
