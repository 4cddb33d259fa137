#[cfg(test)]
mod integration_tests {
    use crate::test_utils::test_utils::setup_test_app;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    async fn test_server() -> TestServer {
        let app = setup_test_app().await;
        TestServer::new(app).unwrap()
    }

    /// Create a school owned by the seeded alpha user and return its id.
    async fn create_alpha_school(server: &TestServer, name: &str) -> String {
        let response = server
            .post("/api/v1/schools")
            .json(&json!({
                "name": name,
                "user_id": "user-alpha",
                "tenant_id": "tenant-alpha"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = test_server().await;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_app_config() {
        let server = test_server().await;

        let response = server.get("/api/v1/config").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["data"]["tenant_name"], "School");
        assert!(body["data"]["owner_roles"]
            .as_array()
            .unwrap()
            .contains(&json!("School Administrator")));
    }

    #[tokio::test]
    async fn test_create_user() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&json!({
                "email": "principal@hillvalley.edu",
                "tenant_id": "tenant-alpha"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], "principal@hillvalley.edu");
        assert!(body["data"]["id"].as_str().is_some());
        assert!(body["data"]["created_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_email() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&json!({ "email": "not-an-email" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["email"], "must be a valid email");
    }

    #[tokio::test]
    async fn test_list_users_with_filters() {
        let server = test_server().await;

        let response = server
            .get("/api/v1/users")
            .add_query_param("tenant_id", "tenant-alpha")
            .await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "alpha@hillvalley.edu");
    }

    #[tokio::test]
    async fn test_create_school() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/schools")
            .json(&json!({
                "name": "Hill Valley High",
                "description": "Est. 1903",
                "user_id": "user-alpha",
                "tenant_id": "tenant-alpha"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "Hill Valley High");
        assert_eq!(body["data"]["tenant_id"], "tenant-alpha");
    }

    #[tokio::test]
    async fn test_create_school_rejects_unknown_owner() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/schools")
            .json(&json!({
                "name": "Ghost School",
                "user_id": "user-nobody",
                "tenant_id": "tenant-alpha"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "UNKNOWN_USER");
    }

    #[tokio::test]
    async fn test_create_school_rejects_tenant_mismatch() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/schools")
            .json(&json!({
                "name": "Wrong Tenant High",
                "user_id": "user-alpha",
                "tenant_id": "tenant-beta"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "TENANT_MISMATCH");
    }

    #[tokio::test]
    async fn test_get_school_includes_owner_and_counts() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Hill Valley High").await;

        let response = server
            .get(&format!("/api/v1/schools/{school_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["email"], "alpha@hillvalley.edu");
        assert_eq!(body["data"]["_count"]["student"], 0);
        assert_eq!(body["data"]["_count"]["teacher"], 0);
        assert_eq!(body["data"]["_count"]["it_staff"], 0);
    }

    #[tokio::test]
    async fn test_create_student_rejects_empty_name() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({ "name": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"]["name"], "required");
    }

    #[tokio::test]
    async fn test_create_student_without_links() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({ "name": "Marty McFly", "attendance": -3 }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "Marty McFly");
        // Negative record values are allowed; the columns are unconstrained.
        assert_eq!(body["data"]["attendance"], -3);
        assert!(body["data"].get("school_id").is_none());
    }

    #[tokio::test]
    async fn test_create_student_rejects_cross_tenant_links() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Hill Valley High").await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({
                "name": "Biff Tannen",
                "user_id": "user-beta",
                "school_id": school_id
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "TENANT_MISMATCH");
    }

    #[tokio::test]
    async fn test_create_student_rejects_unknown_school() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({
                "name": "Lost Student",
                "school_id": "no-such-school"
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["code"], "UNKNOWN_SCHOOL");
    }

    #[tokio::test]
    async fn test_school_counts_track_scoped_writes() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Hill Valley High").await;

        for name in ["Marty McFly", "Jennifer Parker"] {
            let response = server
                .post("/api/v1/students")
                .json(&json!({
                    "name": name,
                    "user_id": "user-alpha",
                    "school_id": school_id
                }))
                .await;
            response.assert_status(StatusCode::CREATED);
        }
        let response = server
            .post("/api/v1/teachers")
            .json(&json!({
                "name": "Mr. Strickland",
                "school_id": school_id
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/v1/schools/{school_id}"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["_count"]["student"], 2);
        assert_eq!(body["data"]["_count"]["teacher"], 1);
        assert_eq!(body["data"]["_count"]["it_staff"], 0);
    }

    #[tokio::test]
    async fn test_get_student_expands_links() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Hill Valley High").await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({
                "name": "Marty McFly",
                "user_id": "user-alpha",
                "school_id": school_id
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let student_id = body["data"]["id"].as_str().unwrap();

        let response = server
            .get(&format!("/api/v1/students/{student_id}"))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["school"]["name"], "Hill Valley High");
        assert_eq!(body["data"]["user"]["email"], "alpha@hillvalley.edu");
    }

    #[tokio::test]
    async fn test_get_student_fails_when_link_lookup_errors() {
        use crate::router::create_router;
        use crate::test_utils::test_utils::setup_test_app_state;
        use sea_orm::ConnectionTrait;

        let state = setup_test_app_state().await;
        let server = TestServer::new(create_router(state.clone())).unwrap();

        let response = server
            .post("/api/v1/students")
            .json(&json!({ "name": "Marty McFly" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let student_id = body["data"]["id"].as_str().unwrap().to_string();

        // Break the linked-user lookup; the student row itself stays readable.
        state
            .db
            .execute_unprepared("DROP TABLE users")
            .await
            .expect("Failed to drop users table");

        let response = server
            .get(&format!("/api/v1/students/{student_id}"))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_update_student() {
        let server = test_server().await;

        let response = server
            .post("/api/v1/students")
            .json(&json!({ "name": "Marty McFly" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let student_id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server
            .put(&format!("/api/v1/students/{student_id}"))
            .json(&json!({
                "name": "Marty McFly",
                "behavior_record": 72
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["behavior_record"], 72);

        let response = server
            .get(&format!("/api/v1/students/{student_id}"))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["behavior_record"], 72);
    }

    #[tokio::test]
    async fn test_list_students_filtered_by_school() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Hill Valley High").await;

        server
            .post("/api/v1/students")
            .json(&json!({ "name": "Enrolled", "school_id": school_id }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/students")
            .json(&json!({ "name": "Unenrolled" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/v1/students")
            .add_query_param("school_id", &school_id)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let students = body["data"].as_array().unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0]["name"], "Enrolled");
    }

    #[tokio::test]
    async fn test_get_missing_record_returns_not_found() {
        let server = test_server().await;

        let response = server.get("/api/v1/teachers/no-such-id").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let body: Value = response.json();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_it_staff_crud_on_hyphenated_route() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Hill Valley High").await;

        let response = server
            .post("/api/v1/it-staffs")
            .json(&json!({
                "name": "Network Admin",
                "school_id": school_id
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let it_staff_id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server.get("/api/v1/it-staffs").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let response = server
            .put(&format!("/api/v1/it-staffs/{it_staff_id}"))
            .json(&json!({
                "name": "Senior Network Admin",
                "school_id": school_id
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .delete(&format!("/api/v1/it-staffs/{it_staff_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/it-staffs/{it_staff_id}"))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_school() {
        let server = test_server().await;
        let school_id = create_alpha_school(&server, "Doomed High").await;

        let response = server
            .delete(&format!("/api/v1/schools/{school_id}"))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/schools/{school_id}"))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
