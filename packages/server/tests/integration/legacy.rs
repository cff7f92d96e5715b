use serde_json::json;

use crate::common::{TestApp, routes};

mod inquiries {
    use super::*;

    #[tokio::test]
    async fn unified_inquiry_reads_back_in_the_legacy_shape() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::TICKETS,
                &json!({
                    "ticket_type": "inquiry",
                    "title": "Lamp failure",
                    "account_id": 1001,
                    "reporter_name": "J. Mercer",
                }),
                &token,
            )
            .await;
        let id = res.id();

        let legacy = app.get_with_token(&routes::legacy_inquiry(id), &token).await;

        assert_eq!(legacy.status, 200, "{}", legacy.text);
        assert_eq!(legacy.body["status"], "Pending");
        assert_eq!(legacy.body["priority"], "R3");
        assert_eq!(legacy.body["customer_id"], 1001);
        assert_eq!(legacy.body["customer_name"], "J. Mercer");
        assert!(legacy.body["handler_id"].is_null());
    }

    #[tokio::test]
    async fn legacy_status_labels_follow_the_lifecycle() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Labels").await;

        app.patch_with_token(&routes::ticket(id), &json!({"node": "in_progress"}), &token)
            .await;
        app.patch_with_token(
            &routes::ticket(id),
            &json!({"node": "waiting_customer"}),
            &token,
        )
        .await;

        let legacy = app.get_with_token(&routes::legacy_inquiry(id), &token).await;
        assert_eq!(legacy.body["status"], "AwaitingFeedback");
    }

    #[tokio::test]
    async fn priority_maps_to_r_grades() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Grades").await;

        app.patch_with_token(&routes::ticket(id), &json!({"priority": "P0"}), &token)
            .await;

        let legacy = app.get_with_token(&routes::legacy_inquiry(id), &token).await;
        assert_eq!(legacy.body["priority"], "R1");
    }

    #[tokio::test]
    async fn list_filters_by_legacy_status_label() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        app.create_ticket(&token, "inquiry", "Still pending").await;
        let moving = app.create_ticket(&token, "inquiry", "Moving").await;
        app.patch_with_token(
            &routes::ticket(moving),
            &json!({"node": "in_progress"}),
            &token,
        )
        .await;

        let res = app
            .get_with_token(
                &format!("{}?status=Pending", routes::LEGACY_INQUIRIES),
                &token,
            )
            .await;

        let rows = res.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Still pending");
    }

    #[tokio::test]
    async fn unknown_status_label_matches_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        app.create_ticket(&token, "inquiry", "Here").await;

        let res = app
            .get_with_token(
                &format!("{}?status=NoSuchLabel", routes::LEGACY_INQUIRIES),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn legacy_intake_files_a_unified_inquiry() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::LEGACY_INQUIRIES,
                &json!({
                    "title": "No signal on HDMI 2",
                    "priority": "R1",
                    "customer_id": 1001,
                    "customer_name": "J. Mercer",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["priority"], "R1");
        assert_eq!(res.body["customer_id"], 1001);
        assert_eq!(res.body["customer_name"], "J. Mercer");
        assert!(res.body["ticket_number"].as_str().unwrap().starts_with('K'));

        let unified = app.get_with_token(&routes::ticket(res.id()), &token).await;
        assert_eq!(unified.body["ticket_type"], "inquiry");
        assert_eq!(unified.body["current_node"], "draft");
        assert_eq!(unified.body["priority"], "P0");
    }

    #[tokio::test]
    async fn intake_without_a_grade_defaults_to_the_lowest_priority() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::LEGACY_INQUIRIES,
                &json!({"title": "Ungraded"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["priority"], "R3");
    }

    #[tokio::test]
    async fn blank_title_is_rejected_at_intake() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(routes::LEGACY_INQUIRIES, &json!({"title": "  "}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn other_ticket_types_are_invisible_through_the_inquiry_endpoint() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let rma = app
            .post_with_token(
                routes::TICKETS,
                &json!({"ticket_type": "rma", "title": "Not an inquiry"}),
                &token,
            )
            .await;

        let res = app
            .get_with_token(&routes::legacy_inquiry(rma.id()), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod rmas {
    use super::*;

    #[tokio::test]
    async fn rma_exposes_the_repair_vocabulary() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("ops", "production").await;
        let parent = app.create_ticket(&token, "inquiry", "Origin").await;

        let res = app
            .post_with_token(
                routes::TICKETS,
                &json!({
                    "ticket_type": "rma",
                    "title": "Unit return",
                    "priority": "P1",
                    "account_id": 1001,
                    "parent_ticket_id": parent,
                }),
                &token,
            )
            .await;
        let id = res.id();

        app.patch_with_token(&routes::ticket(id), &json!({"node": "ms_review"}), &token)
            .await;
        app.patch_with_token(&routes::ticket(id), &json!({"node": "op_receiving"}), &token)
            .await;

        let legacy = app.get_with_token(&routes::legacy_rma(id), &token).await;

        assert_eq!(legacy.status, 200, "{}", legacy.text);
        assert_eq!(legacy.body["status"], "Receiving");
        assert_eq!(legacy.body["repair_priority"], "R2");
        assert_eq!(legacy.body["inquiry_ticket_id"], parent);
    }

    #[tokio::test]
    async fn legacy_intake_files_a_unified_rma() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("ops", "production").await;
        let parent = app.create_ticket(&token, "inquiry", "Origin").await;

        let res = app
            .post_with_token(
                routes::LEGACY_RMAS,
                &json!({
                    "title": "Unit return",
                    "repair_priority": "R2",
                    "customer_id": 1001,
                    "inquiry_ticket_id": parent,
                    "dealer_id": 42,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["repair_priority"], "R2");
        assert_eq!(res.body["inquiry_ticket_id"], parent);
        assert_eq!(res.body["dealer_id"], 42);
        assert!(
            res.body["ticket_number"]
                .as_str()
                .unwrap()
                .starts_with("RMA-D-")
        );

        let unified = app.get_with_token(&routes::ticket(res.id()), &token).await;
        assert_eq!(unified.body["ticket_type"], "rma");
        assert_eq!(unified.body["priority"], "P1");
    }

    #[tokio::test]
    async fn rma_intake_without_dealer_uses_the_customer_channel() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("ops", "production").await;

        let res = app
            .post_with_token(
                routes::LEGACY_RMAS,
                &json!({"title": "Walk-in return", "customer_id": 7}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(
            res.body["ticket_number"]
                .as_str()
                .unwrap()
                .starts_with("RMA-C-")
        );
    }

    #[tokio::test]
    async fn dealer_rma_intake_is_pinned_to_their_own_dealer() {
        let app = TestApp::spawn().await;
        let dealer = app.create_dealer("dealer1", 42).await;

        let res = app
            .post_with_token(
                routes::LEGACY_RMAS,
                &json!({"title": "Dealer return", "dealer_id": 99}),
                &dealer,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["dealer_id"], 42);
    }

    #[tokio::test]
    async fn list_filters_by_customer() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("ops", "production").await;

        app.post_with_token(
            routes::TICKETS,
            &json!({"ticket_type": "rma", "title": "Hers", "account_id": 1}),
            &token,
        )
        .await;
        app.post_with_token(
            routes::TICKETS,
            &json!({"ticket_type": "rma", "title": "His", "account_id": 2}),
            &token,
        )
        .await;

        let res = app
            .get_with_token(&format!("{}?customer_id=2", routes::LEGACY_RMAS), &token)
            .await;

        let rows = res.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "His");
    }
}

mod dealer_repairs {
    use super::*;

    #[tokio::test]
    async fn legacy_intake_files_a_unified_svc_ticket() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::LEGACY_DEALER_REPAIRS,
                &json!({
                    "title": "Color wheel grinding",
                    "priority": "R1",
                    "customer_id": 1001,
                    "customer_name": "J. Mercer",
                    "dealer_id": 42,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["dealer_id"], 42);
        assert!(
            res.body["ticket_number"]
                .as_str()
                .unwrap()
                .starts_with("SVC-D-")
        );

        // The unified view shows the translated priority.
        let unified = app.get_with_token(&routes::ticket(res.id()), &token).await;
        assert_eq!(unified.body["ticket_type"], "svc");
        assert_eq!(unified.body["priority"], "P0");
    }

    #[tokio::test]
    async fn unknown_r_grade_degrades_to_the_lowest_priority() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::LEGACY_DEALER_REPAIRS,
                &json!({"title": "Weird grade", "priority": "R9", "dealer_id": 42}),
                &token,
            )
            .await;

        let unified = app.get_with_token(&routes::ticket(res.id()), &token).await;
        assert_eq!(unified.body["priority"], "P2");
    }

    #[tokio::test]
    async fn staff_intake_without_dealer_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::LEGACY_DEALER_REPAIRS,
                &json!({"title": "Orphan repair"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn dealer_intake_defaults_to_their_own_dealer() {
        let app = TestApp::spawn().await;
        let dealer = app.create_dealer("dealer1", 42).await;

        let res = app
            .post_with_token(
                routes::LEGACY_DEALER_REPAIRS,
                &json!({"title": "My repair"}),
                &dealer,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["dealer_id"], 42);
    }

    #[tokio::test]
    async fn coarse_status_covers_the_dealer_flow() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::LEGACY_DEALER_REPAIRS,
                &json!({"title": "Flow", "dealer_id": 42}),
                &token,
            )
            .await;
        let id = res.id();

        for node in ["ge_review", "dl_receiving"] {
            let res = app
                .patch_with_token(&routes::ticket(id), &json!({"node": node}), &token)
                .await;
            assert_eq!(res.status, 200, "{} -> {}", node, res.text);
        }

        let legacy = app
            .get_with_token(&routes::legacy_dealer_repair(id), &token)
            .await;
        assert_eq!(legacy.body["status"], "InProgress");
    }

    #[tokio::test]
    async fn dealer_only_sees_their_own_repairs() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff("alice", "marketing").await;
        let dealer = app.create_dealer("dealer1", 42).await;

        app.post_with_token(
            routes::LEGACY_DEALER_REPAIRS,
            &json!({"title": "Mine", "dealer_id": 42}),
            &staff,
        )
        .await;
        let foreign = app
            .post_with_token(
                routes::LEGACY_DEALER_REPAIRS,
                &json!({"title": "Not mine", "dealer_id": 7}),
                &staff,
            )
            .await;

        let list = app
            .get_with_token(routes::LEGACY_DEALER_REPAIRS, &dealer)
            .await;
        let rows = list.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "Mine");

        let res = app
            .get_with_token(&routes::legacy_dealer_repair(foreign.id()), &dealer)
            .await;
        assert_eq!(res.status, 404);
    }
}
