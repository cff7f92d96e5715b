use serde_json::json;

use crate::common::{TestApp, routes};

/// Put one mention notification in bob's inbox and return its id.
async fn seed_mention(app: &TestApp, alice: &str, bob: &str) -> i32 {
    let bob_id = app.get_with_token(routes::ME, bob).await.id();
    let ticket_id = app.create_ticket(alice, "inquiry", "Inbox seed").await;
    app.post_with_token(
        &routes::activities(ticket_id),
        &json!({"content": format!("fyi @[bob]({bob_id})")}),
        alice,
    )
    .await;

    let inbox = app.get_with_token(routes::NOTIFICATIONS, bob).await;
    inbox.body["data"][0]["id"].as_i64().unwrap() as i32
}

mod inbox {
    use super::*;

    #[tokio::test]
    async fn notifications_carry_their_source_ticket_and_activity() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        seed_mention(&app, &alice, &bob).await;

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &bob).await;
        let row = &inbox.body["data"][0];

        assert_eq!(row["kind"], "mention");
        assert!(row["ticket_id"].is_number());
        assert!(row["activity_id"].is_number());
        assert!(row["read_at"].is_null());
        assert_eq!(row["icon"], "at-sign");
        assert_eq!(
            row["action_url"],
            format!("/tickets/{}", row["ticket_id"].as_i64().unwrap())
        );
        assert!(row["metadata"]["ticket_number"].is_string());
    }

    #[tokio::test]
    async fn actors_are_not_notified_about_their_own_actions() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let alice_id = app.get_with_token(routes::ME, &alice).await.id();

        let ticket_id = app.create_ticket(&alice, "inquiry", "Self mention").await;
        app.post_with_token(
            &routes::activities(ticket_id),
            &json!({"content": format!("note to self @[alice]({alice_id})")}),
            &alice,
        )
        .await;

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &alice).await;
        assert_eq!(inbox.body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn inbox_is_private() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let id = seed_mention(&app, &alice, &bob).await;

        let res = app.get_with_token(&routes::notification(id), &alice).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unread_count_tracks_reads() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let id = seed_mention(&app, &alice, &bob).await;

        let count = app.get_with_token(routes::NOTIFICATIONS_UNREAD, &bob).await;
        assert_eq!(count.body["unread"], 1);

        let res = app
            .post_with_token(&routes::notification_read(id), &json!({}), &bob)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["read_at"].is_string());

        let count = app.get_with_token(routes::NOTIFICATIONS_UNREAD, &bob).await;
        assert_eq!(count.body["unread"], 0);
    }

    #[tokio::test]
    async fn marking_read_twice_keeps_the_original_timestamp() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let id = seed_mention(&app, &alice, &bob).await;

        let first = app
            .post_with_token(&routes::notification_read(id), &json!({}), &bob)
            .await;
        let second = app
            .post_with_token(&routes::notification_read(id), &json!({}), &bob)
            .await;

        assert_eq!(second.status, 200);
        assert_eq!(first.body["read_at"], second.body["read_at"]);
    }

    #[tokio::test]
    async fn read_all_reports_affected_rows() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let ticket_id = app.create_ticket(&alice, "inquiry", "Busy thread").await;
        for i in 0..3 {
            app.post_with_token(
                &routes::activities(ticket_id),
                &json!({"content": format!("round {i} @[bob]({bob_id})")}),
                &alice,
            )
            .await;
        }

        let res = app
            .post_with_token(routes::NOTIFICATIONS_READ_ALL, &json!({}), &bob)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["affected"], 3);

        let count = app.get_with_token(routes::NOTIFICATIONS_UNREAD, &bob).await;
        assert_eq!(count.body["unread"], 0);
    }

    #[tokio::test]
    async fn archived_rows_leave_the_default_list_but_stay_retrievable() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let id = seed_mention(&app, &alice, &bob).await;

        let res = app
            .post_with_token(&routes::notification_archive(id), &json!({}), &bob)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let default_list = app.get_with_token(routes::NOTIFICATIONS, &bob).await;
        assert_eq!(default_list.body["data"].as_array().unwrap().len(), 0);

        let archived = app
            .get_with_token(&format!("{}?archived=true", routes::NOTIFICATIONS), &bob)
            .await;
        assert_eq!(archived.body["data"].as_array().unwrap().len(), 1);

        let count = app.get_with_token(routes::NOTIFICATIONS_UNREAD, &bob).await;
        assert_eq!(count.body["unread"], 0);
    }

    #[tokio::test]
    async fn clear_all_deletes_everything() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        seed_mention(&app, &alice, &bob).await;

        let res = app
            .delete_with_token(routes::NOTIFICATIONS_CLEAR_ALL, &bob)
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["affected"], 1);

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &bob).await;
        assert_eq!(inbox.body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn list_can_filter_by_kind() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let ticket_id = app.create_ticket(&alice, "inquiry", "Mixed").await;
        app.post_with_token(
            &routes::activities(ticket_id),
            &json!({"content": format!("hi @[bob]({bob_id})")}),
            &alice,
        )
        .await;
        app.patch_with_token(
            &routes::ticket(ticket_id),
            &json!({"assigned_to": bob_id}),
            &alice,
        )
        .await;

        let mentions = app
            .get_with_token(&format!("{}?kind=mention", routes::NOTIFICATIONS), &bob)
            .await;
        let rows = mentions.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["kind"], "mention");
    }
}

mod announcements {
    use super::*;

    #[tokio::test]
    async fn admin_can_broadcast_to_a_recipient_list() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let alice_id = app.get_with_token(routes::ME, &alice).await.id();
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let res = app
            .post_with_token(
                routes::NOTIFICATIONS_ANNOUNCE,
                &json!({
                    "recipient_ids": [alice_id, bob_id, bob_id],
                    "title": "Maintenance window",
                    "body": "Saturday 02:00-04:00 UTC",
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        // Duplicate recipients collapse to one row each.
        assert_eq!(res.body["affected"], 2);

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &alice).await;
        let row = &inbox.body["data"][0];
        assert_eq!(row["kind"], "announcement");
        assert_eq!(row["title"], "Maintenance window");
    }

    #[tokio::test]
    async fn non_admins_cannot_broadcast() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff("alice", "marketing").await;

        let res = app
            .post_with_token(
                routes::NOTIFICATIONS_ANNOUNCE,
                &json!({"recipient_ids": [1], "title": "Psst"}),
                &staff,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn empty_recipient_list_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("root").await;

        let res = app
            .post_with_token(
                routes::NOTIFICATIONS_ANNOUNCE,
                &json!({"recipient_ids": [], "title": "To no one"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
