use serde_json::json;

use crate::common::{TestApp, routes};

mod timeline {
    use super::*;

    #[tokio::test]
    async fn creation_writes_a_system_entry() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Trace me").await;

        let res = app.get_with_token(&routes::activities(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let rows = res.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["activity_type"], "system");
        assert_eq!(rows[0]["detail"]["event"], "created");
    }

    #[tokio::test]
    async fn entries_come_back_in_chronological_order() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Ordered").await;

        app.create_comment(id, &token, "first comment").await;
        app.create_comment(id, &token, "second comment").await;

        let res = app.get_with_token(&routes::activities(id), &token).await;
        let rows = res.body["data"].as_array().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["content"], "first comment");
        assert_eq!(rows[2]["content"], "second comment");
    }

    #[tokio::test]
    async fn status_changes_are_recorded_with_from_and_to() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Tracked").await;

        app.patch_with_token(&routes::ticket(id), &json!({"node": "in_progress"}), &token)
            .await;

        let res = app
            .get_with_token(
                &format!("{}?activity_type=status_change", routes::activities(id)),
                &token,
            )
            .await;
        let rows = res.body["data"].as_array().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["detail"]["from"], "draft");
        assert_eq!(rows[0]["detail"]["to"], "in_progress");
    }
}

mod comments {
    use super::*;

    #[tokio::test]
    async fn comment_records_author_name_and_role() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("ops_lee", "production").await;
        let id = app.create_ticket(&token, "inquiry", "Comment here").await;

        let res = app
            .post_with_token(
                &routes::activities(id),
                &json!({"content": "Looking into it."}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["author_name"], "ops_lee");
        assert_eq!(res.body["author_role"], "OP");
        assert_eq!(res.body["visibility"], "all");
    }

    #[tokio::test]
    async fn empty_comment_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "No blanks").await;

        let res = app
            .post_with_token(&routes::activities(id), &json!({"content": "   "}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn staff_comment_stamps_the_first_response() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff("alice", "marketing").await;
        let dealer = app.create_dealer("dealer1", 42).await;

        let id = app.create_ticket(&dealer, "svc", "Need help").await;
        let before = app.get_with_token(&routes::ticket(id), &staff).await;
        assert!(before.body["first_response_at"].is_null());

        // The reporting dealer's own comment is not a response.
        app.create_comment(id, &dealer, "any update?").await;
        let mid = app.get_with_token(&routes::ticket(id), &staff).await;
        assert!(mid.body["first_response_at"].is_null());

        app.create_comment(id, &staff, "On it.").await;
        let after = app.get_with_token(&routes::ticket(id), &staff).await;
        assert!(after.body["first_response_at"].is_string());
        assert_eq!(after.body["first_response_minutes"], 0);
    }

    #[tokio::test]
    async fn author_can_edit_their_own_comment() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Editable").await;
        let comment_id = app.create_comment(id, &token, "typo herre").await;

        let res = app
            .patch_with_token(
                &routes::activity(id, comment_id),
                &json!({"content": "typo here"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"], "typo here");
        assert!(res.body["edited_at"].is_string());
    }

    #[tokio::test]
    async fn others_cannot_edit_a_comment() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let id = app.create_ticket(&alice, "inquiry", "Not yours").await;
        let comment_id = app.create_comment(id, &alice, "mine").await;

        let res = app
            .patch_with_token(
                &routes::activity(id, comment_id),
                &json!({"content": "hijacked"}),
                &bob,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn system_entries_are_immutable() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Hands off").await;

        let list = app.get_with_token(&routes::activities(id), &token).await;
        let system_id = list.body["data"][0]["id"].as_i64().unwrap() as i32;

        let res = app
            .patch_with_token(
                &routes::activity(id, system_id),
                &json!({"content": "rewrite history"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn admin_can_delete_any_comment() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let admin = app.create_admin("root").await;
        let id = app.create_ticket(&alice, "inquiry", "Moderated").await;
        let comment_id = app.create_comment(id, &alice, "rude remark").await;

        let res = app
            .delete_with_token(&routes::activity(id, comment_id), &admin)
            .await;
        assert_eq!(res.status, 204);

        let list = app.get_with_token(&routes::activities(id), &alice).await;
        let rows = list.body["data"].as_array().unwrap();
        assert!(rows.iter().all(|a| a["id"] != comment_id));
    }

    #[tokio::test]
    async fn deleting_a_comment_touches_the_ticket() {
        let app = TestApp::spawn().await;
        let token = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&token, "inquiry", "Bookkeeping").await;
        let comment_id = app.create_comment(id, &token, "soon gone").await;

        let before = app.get_with_token(&routes::ticket(id), &token).await;

        let res = app
            .delete_with_token(&routes::activity(id, comment_id), &token)
            .await;
        assert_eq!(res.status, 204);

        let after = app.get_with_token(&routes::ticket(id), &token).await;
        assert_ne!(after.body["updated_at"], before.body["updated_at"]);
    }

    #[tokio::test]
    async fn non_author_non_admin_cannot_delete() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let id = app.create_ticket(&alice, "inquiry", "Protected").await;
        let comment_id = app.create_comment(id, &alice, "stays").await;

        let res = app
            .delete_with_token(&routes::activity(id, comment_id), &bob)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod mentions {
    use super::*;

    #[tokio::test]
    async fn explicit_mention_resolves_by_id() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let id = app.create_ticket(&alice, "inquiry", "Mention test").await;
        let res = app
            .post_with_token(
                &routes::activities(id),
                &json!({"content": format!("cc @[bob]({bob_id})")}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let mentions = res.body["mentions"].as_array().unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0]["user_id"], bob_id);
    }

    #[tokio::test]
    async fn bare_mention_falls_back_to_name_lookup() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let id = app.create_ticket(&alice, "inquiry", "Fuzzy").await;
        let res = app
            .post_with_token(
                &routes::activities(id),
                &json!({"content": "ping @bob please"}),
                &alice,
            )
            .await;

        let mentions = res.body["mentions"].as_array().unwrap();
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0]["user_id"], bob_id);
    }

    #[tokio::test]
    async fn unresolvable_mentions_are_dropped() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let id = app.create_ticket(&alice, "inquiry", "Nobody home").await;

        let res = app
            .post_with_token(
                &routes::activities(id),
                &json!({"content": "hey @nonexistent_person and @[Ghost](999999)"}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["mentions"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn mentioned_user_joins_participants_and_is_notified() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let id = app.create_ticket(&alice, "inquiry", "Join in").await;
        app.post_with_token(
            &routes::activities(id),
            &json!({"content": format!("@[bob]({bob_id}), thoughts?")}),
            &alice,
        )
        .await;

        let ticket = app.get_with_token(&routes::ticket(id), &alice).await;
        let participants = ticket.body["participants"].as_array().unwrap();
        assert!(participants.iter().any(|p| p["user_id"] == bob_id));

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &bob).await;
        let rows = inbox.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["kind"], "mention");
    }

    #[tokio::test]
    async fn participants_get_a_new_comment_ping_but_mentions_win() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let id = app.create_ticket(&alice, "inquiry", "Ping rules").await;
        // First comment pulls bob into the participant list.
        app.post_with_token(
            &routes::activities(id),
            &json!({"content": format!("@[bob]({bob_id}) take a look")}),
            &alice,
        )
        .await;
        // Second comment mentions nobody; bob is now a plain participant.
        app.create_comment(id, &alice, "small update").await;

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &bob).await;
        let kinds: Vec<&str> = inbox.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["kind"].as_str().unwrap())
            .collect();

        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&"mention"));
        assert!(kinds.contains(&"new_comment"));
    }

    #[tokio::test]
    async fn mentions_leave_an_internal_audit_entry() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let id = app.create_ticket(&alice, "inquiry", "Audit trail").await;
        let comment = app
            .post_with_token(
                &routes::activities(id),
                &json!({"content": format!("cc @[bob]({bob_id})")}),
                &alice,
            )
            .await;
        let comment_id = comment.id();

        let res = app
            .get_with_token(
                &format!("{}?activity_type=mention", routes::activities(id)),
                &alice,
            )
            .await;
        let rows = res.body["data"].as_array().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["visibility"], "internal");
        assert_eq!(rows[0]["detail"]["comment_id"], comment_id);
        assert_eq!(rows[0]["detail"]["mentioned_users"][0]["user_id"], bob_id);
    }

    #[tokio::test]
    async fn dealers_do_not_see_the_mention_audit_entry() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff("alice", "marketing").await;
        let other = app.create_staff("bob", "production").await;
        let other_id = app.get_with_token(routes::ME, &other).await.id();
        let dealer = app.create_dealer("dealer1", 42).await;

        let id = app.create_ticket(&dealer, "svc", "Dealer view").await;
        app.post_with_token(
            &routes::activities(id),
            &json!({"content": format!("@[bob]({other_id}) can you check?")}),
            &staff,
        )
        .await;

        let dealer_view = app.get_with_token(&routes::activities(id), &dealer).await;
        let rows = dealer_view.body["data"].as_array().unwrap();
        // The comment itself is public, the audit entry is not.
        assert!(rows.iter().all(|a| a["activity_type"] != "mention"));
    }

    #[tokio::test]
    async fn editing_a_comment_notifies_only_newly_mentioned_users() {
        let app = TestApp::spawn().await;
        let alice = app.create_staff("alice", "marketing").await;
        let bob = app.create_staff("bob", "production").await;
        let carol = app.create_staff("carol", "rd").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();
        let carol_id = app.get_with_token(routes::ME, &carol).await.id();

        let id = app.create_ticket(&alice, "inquiry", "Edit mentions").await;
        let comment_id = app
            .create_comment(id, &alice, &format!("cc @[bob]({bob_id})"))
            .await;

        app.patch_with_token(
            &routes::activity(id, comment_id),
            &json!({"content": format!("cc @[bob]({bob_id}) and @[carol]({carol_id})")}),
            &alice,
        )
        .await;

        let bob_inbox = app.get_with_token(routes::NOTIFICATIONS, &bob).await;
        let bob_mentions = bob_inbox.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|n| n["kind"] == "mention")
            .count();
        assert_eq!(bob_mentions, 1);

        let carol_inbox = app.get_with_token(routes::NOTIFICATIONS, &carol).await;
        assert_eq!(carol_inbox.body["data"].as_array().unwrap().len(), 1);
    }
}

mod visibility {
    use super::*;

    #[tokio::test]
    async fn dealers_cannot_write_internal_comments() {
        let app = TestApp::spawn().await;
        let dealer = app.create_dealer("dealer1", 42).await;
        let id = app.create_ticket(&dealer, "svc", "My repair").await;

        let res = app
            .post_with_token(
                &routes::activities(id),
                &json!({"content": "secret", "visibility": "internal"}),
                &dealer,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn dealers_do_not_see_internal_entries() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff("alice", "marketing").await;
        let dealer = app.create_dealer("dealer1", 42).await;
        let id = app.create_ticket(&dealer, "svc", "Shared").await;

        app.post_with_token(
            &routes::activities(id),
            &json!({"content": "internal cost note", "visibility": "internal"}),
            &staff,
        )
        .await;
        app.create_comment(id, &staff, "public reply").await;

        let staff_view = app.get_with_token(&routes::activities(id), &staff).await;
        assert_eq!(staff_view.body["data"].as_array().unwrap().len(), 3);

        let dealer_view = app.get_with_token(&routes::activities(id), &dealer).await;
        let rows = dealer_view.body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|a| a["visibility"] == "all"));
    }

    #[tokio::test]
    async fn internal_comments_do_not_ping_dealer_participants() {
        let app = TestApp::spawn().await;
        let staff = app.create_staff("alice", "marketing").await;
        let dealer = app.create_dealer("dealer1", 42).await;

        // The dealer creates the ticket and is therefore a participant.
        let id = app.create_ticket(&dealer, "svc", "Quiet").await;
        app.post_with_token(
            &routes::activities(id),
            &json!({"content": "margin discussion", "visibility": "internal"}),
            &staff,
        )
        .await;

        let inbox = app.get_with_token(routes::NOTIFICATIONS, &dealer).await;
        assert_eq!(inbox.body["data"].as_array().unwrap().len(), 0);
    }
}
