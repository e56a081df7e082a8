use super::{TestBuilder, payload, payload_value};
use crate::common::Method::*;
use simple_issues_bot::interactions::{ACCESS_DENIED, COMMAND_NOT_FOUND};

const CLOSE: &str = "@simple-issues-bot close this issue";
const MAINTAINER: u64 = 13386468;

#[test]
fn whitelisted_user_closes_issue() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_webhook("issue_comment", &payload("created", MAINTAINER, CLOSE));
    assert_eq!(body, "ok");
    ctx.settle(2);
    ctx.events.assert_eq(&[
        (POST, "/app/installations/46294327/access_tokens"),
        (PATCH, "/repos/octo-org/playground/issues/7"),
    ]);
    assert_eq!(
        ctx.events.get(1).json(),
        serde_json::json!({"state": "closed"})
    );
}

#[test]
fn access_denied() {
    let ctx = TestBuilder::github().build();
    ctx.send_webhook("issue_comment", &payload("created", 999, CLOSE));
    ctx.settle(2);
    ctx.events.assert_eq(&[
        (POST, "/app/installations/46294327/access_tokens"),
        (POST, "/repos/octo-org/playground/issues/7/comments"),
    ]);
    assert_eq!(
        ctx.events.get(1).json(),
        serde_json::json!({"body": ACCESS_DENIED})
    );
}

#[test]
fn command_not_found() {
    let ctx = TestBuilder::github().build();
    ctx.send_webhook(
        "issue_comment",
        &payload("created", MAINTAINER, "@simple-issues-bot delete this issue"),
    );
    ctx.settle(2);
    ctx.events.assert_eq(&[
        (POST, "/app/installations/46294327/access_tokens"),
        (POST, "/repos/octo-org/playground/issues/7/comments"),
    ]);
    assert_eq!(
        ctx.events.get(1).json(),
        serde_json::json!({"body": COMMAND_NOT_FOUND})
    );
}

#[test]
fn edited_comment_is_ignored() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_webhook("issue_comment", &payload("edited", MAINTAINER, "unrelated text"));
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn edited_mention_is_ignored() {
    let ctx = TestBuilder::github().build();
    ctx.send_webhook("issue_comment", &payload("edited", 999, CLOSE));
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn comment_for_someone_else() {
    let ctx = TestBuilder::github().build();
    ctx.send_webhook("issue_comment", &payload("created", 999, "LGTM, close this issue"));
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn other_events_are_ignored() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_webhook("issues", &payload("created", MAINTAINER, CLOSE));
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn bad_signature_is_acknowledged() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_raw(
        reqwest::Method::POST,
        "/",
        &[
            ("X-GitHub-Event", "issue_comment"),
            ("X-Hub-Signature-256", "sha256=0000"),
        ],
        payload("created", MAINTAINER, CLOSE),
    );
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn unsigned_delivery_is_acknowledged() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_raw(
        reqwest::Method::POST,
        "/",
        &[("X-GitHub-Event", "issue_comment")],
        payload("created", MAINTAINER, CLOSE),
    );
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn malformed_payload_is_acknowledged() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_webhook("issue_comment", r#"{"action":"created"}"#);
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn non_post_requests_are_acknowledged() {
    let ctx = TestBuilder::github().build();
    let body = ctx.send_raw(reqwest::Method::GET, "/", &[], String::new());
    assert_eq!(body, "ok");
    let body = ctx.send_raw(reqwest::Method::GET, "/health", &[], String::new());
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn failed_action_still_acknowledged() {
    let ctx = TestBuilder::github()
        .api_handler(
            PATCH,
            "repos/{owner}/{repo}/issues/{number}",
            |_req| crate::common::Response::new().code(502),
        )
        .build();
    let body = ctx.send_webhook("issue_comment", &payload("created", MAINTAINER, CLOSE));
    assert_eq!(body, "ok");
    ctx.settle(2);
    // No retry and no apology comment.
    ctx.events.assert_eq(&[
        (POST, "/app/installations/46294327/access_tokens"),
        (PATCH, "/repos/octo-org/playground/issues/7"),
    ]);
}

#[test]
fn configured_bot() {
    let ctx = TestBuilder::github()
        .config(
            r#"
            bot-name = "@triage-helper"
            whitelist = [999]

            [commands]
            "close" = "close-issue"
            "#,
        )
        .build();
    ctx.send_webhook("issue_comment", &payload("created", 999, "@triage-helper close"));
    ctx.settle(2);
    ctx.events.assert_eq(&[
        (POST, "/app/installations/46294327/access_tokens"),
        (PATCH, "/repos/octo-org/playground/issues/7"),
    ]);
}

#[test]
fn missing_installation_is_acknowledged() {
    let ctx = TestBuilder::github().build();
    let mut payload = payload_value("created", MAINTAINER, CLOSE);
    payload.as_object_mut().unwrap().remove("installation");
    let body = ctx.send_webhook("issue_comment", &payload.to_string());
    assert_eq!(body, "ok");
    ctx.settle(0);
    ctx.events.assert_eq(&[]);
}

#[test]
fn large_delivery_is_processed() {
    let ctx = TestBuilder::github().build();
    let mut payload = payload_value("created", MAINTAINER, CLOSE);
    payload["issue"]["body"] = "x".repeat(3 * 1024 * 1024).into();
    let body = ctx.send_webhook_bytes("issue_comment", payload.to_string().into_bytes());
    assert_eq!(body, "ok");
    ctx.settle(2);
    ctx.events.assert_eq(&[
        (POST, "/app/installations/46294327/access_tokens"),
        (PATCH, "/repos/octo-org/playground/issues/7"),
    ]);
}
