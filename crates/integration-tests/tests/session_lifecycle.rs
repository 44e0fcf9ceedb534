//! End-to-end session behavior: login, expiry-driven refresh, refresh
//! coalescing, logout, and the 401 safety net.

use std::sync::atomic::Ordering;

use green_mango_client::Access;
use green_mango_integration_tests::{TestContext, mint_token, now_epoch};

#[tokio::test]
async fn test_login_installs_tokens_and_profile() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let snapshot = ctx.client.session().snapshot().await;
    assert!(snapshot.is_authenticated());
    let profile = snapshot.user_info.expect("profile cached after login");
    assert_eq!(profile.id.as_i32(), 1);
    assert_eq!(profile.full_name, "Ada Admin");

    // Fresh token: the guard allows without any refresh traffic.
    assert_eq!(ctx.client.guard().evaluate().await, Access::Allowed);
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_publishes_exactly_one_transition() {
    let ctx = TestContext::spawn().await;
    let mut changes = ctx.client.session().subscribe();

    ctx.login().await;

    changes.changed().await.expect("login notification");
    let snapshot = changes.borrow_and_update().clone();
    // The first state a subscriber can observe already has both the token
    // and the profile; there is no token-only intermediate.
    assert!(snapshot.is_authenticated());
    assert!(snapshot.user_info.is_some());
    assert!(!changes.has_changed().expect("channel open"));
}

#[tokio::test]
async fn test_guard_denies_without_session() {
    let ctx = TestContext::spawn().await;
    assert_eq!(ctx.client.guard().evaluate().await, Access::Denied);
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_transparently() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let stale = mint_token(now_epoch() - 10, "stale");
    ctx.client
        .session()
        .set_tokens(Some(stale.clone()), Some("R1".to_string()))
        .await;

    assert!(ctx.client.session().is_valid().await);
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 1);

    let renewed = ctx
        .client
        .session()
        .access_token()
        .await
        .expect("token after refresh");
    assert_ne!(renewed, stale);

    // The refresh token survived the exchange: a second expiry can be
    // renewed as well.
    ctx.client
        .session()
        .set_tokens(Some(mint_token(now_epoch() - 10, "stale2")), Some("R1".into()))
        .await;
    assert!(ctx.client.session().is_valid().await);
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_validations_coalesce_into_one_refresh() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    ctx.client
        .session()
        .set_tokens(
            Some(mint_token(now_epoch() - 10, "stale")),
            Some("R1".to_string()),
        )
        .await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let session = ctx.client.session().clone();
        tasks.push(tokio::spawn(async move { session.is_valid().await }));
    }
    for task in tasks {
        assert!(task.await.expect("validation task"));
    }

    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_undecodable_token_forces_logout() {
    let ctx = TestContext::spawn().await;
    ctx.client
        .session()
        .set_tokens(Some("not-a-jwt".to_string()), Some("R1".to_string()))
        .await;

    assert!(!ctx.client.session().is_valid().await);

    let snapshot = ctx.client.session().snapshot().await;
    assert!(!snapshot.is_authenticated());
    assert!(snapshot.user_info.is_none());
    // A refresh token was present, so the backend was notified.
    assert_eq!(ctx.state.logout_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    ctx.state.refresh_fails.store(true, Ordering::SeqCst);

    ctx.client
        .session()
        .set_tokens(
            Some(mint_token(now_epoch() - 10, "stale")),
            Some("R1".to_string()),
        )
        .await;

    assert!(!ctx.client.session().is_valid().await);
    assert!(!ctx.client.session().snapshot().await.is_authenticated());
    assert_eq!(ctx.client.guard().evaluate().await, Access::Denied);
}

#[tokio::test]
async fn test_expired_token_without_refresh_token_is_invalid() {
    let ctx = TestContext::spawn().await;
    ctx.client
        .session()
        .set_tokens(Some(mint_token(now_epoch() - 10, "stale")), None)
        .await;

    assert!(!ctx.client.session().is_valid().await);
    assert_eq!(ctx.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_logout_clears_locally_even_when_server_fails() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    ctx.state.logout_fails.store(true, Ordering::SeqCst);

    ctx.client.auth().logout().await;

    assert_eq!(ctx.state.logout_calls.load(Ordering::SeqCst), 1);
    let snapshot = ctx.client.session().snapshot().await;
    assert!(!snapshot.is_authenticated());
    assert!(snapshot.user_info.is_none());
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    ctx.state
        .user_info_unauthorized
        .store(true, Ordering::SeqCst);

    let err = ctx
        .client
        .auth()
        .fetch_user_info()
        .await
        .expect_err("401 must surface");
    assert!(err.is_unauthorized());

    assert!(!ctx.client.session().snapshot().await.is_authenticated());
    assert_eq!(ctx.client.guard().evaluate().await, Access::Denied);
}

#[tokio::test]
async fn test_guard_observes_login_and_logout() {
    let ctx = TestContext::spawn().await;
    let mut guard = ctx.client.guard();

    ctx.login().await;
    assert_eq!(guard.watch_access().await, Access::Allowed);
    assert!(guard.snapshot().is_authenticated());

    ctx.client.auth().logout().await;
    assert_eq!(guard.watch_access().await, Access::Denied);
}

#[tokio::test]
async fn test_simultaneous_unauthorized_responses_are_safe() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    ctx.state
        .user_info_unauthorized
        .store(true, Ordering::SeqCst);

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let client = ctx.client.clone();
        tasks.push(tokio::spawn(
            async move { client.auth().fetch_user_info().await },
        ));
    }
    for task in tasks {
        let err = task.await.expect("task").expect_err("401 must surface");
        assert!(err.is_unauthorized());
    }

    // The cleanup is idempotent: every caller converges on the same
    // anonymous state.
    let snapshot = ctx.client.session().snapshot().await;
    assert!(!snapshot.is_authenticated());
    assert!(snapshot.user_info.is_none());
}

#[tokio::test]
async fn test_fetch_user_info_updates_cached_profile() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    ctx.client
        .session()
        .update_user_info(|p| p.full_name = "Stale Name".to_string())
        .await;

    let profile = ctx
        .client
        .auth()
        .fetch_user_info()
        .await
        .expect("profile fetch");
    assert_eq!(profile.full_name, "Ada Admin");

    let cached = ctx.client.session().user_info().await.expect("cached");
    assert_eq!(cached.full_name, "Ada Admin");
}
