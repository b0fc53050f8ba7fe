//! Scenario tests for the SubmissionController state machine.
//!
//! Every collaborator is a fake: cookies come from a static jar, the page is
//! an HTML snapshot, the API is scripted and time is a manual clock.

#[path = "../support/fakes.rs"]
mod fakes;

use fakes::*;

use wishclip::managers::submission_controller::{GENERIC_FAILURE, TIMEOUT_FAILURE};
use wishclip::types::account::AuthPayload;
use wishclip::types::errors::{ApiError, SubmitError};
use wishclip::types::popup::{ActionControl, Notice, Phase};
use wishclip::types::submission::{DestinationMode, UserPreferences};

// ---------------------------------------------------------------------------
// Activation flow
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_no_session_cookie_is_not_logged_in() {
    let h = Harness::new(Some(family()), vec![]);
    h.auth_cache().store(&family(), START).await.unwrap();
    let mut controller = h.controller();

    let state = controller.open().await;

    assert_eq!(state.phase, Phase::NotLoggedIn);
    assert_eq!(h.api.who_am_i_count(), 0, "no auth call without a session");
    assert_eq!(h.page.injection_count(), 0, "no extraction without a session");
    assert!(h.auth_cache().snapshot().await.unwrap().is_none(), "stale cache is dropped");
}

#[tokio::test]
async fn test_account_without_profiles_is_no_profiles() {
    let empty = AuthPayload {
        kids: vec![],
        ..family()
    };
    let h = Harness::new(Some(empty), vec![session_cookie()]);
    let mut controller = h.controller();

    let state = controller.open().await;

    assert_eq!(state.phase, Phase::NoProfiles);
    assert_eq!(h.page.injection_count(), 0);
}

#[tokio::test]
async fn test_auth_check_failure_reads_as_logged_out() {
    let h = Harness::new(None, vec![session_cookie()]);
    let mut controller = h.controller();

    assert_eq!(controller.open().await.phase, Phase::NotLoggedIn);
    assert_eq!(h.api.who_am_i_count(), 1);
    assert_eq!(h.page.injection_count(), 0);
}

#[tokio::test]
async fn test_logged_out_payload_reads_as_logged_out() {
    let h = Harness::new(Some(AuthPayload::default()), vec![session_cookie()]);
    let mut controller = h.controller();
    assert_eq!(controller.open().await.phase, Phase::NotLoggedIn);
}

#[tokio::test]
async fn test_ready_with_extracted_product_and_defaults() {
    let h = Harness::logged_in();
    let mut controller = h.controller();

    let state = controller.open().await.clone();

    assert_eq!(state.phase, Phase::Ready);
    let product = state.product.clone().unwrap();
    assert_eq!(product.title, "Wooden Train Set");
    assert_eq!(product.image, "https://cdn.example.com/train.jpg");
    assert_eq!(product.price, "34.99");
    assert_eq!(product.domain, "toybarn.example.com");
    assert_eq!(state.destination, DestinationMode::Kid);
    assert_eq!(state.selected_kid.as_deref(), Some("k1"));
    assert_eq!(state.selected_registry.as_deref(), Some("r1"));
    assert!(!state.already_added);
    assert!(!state.from_cache);
    assert!(state.action_enabled());
    assert_eq!(state.action_label(), "Add to Wishlist");

    let cached = h.auth_cache().snapshot().await.unwrap().unwrap();
    assert_eq!(cached.fetched_at, START);
    assert!(controller.take_refresh_handle().is_none(), "fresh fetch needs no refresh");
}

#[tokio::test]
async fn test_restricted_page_skips_extraction() {
    let h = Harness::logged_in().with_page("chrome://extensions", "<html></html>");
    let mut controller = h.controller();

    assert_eq!(controller.open().await.phase, Phase::ExtractionFailed);
    assert_eq!(h.page.injection_count(), 0);
}

#[tokio::test]
async fn test_page_without_title_is_extraction_failed() {
    let h = Harness::logged_in().with_page(
        "https://shop.example.com/blank",
        r#"<html><body><img src="https://cdn.example.com/a.jpg" width="500" height="500"><p>$5.00</p></body></html>"#,
    );
    let mut controller = h.controller();

    assert_eq!(controller.open().await.phase, Phase::ExtractionFailed);
    assert_eq!(h.page.injection_count(), 1);
}

#[tokio::test]
async fn test_recent_submission_flags_already_added() {
    let h = Harness::logged_in();
    h.dedup().record(TRAIN_URL, START - 30_000).await.unwrap();
    let mut controller = h.controller();

    let state = controller.open().await;

    assert_eq!(state.phase, Phase::Ready);
    assert!(state.already_added);
    assert!(state.action_enabled(), "the flag never blocks a re-add");
}

#[tokio::test]
async fn test_old_submission_is_not_flagged() {
    let h = Harness::logged_in();
    h.dedup().record(TRAIN_URL, START - 90_000).await.unwrap();
    let mut controller = h.controller();
    assert!(!controller.open().await.already_added);
}

// ---------------------------------------------------------------------------
// Fast paint and background refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fresh_cache_paints_then_refreshes_in_background() {
    let h = Harness::logged_in();
    let cached = AuthPayload {
        kids: vec![kid("k1", "Ava")],
        ..family()
    };
    h.auth_cache().store(&cached, START - 60_000).await.unwrap();
    let mut controller = h.controller();

    let state = controller.open().await.clone();
    assert_eq!(state.phase, Phase::Ready);
    assert!(state.from_cache);
    assert_eq!(state.account.as_ref(), Some(&cached));

    controller.take_refresh_handle().expect("refresh started").await.unwrap();

    assert_eq!(h.api.who_am_i_count(), 1);
    let refreshed = h.auth_cache().snapshot().await.unwrap().unwrap();
    assert_eq!(refreshed.payload, family(), "refresh replaces the cache");
    assert_eq!(refreshed.fetched_at, START);
    assert_eq!(
        controller.state().account.as_ref(),
        Some(&cached),
        "refresh does not re-render populated selections"
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_cache_and_state() {
    let h = Harness::new(None, vec![session_cookie()]);
    h.auth_cache().store(&family(), START - 1_000).await.unwrap();
    let mut controller = h.controller();

    assert_eq!(controller.open().await.phase, Phase::Ready);
    controller.take_refresh_handle().unwrap().await.unwrap();

    let snapshot = h.auth_cache().snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.fetched_at, START - 1_000);
    assert_eq!(controller.state().phase, Phase::Ready);
}

#[tokio::test]
async fn test_expired_cache_fetches_in_foreground() {
    let h = Harness::logged_in();
    h.auth_cache().store(&family(), START - 300_000).await.unwrap();
    let mut controller = h.controller();

    let state = controller.open().await;
    assert!(!state.from_cache);
    assert_eq!(h.api.who_am_i_count(), 1);
    assert!(controller.take_refresh_handle().is_none());
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_saved_preferences_are_restored() {
    let h = Harness::logged_in();
    h.prefs()
        .save(&UserPreferences {
            last_kid_id: Some("k2".to_string()),
            last_registry_id: Some("r1".to_string()),
            last_destination: Some(DestinationMode::Registry),
        })
        .await
        .unwrap();
    let mut controller = h.controller();

    let state = controller.open().await;
    assert_eq!(state.destination, DestinationMode::Registry);
    assert_eq!(state.selected_kid.as_deref(), Some("k2"));
    assert_eq!(state.action_label(), "Add to Registry");
}

#[tokio::test]
async fn test_stale_preference_ids_are_ignored() {
    let h = Harness::logged_in();
    h.prefs()
        .save(&UserPreferences {
            last_kid_id: Some("deleted-kid".to_string()),
            last_registry_id: Some("deleted-registry".to_string()),
            last_destination: None,
        })
        .await
        .unwrap();
    let mut controller = h.controller();

    let state = controller.open().await;
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.selected_kid.as_deref(), Some("k1"));
    assert_eq!(state.selected_registry.as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_selection_changes_are_persisted() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;

    controller.select_kid("k2").await;
    controller.set_destination(DestinationMode::Registry).await;
    controller.select_kid("nobody").await;

    assert_eq!(controller.state().selected_kid.as_deref(), Some("k2"));
    let prefs = h.prefs().load().await.unwrap();
    assert_eq!(prefs.last_kid_id.as_deref(), Some("k2"));
    assert_eq!(prefs.last_destination, Some(DestinationMode::Registry));
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_successful_submission_records_and_confirms() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;
    controller.select_kid("k2").await;

    let state = controller.submit().await.unwrap().clone();

    let request = h.api.last_request().unwrap();
    assert_eq!(request.kid_id.as_deref(), Some("k2"));
    assert_eq!(request.registry_id, None);
    assert_eq!(request.title, "Wooden Train Set");
    assert_eq!(request.price, "34.99");
    assert_eq!(request.url, TRAIN_URL);
    assert_eq!(h.api.requests.lock().unwrap()[0].0, "tok-abc");

    assert_eq!(state.action, ActionControl::Confirmed { until: START + 2_000 });
    assert_eq!(state.action_label(), "Added!");
    assert_eq!(state.notice, Some(Notice::Success("Added to Ben's wishlist!".to_string())));
    assert!(state.already_added);

    assert!(h.dedup().was_recently_added(TRAIN_URL, START + 1).await);
    assert_eq!(h.prefs().load().await.unwrap().last_kid_id.as_deref(), Some("k2"));
}

#[tokio::test]
async fn test_success_indicator_reverts_after_display_time() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;
    controller.submit().await.unwrap();

    h.clock.advance(1_999);
    assert_eq!(controller.settle().action_label(), "Added!");

    h.clock.advance(1);
    let state = controller.settle();
    assert_eq!(state.action, ActionControl::Idle);
    assert_eq!(state.action_label(), "Add to Wishlist");
}

#[tokio::test]
async fn test_server_success_message_is_shown() {
    let h = Harness::logged_in();
    h.api.set_add(AddOutcome::Ok(Some("Saved to Ava's list".to_string())));
    let mut controller = h.controller();
    controller.open().await;

    let state = controller.submit().await.unwrap();
    assert_eq!(state.notice, Some(Notice::Success("Saved to Ava's list".to_string())));
}

#[tokio::test]
async fn test_conflict_message_is_shown_verbatim() {
    let h = Harness::logged_in();
    h.api.set_add(AddOutcome::Rejected(409, Some("This item is already on the wishlist".to_string())));
    let mut controller = h.controller();
    controller.open().await;

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::Api(ApiError::Rejected { status: 409, .. })));
    let state = controller.state();
    assert_eq!(
        state.notice,
        Some(Notice::Error("This item is already on the wishlist".to_string()))
    );
    assert_eq!(state.action, ActionControl::Idle);
    assert!(state.action_enabled());
    assert_eq!(state.action_label(), "Add to Wishlist");
    assert!(!h.dedup().was_recently_added(TRAIN_URL, START).await);
}

#[tokio::test]
async fn test_failure_without_message_uses_generic_text() {
    let h = Harness::logged_in();
    h.api.set_add(AddOutcome::Rejected(500, None));
    let mut controller = h.controller();
    controller.open().await;

    assert!(controller.submit().await.is_err());
    assert_eq!(controller.state().notice, Some(Notice::Error(GENERIC_FAILURE.to_string())));
}

#[tokio::test]
async fn test_timeout_returns_control_to_idle() {
    let h = Harness::logged_in();
    h.api.set_add(AddOutcome::TimedOut);
    let mut controller = h.controller();
    controller.open().await;

    assert!(matches!(controller.submit().await, Err(SubmitError::Api(ApiError::TimedOut))));
    let state = controller.state();
    assert_eq!(state.action, ActionControl::Idle);
    assert_eq!(state.notice, Some(Notice::Error(TIMEOUT_FAILURE.to_string())));
}

#[tokio::test]
async fn test_missing_selection_is_rejected_locally() {
    let no_registries = AuthPayload {
        registries: vec![],
        ..family()
    };
    let h = Harness::new(Some(no_registries), vec![session_cookie()]);
    let mut controller = h.controller();
    controller.open().await;
    controller.set_destination(DestinationMode::Registry).await;
    assert!(!controller.state().action_enabled());

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, SubmitError::MissingSelection("registry")));
    assert_eq!(h.api.add_count(), 0, "no network call");
    assert_eq!(
        controller.state().notice,
        Some(Notice::Error("No registry selected".to_string()))
    );
}

#[tokio::test]
async fn test_registry_submission_sends_registry_id() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;
    controller.set_destination(DestinationMode::Registry).await;

    let state = controller.submit().await.unwrap().clone();

    let request = h.api.last_request().unwrap();
    assert_eq!(request.registry_id.as_deref(), Some("r1"));
    assert_eq!(request.kid_id, None);
    assert_eq!(state.notice, Some(Notice::Success("Added to Baby Shower!".to_string())));
}

#[tokio::test]
async fn test_switching_destination_clears_notice() {
    let h = Harness::logged_in();
    h.api.set_add(AddOutcome::Rejected(400, Some("Invalid price".to_string())));
    let mut controller = h.controller();
    controller.open().await;
    let _ = controller.submit().await;
    assert!(controller.state().notice.is_some());

    let state = controller.set_destination(DestinationMode::Registry).await;

    assert!(state.notice.is_none());
    assert_eq!(state.action_label(), "Add to Registry");
    assert!(state.action_enabled());
}

#[tokio::test]
async fn test_submit_outside_ready_is_not_ready() {
    let h = Harness::new(Some(family()), vec![]);
    let mut controller = h.controller();
    controller.open().await;

    assert!(matches!(controller.submit().await, Err(SubmitError::NotReady)));
    assert_eq!(h.api.add_count(), 0);
}

#[tokio::test]
async fn test_logout_clears_cache() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;
    assert!(h.auth_cache().snapshot().await.unwrap().is_some());

    let state = controller.logout().await;

    assert_eq!(state.phase, Phase::NotLoggedIn);
    assert!(h.auth_cache().snapshot().await.unwrap().is_none());
}

#[tokio::test]
async fn test_in_flight_submission_shows_submitting() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;

    let pending = controller.begin_submit().unwrap();

    let state = controller.state();
    assert_eq!(state.action, ActionControl::Submitting);
    assert_eq!(state.action_label(), "Adding...");
    assert!(!state.action_enabled());
    assert!(matches!(controller.begin_submit(), Err(SubmitError::InProgress)));

    let result = pending.send().await;
    let state = controller.finish_submit(pending, result).await.unwrap();
    assert_eq!(state.action, ActionControl::Confirmed { until: START + 2_000 });
    assert_eq!(h.api.add_count(), 1);
}

#[tokio::test]
async fn test_submission_finishing_after_reopen_only_records() {
    let h = Harness::logged_in();
    let mut controller = h.controller();
    controller.open().await;
    let pending = controller.begin_submit().unwrap();

    controller.open().await;
    let result = pending.send().await;
    let state = controller.finish_submit(pending, result).await.unwrap();

    assert_eq!(state.action, ActionControl::Idle);
    assert!(state.notice.is_none());
    assert!(h.dedup().was_recently_added(TRAIN_URL, START).await);
}

#[tokio::test]
async fn test_missing_tab_is_extraction_failed() {
    let h = Harness::logged_in().with_page("", "");
    let mut controller = h.controller();

    assert_eq!(controller.open().await.phase, Phase::ExtractionFailed);
    assert_eq!(h.page.injection_count(), 0);
}
