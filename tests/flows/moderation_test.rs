//! Tests for `src/flows/moderation.rs`.

use bazaar::config::Limits;
use bazaar::db::{ProfileField, Severity};
use bazaar::flows::{
    ActiveFlow, BlockUser, EditUserProfile, FlagListing, Flow, Input, Keys, Reasoned, Step,
    UserProfileEdit, WarnOutcome, WarnUser,
};
use bazaar::validation::ValidationError;

#[test]
fn warning_collects_severity_then_reason() {
    let limits = Limits::default();
    let flow = WarnUser::start(5);
    assert_eq!(flow.prompt(&limits).keys, Keys::Severity);

    let flow = match flow.advance(Input::Choice("high".to_owned()), &limits) {
        Step::Next { state, .. } => state,
        other => panic!("expected reason step, got {other:?}"),
    };
    assert_eq!(
        flow.advance(Input::Text("scam links".to_owned()), &limits),
        Step::Done(WarnOutcome {
            user_id: 5,
            severity: Severity::High,
            reason: "scam links".to_owned(),
        })
    );
}

#[test]
fn unknown_severity_is_retried() {
    let limits = Limits::default();
    match WarnUser::start(5).advance(Input::Choice("apocalyptic".to_owned()), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::UnknownChoice),
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn block_and_flag_need_a_reason() {
    let limits = Limits::default();
    match BlockUser::start(8).advance(Input::Text("   ".to_owned()), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::Empty { field: "Reason" }),
        other => panic!("expected retry, got {other:?}"),
    }
    assert_eq!(
        BlockUser::start(8).advance(Input::Text("fraud".to_owned()), &limits),
        Step::Done(Reasoned {
            target_id: 8,
            reason: "fraud".to_owned(),
        })
    );
    assert_eq!(
        FlagListing::start(3).advance(Input::Text("counterfeit".to_owned()), &limits),
        Step::Done(Reasoned {
            target_id: 3,
            reason: "counterfeit".to_owned(),
        })
    );
}

#[test]
fn overlong_reason_is_rejected() {
    let limits = Limits {
        reason_max: 5,
        ..Limits::default()
    };
    match FlagListing::start(3).advance(Input::Text("too long a reason".to_owned()), &limits) {
        Step::Retry { error, .. } => {
            assert_eq!(error, ValidationError::TooLong { field: "Reason", max: 5 });
        }
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn admin_profile_edit_validates_like_the_owner_edit() {
    let limits = Limits::default();
    let flow = EditUserProfile::start(9, ProfileField::Location);
    let prompt = flow.prompt(&limits);
    assert_eq!(prompt.keys, Keys::Skip);
    assert!(prompt.text.contains("user #9"));
    assert_eq!(ActiveFlow::EditUserProfile(flow).name(), "edit_user_profile");

    assert_eq!(
        flow.advance(Input::Text("  Lisbon ".to_owned()), &limits),
        Step::Done(UserProfileEdit {
            user_id: 9,
            field: ProfileField::Location,
            value: Some("Lisbon".to_owned()),
        })
    );
    assert_eq!(
        flow.advance(Input::Skip, &limits),
        Step::Done(UserProfileEdit {
            user_id: 9,
            field: ProfileField::Location,
            value: None,
        })
    );

    let phone = EditUserProfile::start(9, ProfileField::Phone);
    match phone.advance(Input::Text("call me maybe".to_owned()), &limits) {
        Step::Retry { state, error } => {
            assert_eq!(state, phone);
            assert_eq!(error, ValidationError::InvalidPhone);
        }
        other => panic!("expected retry, got {other:?}"),
    }
    assert!(matches!(
        phone.advance(Input::Confirm(true), &limits),
        Step::Retry { .. }
    ));
}
