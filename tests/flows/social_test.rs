//! Tests for `src/flows/social.rs`.

use bazaar::config::Limits;
use bazaar::db::{NewReview, ProfileField};
use bazaar::flows::{
    Flow, Input, MessageFlow, OutgoingMessage, ProfileEdit, ProfileOutcome, ReviewFlow, Step,
};
use bazaar::validation::ValidationError;

#[test]
fn compose_message_targets_seller_and_listing() {
    let limits = Limits::default();
    let flow = MessageFlow::Compose {
        listing_id: 4,
        to: 9,
    };
    assert_eq!(
        flow.advance(Input::Text(" Is it available? ".to_owned()), &limits),
        Step::Done(OutgoingMessage {
            to: 9,
            listing_id: Some(4),
            text: "Is it available?".to_owned(),
        })
    );
}

#[test]
fn too_short_message_is_retried() {
    let limits = Limits::default();
    let flow = MessageFlow::Reply {
        to: 9,
        listing_id: None,
    };
    match flow.advance(Input::Text("k".to_owned()), &limits) {
        Step::Retry { state, error } => {
            assert_eq!(state, flow);
            assert_eq!(error, ValidationError::TooShort { field: "Message", min: 2 });
        }
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn review_rating_then_optional_comment() {
    let limits = Limits::default();
    let flow = match ReviewFlow::start(11).advance(Input::Choice("4".to_owned()), &limits) {
        Step::Next { state, .. } => state,
        other => panic!("expected comment step, got {other:?}"),
    };
    assert_eq!(
        flow,
        ReviewFlow::Comment {
            listing_id: 11,
            rating: 4
        }
    );
    assert_eq!(
        flow.advance(Input::Skip, &limits),
        Step::Done(NewReview {
            listing_id: 11,
            rating: 4,
            comment: None,
        })
    );
    assert_eq!(
        flow.advance(Input::Text("Great seller".to_owned()), &limits),
        Step::Done(NewReview {
            listing_id: 11,
            rating: 4,
            comment: Some("Great seller".to_owned()),
        })
    );
}

#[test]
fn out_of_range_rating_is_retried() {
    let limits = Limits::default();
    match ReviewFlow::start(11).advance(Input::Choice("6".to_owned()), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::UnknownChoice),
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn profile_edit_validates_phone_and_clears_on_skip() {
    let limits = Limits::default();
    let flow = ProfileEdit::start(ProfileField::Phone);

    match flow.advance(Input::Text("call me".to_owned()), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::InvalidPhone),
        other => panic!("expected retry, got {other:?}"),
    }
    assert_eq!(
        flow.advance(Input::Text("+49 (30) 123-456".to_owned()), &limits),
        Step::Done(ProfileOutcome {
            field: ProfileField::Phone,
            value: Some("+49 (30) 123-456".to_owned()),
        })
    );
    assert_eq!(
        flow.advance(Input::Skip, &limits),
        Step::Done(ProfileOutcome {
            field: ProfileField::Phone,
            value: None,
        })
    );
}
