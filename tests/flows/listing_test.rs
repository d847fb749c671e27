//! Tests for `src/flows/listing.rs`.

use bazaar::config::Limits;
use bazaar::db::{ListingEdit, ListingField};
use bazaar::flows::{CreateListing, EditListing, EditOutcome, Flow, Input, Keys, Step};
use bazaar::validation::ValidationError;

fn text(s: &str) -> Input {
    Input::Text(s.to_owned())
}

fn photo(n: u32) -> Input {
    Input::Photo {
        file_id: format!("file-{n}"),
        unique_id: format!("uniq-{n}"),
    }
}

/// Advance and require a move to a new step.
fn next<F: Flow>(flow: F, input: Input, limits: &Limits) -> F
where
    F: std::fmt::Debug,
{
    match flow.advance(input, limits) {
        Step::Next { state, .. } => state,
        Step::Retry { state, error } => panic!("unexpected retry at {state:?}: {error}"),
        Step::Done(_) => panic!("flow finished early"),
    }
}

fn at_confirm(limits: &Limits) -> CreateListing {
    let flow = CreateListing::start();
    let flow = next(flow, text("  Mountain bike  "), limits);
    let flow = next(flow, Input::Skip, limits);
    let flow = next(flow, text("$1,250.00"), limits);
    let flow = next(flow, Input::Choice("sports".to_owned()), limits);
    next(flow, Input::Skip, limits)
}

#[test]
fn happy_path_produces_draft() {
    let limits = Limits::default();
    let flow = at_confirm(&limits);
    assert_eq!(flow.prompt(&limits).keys, Keys::Confirm);

    match flow.advance(Input::Confirm(true), &limits) {
        Step::Done(Some(draft)) => {
            assert_eq!(draft.title, "Mountain bike");
            assert_eq!(draft.description, None);
            assert_eq!(draft.price_cents, 125_000);
            assert_eq!(draft.category, "sports");
            assert!(draft.photos.is_empty());
        }
        other => panic!("expected a finished draft, got {other:?}"),
    }
}

#[test]
fn declining_at_confirm_yields_nothing() {
    let limits = Limits::default();
    let flow = at_confirm(&limits);
    assert_eq!(flow.advance(Input::Confirm(false), &limits), Step::Done(None));
}

#[test]
fn short_title_is_retried_in_place() {
    let limits = Limits::default();
    match CreateListing::start().advance(text("ab"), &limits) {
        Step::Retry { state, error } => {
            assert_eq!(state, CreateListing::Title);
            assert_eq!(error, ValidationError::TooShort { field: "Title", min: 3 });
        }
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn bad_price_and_unknown_category_are_retried() {
    let limits = Limits::default();
    let flow = next(CreateListing::start(), text("Desk"), &limits);
    let flow = next(flow, text("Solid oak"), &limits);

    let flow = match flow.advance(text("cheap"), &limits) {
        Step::Retry { state, error } => {
            assert_eq!(error, ValidationError::NotANumber);
            state
        }
        other => panic!("expected retry, got {other:?}"),
    };
    let flow = next(flow, text("80"), &limits);

    match flow.advance(Input::Choice("spaceships".to_owned()), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::UnknownChoice),
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn text_at_category_step_is_wrong_input() {
    let limits = Limits::default();
    let flow = next(CreateListing::start(), text("Desk"), &limits);
    let flow = next(flow, Input::Skip, &limits);
    let flow = next(flow, text("10"), &limits);
    match flow.advance(text("books"), &limits) {
        Step::Retry { error, .. } => {
            assert!(matches!(error, ValidationError::WrongInput { .. }));
        }
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn photos_stop_at_the_limit() {
    let limits = Limits {
        max_photos: 2,
        ..Limits::default()
    };
    let flow = next(CreateListing::start(), text("Camera"), &limits);
    let flow = next(flow, Input::Skip, &limits);
    let flow = next(flow, text("300"), &limits);
    let flow = next(flow, Input::Choice("electronics".to_owned()), &limits);
    assert_eq!(flow.prompt(&limits).keys, Keys::Photos);

    let flow = next(flow, photo(1), &limits);
    assert!(matches!(flow, CreateListing::Photos(_)));
    let flow = next(flow, photo(2), &limits);
    match &flow {
        CreateListing::Confirm(draft) => {
            assert_eq!(draft.photos.len(), 2);
            assert_eq!(draft.photos[0].file_id, "file-1");
        }
        other => panic!("expected confirmation after the last photo, got {other:?}"),
    }
}

#[test]
fn edit_selects_field_then_value() {
    let limits = Limits::default();
    let flow = EditListing::start(7, false);
    assert_eq!(flow.prompt(&limits).keys, Keys::ListingFields);

    let flow = next(flow, Input::Choice("price".to_owned()), &limits);
    assert_eq!(flow, EditListing::for_field(7, false, ListingField::Price));

    assert_eq!(
        flow.advance(text("19.99"), &limits),
        Step::Done(EditOutcome {
            listing_id: 7,
            admin: false,
            edit: ListingEdit::Price(1_999),
        })
    );
}

#[test]
fn edit_rejects_unknown_field() {
    let limits = Limits::default();
    match EditListing::start(7, true).advance(Input::Choice("colour".to_owned()), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::UnknownChoice),
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn edit_description_skip_clears_it() {
    let limits = Limits::default();
    let flow = EditListing::for_field(3, true, ListingField::Description);
    assert_eq!(
        flow.advance(Input::Skip, &limits),
        Step::Done(EditOutcome {
            listing_id: 3,
            admin: true,
            edit: ListingEdit::Description(None),
        })
    );
}
