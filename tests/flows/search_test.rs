//! Tests for `src/flows/search.rs`.

use bazaar::config::Limits;
use bazaar::db::SearchCriteria;
use bazaar::flows::{parse_range, Flow, Input, Keys, Search, Step, ALL_CATEGORIES, CUSTOM_RANGE};
use bazaar::validation::ValidationError;

fn choice(s: &str) -> Input {
    Input::Choice(s.to_owned())
}

fn text(s: &str) -> Input {
    Input::Text(s.to_owned())
}

fn next(flow: Search, input: Input, limits: &Limits) -> Search {
    match flow.advance(input, limits) {
        Step::Next { state, .. } => state,
        other => panic!("expected next step, got {other:?}"),
    }
}

#[test]
fn keyword_search() {
    let limits = Limits::default();
    let flow = next(Search::start(), choice("keywords"), &limits);
    assert_eq!(flow, Search::Keywords);
    assert_eq!(
        flow.advance(text("  bike "), &limits),
        Step::Done(SearchCriteria {
            keywords: Some("bike".to_owned()),
            ..SearchCriteria::default()
        })
    );
}

#[test]
fn category_search_and_browse_all() {
    let limits = Limits::default();
    let flow = next(Search::start(), choice("category"), &limits);
    assert_eq!(flow.prompt(&limits).keys, Keys::BrowseCategories);

    assert_eq!(
        flow.advance(choice("books"), &limits),
        Step::Done(SearchCriteria {
            category: Some("books".to_owned()),
            ..SearchCriteria::default()
        })
    );
    assert_eq!(
        flow.advance(choice(ALL_CATEGORIES), &limits),
        Step::Done(SearchCriteria::default())
    );
}

#[test]
fn preset_price_range() {
    let limits = Limits::default();
    let flow = next(Search::start(), choice("price"), &limits);
    assert_eq!(
        flow.advance(choice("25-50"), &limits),
        Step::Done(SearchCriteria {
            min_price_cents: Some(2_500),
            max_price_cents: Some(5_000),
            ..SearchCriteria::default()
        })
    );
}

#[test]
fn custom_range_rejects_inverted_bounds() {
    let limits = Limits::default();
    let flow = next(Search::start(), choice("price"), &limits);
    let flow = next(flow, choice(CUSTOM_RANGE), &limits);
    let flow = next(flow, text("100"), &limits);
    assert_eq!(
        flow,
        Search::MaxPrice {
            min_cents: Some(10_000)
        }
    );

    match flow.advance(text("50"), &limits) {
        Step::Retry { error, .. } => assert_eq!(error, ValidationError::InvertedRange),
        other => panic!("expected retry, got {other:?}"),
    }
    assert_eq!(
        flow.advance(text("0"), &limits),
        Step::Done(SearchCriteria {
            min_price_cents: Some(10_000),
            ..SearchCriteria::default()
        })
    );
}

#[test]
fn unknown_mode_is_retried() {
    let limits = Limits::default();
    match Search::start().advance(choice("telepathy"), &limits) {
        Step::Retry { state, error } => {
            assert_eq!(state, Search::Mode);
            assert_eq!(error, ValidationError::UnknownChoice);
        }
        other => panic!("expected retry, got {other:?}"),
    }
}

#[test]
fn range_tokens() {
    assert_eq!(parse_range("0-25"), Some((None, Some(2_500))));
    assert_eq!(parse_range("500-0"), Some((Some(50_000), None)));
    assert_eq!(parse_range("abc"), None);
    assert_eq!(parse_range("-5-10"), None);
}
