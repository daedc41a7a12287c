//! Integration tests for the card farming constraint engine
//!
//! These tests verify:
//! - The documented toggle outcomes (cross-toggle, at-least-one fallback)
//! - Idempotence of repeated toggles
//! - That no sequence of toggles can enable both options
//! - That unrelated feature areas pass through untouched

use idler_settings::models::CARD_FARMING_AREA;
use idler_settings::services::{ConstraintError, apply_card_farming_toggle, apply_toggle};
use idler_settings::{CardFarmingMode, CardFarmingOption, SettingsDocument};
use proptest::prelude::*;
use serde_json::json;

fn doc_with(mode: CardFarmingMode) -> SettingsDocument {
    let mut doc: SettingsDocument = serde_json::from_value(json!({
        "cardFarming": { "listGames": true, "allGames": false },
        "achievementUnlocker": { "idle": true, "hidden": false },
    }))
    .unwrap();
    doc.card_farming.mode = mode;
    doc
}

fn stored_flags(doc: &SettingsDocument) -> (bool, bool) {
    let value = serde_json::to_value(doc).unwrap();
    (
        value["cardFarming"]["listGames"].as_bool().unwrap(),
        value["cardFarming"]["allGames"].as_bool().unwrap(),
    )
}

#[test]
fn test_cross_toggle() {
    let doc = doc_with(CardFarmingMode::ListGames);

    let next = apply_toggle(&doc, CARD_FARMING_AREA, "allGames", true).unwrap();

    assert_eq!(stored_flags(&next), (false, true));
}

#[test]
fn test_at_least_one_fallback() {
    let doc = doc_with(CardFarmingMode::ListGames);

    let next = apply_toggle(&doc, CARD_FARMING_AREA, "listGames", false).unwrap();

    assert_eq!(stored_flags(&next), (true, false));
    assert_eq!(next, doc);
}

#[test]
fn test_toggle_twice_equals_once() {
    let doc = doc_with(CardFarmingMode::AllGames);

    let once = apply_toggle(&doc, CARD_FARMING_AREA, "listGames", true).unwrap();
    let twice = apply_toggle(&once, CARD_FARMING_AREA, "listGames", true).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_achievement_unlocker_untouched() {
    let doc = doc_with(CardFarmingMode::ListGames);

    let next = apply_toggle(&doc, CARD_FARMING_AREA, "allGames", true).unwrap();

    assert_eq!(
        next.area("achievementUnlocker"),
        Some(&json!({ "idle": true, "hidden": false }))
    );
}

#[test]
fn test_unknown_option_reports_error() {
    let doc = doc_with(CardFarmingMode::ListGames);

    let result = apply_toggle(&doc, CARD_FARMING_AREA, "favoriteGames", true);

    assert_eq!(
        result,
        Err(ConstraintError::UnknownOption {
            area: CARD_FARMING_AREA.to_string(),
            option: "favoriteGames".to_string(),
        })
    );
}

fn mode_strategy() -> impl Strategy<Value = CardFarmingMode> {
    prop_oneof![
        Just(CardFarmingMode::ListGames),
        Just(CardFarmingMode::AllGames),
        Just(CardFarmingMode::Off),
    ]
}

fn option_strategy() -> impl Strategy<Value = CardFarmingOption> {
    prop_oneof![
        Just(CardFarmingOption::ListGames),
        Just(CardFarmingOption::AllGames),
    ]
}

proptest! {
    #[test]
    fn prop_toggle_is_idempotent(
        mode in mode_strategy(),
        option in option_strategy(),
        checked in any::<bool>(),
    ) {
        let once = apply_card_farming_toggle(&doc_with(mode), option, checked);
        let twice = apply_card_farming_toggle(&once, option, checked);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_options_never_both_enabled(
        start in mode_strategy(),
        toggles in prop::collection::vec((option_strategy(), any::<bool>()), 0..32),
    ) {
        let mut doc = doc_with(start);

        for (option, checked) in toggles {
            doc = apply_toggle(&doc, CARD_FARMING_AREA, option.key(), checked).unwrap();
            let (list_games, all_games) = stored_flags(&doc);
            prop_assert!(!(list_games && all_games));
        }
    }

    #[test]
    fn prop_toggle_outcome(
        mode in mode_strategy(),
        option in option_strategy(),
        checked in any::<bool>(),
    ) {
        let next = apply_card_farming_toggle(&doc_with(mode), option, checked);

        if checked {
            prop_assert!(next.card_farming_mode().is_enabled(option));
            prop_assert!(!next.card_farming_mode().is_enabled(option.other()));
        } else {
            prop_assert_ne!(next.card_farming_mode(), CardFarmingMode::Off);
        }
        prop_assert_eq!(next.other_areas, doc_with(mode).other_areas);
    }
}
