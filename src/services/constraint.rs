use crate::models::{CARD_FARMING_AREA, CardFarmingMode, CardFarmingOption, SettingsDocument};
use thiserror::Error;

/// Errors for toggle requests that name something the engine does not manage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Feature area '{0}' has no toggle constraints")]
    UnknownArea(String),

    #[error("Unknown option '{option}' in feature area '{area}'")]
    UnknownOption { area: String, option: String },
}

/// Apply a single checkbox toggle and return the resulting document.
///
/// Only the `cardFarming` area is constrained. The input is left untouched;
/// an unknown area or option is reported and no document is produced.
pub fn apply_toggle(
    doc: &SettingsDocument,
    area: &str,
    option: &str,
    checked: bool,
) -> Result<SettingsDocument, ConstraintError> {
    if area != CARD_FARMING_AREA {
        return Err(ConstraintError::UnknownArea(area.to_string()));
    }

    let option = option
        .parse::<CardFarmingOption>()
        .map_err(|_| ConstraintError::UnknownOption {
            area: area.to_string(),
            option: option.to_string(),
        })?;

    Ok(apply_card_farming_toggle(doc, option, checked))
}

/// Typed form of [`apply_toggle`] for the card farming pair.
///
/// Checking an option clears the other one. Unchecking an option while the
/// other is also off re-selects it, so at least one stays selected.
pub fn apply_card_farming_toggle(
    doc: &SettingsDocument,
    option: CardFarmingOption,
    checked: bool,
) -> SettingsDocument {
    let mut next = doc.clone();
    next.card_farming.mode = next_mode(doc.card_farming.mode, option, checked);
    next
}

fn next_mode(current: CardFarmingMode, option: CardFarmingOption, checked: bool) -> CardFarmingMode {
    let mut target = checked;
    let mut other = current.is_enabled(option.other());

    if checked {
        other = false;
    } else if !other {
        target = true;
    }

    match option {
        CardFarmingOption::ListGames => CardFarmingMode::from_flags(target, other),
        CardFarmingOption::AllGames => CardFarmingMode::from_flags(other, target),
    }
}
