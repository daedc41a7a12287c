use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Top-level key of the card farming feature area.
pub const CARD_FARMING_AREA: &str = "cardFarming";

/// Top-level key of the achievement unlocker feature area (opaque here).
pub const ACHIEVEMENT_UNLOCKER_AREA: &str = "achievementUnlocker";

/// One of the two mutually exclusive card farming options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardFarmingOption {
    /// Farm only the games on the user's card farming list
    ListGames,
    /// Farm every game that still has card drops
    AllGames,
}

impl CardFarmingOption {
    /// Key used for this option in the stored document.
    pub fn key(self) -> &'static str {
        match self {
            Self::ListGames => "listGames",
            Self::AllGames => "allGames",
        }
    }

    /// The option this one excludes.
    pub fn other(self) -> Self {
        match self {
            Self::ListGames => Self::AllGames,
            Self::AllGames => Self::ListGames,
        }
    }
}

impl fmt::Display for CardFarmingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CardFarmingOption {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listGames" => Ok(Self::ListGames),
            "allGames" => Ok(Self::AllGames),
            _ => Err(()),
        }
    }
}

/// Which card farming option is active.
///
/// Replaces the stored pair of booleans so a double-true state cannot be
/// represented. The booleans only exist at the serialization boundary
/// (see [`CardFarmingMode::from_flags`] and [`CardFarmingMode::flags`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardFarmingMode {
    #[default]
    ListGames,
    AllGames,
    /// Neither option selected
    Off,
}

impl CardFarmingMode {
    /// Build a mode from the stored `(listGames, allGames)` flags.
    ///
    /// Both flags set is a legacy invalid state; it resolves to `ListGames`.
    pub fn from_flags(list_games: bool, all_games: bool) -> Self {
        match (list_games, all_games) {
            (true, false) => Self::ListGames,
            (false, true) => Self::AllGames,
            (false, false) => Self::Off,
            (true, true) => {
                tracing::warn!(
                    "Both card farming options were enabled in stored settings, keeping listGames"
                );
                Self::ListGames
            }
        }
    }

    /// The `(listGames, allGames)` flags for this mode.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::ListGames => (true, false),
            Self::AllGames => (false, true),
            Self::Off => (false, false),
        }
    }

    /// Whether `option` is the active one.
    pub fn is_enabled(self, option: CardFarmingOption) -> bool {
        let (list_games, all_games) = self.flags();
        match option {
            CardFarmingOption::ListGames => list_games,
            CardFarmingOption::AllGames => all_games,
        }
    }
}

/// The `cardFarming` feature area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardFarmingSettings {
    pub mode: CardFarmingMode,

    /// Options other than `listGames`/`allGames`, kept verbatim
    pub extra: IndexMap<String, Value>,
}

/// The full settings document persisted under the `settings` key.
///
/// Card farming is interpreted; every other feature area is carried through
/// unchanged in its original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSettings", into = "RawSettings")]
pub struct SettingsDocument {
    pub card_farming: CardFarmingSettings,
    pub other_areas: IndexMap<String, Value>,
}

impl SettingsDocument {
    /// Current card farming mode.
    pub fn card_farming_mode(&self) -> CardFarmingMode {
        self.card_farming.mode
    }

    /// Look up a non card farming feature area.
    pub fn area(&self, name: &str) -> Option<&Value> {
        self.other_areas.get(name)
    }

    /// Read a single option value, card farming included.
    pub fn option(&self, area: &str, option: &str) -> Option<Value> {
        if area == CARD_FARMING_AREA {
            if let Ok(known) = option.parse::<CardFarmingOption>() {
                return Some(Value::Bool(self.card_farming.mode.is_enabled(known)));
            }
            return self.card_farming.extra.get(option).cloned();
        }

        self.other_areas
            .get(area)
            .and_then(|value| value.get(option))
            .cloned()
    }
}

impl Default for SettingsDocument {
    fn default() -> Self {
        let mut other_areas = IndexMap::new();
        other_areas.insert(
            ACHIEVEMENT_UNLOCKER_AREA.to_string(),
            Value::Object(serde_json::Map::new()),
        );

        Self {
            card_farming: CardFarmingSettings::default(),
            other_areas,
        }
    }
}

/// Wire shape of [`SettingsDocument`]: a plain map of feature areas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct RawSettings(IndexMap<String, Value>);

impl From<RawSettings> for SettingsDocument {
    fn from(raw: RawSettings) -> Self {
        let mut areas = raw.0;

        let mut extra = match areas.shift_remove(CARD_FARMING_AREA) {
            Some(Value::Object(map)) => map.into_iter().collect::<IndexMap<_, _>>(),
            Some(other) => {
                tracing::warn!("Ignoring malformed cardFarming area: {}", other);
                IndexMap::new()
            }
            None => IndexMap::new(),
        };

        let mut take_flag = |option: CardFarmingOption| {
            extra
                .shift_remove(option.key())
                .and_then(|value| value.as_bool())
                .unwrap_or(false)
        };
        let list_games = take_flag(CardFarmingOption::ListGames);
        let all_games = take_flag(CardFarmingOption::AllGames);

        Self {
            card_farming: CardFarmingSettings {
                mode: CardFarmingMode::from_flags(list_games, all_games),
                extra,
            },
            other_areas: areas,
        }
    }
}

impl From<SettingsDocument> for RawSettings {
    fn from(doc: SettingsDocument) -> Self {
        let (list_games, all_games) = doc.card_farming.mode.flags();

        let mut card_farming = serde_json::Map::new();
        card_farming.insert(
            CardFarmingOption::ListGames.key().to_string(),
            Value::Bool(list_games),
        );
        card_farming.insert(
            CardFarmingOption::AllGames.key().to_string(),
            Value::Bool(all_games),
        );
        card_farming.extend(doc.card_farming.extra);

        let mut areas = IndexMap::with_capacity(doc.other_areas.len() + 1);
        areas.insert(CARD_FARMING_AREA.to_string(), Value::Object(card_farming));
        areas.extend(doc.other_areas);

        RawSettings(areas)
    }
}
