//! Locale for category labels and user-facing text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    #[default]
    En,
}

const DAYS_EN: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const DAYS_RU: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];
const MEALS_EN: [&str; 2] = ["Lunch", "Dinner"];
const MEALS_RU: [&str; 2] = ["Обед", "Ужин"];

impl Locale {
    /// The seven weekday labels, Monday first.
    pub fn day_labels(self) -> &'static [&'static str; 7] {
        match self {
            Locale::Ru => &DAYS_RU,
            Locale::En => &DAYS_EN,
        }
    }

    /// The two meal-time labels, lunch first.
    pub fn meal_labels(self) -> &'static [&'static str; 2] {
        match self {
            Locale::Ru => &MEALS_RU,
            Locale::En => &MEALS_EN,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Ru => write!(f, "ru"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale '{other}' (expected ru or en)")),
        }
    }
}
