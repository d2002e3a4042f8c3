use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trip::{TripId, DEFAULT_GUIDE};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dynamic,
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DateFormat {
    Iso,
    #[default]
    DayMonthYear,
    MonthDayYear,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
        }
    }

    pub fn format(&self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSettings {
    pub theme_mode: ThemeMode,
    pub default_guide: String,
    pub show_delete_confirmation: bool,
    pub date_format: DateFormat,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::Dynamic,
            default_guide: DEFAULT_GUIDE.into(),
            show_delete_confirmation: true,
            date_format: DateFormat::DayMonthYear,
        }
    }
}

/// Everything the preference store keeps on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Preferences {
    #[serde(default)]
    pub ongoing_session_id: Option<TripId>,
    #[serde(default)]
    pub settings: UserSettings,
}
