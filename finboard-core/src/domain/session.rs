//! Per-user interaction context.
//!
//! Everything an interaction depends on travels in a [`SessionContext`]
//! owned by the caller. Nothing is read from ambient state, so two sessions
//! never observe each other's uploads or selections.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback window for the equity page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
    ];

    /// Short token used on the command line and in file names.
    pub fn token(self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
        }
    }

    pub fn months(self) -> u32 {
        match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::TwoYears => 24,
        }
    }

    /// First calendar day of the window ending at `end`.
    pub fn start_from(self, end: NaiveDate) -> NaiveDate {
        end.checked_sub_months(Months::new(self.months()))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Period::OneMonth => "1 month",
            Period::ThreeMonths => "3 months",
            Period::SixMonths => "6 months",
            Period::OneYear => "1 year",
            Period::TwoYears => "2 years",
        };
        f.write_str(label)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Period::ALL
            .into_iter()
            .find(|p| p.token() == s || p.to_string() == s)
            .ok_or_else(|| {
                format!("unknown period '{s}'. Valid: 1mo, 3mo, 6mo, 1y, 2y")
            })
    }
}

/// Which page the interaction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Home,
    Equity,
    Tips,
}

/// A file handed over by the upload widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Selections and upload for one user's interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub ticker: String,
    pub period: Period,
    pub page: Page,
    pub uploaded: Option<UploadedFile>,
}

impl SessionContext {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            period: Period::default(),
            page: Page::default(),
            uploaded: None,
        }
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn with_upload(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.uploaded = Some(UploadedFile {
            name: name.into(),
            bytes,
        });
        self
    }
}
