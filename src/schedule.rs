// Copyright 2026 The idasenctl Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recurring desk moves: schedule records, time-of-day and weekday parsing.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Short weekday names, indexed from Sunday.
const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Full weekday names, indexed from Sunday.
const FULL_DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// A recurring move of a desk to a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Unique key.
    pub name: String,
    /// Local time of day, `HH:MM`.
    pub time: String,
    pub desk_name: String,
    pub preset_name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Weekdays, 0 = Sunday .. 6 = Saturday.
    #[serde(default)]
    pub days: Vec<u8>,
}

fn default_enabled() -> bool {
    true
}

impl Schedule {
    /// Whether the schedule applies on the weekday of `now`.
    pub fn runs_on<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let weekday = now.weekday().num_days_from_sunday() as u8;
        self.days.contains(&weekday)
    }

    /// This schedule's instant on the same calendar day as `now`.
    ///
    /// `None` when the wall-clock time does not exist that day (DST gap).
    pub fn occurrence_on<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Option<DateTime<Tz>>, ConfigError> {
        let time = parse_time(&self.time)?;
        let local = now.date_naive().and_time(time);
        Ok(now.timezone().from_local_datetime(&local).earliest())
    }
}

/// Parse an `HH:MM` time of day.
pub fn parse_time(s: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| ConfigError::InvalidTime(s.to_string()))
}

/// Parse a single day token: full name, 3-letter abbreviation, or 0-6.
pub fn parse_day(token: &str) -> Option<u8> {
    let token = token.trim().to_lowercase();

    if let Ok(n) = token.parse::<u8>() {
        return (n <= 6).then_some(n);
    }

    FULL_DAY_NAMES
        .iter()
        .position(|full| *full == token || full[..3] == token)
        .map(|i| i as u8)
}

/// Parse a list of day tokens.
///
/// Fails on the first invalid token without returning a partial set.
/// Duplicates are dropped, keeping first-seen order.
pub fn parse_days<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u8>, ConfigError> {
    let mut days = Vec::new();
    for token in tokens {
        let token = token.as_ref();
        let day = parse_day(token).ok_or_else(|| ConfigError::InvalidDay(token.to_string()))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// Render days as `Mon,Wed,Fri`. Out-of-range values are skipped.
pub fn format_days(days: &[u8]) -> String {
    days.iter()
        .filter_map(|d| DAY_NAMES.get(*d as usize).copied())
        .collect::<Vec<_>>()
        .join(",")
}
