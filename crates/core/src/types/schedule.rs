use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::text::normalize;

/// Opening hours as stored by the establishment back-office: a map from day
/// name (French or English) to either a list of slots or a detailed entry.
pub type RawOpeningHours = BTreeMap<String, RawDayHours>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDayHours {
    Slots(Vec<RawSlot>),
    Detailed {
        #[serde(rename = "isOpen", default = "default_open")]
        is_open: bool,
        #[serde(default)]
        slots: Vec<RawSlot>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSlot {
    pub open: String,
    pub close: String,
}

fn default_open() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningInterval {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningInterval {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }

    /// `22:00-02:00` and `00:00-00:00` both continue into the next day.
    fn spans_midnight(&self) -> bool {
        self.close <= self.open
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpeningSchedule {
    days: [Vec<OpeningInterval>; 7],
}

impl OpeningSchedule {
    pub fn add(&mut self, day: Weekday, interval: OpeningInterval) {
        self.days[day.num_days_from_monday() as usize].push(interval);
    }

    pub fn with_interval(mut self, day: Weekday, interval: OpeningInterval) -> Self {
        self.add(day, interval);
        self
    }

    pub fn intervals(&self, day: Weekday) -> &[OpeningInterval] {
        &self.days[day.num_days_from_monday() as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// `at` must already be expressed in the establishment's local time.
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let time = at.time();
        let today = at.weekday();
        let open_today = self.intervals(today).iter().any(|interval| {
            if interval.spans_midnight() {
                time >= interval.open
            } else {
                time >= interval.open && time < interval.close
            }
        });
        if open_today {
            return true;
        }
        self.intervals(today.pred())
            .iter()
            .filter(|interval| interval.spans_midnight())
            .any(|interval| time < interval.close)
    }

    pub fn from_raw(raw: &RawOpeningHours) -> Result<Self, CoreError> {
        let mut schedule = Self::default();
        for (day_name, hours) in raw {
            let day = parse_weekday(day_name)?;
            let slots = match hours {
                RawDayHours::Slots(slots) => slots.as_slice(),
                RawDayHours::Detailed { is_open: false, .. } => continue,
                RawDayHours::Detailed { slots, .. } => slots.as_slice(),
            };
            for slot in slots {
                let open = parse_time(&slot.open)?;
                let close = parse_time(&slot.close)?;
                schedule.add(day, OpeningInterval::new(open, close));
            }
        }
        Ok(schedule)
    }
}

fn parse_weekday(input: &str) -> Result<Weekday, CoreError> {
    let day = match normalize(input).as_str() {
        "lundi" | "monday" | "mon" => Weekday::Mon,
        "mardi" | "tuesday" | "tue" => Weekday::Tue,
        "mercredi" | "wednesday" | "wed" => Weekday::Wed,
        "jeudi" | "thursday" | "thu" => Weekday::Thu,
        "vendredi" | "friday" | "fri" => Weekday::Fri,
        "samedi" | "saturday" | "sat" => Weekday::Sat,
        "dimanche" | "sunday" | "sun" => Weekday::Sun,
        _ => return Err(CoreError::InvalidSchedule(format!("unknown day: {input}"))),
    };
    Ok(day)
}

fn parse_time(input: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = input.trim();
    if trimmed == "24:00" {
        return Ok(NaiveTime::MIN);
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| CoreError::InvalidSchedule(format!("invalid time: {input}")))
}
