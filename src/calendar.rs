use crate::models::{ActivityLevel, CalendarDay, CalendarResponse, DayLead, Lead};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;

const SYNTHETIC_SPREAD_DAYS: usize = 7;

/// Leads whose `created_at` already parses are untouched, so running this
/// twice is a no-op.
pub fn backfill_created_at(leads: Vec<Lead>, now: DateTime<Local>) -> Vec<Lead> {
    leads
        .into_iter()
        .enumerate()
        .map(|(index, mut lead)| {
            if lead_day(&lead).is_none() {
                let days_back = (index % SYNTHETIC_SPREAD_DAYS) as u64;
                lead.created_at = Some(calendar_days_before(&now, days_back).to_rfc3339());
            }
            lead
        })
        .collect()
}

// Calendar days, not 24 h steps. A wall time that does not exist on the
// target day (DST gap) falls back to noon of that day.
fn calendar_days_before<Tz: TimeZone>(now: &DateTime<Tz>, days_back: u64) -> DateTime<Tz> {
    now.clone()
        .checked_sub_days(Days::new(days_back))
        .or_else(|| {
            let day = now.date_naive().checked_sub_days(Days::new(days_back))?;
            now.timezone()
                .from_local_datetime(&day.and_hms_opt(12, 0, 0)?)
                .earliest()
        })
        .unwrap_or_else(|| now.clone())
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.with_timezone(&Local).date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(stamp.date());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(stamp.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn lead_day(lead: &Lead) -> Option<NaiveDate> {
    lead.created_at.as_deref().and_then(parse_day)
}

pub fn leads_per_day(leads: &[Lead]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for day in leads.iter().filter_map(lead_day) {
        *counts.entry(day).or_insert(0) += 1;
    }
    counts
}

impl ActivityLevel {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => ActivityLevel::None,
            1..=2 => ActivityLevel::Low,
            3..=4 => ActivityLevel::Medium,
            _ => ActivityLevel::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::None => "none",
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
        }
    }
}

pub fn clamp_selected_day(requested: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    requested.map_or(today, |day| day.min(today))
}

pub fn leads_for_day(leads: &[Lead], day: NaiveDate) -> Vec<(usize, &Lead)> {
    leads
        .iter()
        .enumerate()
        .filter(|(_, lead)| lead_day(lead) == Some(day))
        .collect()
}

pub fn build_calendar(leads: &[Lead], requested: Option<NaiveDate>) -> CalendarResponse {
    build_calendar_at(Local::now().date_naive(), leads, requested)
}

pub fn build_calendar_at(
    today: NaiveDate,
    leads: &[Lead],
    requested: Option<NaiveDate>,
) -> CalendarResponse {
    let selected = clamp_selected_day(requested, today);
    let counts = leads_per_day(leads);

    let days = month_days(selected)
        .map(|date| {
            let count = counts.get(&date).copied().unwrap_or_default();
            CalendarDay {
                date: date_key(date),
                count,
                activity: ActivityLevel::from_count(count),
            }
        })
        .collect();

    let selected_leads = leads_for_day(leads, selected)
        .into_iter()
        .map(|(position, lead)| DayLead {
            key: lead.key(position),
            name: lead.name.clone(),
            score_label: lead.score_label.clone(),
            band: lead.band(),
        })
        .collect();

    CalendarResponse {
        today: date_key(today),
        selected_date: date_key(selected),
        selected_label: long_date_label(selected),
        month: selected.format("%B %Y").to_string(),
        days,
        selected_leads,
    }
}

fn month_days(day: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let first = day.with_day(1).unwrap_or(day);
    first
        .iter_days()
        .take_while(move |date| date.month() == first.month())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn long_date_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
