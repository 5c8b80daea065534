use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeadId {
    Number(i64),
    Text(String),
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadId::Number(id) => write!(f, "{id}"),
            LeadId::Text(id) => f.write_str(id),
        }
    }
}

/// Missing, `null` or mistyped fields fall back to their empty value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<LeadId>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub industry: String,
    #[serde(default, deserialize_with = "lenient")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient")]
    pub job_role: String,
    #[serde(default, deserialize_with = "lenient")]
    pub company_size: String,
    #[serde(default, deserialize_with = "lenient")]
    pub lead_source: String,
    #[serde(default, deserialize_with = "lenient")]
    pub lead_quality: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient")]
    pub followup: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub score_label: String,
    #[serde(default, deserialize_with = "lenient")]
    pub sentiment_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub sentiment_label: String,
    #[serde(default, deserialize_with = "lenient")]
    pub intent_detected: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub intent_label: String,
    #[serde(default, deserialize_with = "lenient")]
    pub website_visits: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub email_opens: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub time_spent_on_site: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub click_through_rate: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub past_purchases: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub inquiry_responses: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
}

impl Lead {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    // Prefixes keep upstream ids and positional keys from ever colliding.
    pub fn key(&self, position: usize) -> String {
        match &self.id {
            Some(id) => format!("id-{id}"),
            None => format!("pos-{position}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Hot,
    Warm,
    Cold,
}

impl ScoreBand {
    /// Warm is inclusive on both ends: 40 and 70 are warm.
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            ScoreBand::Hot
        } else if (40.0..=70.0).contains(&score) {
            ScoreBand::Warm
        } else {
            ScoreBand::Cold
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreBand::Hot => "hot",
            ScoreBand::Warm => "warm",
            ScoreBand::Cold => "cold",
        }
    }
}

impl FromStr for ScoreBand {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "hot" => Ok(ScoreBand::Hot),
            "warm" => Ok(ScoreBand::Warm),
            "cold" => Ok(ScoreBand::Cold),
            other => Err(format!("unknown score range '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentFilter {
    Yes,
    No,
}

impl FromStr for IntentFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "yes" => Ok(IntentFilter::Yes),
            "no" => Ok(IntentFilter::No),
            other => Err(format!("unknown intent filter '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadFilters {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub score_range: Option<ScoreBand>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub intent: Option<IntentFilter>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
}

impl LeadFilters {
    pub fn is_empty(&self) -> bool {
        self == &LeadFilters::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadQuery {
    #[serde(default, deserialize_with = "null_as_default")]
    pub search: String,
    #[serde(flatten)]
    pub filters: LeadFilters,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ViewCommand {
    Toggle,
    Query(LeadQuery),
    ResetFilters,
    Page { page: usize },
    PageSize { page_size: usize },
}

#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct PageSizeForm {
    pub page_size: usize,
}

// Checkboxes only submit a value when checked.
#[derive(Debug, Deserialize)]
pub struct AutoRefreshForm {
    #[serde(default)]
    pub enabled: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutoRefreshRequest {
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadCard {
    pub key: String,
    pub band: ScoreBand,
    #[serde(flatten)]
    pub lead: Lead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewModeName {
    Latest,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub start_item: usize,
    pub end_item: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub items: Vec<PageItem>,
}

#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    pub mode: ViewModeName,
    pub query: Option<LeadQuery>,
    pub page_size: usize,
    pub total_leads: usize,
    pub filtered_count: usize,
    pub leads: Vec<LeadCard>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: String,
    pub count: usize,
    pub activity: ActivityLevel,
}

#[derive(Debug, Serialize)]
pub struct DayLead {
    pub key: String,
    pub name: String,
    pub score_label: String,
    pub band: ScoreBand,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub today: String,
    pub selected_date: String,
    pub selected_label: String,
    pub month: String,
    pub days: Vec<CalendarDay>,
    pub selected_leads: Vec<DayLead>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
}

#[derive(Debug, Serialize)]
pub struct RadarPoint {
    pub label: &'static str,
    pub value: f64,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct EngagementResponse {
    pub key: String,
    pub name: String,
    pub points: Vec<RadarPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub lead_count: usize,
    pub last_refresh: Option<String>,
    pub auto_refresh: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
