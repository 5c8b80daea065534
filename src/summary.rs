use crate::models::{EngagementResponse, Lead, RadarPoint, ScoreBand, ScoreDistribution};

const MAX_WEBSITE_VISITS: f64 = 20.0;
const MAX_EMAIL_OPENS: f64 = 10.0;
const MAX_TIME_ON_SITE: f64 = 30.0;
const MAX_PAST_PURCHASES: f64 = 10.0;
const MAX_INQUIRY_RESPONSES: f64 = 5.0;

pub fn score_distribution(leads: &[Lead]) -> ScoreDistribution {
    leads
        .iter()
        .fold(ScoreDistribution::default(), |mut acc, lead| {
            match lead.band() {
                ScoreBand::Hot => acc.hot += 1,
                ScoreBand::Warm => acc.warm += 1,
                ScoreBand::Cold => acc.cold += 1,
            }
            acc
        })
}

pub fn engagement(lead: &Lead, key: String) -> EngagementResponse {
    let ctr_percent = lead.click_through_rate * 100.0;
    let points = vec![
        RadarPoint {
            label: "Website Visits",
            value: normalize(lead.website_visits, MAX_WEBSITE_VISITS),
            detail: format!("Website Visits: {}", lead.website_visits),
        },
        RadarPoint {
            label: "Email Opens",
            value: normalize(lead.email_opens, MAX_EMAIL_OPENS),
            detail: format!("Email Opens: {}", lead.email_opens),
        },
        RadarPoint {
            label: "Time on Site",
            value: normalize(lead.time_spent_on_site, MAX_TIME_ON_SITE),
            detail: format!("Time on Site: {} min", lead.time_spent_on_site),
        },
        RadarPoint {
            label: "Click Rate (%)",
            value: ctr_percent.clamp(0.0, 100.0),
            detail: format!("Click Rate: {ctr_percent:.1}%"),
        },
        RadarPoint {
            label: "Past Purchases",
            value: normalize(lead.past_purchases, MAX_PAST_PURCHASES),
            detail: format!("Past Purchases: {}", lead.past_purchases),
        },
        RadarPoint {
            label: "Inquiry Responses",
            value: normalize(lead.inquiry_responses, MAX_INQUIRY_RESPONSES),
            detail: format!("Inquiry Responses: {}", lead.inquiry_responses),
        },
    ];

    EngagementResponse {
        key,
        name: lead.name.clone(),
        points,
    }
}

fn normalize(value: f64, max: f64) -> f64 {
    (value / max * 100.0).clamp(0.0, 100.0)
}
