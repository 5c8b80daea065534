use crate::models::{IntentFilter, Lead, LeadFilters, LeadQuery};

pub fn matches(lead: &Lead, query: &LeadQuery) -> bool {
    matches_search(lead, &query.search) && matches_filters(lead, &query.filters)
}

pub fn filter_leads<'a>(leads: &'a [Lead], query: &LeadQuery) -> Vec<&'a Lead> {
    leads.iter().filter(|lead| matches(lead, query)).collect()
}

fn matches_search(lead: &Lead, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [&lead.name, &lead.industry, &lead.message]
        .into_iter()
        .any(|field| contains_ignore_case(field, &needle))
}

fn matches_filters(lead: &Lead, filters: &LeadFilters) -> bool {
    let score = filters
        .score_range
        .is_none_or(|band| lead.band() == band);
    let sentiment = filters
        .sentiment
        .as_deref()
        .is_none_or(|sentiment| lead.sentiment_label == sentiment);
    let intent = filters.intent.is_none_or(|intent| match intent {
        IntentFilter::Yes => lead.intent_detected,
        IntentFilter::No => !lead.intent_detected,
    });
    let industry = filters
        .industry
        .as_deref()
        .is_none_or(|industry| contains_ignore_case(&lead.industry, &industry.to_lowercase()));
    let location = filters
        .location
        .as_deref()
        .is_none_or(|location| contains_ignore_case(&lead.location, &location.to_lowercase()));

    score && sentiment && intent && industry && location
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
