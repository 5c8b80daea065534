use crate::models::{
    CalendarResponse, EngagementResponse, LeadCard, LeadQuery, LeadsResponse,
    PageItem, Pagination, ScoreBand, ScoreDistribution, StatusResponse, ViewModeName,
};
use crate::view::{LATEST_COUNT, PAGE_SIZES};
use chrono::{Datelike, NaiveDate};
use std::f64::consts::PI;
use std::fmt::Write;

pub struct Dashboard {
    pub status: StatusResponse,
    pub calendar: CalendarResponse,
    pub distribution: ScoreDistribution,
    pub leads: LeadsResponse,
    pub engagements: Vec<EngagementResponse>,
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let reload = if dashboard.status.auto_refresh {
        "setTimeout(() => window.location.reload(), 10000);"
    } else {
        ""
    };
    INDEX_HTML
        .replace("{{HEADER}}", &render_header(&dashboard.status))
        .replace("{{CALENDAR}}", &render_calendar(&dashboard.calendar))
        .replace("{{SUMMARY}}", &render_summary(&dashboard.distribution))
        .replace(
            "{{LEADS}}",
            &render_leads(&dashboard.leads, &dashboard.engagements),
        )
        .replace("{{RELOAD}}", reload)
}

fn render_header(status: &StatusResponse) -> String {
    let checked = if status.auto_refresh { " checked" } else { "" };
    let last = status.last_refresh.as_deref().unwrap_or("never");
    format!(
        r#"<form class="auto-refresh" method="post" action="/auto-refresh">
        <label><input type="checkbox" name="enabled" value="on" onchange="this.form.submit()"{checked} /> Auto-refresh</label>
        <span class="last-refresh">Last: {last}</span>
      </form>
      <form method="post" action="/refresh"><button class="btn-secondary" type="submit">Refresh Now</button></form>"#,
        last = escape(last),
    )
}

fn render_calendar(calendar: &CalendarResponse) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<h2>Lead Activity Calendar</h2><p class="subtitle">{}</p><div class="calendar-grid">"#,
        escape(&calendar.month)
    );
    for weekday in ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"] {
        let _ = write!(html, r#"<span class="weekday">{weekday}</span>"#);
    }

    if let Some(first) = calendar.days.first().and_then(|day| parse_key(&day.date)) {
        for _ in 0..first.weekday().num_days_from_monday() {
            html.push_str(r#"<span class="tile blank"></span>"#);
        }
    }

    for day in &calendar.days {
        let number = day
            .date
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .trim_start_matches('0');
        let selected = if day.date == calendar.selected_date { " selected" } else { "" };
        let count = if day.count > 0 {
            format!(r#"<span class="lead-count">{}</span>"#, day.count)
        } else {
            String::new()
        };
        let class = format!("tile {}-activity{selected}", day.activity.as_str());
        if day.date.as_str() > calendar.today.as_str() {
            let _ = write!(html, r#"<span class="{class} future">{number}</span>"#);
        } else {
            let _ = write!(
                html,
                r#"<a class="{class}" href="/?date={date}">{number}{count}</a>"#,
                date = day.date
            );
        }
    }
    html.push_str("</div>");

    html.push_str(
        r#"<div class="calendar-legend">
        <span><i class="legend-dot high-activity"></i>5+ leads</span>
        <span><i class="legend-dot medium-activity"></i>3-4 leads</span>
        <span><i class="legend-dot low-activity"></i>1-2 leads</span>
      </div>"#,
    );

    let count = calendar.selected_leads.len();
    let _ = write!(
        html,
        r#"<div class="selected-date"><h3>{}</h3><p>{count} lead{} added</p>"#,
        escape(&calendar.selected_label),
        if count == 1 { "" } else { "s" }
    );
    if count > 0 {
        html.push_str("<h4>Leads for this date:</h4><ul>");
        for lead in &calendar.selected_leads {
            let _ = write!(
                html,
                r#"<li><span class="lead-name">{}</span><span class="score-indicator {}">{}</span></li>"#,
                escape(&lead.name),
                lead.band.as_str(),
                escape(&lead.score_label)
            );
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

fn render_summary(distribution: &ScoreDistribution) -> String {
    let slices = [
        ("Hot", ScoreBand::Hot, distribution.hot),
        ("Warm", ScoreBand::Warm, distribution.warm),
        ("Cold", ScoreBand::Cold, distribution.cold),
    ];
    let total: usize = slices.iter().map(|(_, _, count)| count).sum();

    let mut svg = String::from(
        r#"<svg class="pie" viewBox="0 0 200 200" role="img" aria-label="Lead score distribution">"#,
    );
    if total == 0 {
        svg.push_str(
            r#"<text class="chart-label" x="100" y="104" text-anchor="middle">No leads yet</text>"#,
        );
    } else {
        let mut start = -PI / 2.0;
        for (_, band, count) in slices.iter().filter(|(_, _, count)| *count > 0) {
            if *count == total {
                let _ = write!(
                    svg,
                    r#"<circle class="slice {}" cx="100" cy="100" r="90" />"#,
                    band.as_str()
                );
                break;
            }
            let sweep = *count as f64 / total as f64 * 2.0 * PI;
            let end = start + sweep;
            let (x1, y1) = polar(100.0, 100.0, 90.0, start);
            let (x2, y2) = polar(100.0, 100.0, 90.0, end);
            let large = if sweep > PI { 1 } else { 0 };
            let _ = write!(
                svg,
                r#"<path class="slice {}" d="M 100 100 L {x1:.2} {y1:.2} A 90 90 0 {large} 1 {x2:.2} {y2:.2} Z" />"#,
                band.as_str()
            );
            start = end;
        }
    }
    svg.push_str("</svg>");

    let mut legend = String::from(r#"<ul class="pie-legend">"#);
    for (label, band, count) in slices {
        let _ = write!(
            legend,
            r#"<li><i class="legend-dot {}"></i>{label}: {count}</li>"#,
            band.as_str()
        );
    }
    legend.push_str("</ul>");

    format!(r#"<h2>Lead Summary</h2><h3>Lead Score Distribution</h3>{svg}{legend}"#)
}

fn render_leads(leads: &LeadsResponse, engagements: &[EngagementResponse]) -> String {
    let mut html = String::new();

    if let Some(query) = &leads.query {
        html.push_str(&render_filters(query));
    }

    let (title, toggle) = match leads.mode {
        ViewModeName::Latest => (
            "Latest Leads".to_string(),
            format!("View All {} Leads", leads.total_leads),
        ),
        ViewModeName::All => (
            format!("All Leads ({})", leads.filtered_count),
            format!("Show Latest {LATEST_COUNT}"),
        ),
    };
    let _ = write!(
        html,
        r#"<div class="leads-header"><h2>{title}</h2>
        <form method="post" action="/view/toggle"><button class="btn-primary" type="submit">{toggle}</button></form></div>"#
    );

    if leads.leads.is_empty() {
        html.push_str(
            r#"<div class="empty-state"><h3>No leads yet</h3><p>Leads will appear here once added via API</p></div>"#,
        );
        return html;
    }

    html.push_str(r#"<div class="lead-grid">"#);
    for card in &leads.leads {
        let chart = engagements.iter().find(|chart| chart.key == card.key);
        html.push_str(&render_card(card, chart));
    }
    html.push_str("</div>");

    if leads.mode == ViewModeName::Latest && leads.leads.len() == LATEST_COUNT {
        let _ = write!(
            html,
            r#"<p class="more-leads-hint">Showing latest {LATEST_COUNT} leads</p>"#
        );
    }

    if let Some(pagination) = &leads.pagination {
        html.push_str(&render_pagination(pagination));
    }
    html
}

fn render_filters(query: &LeadQuery) -> String {
    let filters = &query.filters;
    let score = filters.score_range.map(ScoreBand::as_str).unwrap_or_default();
    let sentiment = filters.sentiment.as_deref().unwrap_or_default();
    let intent = match filters.intent {
        Some(crate::models::IntentFilter::Yes) => "yes",
        Some(crate::models::IntentFilter::No) => "no",
        None => "",
    };

    format!(
        r#"<form class="lead-filters" method="post" action="/view/filters">
        <input class="search-input" type="text" name="search" placeholder="Search leads by name, company, or message..." value="{search}" />
        <div class="filter-grid">
          <label>Score Range<select name="score_range">{score_options}</select></label>
          <label>Sentiment<select name="sentiment">{sentiment_options}</select></label>
          <label>Intent<select name="intent">{intent_options}</select></label>
          <label>Industry<input type="text" name="industry" placeholder="Filter by industry..." value="{industry}" /></label>
          <label>Location<input type="text" name="location" placeholder="Filter by location..." value="{location}" /></label>
        </div>
        <button class="btn-primary" type="submit">Apply</button>
      </form>
      <form method="post" action="/view/filters/reset"><button class="btn-secondary" type="submit">Reset Filters</button></form>"#,
        search = escape(&query.search),
        score_options = options(
            score,
            &[("", "All Scores"), ("hot", "Hot (70+)"), ("warm", "Warm (40-70)"), ("cold", "Cold (&lt;40)")]
        ),
        sentiment_options = options(
            sentiment,
            &[("", "All Sentiments"), ("POSITIVE", "Positive"), ("NEGATIVE", "Negative")]
        ),
        intent_options = options(
            intent,
            &[("", "All Leads"), ("yes", "Intent Detected"), ("no", "No Intent")]
        ),
        industry = escape(filters.industry.as_deref().unwrap_or_default()),
        location = escape(filters.location.as_deref().unwrap_or_default()),
    )
}

fn options(current: &str, choices: &[(&str, &str)]) -> String {
    choices
        .iter()
        .map(|(value, label)| {
            let selected = if *value == current { " selected" } else { "" };
            format!(r#"<option value="{value}"{selected}>{label}</option>"#)
        })
        .collect()
}

fn render_card(card: &LeadCard, chart: Option<&EngagementResponse>) -> String {
    let lead = &card.lead;
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<details class="lead-card"><summary class="lead-header"><h3>{name}</h3><span class="score-badge {band}">{label}</span></summary>
        <div class="lead-details"><div class="lead-info">
          <p><strong>Industry:</strong> {industry}</p>
          <p><strong>Location:</strong> {location}</p>
          <p><strong>Role:</strong> {role}</p>
          <p><strong>Company Size:</strong> {size}</p>
          <p><strong>Lead Source:</strong> {source}</p>
          <p><strong>Score:</strong> {score:.2}</p>
          <p><span class="sentiment-badge {sentiment_class}">{sentiment}</span> <span class="intent-badge">{intent}</span></p>
        </div>"#,
        name = escape(&lead.name),
        band = card.band.as_str(),
        label = escape(&lead.score_label),
        industry = escape(&lead.industry),
        location = escape(&lead.location),
        role = escape(&lead.job_role),
        size = escape(&lead.company_size),
        source = escape(&lead.lead_source),
        score = lead.score,
        sentiment_class = escape(&lead.sentiment_label.to_lowercase()),
        sentiment = escape(&lead.sentiment_label),
        intent = escape(&lead.intent_label),
    );
    if let Some(chart) = chart {
        html.push_str(&render_radar(chart));
    }
    let _ = write!(
        html,
        r#"<div class="message-preview"><strong>Message:</strong><p>{}</p></div>"#,
        escape(&lead.message)
    );
    if let Some(followup) = lead.followup.as_deref().filter(|text| !text.is_empty()) {
        let _ = write!(
            html,
            r#"<div class="followup-preview"><strong>AI Follow-up:</strong><p>{}</p></div>"#,
            escape(followup)
        );
    }
    html.push_str("</div></details>");
    html
}

fn render_radar(chart: &EngagementResponse) -> String {
    const CENTER: f64 = 110.0;
    const RADIUS: f64 = 70.0;
    let axes = chart.points.len().max(1) as f64;
    let angle = |index: usize| -PI / 2.0 + index as f64 * 2.0 * PI / axes;

    let mut svg = String::from(
        r#"<div class="lead-radar"><h4>Lead Engagement Metrics</h4><svg viewBox="0 0 220 220" role="img" aria-label="Lead engagement metrics">"#,
    );
    for ring in [20.0, 40.0, 60.0, 80.0, 100.0] {
        let points = polygon(
            (0..chart.points.len()).map(|i| polar(CENTER, CENTER, RADIUS * ring / 100.0, angle(i))),
        );
        let _ = write!(svg, r#"<polygon class="chart-grid" points="{points}" />"#);
    }
    for (index, point) in chart.points.iter().enumerate() {
        let (x, y) = polar(CENTER, CENTER, RADIUS, angle(index));
        let (lx, ly) = polar(CENTER, CENTER, RADIUS + 18.0, angle(index));
        let _ = write!(
            svg,
            r#"<line class="chart-axis" x1="{CENTER}" y1="{CENTER}" x2="{x:.2}" y2="{y:.2}" /><text class="chart-label" x="{lx:.2}" y="{ly:.2}" text-anchor="middle"><title>{}</title>{}</text>"#,
            escape(&point.detail),
            point.label
        );
    }
    let shape = polygon(
        chart
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| polar(CENTER, CENTER, RADIUS * point.value / 100.0, angle(i))),
    );
    let _ = write!(svg, r#"<polygon class="radar-shape" points="{shape}" /></svg></div>"#);
    svg
}

fn render_pagination(pagination: &Pagination) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="lead-pagination"><div class="pagination-info"><span>Showing {}-{} of {} leads</span>
        <form method="post" action="/view/page-size"><select name="page_size" onchange="this.form.submit()">"#,
        pagination.start_item, pagination.end_item, pagination.total_items
    );
    for size in PAGE_SIZES {
        let selected = if size == pagination.page_size { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{size}"{selected}>{size} per page</option>"#);
    }
    html.push_str(r#"</select></form></div><form class="pagination-controls" method="post" action="/view/page">"#);

    let _ = write!(
        html,
        r#"<button class="btn-secondary" name="page" value="{}" type="submit"{}>Previous</button>"#,
        pagination.page.saturating_sub(1),
        disabled(!pagination.has_previous)
    );
    for item in &pagination.items {
        match item {
            PageItem::Ellipsis => html.push_str(r#"<span class="ellipsis">...</span>"#),
            PageItem::Page(page) => {
                let active = if *page == pagination.page { " active" } else { "" };
                let _ = write!(
                    html,
                    r#"<button class="page-btn{active}" name="page" value="{page}" type="submit">{page}</button>"#
                );
            }
        }
    }
    let _ = write!(
        html,
        r#"<button class="btn-secondary" name="page" value="{}" type="submit"{}>Next</button></form></div>"#,
        pagination.page + 1,
        disabled(!pagination.has_next)
    );
    html
}

fn disabled(flag: bool) -> &'static str {
    if flag { " disabled" } else { "" }
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

fn polygon(points: impl Iterator<Item = (f64, f64)>) -> String {
    points
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Lead Management Dashboard</title>
  <style>
    :root {
      --bg: #f4f6fb;
      --ink: #2b2a28;
      --card: #ffffff;
      --accent: #667eea;
      --hot: #e74c3c;
      --warm: #f39c12;
      --cold: #3498db;
      --shadow: 0 12px 32px rgba(47, 72, 88, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
    }

    .app-header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      padding: 24px 32px;
      background: linear-gradient(135deg, #667eea, #764ba2);
      color: white;
    }

    .app-header h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .header-actions, .auto-refresh, .leads-header, .pagination-controls, .pagination-info {
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .leads-header, .pagination-info {
      justify-content: space-between;
    }

    main {
      padding: 24px 32px 48px;
      display: grid;
      gap: 24px;
    }

    .dashboard-top {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(340px, 1fr));
      gap: 24px;
    }

    .panel {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .subtitle {
      margin: 0 0 12px;
      color: #6b645d;
    }

    .calendar-grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 4px;
    }

    .weekday {
      font-size: 0.75rem;
      text-align: center;
      color: #8b857d;
    }

    .tile {
      position: relative;
      display: block;
      padding: 10px 0;
      border-radius: 8px;
      text-align: center;
      color: inherit;
      text-decoration: none;
      background: #f6f7fb;
    }

    .tile.blank {
      background: transparent;
    }

    .tile.future {
      opacity: 0.35;
    }

    .tile.selected {
      outline: 2px solid var(--accent);
    }

    .lead-count {
      position: absolute;
      top: 2px;
      right: 4px;
      font-size: 0.65rem;
      font-weight: 700;
    }

    .low-activity { background: #d4f1dc; }
    .medium-activity { background: #ffe3a3; }
    .high-activity { background: #f9b8b0; }

    .calendar-legend, .pie-legend {
      display: flex;
      gap: 16px;
      padding: 0;
      margin: 12px 0;
      list-style: none;
      font-size: 0.85rem;
    }

    .legend-dot {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    .legend-dot.hot, .slice.hot { background: var(--hot); fill: var(--hot); }
    .legend-dot.warm, .slice.warm { background: var(--warm); fill: var(--warm); }
    .legend-dot.cold, .slice.cold { background: var(--cold); fill: var(--cold); }

    .pie {
      width: 220px;
      height: 220px;
    }

    .lead-grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(320px, 1fr));
      gap: 16px;
    }

    .lead-card {
      background: var(--card);
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 16px;
    }

    .lead-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      cursor: pointer;
    }

    .lead-header h3 {
      margin: 0;
    }

    .score-badge, .score-indicator {
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 0.8rem;
      color: white;
    }

    .hot { background: var(--hot); }
    .warm { background: var(--warm); }
    .cold { background: var(--cold); }

    .chart-grid {
      fill: none;
      stroke: rgba(47, 72, 88, 0.15);
    }

    .chart-axis {
      stroke: rgba(47, 72, 88, 0.25);
    }

    .chart-label {
      fill: #495057;
      font-size: 8px;
    }

    .radar-shape {
      fill: rgba(102, 126, 234, 0.2);
      stroke: rgba(102, 126, 234, 1);
      stroke-width: 2;
    }

    .lead-filters {
      display: grid;
      gap: 12px;
    }

    .filter-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
    }

    .filter-grid label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
    }

    .search-input {
      width: 100%;
      padding: 10px 14px;
      border-radius: 999px;
      border: 1px solid #d0d4e0;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font-weight: 600;
      cursor: pointer;
    }

    button:disabled {
      opacity: 0.4;
      cursor: default;
    }

    .btn-primary { background: var(--accent); color: white; }
    .btn-secondary { background: #e9ecf5; color: var(--ink); }
    .page-btn { background: transparent; }
    .page-btn.active { background: var(--accent); color: white; }

    .empty-state, .more-leads-hint {
      text-align: center;
      color: #6b645d;
    }
  </style>
</head>
<body>
  <header class="app-header">
    <h1>Lead Management Dashboard</h1>
    <div class="header-actions">
      {{HEADER}}
    </div>
  </header>

  <main>
    <div class="dashboard-top">
      <section class="panel lead-calendar">
        {{CALENDAR}}
      </section>
      <section class="panel summary-charts">
        {{SUMMARY}}
      </section>
    </div>

    <section class="panel leads-section">
      {{LEADS}}
    </section>
  </main>

  <script>
    {{RELOAD}}
  </script>
</body>
</html>
"#;
