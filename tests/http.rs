use chrono::{Duration as Days, Local};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCORES: [f64; 12] = [
    90.0, 85.0, 80.0, 75.0, 70.0, 65.0, 50.0, 45.0, 40.0, 30.0, 20.0, 10.0,
];

#[derive(Debug, Deserialize)]
struct LeadsResponse {
    mode: String,
    query: Option<serde_json::Value>,
    page_size: usize,
    total_leads: usize,
    filtered_count: usize,
    leads: Vec<LeadCard>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct LeadCard {
    key: String,
    name: String,
    band: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    page: usize,
    total_pages: usize,
    start_item: usize,
    end_item: usize,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    today: String,
    selected_date: String,
    days: Vec<CalendarDay>,
    selected_leads: Vec<DayLead>,
}

#[derive(Debug, Deserialize)]
struct CalendarDay {
    date: String,
    count: usize,
    activity: String,
}

#[derive(Debug, Deserialize)]
struct DayLead {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ScoreDistribution {
    hot: usize,
    warm: usize,
    cold: usize,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    lead_count: usize,
    last_refresh: Option<String>,
    auto_refresh: bool,
}

#[derive(Debug, Deserialize)]
struct EngagementResponse {
    name: String,
    points: Vec<serde_json::Value>,
}

struct TestServer {
    base_url: String,
    child: Child,
    _upstream: MockServer,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

/// Twelve leads; positions 1 and 2 carry real timestamps, the rest none.
fn fixture_leads() -> serde_json::Value {
    let leads: Vec<serde_json::Value> = SCORES
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let created_at = match i {
                1 => json!("2025-06-01T10:00:00"),
                2 => json!("2025-06-01T15:30:00.250000"),
                _ => serde_json::Value::Null,
            };
            let even = i % 2 == 0;
            let industry = if even { "Fintech" } else { "Healthcare" };
            let location = if i % 3 == 0 { "Lisbon" } else { "Berlin" };
            let score_label = if *score > 70.0 {
                "Hot"
            } else if *score >= 40.0 {
                "Warm"
            } else {
                "Cold"
            };
            let sentiment = if even { "POSITIVE" } else { "NEGATIVE" };
            let intent_label = if even { "Yes" } else { "No" };
            json!({
                "id": i + 1,
                "name": format!("Lead {}", i + 1),
                "industry": industry,
                "location": location,
                "job_role": "CTO",
                "company_size": "51-200",
                "lead_source": "Website",
                "message": format!("Message number {}", i + 1),
                "score": score,
                "score_label": score_label,
                "sentiment_label": sentiment,
                "intent_detected": even,
                "intent_label": intent_label,
                "website_visits": 10,
                "click_through_rate": 0.5,
                "created_at": created_at,
            })
        })
        .collect();
    serde_json::Value::Array(leads)
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/status")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(upstream: MockServer) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_lead_dashboard"))
        .env("PORT", port.to_string())
        .env("LEADS_API_BASE", upstream.uri())
        .env("AUTO_REFRESH", "false")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        child,
        _upstream: upstream,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_leads()))
        .mount(&upstream)
        .await;
    let server = Arc::new(spawn_server(upstream).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_leads(client: &Client, base_url: &str) -> LeadsResponse {
    client
        .get(format!("{base_url}/api/leads"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn send_view(client: &Client, base_url: &str, command: serde_json::Value) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/view"))
        .json(&command)
        .send()
        .await
        .unwrap()
}

async fn view(client: &Client, base_url: &str, command: serde_json::Value) -> LeadsResponse {
    let response = send_view(client, base_url, command).await;
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

/// Puts the shared server back into the latest view with the default page size.
async fn reset_view(client: &Client, base_url: &str) {
    if get_leads(client, base_url).await.mode == "all" {
        view(client, base_url, json!({ "action": "toggle" })).await;
    }
    view(client, base_url, json!({ "action": "page_size", "page_size": 10 })).await;
}

fn names(response: &LeadsResponse) -> Vec<&str> {
    response.leads.iter().map(|lead| lead.name.as_str()).collect()
}

#[tokio::test]
async fn http_latest_view_shows_first_four() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_view(&client, &server.base_url).await;

    let leads = get_leads(&client, &server.base_url).await;
    assert_eq!(leads.mode, "latest");
    assert_eq!(leads.total_leads, 12);
    assert_eq!(names(&leads), ["Lead 1", "Lead 2", "Lead 3", "Lead 4"]);
    assert_eq!(leads.leads[0].key, "id-1");
    assert!(leads.pagination.is_none());
    assert!(leads.query.is_none());
}

#[tokio::test]
async fn http_filters_are_rejected_in_latest_view() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_view(&client, &server.base_url).await;

    let response = send_view(
        &client,
        &server.base_url,
        json!({ "action": "query", "score_range": "hot" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send_view(&client, &server.base_url, json!({ "action": "page", "page": 1 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_hot_filter_then_back_to_latest() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_view(&client, &server.base_url).await;

    let all = view(&client, &server.base_url, json!({ "action": "toggle" })).await;
    assert_eq!(all.mode, "all");
    assert_eq!(all.filtered_count, 12);
    let pagination = all.pagination.expect("12 leads need two pages");
    assert_eq!(pagination.total_pages, 2);

    let hot = view(
        &client,
        &server.base_url,
        json!({ "action": "query", "search": "", "score_range": "hot" }),
    )
    .await;
    let expected = SCORES.iter().filter(|score| **score > 70.0).count();
    assert_eq!(hot.filtered_count, expected);
    assert_eq!(hot.leads.len(), expected);
    assert!(hot.leads.iter().all(|lead| lead.band == "hot"));
    assert!(hot.pagination.is_none());

    let latest = view(&client, &server.base_url, json!({ "action": "toggle" })).await;
    assert_eq!(latest.mode, "latest");
    assert!(latest.query.is_none());
    assert_eq!(names(&latest), ["Lead 1", "Lead 2", "Lead 3", "Lead 4"]);

    let again = view(&client, &server.base_url, json!({ "action": "toggle" })).await;
    assert_eq!(again.filtered_count, 12);
    view(&client, &server.base_url, json!({ "action": "toggle" })).await;
}

#[tokio::test]
async fn http_pagination_bounds_and_page_size() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_view(&client, &server.base_url).await;

    view(&client, &server.base_url, json!({ "action": "toggle" })).await;
    let second = view(&client, &server.base_url, json!({ "action": "page", "page": 2 })).await;
    assert_eq!(names(&second), ["Lead 11", "Lead 12"]);
    let pagination = second.pagination.unwrap();
    assert_eq!(pagination.page, 2);
    assert_eq!((pagination.start_item, pagination.end_item), (11, 12));

    for page in [0, 3] {
        let response =
            send_view(&client, &server.base_url, json!({ "action": "page", "page": page })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let bigger = view(
        &client,
        &server.base_url,
        json!({ "action": "page_size", "page_size": 25 }),
    )
    .await;
    assert_eq!(bigger.page_size, 25);
    assert_eq!(bigger.leads.len(), 12);
    assert!(bigger.pagination.is_none());

    let response = send_view(
        &client,
        &server.base_url,
        json!({ "action": "page_size", "page_size": 7 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    reset_view(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_form_filters_drive_the_view() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_view(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/view/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let page = response.text().await.unwrap();
    assert!(page.contains("All Leads (12)"));

    let response = client
        .post(format!("{}/view/filters", server.base_url))
        .form(&[
            ("search", ""),
            ("score_range", "cold"),
            ("sentiment", ""),
            ("intent", ""),
            ("industry", "fin"),
            ("location", ""),
        ])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let leads = get_leads(&client, &server.base_url).await;
    assert_eq!(names(&leads), ["Lead 11"]);

    let response = client
        .post(format!("{}/view/filters/reset", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(get_leads(&client, &server.base_url).await.filtered_count, 12);

    reset_view(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_calendar_backfills_missing_dates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today = Local::now().date_naive();
    let calendar: CalendarResponse = client
        .get(format!("{}/api/calendar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(calendar.today, today.to_string());
    assert_eq!(calendar.selected_date, today.to_string());
    let selected: Vec<&str> = calendar.selected_leads.iter().map(|lead| lead.name.as_str()).collect();
    // positions 0 and 7 land on today
    assert_eq!(selected, ["Lead 1", "Lead 8"]);
    let tile = calendar
        .days
        .iter()
        .find(|day| day.date == today.to_string())
        .expect("today tile");
    assert_eq!(tile.count, 2);
    assert_eq!(tile.activity, "low");

    let two_back = today - Days::days(2);
    let calendar: CalendarResponse = client
        .get(format!("{}/api/calendar?date={two_back}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let selected: Vec<&str> = calendar.selected_leads.iter().map(|lead| lead.name.as_str()).collect();
    assert_eq!(selected, ["Lead 10"]);

    let june: CalendarResponse = client
        .get(format!("{}/api/calendar?date=2025-06-01", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(june.selected_leads.len(), 2);

    let future = today + Days::days(30);
    let clamped: CalendarResponse = client
        .get(format!("{}/api/calendar?date={future}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(clamped.selected_date, today.to_string());

    let response = client
        .get(format!("{}/api/calendar?date=yesterday", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_summary_and_engagement() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let summary: ScoreDistribution = client
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!((summary.hot, summary.warm, summary.cold), (4, 5, 3));

    let chart: EngagementResponse = client
        .get(format!("{}/api/leads/id-1/engagement", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chart.name, "Lead 1");
    assert_eq!(chart.points.len(), 6);
    assert_eq!(chart.points[0]["value"], json!(50.0));

    let response = client
        .get(format!("{}/api/leads/nope/engagement", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_dashboard_page_renders() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    reset_view(&client, &server.base_url).await;

    let page = client
        .get(&server.base_url)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Lead Management Dashboard"));
    assert!(page.contains("Latest Leads"));
    assert!(page.contains("View All 12 Leads"));
    assert!(page.contains("Showing latest 4 leads"));
    assert!(page.contains("Lead Score Distribution"));
}

#[tokio::test]
async fn http_auto_refresh_toggles() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for enabled in [true, true, false, false] {
        let status: StatusResponse = client
            .post(format!("{}/api/auto-refresh", server.base_url))
            .json(&json!({ "enabled": enabled }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status.auto_refresh, enabled);
        assert_eq!(status.lead_count, 12);
    }
}

#[tokio::test]
async fn http_failed_refresh_keeps_previous_snapshot() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture_leads()))
        .up_to_n_times(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/leads"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;

    let server = spawn_server(upstream).await;
    let client = Client::new();

    let before: StatusResponse = client
        .get(format!("{}/api/status", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before.lead_count, 12);
    assert!(before.last_refresh.is_some());
    assert!(!before.auto_refresh);

    let after: StatusResponse = client
        .post(format!("{}/api/refresh", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after.lead_count, 12);
    assert_eq!(after.last_refresh, before.last_refresh);
}
