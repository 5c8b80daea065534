use crate::calendar::build_calendar;
use crate::errors::AppError;
use crate::fetch::{refresh, set_auto_refresh};
use crate::models::{
    AutoRefreshForm, AutoRefreshRequest, CalendarResponse, DateQuery, EngagementResponse,
    LeadCard, LeadQuery, LeadsResponse, PageForm, PageSizeForm, ScoreDistribution,
    StatusResponse, ViewCommand,
};
use crate::state::{AppState, Session};
use crate::summary::{engagement, score_distribution};
use crate::ui::{render_dashboard, Dashboard};
use crate::view::ViewState;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::NaiveDate;
use tracing::info;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Html<String>, AppError> {
    let requested = parse_date(query.date.as_deref())?;
    let auto_refresh = state.auto_refresh_enabled().await;
    let session = state.session.lock().await;

    let leads = leads_response(&session);
    let engagements = leads
        .leads
        .iter()
        .filter_map(|card| engagement_for(&session, &card.key))
        .collect();
    let dashboard = Dashboard {
        status: status_response(&session, auto_refresh),
        calendar: build_calendar(&session.snapshot.leads, requested),
        distribution: score_distribution(&session.snapshot.leads),
        leads,
        engagements,
    };
    Ok(Html(render_dashboard(&dashboard)))
}

pub async fn get_leads(State(state): State<AppState>) -> Json<LeadsResponse> {
    let session = state.session.lock().await;
    Json(leads_response(&session))
}

pub async fn view_command(
    State(state): State<AppState>,
    Json(command): Json<ViewCommand>,
) -> Result<Json<LeadsResponse>, AppError> {
    let mut session = state.session.lock().await;
    apply_command(&mut session, command)?;
    Ok(Json(leads_response(&session)))
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let requested = parse_date(query.date.as_deref())?;
    let session = state.session.lock().await;
    Ok(Json(build_calendar(&session.snapshot.leads, requested)))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<ScoreDistribution> {
    let session = state.session.lock().await;
    Json(score_distribution(&session.snapshot.leads))
}

pub async fn get_engagement(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<EngagementResponse>, AppError> {
    let session = state.session.lock().await;
    engagement_for(&session, &key)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no lead with key '{key}'")))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(current_status(&state).await)
}

pub async fn api_refresh(State(state): State<AppState>) -> Json<StatusResponse> {
    refresh(&state).await;
    Json(current_status(&state).await)
}

pub async fn api_auto_refresh(
    State(state): State<AppState>,
    Json(payload): Json<AutoRefreshRequest>,
) -> Json<StatusResponse> {
    set_auto_refresh(&state, payload.enabled).await;
    Json(current_status(&state).await)
}

pub async fn toggle_view(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    apply_command(&mut session, ViewCommand::Toggle)?;
    Ok(Redirect::to("/"))
}

pub async fn set_filters(
    State(state): State<AppState>,
    Form(query): Form<LeadQuery>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    apply_command(&mut session, ViewCommand::Query(query))?;
    Ok(Redirect::to("/"))
}

pub async fn reset_filters(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    apply_command(&mut session, ViewCommand::ResetFilters)?;
    Ok(Redirect::to("/"))
}

pub async fn set_page(
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    apply_command(&mut session, ViewCommand::Page { page: form.page })?;
    Ok(Redirect::to("/"))
}

pub async fn set_page_size(
    State(state): State<AppState>,
    Form(form): Form<PageSizeForm>,
) -> Result<Redirect, AppError> {
    let mut session = state.session.lock().await;
    apply_command(
        &mut session,
        ViewCommand::PageSize {
            page_size: form.page_size,
        },
    )?;
    Ok(Redirect::to("/"))
}

pub async fn manual_refresh(State(state): State<AppState>) -> Redirect {
    refresh(&state).await;
    Redirect::to("/")
}

pub async fn toggle_auto_refresh(
    State(state): State<AppState>,
    Form(form): Form<AutoRefreshForm>,
) -> Redirect {
    set_auto_refresh(&state, form.enabled.is_some()).await;
    Redirect::to("/")
}

fn apply_command(session: &mut Session, command: ViewCommand) -> Result<(), AppError> {
    let view: &mut ViewState = &mut session.view;
    match command {
        ViewCommand::Toggle => {
            view.toggle();
            info!(mode = ?view.mode_name(), "view toggled");
        }
        ViewCommand::Query(query) => view.set_query(query)?,
        ViewCommand::ResetFilters => view.reset_filters()?,
        ViewCommand::Page { page } => view.go_to_page(page, &session.snapshot.leads)?,
        ViewCommand::PageSize { page_size } => view.set_page_size(page_size)?,
    }
    Ok(())
}

fn leads_response(session: &Session) -> LeadsResponse {
    let view = &session.view;
    let visible = view.project(&session.snapshot.leads);
    LeadsResponse {
        mode: visible.mode,
        query: view.query().cloned(),
        page_size: view.page_size(),
        total_leads: session.snapshot.leads.len(),
        filtered_count: visible.filtered_count,
        leads: visible
            .leads
            .into_iter()
            .map(|(position, lead)| LeadCard {
                key: lead.key(position),
                band: lead.band(),
                lead: lead.clone(),
            })
            .collect(),
        pagination: visible.pagination,
    }
}

fn engagement_for(session: &Session, key: &str) -> Option<EngagementResponse> {
    session
        .snapshot
        .leads
        .iter()
        .enumerate()
        .find(|(position, lead)| lead.key(*position) == key)
        .map(|(position, lead)| engagement(lead, lead.key(position)))
}

async fn current_status(state: &AppState) -> StatusResponse {
    let auto_refresh = state.auto_refresh_enabled().await;
    let session = state.session.lock().await;
    status_response(&session, auto_refresh)
}

fn status_response(session: &Session, auto_refresh: bool) -> StatusResponse {
    StatusResponse {
        lead_count: session.snapshot.leads.len(),
        last_refresh: session
            .snapshot
            .last_refresh
            .map(|stamp| stamp.format("%H:%M:%S").to_string()),
        auto_refresh,
    }
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| AppError::bad_request("date must be formatted as YYYY-MM-DD"))
    })
    .transpose()
}
