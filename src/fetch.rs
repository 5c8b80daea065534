use crate::errors::FetchError;
use crate::models::Lead;
use crate::state::AppState;
use chrono::Local;
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct LeadsClient {
    client: reqwest::Client,
    leads_url: String,
}

impl LeadsClient {
    pub fn new(leads_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            leads_url: leads_url.into(),
        })
    }

    pub fn leads_url(&self) -> &str {
        &self.leads_url
    }

    pub async fn fetch_leads(&self) -> Result<Vec<Lead>, FetchError> {
        let response = self
            .client
            .get(&self.leads_url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        response.json().await.map_err(FetchError::Decode)
    }
}

pub async fn refresh(state: &AppState) -> bool {
    match state.client.fetch_leads().await {
        Ok(leads) => {
            let count = leads.len();
            state.session.lock().await.replace_leads(leads, Local::now());
            debug!(count, "lead snapshot replaced");
            true
        }
        Err(err) => {
            warn!(url = state.client.leads_url(), "keeping previous leads: {err}");
            false
        }
    }
}

// At most one poller exists; starting it fetches immediately.
pub async fn set_auto_refresh(state: &AppState, enabled: bool) {
    let mut task = state.auto_refresh.lock().await;
    let running = task.as_ref().is_some_and(|handle| !handle.is_finished());

    match (enabled, running) {
        (true, false) => {
            *task = Some(spawn_poller(state.clone()));
            info!(period = ?state.refresh_interval, "auto-refresh enabled");
        }
        (false, true) => {
            if let Some(handle) = task.take() {
                handle.abort();
            }
            info!("auto-refresh disabled");
        }
        (false, false) => {
            task.take();
        }
        (true, true) => {}
    }
}

fn spawn_poller(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(state.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            refresh(&state).await;
        }
    })
}
