use crate::calendar::backfill_created_at;
use crate::fetch::LeadsClient;
use crate::models::Lead;
use crate::view::ViewState;
use chrono::{DateTime, Local};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinHandle};

#[derive(Debug, Default)]
pub struct Snapshot {
    pub leads: Vec<Lead>,
    pub last_refresh: Option<DateTime<Local>>,
}

#[derive(Debug, Default)]
pub struct Session {
    pub snapshot: Snapshot,
    pub view: ViewState,
}

impl Session {
    pub fn replace_leads(&mut self, leads: Vec<Lead>, now: DateTime<Local>) {
        self.snapshot = Snapshot {
            leads: backfill_created_at(leads, now),
            last_refresh: Some(now),
        };
    }
}

#[derive(Clone)]
pub struct AppState {
    pub client: LeadsClient,
    pub refresh_interval: Duration,
    pub session: Arc<Mutex<Session>>,
    pub auto_refresh: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppState {
    pub fn new(client: LeadsClient, refresh_interval: Duration) -> Self {
        Self {
            client,
            refresh_interval,
            session: Arc::new(Mutex::new(Session::default())),
            auto_refresh: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}
