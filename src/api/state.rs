// src/api/state.rs
use crate::config::AppConfig;
use crate::harness::TestHarness;
use crate::judge::{self, CodeJudge};
use crate::progress::ProgressForwarder;
use crate::session::SessionRegistry;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: Client,
    pub judge: Arc<dyn CodeJudge>,
    pub sessions: Arc<SessionRegistry>,
    pub progress: Option<ProgressForwarder>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = Client::new();
        let judge = judge::from_config(&config.judge, client.clone());
        Self::with_judge(config, client, judge)
    }

    /// Builds the state around an already constructed judge.
    pub fn with_judge(config: AppConfig, client: Client, judge: Arc<dyn CodeJudge>) -> Self {
        let harness = TestHarness::new(judge.clone(), &config.harness);
        let progress = config
            .progress
            .api_url
            .as_ref()
            .map(|url| ProgressForwarder::new(client.clone(), url.clone()));

        Self {
            config: Arc::new(config),
            client,
            judge,
            sessions: Arc::new(SessionRegistry::new(Arc::new(harness))),
            progress,
        }
    }
}
