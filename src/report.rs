//! Run report: a JSON record of one provisioning run under `.looker-provision/runs/`.
//!
//! The pipeline has no resume; the report exists so an operator can see which
//! resources a failed run already created before cleaning up by hand.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seed::SeedSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub host_url: String,
    pub project_name: String,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedSummary>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl RunReport {
    pub fn new(host_url: &str, project_name: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            host_url: host_url.to_string(),
            project_name: project_name.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
            client_id: None,
            connection: None,
            project_id: None,
            seed: None,
            models: Vec::new(),
        }
    }

    pub fn record(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn succeeded(&self) -> bool {
        self.finished_at.is_some() && self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Write the report as `<runs_dir>/<run_id>.json`.
    pub fn save(&self, runs_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(runs_dir)
            .with_context(|| format!("Failed to create {}", runs_dir.display()))?;
        let path = runs_dir.join(format!("{}.json", self.run_id));
        let content = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write run report: {}", path.display()))?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run report: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse run report: {}", path.display()))
    }
}
