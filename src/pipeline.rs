//! The provisioning pipeline: seven steps, strictly in order.
//!
//! ```text
//! probe → mint → register-connection → create-project → seed → register-models → import-dashboard
//! ```
//!
//! Each step either returns its output to the next or ends the run. There is no
//! resume and no rollback; the run report records how far a run got.

use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::api::LookerClient;
use crate::config::ProvisionConfig;
use crate::credentials::{self, ApiCredentials};
use crate::errors::PipelineError;
use crate::instance::InstanceDescriptor;
use crate::probe::LivenessProber;
use crate::project::{self, ProjectId};
use crate::report::{RunReport, StepRecord, StepStatus};
use crate::seed::{self, RemoteShell};
use crate::ui::PipelineUI;
use crate::{connection, models};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Probe,
    Mint,
    RegisterConnection,
    CreateProject,
    Seed,
    RegisterModels,
    ImportDashboard,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Probe,
        Step::Mint,
        Step::RegisterConnection,
        Step::CreateProject,
        Step::Seed,
        Step::RegisterModels,
        Step::ImportDashboard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Probe => "probe",
            Step::Mint => "mint",
            Step::RegisterConnection => "register-connection",
            Step::CreateProject => "create-project",
            Step::Seed => "seed",
            Step::RegisterModels => "register-models",
            Step::ImportDashboard => "import-dashboard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::Probe => "Waiting for the instance to come alive",
            Step::Mint => "Minting API credentials",
            Step::RegisterConnection => "Registering database connection",
            Step::CreateProject => "Creating project",
            Step::Seed => "Seeding project source",
            Step::RegisterModels => "Registering models",
            Step::ImportDashboard => "Importing dashboard",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One bring-up run against one instance.
pub struct Pipeline {
    config: ProvisionConfig,
    descriptor: InstanceDescriptor,
    shell: Option<Box<dyn RemoteShell>>,
    ui: PipelineUI,
}

impl Pipeline {
    pub fn new(config: ProvisionConfig, descriptor: InstanceDescriptor) -> Self {
        let ui = PipelineUI::new(Step::ALL.len() as u64, config.verbose);
        Self {
            config,
            descriptor,
            shell: None,
            ui,
        }
    }

    /// Use `shell` for seeding instead of opening an SSH session.
    pub fn with_shell(mut self, shell: Box<dyn RemoteShell>) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn with_ui(mut self, ui: PipelineUI) -> Self {
        self.ui = ui;
        self
    }

    /// Run every step and persist the run report, whatever the outcome.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::new(&self.descriptor.host_url, &self.config.toml.project.name);
        info!(run_id = %report.run_id, host = %self.descriptor.host_url, "Starting provisioning run");

        let result = self.run_steps(&mut report).await;
        report.finish();
        self.ui.finish(result.is_ok());

        match report.save(&self.config.runs_dir()) {
            Ok(path) => info!(path = %path.display(), "Saved run report"),
            Err(e) => warn!(error = %e, "Failed to save run report"),
        }

        match result {
            Ok(()) => {
                info!(run_id = %report.run_id, "Provisioning complete");
                Ok(report)
            }
            Err(e) => {
                error!(step = e.step, error = %format!("{:#}", e.source), "Provisioning failed");
                Err(e)
            }
        }
    }

    async fn run_steps(&self, report: &mut RunReport) -> Result<(), PipelineError> {
        self.step(report, Step::Probe, self.probe()).await?;

        let credentials = self
            .step(
                report,
                Step::Mint,
                credentials::mint(&self.descriptor, &self.config.mint_options()),
            )
            .await?;
        report.client_id = Some(credentials.client_id.clone());

        let (client, connection) = self
            .step(report, Step::RegisterConnection, self.register_connection(&credentials))
            .await?;
        report.connection = Some(connection);

        let project_id = self
            .step(
                report,
                Step::CreateProject,
                project::provision(&client, &self.config.toml.project.name),
            )
            .await?;
        report.project_id = Some(project_id.to_string());

        let summary = self
            .step(report, Step::Seed, self.seed(&project_id))
            .await?;
        report.seed = Some(summary);

        let registered = self
            .step(
                report,
                Step::RegisterModels,
                models::register_models(&client, &project_id),
            )
            .await?;
        report.models = registered;

        let import = self.config.dashboard_import();
        self.step(
            report,
            Step::ImportDashboard,
            import.run(&self.descriptor, &credentials),
        )
        .await?;

        Ok(())
    }

    /// Run one step: drive the UI, time it, and record it in the report.
    async fn step<T, F>(&self, report: &mut RunReport, step: Step, fut: F) -> Result<T, PipelineError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        self.ui.start_step(step.name(), step.description());
        let started_at = Utc::now();
        let start = Instant::now();

        let result = fut.await;
        let elapsed = start.elapsed();
        let mut record = StepRecord {
            name: step.name().to_string(),
            status: StepStatus::Completed,
            started_at,
            elapsed_ms: elapsed.as_millis() as u64,
            error: None,
        };

        match result {
            Ok(value) => {
                self.ui.step_complete(step.name(), elapsed);
                report.record(record);
                Ok(value)
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                self.ui.step_failed(step.name(), &reason);
                record.status = StepStatus::Failed;
                record.error = Some(reason);
                report.record(record);
                Err(PipelineError::new(step.name(), e))
            }
        }
    }

    async fn probe(&self) -> anyhow::Result<()> {
        let delay = self.config.initial_delay();
        if !delay.is_zero() {
            self.ui.waiting("Initial delay before probing", delay);
            tokio::time::sleep(delay).await;
        }
        let prober = LivenessProber::new(
            &self.descriptor.host_url,
            self.config.backoff_schedule(),
            self.config.api_timeout(),
        );
        self.ui.log_activity(&format!("GET {}", prober.url()));
        prober.probe().await?;
        Ok(())
    }

    async fn register_connection(
        &self,
        credentials: &ApiCredentials,
    ) -> anyhow::Result<(LookerClient, String)> {
        let client = LookerClient::login(
            self.config.toml.api.base_url(&self.descriptor.host_url),
            credentials,
            self.config.api_timeout(),
        )
        .await?;
        let created = connection::register(&client, &self.config.connection_file()).await?;
        Ok((client, created.name))
    }

    async fn seed(&self, project_id: &ProjectId) -> anyhow::Result<seed::SeedSummary> {
        let options = self.config.seed_options();
        self.ui.log_activity(&format!("Cloning {}", options.repo_url));
        let summary = match &self.shell {
            Some(shell) => seed::seed(shell.as_ref(), &self.descriptor, project_id, &options).await?,
            None => {
                let shell = self.config.remote_shell(&self.descriptor)?;
                seed::seed(&shell, &self.descriptor, project_id, &options).await?
            }
        };
        Ok(summary)
    }
}
