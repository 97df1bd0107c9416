//! Command-line front end for review lifecycle governance.
//!
//! Usage:
//!
//! ```text
//! devflow [--project-root <dir>] [--activity-limit <n>] transition <task-key> --to APPROVED --by alice [--notes <text>]
//! devflow status <task-key> [--no-history] [--no-stats]
//! devflow gate <task-key> (--action ticket_publication | --min-status APPROVED)
//! devflow batch <operations.json> [--continue-on-error]
//! devflow report [--status CHANGES_REQUESTED]... [--user bob]
//! devflow check <task-key> <check>...
//! ```
//!
//! Results are printed to stdout as JSON. Task records are read from and
//! written to `<project-root>/Docs/.tasks`. The batch file holds a JSON array
//! of `{"taskKey", "newStatus", "by", "notes"}` objects.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use clap::{Parser, Subcommand};
use devflow::config::{ConfigError, DevflowConfig};
use devflow::task::{
    adapters::file::FileTaskStore,
    domain::{ParseTaskStatusError, TaskStatus},
    ports::TaskStoreError,
    services::{
        BatchCoordinator, ChecklistService, DownstreamAction, QueryOptions, ReportAggregator,
        ReportFilter, TaskGate, TaskGateError, TaskLifecycleError, TaskLifecycleService,
        TransitionTaskRequest,
    },
};
use devflow::telemetry;
use mockable::DefaultClock;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "devflow", version, about = "Review lifecycle governance for engineering tasks")]
struct Cli {
    /// Project root; defaults to $DOCS_PROJECT_ROOT, then the working directory.
    #[arg(long, global = true)]
    project_root: Option<Utf8PathBuf>,

    /// Number of recent activity entries a report lists.
    #[arg(long, global = true)]
    activity_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Move a task to a new status.
    Transition {
        /// Task key.
        task_key: String,
        /// Target status.
        #[arg(long)]
        to: String,
        /// Actor requesting the change.
        #[arg(long)]
        by: String,
        /// Justification; required for rejections and publication.
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Show a task's status, allowed transitions, and history.
    Status {
        /// Task key.
        task_key: String,
        /// Omit the transition history.
        #[arg(long)]
        no_history: bool,
        /// Omit the status statistics.
        #[arg(long)]
        no_stats: bool,
    },
    /// Check whether a downstream action may run.
    Gate {
        /// Task key.
        task_key: String,
        /// Downstream action to authorize.
        #[arg(long, conflicts_with = "min_status")]
        action: Option<String>,
        /// Minimum status to require.
        #[arg(long)]
        min_status: Option<String>,
    },
    /// Apply a JSON array of transitions in order.
    Batch {
        /// Path to the operations file.
        file: Utf8PathBuf,
        /// Keep going after a failed item.
        #[arg(long)]
        continue_on_error: bool,
    },
    /// Summarise every task's status.
    Report {
        /// Only include tasks in these statuses.
        #[arg(long = "status")]
        statuses: Vec<String>,
        /// Only include tasks owned or reviewed by this user.
        #[arg(long)]
        user: Option<String>,
    },
    /// Run consistency checks against a task record.
    Check {
        /// Task key.
        task_key: String,
        /// Check names, e.g. `status_valid stats_consistent`.
        #[arg(required = true)]
        checks: Vec<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),
    #[error(transparent)]
    Gate(#[from] TaskGateError),
    #[error(transparent)]
    Store(#[from] TaskStoreError),
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),
    #[error(transparent)]
    Domain(#[from] devflow::task::domain::TaskDomainError),
    #[error("gate requires --action or --min-status")]
    MissingGateTarget,
    #[error("failed to read batch file {path}: {source}")]
    BatchRead {
        path: Utf8PathBuf,
        source: io::Error,
    },
    #[error("invalid batch file {path}: {source}")]
    BatchParse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// What a command produced and whether it counts as success.
struct Rendered {
    body: serde_json::Value,
    success: bool,
}

impl Rendered {
    fn ok(body: &impl Serialize) -> Result<Self, CliError> {
        Ok(Self {
            body: serde_json::to_value(body)?,
            success: true,
        })
    }

    fn with_success(body: &impl Serialize, success: bool) -> Result<Self, CliError> {
        Ok(Self {
            body: serde_json::to_value(body)?,
            success,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = telemetry::init(telemetry::DEFAULT_FILTER) {
        report_error(&err);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            report_error(&err);
            return ExitCode::FAILURE;
        }
    };

    match runtime
        .block_on(run(cli))
        .and_then(|rendered| print_json(&rendered).map(|()| rendered.success))
    {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &dyn std::error::Error) {
    tracing::error!(error = %err, "devflow command failed");
    let mut stderr = io::stderr().lock();
    if writeln!(stderr, "error: {err}").is_err() {
        tracing::debug!("stderr unavailable");
    }
}

fn print_json(rendered: &Rendered) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(&rendered.body)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

async fn run(cli: Cli) -> Result<Rendered, CliError> {
    let mut config = DevflowConfig::resolve(cli.project_root.as_deref())?;
    if let Some(limit) = cli.activity_limit {
        config = config.with_recent_activity_limit(limit);
    }
    tracing::debug!(tasks_path = %config.tasks_path(), "resolved configuration");
    let store = Arc::new(FileTaskStore::new(config.tasks_path()));
    let lifecycle = TaskLifecycleService::new(Arc::clone(&store), Arc::new(DefaultClock));

    match cli.command {
        Command::Transition {
            task_key,
            to,
            by,
            notes,
        } => {
            let request = TransitionTaskRequest::new(task_key, to, by).with_notes(notes);
            let outcome = lifecycle.transition(request).await?;
            Rendered::ok(&json!({
                "taskKey": outcome.task_key,
                "oldStatus": outcome.old_status,
                "newStatus": outcome.new_status,
                "version": outcome.record.version,
            }))
        }
        Command::Status {
            task_key,
            no_history,
            no_stats,
        } => {
            let options = QueryOptions {
                include_history: !no_history,
                include_stats: !no_stats,
            };
            Rendered::ok(&lifecycle.query(&task_key, options).await?)
        }
        Command::Gate {
            task_key,
            action,
            min_status,
        } => {
            run_gate(
                &TaskGate::new(store),
                &task_key,
                action.as_deref(),
                min_status.as_deref(),
            )
            .await
        }
        Command::Batch {
            file,
            continue_on_error,
        } => {
            let operations = read_operations(&file)?;
            let result = BatchCoordinator::new(lifecycle)
                .run(operations, continue_on_error)
                .await;
            let success = result.failed.is_empty();
            Rendered::with_success(&result, success)
        }
        Command::Report { statuses, user } => {
            let parsed = statuses
                .iter()
                .map(|status| TaskStatus::try_from(status.as_str()))
                .collect::<Result<Vec<_>, _>>()?;
            let mut filter = ReportFilter::new().with_statuses(parsed);
            if let Some(participant) = user {
                filter = filter.with_participant(participant);
            }
            let report = ReportAggregator::new(store)
                .with_activity_limit(config.recent_activity_limit)
                .generate(&filter)
                .await?;
            Rendered::ok(&report)
        }
        Command::Check { task_key, checks } => {
            let outcome = ChecklistService::new(store).run(&task_key, checks.as_slice()).await?;
            let passed = outcome.passed;
            Rendered::with_success(&outcome, passed)
        }
    }
}

async fn run_gate(
    gate: &TaskGate<FileTaskStore>,
    task_key: &str,
    action: Option<&str>,
    min_status: Option<&str>,
) -> Result<Rendered, CliError> {
    let checked = match (action, min_status) {
        (Some(name), _) => {
            let parsed = DownstreamAction::try_from(name)?;
            gate.authorize(task_key, parsed).await
        }
        (None, Some(status)) => {
            let minimum = TaskStatus::try_from(status)?;
            gate.require_minimum(task_key, minimum).await
        }
        (None, None) => return Err(CliError::MissingGateTarget),
    };

    match checked {
        Ok(current) => Rendered::ok(&json!({
            "taskKey": task_key,
            "allowed": true,
            "currentStatus": current,
        })),
        Err(err) => {
            let Some(gate_error) = err.gate_error() else {
                return Err(err.into());
            };
            Rendered::with_success(
                &json!({
                    "taskKey": task_key,
                    "allowed": false,
                    "currentStatus": gate_error.current,
                    "requiredStatus": gate_error.required,
                    "message": err.to_string(),
                }),
                false,
            )
        }
    }
}

fn read_operations(path: &Utf8Path) -> Result<Vec<TransitionTaskRequest>, CliError> {
    let read_error = |source: io::Error| CliError::BatchRead {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error(io::Error::other("path must include a file name")))?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let contents = dir.read_to_string(file_name).map_err(read_error)?;
    serde_json::from_str(&contents).map_err(|source| CliError::BatchParse {
        path: path.to_path_buf(),
        source,
    })
}
