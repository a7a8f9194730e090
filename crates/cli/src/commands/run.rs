//! `run` command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use components::DefaultInitializer;
use dispatcher::DispatcherBuilder;
use dom::MemoryDom;
use observability::{InvocationStats, LogController, Logger};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

use crate::cli::RunArgs;
use crate::error::CliError;

/// Script file layout
///
/// ```toml
/// [[commands]]
/// name = "configure"
/// options = { propertyID = "p1" }
/// ```
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    commands: Vec<ScriptCommand>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptCommand {
    pub name: String,
    #[serde(default)]
    pub options: Value,
}

/// Outcome of one scripted invocation
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub command: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Resolved,
    Rejected,
    Pending,
}

/// Everything produced by one script run
#[derive(Debug)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    pub stats: InvocationStats,
}

/// Execute the `run` command
pub async fn run_script(args: &RunArgs) -> Result<()> {
    info!(script = %args.script.display(), "Loading script");

    let commands = load_script(&args.script)?;
    let report = execute_script(&commands, args).await;

    if args.json {
        let steps = serde_json::to_string_pretty(&report.steps)?;
        println!("{steps}");
    } else {
        print_report(&report);
    }

    let failed = report.stats.total().failed;
    if failed > 0 && !args.allow_failures {
        return Err(CliError::CommandsFailed { count: failed }.into());
    }
    Ok(())
}

/// Read a TOML/JSON command script
pub fn load_script(path: &Path) -> Result<Vec<ScriptCommand>, CliError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(CliError::script_not_found(display));
    }

    let raw = config_loader::ConfigLoader::load_from_path(path)
        .map_err(|e| CliError::script_parse(&display, e.to_string()))?;
    let script: Script =
        serde_json::from_value(raw).map_err(|e| CliError::script_parse(&display, e.to_string()))?;

    debug!(commands = script.commands.len(), "Script loaded");
    Ok(script.commands)
}

/// Dispatch every command in order against a fresh in-memory document
#[instrument(name = "harness_execute_script", skip_all, fields(commands = commands.len()))]
pub async fn execute_script(commands: &[ScriptCommand], args: &RunArgs) -> RunReport {
    let dom = Arc::new(if args.body_delay_ms == 0 {
        MemoryDom::with_body()
    } else {
        MemoryDom::new()
    });
    if args.body_delay_ms > 0 {
        let dom = Arc::clone(&dom);
        let delay = Duration::from_millis(args.body_delay_ms);
        tokio::spawn(async move {
            sleep(delay).await;
            let body = dom.attach_body();
            debug!(body = %body, "Document body attached");
        });
    }

    let controller = LogController::new();
    let initializer = DefaultInitializer::new(
        Arc::clone(&dom),
        Logger::new(&args.namespace, controller.clone()),
    );
    let mut builder = DispatcherBuilder::new(&args.namespace, initializer).log_controller(controller);
    if let Some(query) = &args.query {
        builder = builder.query_string(query);
    }
    let dispatcher = builder.build();

    let settle = Duration::from_millis(args.settle_timeout_ms);
    let mut stats = InvocationStats::new();
    let mut steps = Vec::with_capacity(commands.len());

    for (index, command) in commands.iter().enumerate() {
        let invocation = dispatcher.execute(&command.name, command.options.clone());

        let mut step = StepReport {
            index,
            command: command.name.clone(),
            status: StepStatus::Pending,
            value: None,
            error: None,
        };
        match timeout(settle, invocation).await {
            Ok(Ok(value)) => {
                stats.record_success(&command.name);
                step.status = StepStatus::Resolved;
                step.value = Some(value);
            }
            Ok(Err(e)) => {
                stats.record_failure(&command.name);
                step.status = StepStatus::Rejected;
                step.error = Some(e.to_string());
            }
            Err(_) => {
                warn!(command = %command.name, "Invocation did not settle");
                stats.record_pending(&command.name);
            }
        }
        steps.push(step);
    }

    info!(
        configuration = dispatcher.state().label(),
        "Script finished"
    );

    RunReport { steps, stats }
}

fn print_report(report: &RunReport) {
    println!("\n=== Script Results ===\n");
    for step in &report.steps {
        match step.status {
            StepStatus::Resolved => {
                let value = step.value.as_ref().unwrap_or(&Value::Null);
                println!("  ✓ [{}] {} -> {}", step.index, step.command, value);
            }
            StepStatus::Rejected => {
                let error = step.error.as_deref().unwrap_or_default();
                println!("  ✗ [{}] {}: {}", step.index, step.command, error);
            }
            StepStatus::Pending => {
                println!("  … [{}] {}: still pending", step.index, step.command);
            }
        }
    }

    let total = report.stats.total();
    println!("\n=== Summary ===\n");
    for (command, counts) in report.stats.iter() {
        println!(
            "  {command}: {} resolved, {} rejected, {} pending",
            counts.succeeded, counts.failed, counts.pending
        );
    }
    println!(
        "\n  Total: {} resolved, {} rejected, {} pending\n",
        total.succeeded, total.failed, total.pending
    );
}
