// crates/flowcli/src/main.rs

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use flowcore::{ExecutionEvent, NodeEvent};
use flowruntime::{
    ErrorHandling, FlowRuntime, NodeDocument, NodeRegistry, RuntimeConfig, WorkflowDocument,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow")]
#[command(about = "Flow Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow document
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Seed an unconnected input, as node.port=<json>
        #[arg(short, long = "set", value_name = "NODE.PORT=JSON")]
        seeds: Vec<String>,

        /// Stop at the first failing node instead of running independent branches
        #[arg(long)]
        fail_fast: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow document without running it
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            seeds,
            fail_fast,
            verbose,
        } => {
            init_logging(verbose);
            run_workflow(file, seeds, fail_fast)?;
        }

        Commands::Validate { file } => {
            init_logging(false);
            validate_workflow(file)?;
        }

        Commands::Nodes => {
            list_nodes()?;
        }

        Commands::Init { output } => {
            create_example_workflow(output)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn standard_registry() -> Result<NodeRegistry> {
    flownodes::standard_registry().map_err(|e| anyhow!("failed to register nodes: {}", e))
}

/// Split `node.port=json` into its parts
fn parse_seed(seed: &str) -> Result<(String, String, serde_json::Value)> {
    let (target, raw) = seed
        .split_once('=')
        .ok_or_else(|| anyhow!("seed '{}' must look like node.port=<json>", seed))?;
    let (node, port) = target
        .rsplit_once('.')
        .ok_or_else(|| anyhow!("seed target '{}' must look like node.port", target))?;
    let json: serde_json::Value = serde_json::from_str(raw)
        .with_context(|| format!("seed value for {} is not valid JSON", target))?;
    Ok((node.to_string(), port.to_string(), json))
}

fn run_workflow(file: PathBuf, seeds: Vec<String>, fail_fast: bool) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let mut document = WorkflowDocument::from_path(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    for seed in &seeds {
        let (node, port, value) = parse_seed(seed)?;
        document.seed_input(&node, port, value)?;
    }

    let config = RuntimeConfig {
        on_error: if fail_fast {
            ErrorHandling::StopWorkflow
        } else {
            ErrorHandling::ContinueOnError
        },
        ..RuntimeConfig::default()
    };
    let runtime = FlowRuntime::with_registry(Arc::new(standard_registry()?), config);

    let mut workflow = runtime.load(&document)?;
    tracing::debug!(workflow = %workflow.name(), seeds = seeds.len(), "workflow loaded");

    print!("{}", workflow.summary());
    println!();

    let mut events = runtime.subscribe_events();
    let report = runtime.execute(&mut workflow);

    while let Ok(event) = events.try_recv() {
        print_event(event);
    }

    println!();
    println!("📊 Execution Summary:");
    print!("{}", report);

    let mut printed_header = false;
    for node in workflow.nodes() {
        for port in node.outputs() {
            if let Some(value) = port.value() {
                if !printed_header {
                    println!();
                    println!("📤 Outputs:");
                    printed_header = true;
                }
                println!("   {}.{}: {}", node.name(), port.name(), value.to_plain_json());
            }
        }
    }

    if report.success {
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} nodes did not complete",
            report.total_nodes() - report.completed_nodes(),
            report.total_nodes()
        ))
    }
}

fn print_event(event: ExecutionEvent) {
    match event {
        ExecutionEvent::WorkflowStarted { .. } => {
            println!("▶️  Workflow started");
        }
        ExecutionEvent::NodeStarted { node, kind, .. } => {
            println!("  ⚡ Starting node: {} ({})", node, kind);
        }
        ExecutionEvent::NodeCompleted {
            node,
            metadata,
            duration_ms,
            ..
        } => {
            println!("  ✅ Node {} completed in {}ms", node, duration_ms);
            let mut entries: Vec<_> = metadata.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, value) in entries {
                println!("     🏷️  {} = {}", key, value.to_plain_json());
            }
        }
        ExecutionEvent::NodeFailed { node, error, .. } => {
            println!("  ❌ Node {} failed: {}", node, error);
        }
        ExecutionEvent::NodeEvent { node, event, .. } => match event {
            NodeEvent::Info { message } => {
                println!("     ℹ️  [{}] {}", node, message);
            }
            NodeEvent::Warning { message } => {
                println!("     ⚠️  [{}] {}", node, message);
            }
            NodeEvent::Data { port, value } => {
                println!("     📦 [{}] {} = {}", node, port, value.to_plain_json());
            }
        },
        ExecutionEvent::WorkflowCompleted {
            success,
            duration_ms,
            ..
        } => {
            if success {
                println!("✨ Workflow completed successfully in {}ms", duration_ms);
            } else {
                println!("💥 Workflow failed after {}ms", duration_ms);
            }
        }
    }
}

fn validate_workflow(file: PathBuf) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let document = WorkflowDocument::from_path(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let registry = standard_registry()?;
    let workflow = document.build(&registry)?;

    println!("✅ Workflow is valid:");
    print!("{}", workflow.summary());

    Ok(())
}

fn list_nodes() -> Result<()> {
    println!("📦 Available Node Types:");
    println!();

    let registry = standard_registry()?;

    for node_type in registry.list_node_types() {
        let Some(schema) = registry.schema(&node_type) else {
            continue;
        };
        println!("  • {} ({})", node_type, schema.category());
        println!("    {}", schema.description());
        for param in schema.parameters() {
            let default = param
                .default
                .as_ref()
                .map(|v| format!(" = {}", v.to_plain_json()))
                .unwrap_or_default();
            let marker = if param.required { "" } else { "?" };
            println!("      param  {}{}: {}{}", param.name, marker, param.param_type, default);
        }
        for port in schema.inputs() {
            let marker = if port.required { "" } else { "?" };
            println!("      input  {}{}: {}", port.name, marker, port.port_type);
        }
        for port in schema.outputs() {
            let marker = if port.required { "" } else { "?" };
            println!("      output {}{}: {}", port.name, marker, port.port_type);
        }
    }

    Ok(())
}

fn create_example_workflow(output: PathBuf) -> Result<()> {
    let mut document = WorkflowDocument::new("Example Arithmetic Workflow")
        .with_node(NodeDocument::new("two", "math.constant").with_param("value", 2.into()))
        .with_node(NodeDocument::new("three", "math.constant").with_param("value", 3.into()))
        .with_node(NodeDocument::new("sum", "math.add"))
        .with_node(
            NodeDocument::new("scaled", "math.scale").with_param("factor", 10.into()),
        )
        .with_node(NodeDocument::new("log", "debug.log"))
        .with_connection("two", "value", "sum", "a")
        .with_connection("three", "value", "sum", "b")
        .with_connection("sum", "sum", "scaled", "value")
        .with_connection("scaled", "value", "log", "message");
    document.description = Some("Adds two constants, scales the sum and logs it".to_string());

    std::fs::write(&output, document.to_json_pretty()?)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  flow run --file {}", output.display());

    Ok(())
}
