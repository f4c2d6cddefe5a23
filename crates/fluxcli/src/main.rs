use anyhow::Result;
use clap::{Parser, Subcommand};
use fluxcore::{Execution, ExecutionEvent, FlowDefinition, Node, NodeType, StepStatus, Value};
use fluxnodes::NodeHandlerRouter;
use fluxruntime::FlowRuntime;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "flux")]
#[command(about = "Integration flow engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a flow definition file
    Run {
        /// Path to flow definition JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Initial payload as JSON string
        #[arg(short, long)]
        input: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a flow definition file
    Validate {
        /// Path to flow definition JSON file
        file: PathBuf,
    },

    /// List built-in node handlers
    Handlers,

    /// Create a new example flow definition
    Init {
        /// Output file path
        #[arg(short, long, default_value = "flow.json")]
        output: PathBuf,
    },
}

/// Convert a serde_json::Value to fluxcore::Value
fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                Value::Number(f)
            } else {
                Value::Number(n.as_i64().unwrap_or(0) as f64)
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::Array(arr.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: HashMap<String, Value> = obj
                .into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, input, verbose } => {
            if verbose {
                tracing_subscriber::fmt()
                    .with_max_level(tracing::Level::DEBUG)
                    .init();
            } else {
                tracing_subscriber::fmt()
                    .with_max_level(tracing::Level::INFO)
                    .init();
            }

            run_flow(file, input).await?;
        }

        Commands::Validate { file } => {
            validate_flow(file)?;
        }

        Commands::Handlers => {
            list_handlers();
        }

        Commands::Init { output } => {
            create_example_flow(output)?;
        }
    }

    Ok(())
}

async fn run_flow(file: PathBuf, input: Option<String>) -> Result<()> {
    println!("🚀 Loading flow definition from: {}", file.display());

    let definition_json = std::fs::read_to_string(&file)?;
    let definition: FlowDefinition = serde_json::from_str(&definition_json)?;
    definition.validate()?;

    println!("📋 Flow: {}", definition.name);
    println!("   Nodes: {}", definition.nodes.len());
    println!("   Edges: {}", definition.edges.len());
    println!();

    // Parse payload - convert plain JSON to Value types
    let payload: HashMap<String, Value> = if let Some(input_str) = input {
        let json: serde_json::Value = serde_json::from_str(&input_str)?;

        if let serde_json::Value::Object(obj) = json {
            obj.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect()
        } else {
            return Err(anyhow::anyhow!("Input must be a JSON object"));
        }
    } else {
        HashMap::new()
    };

    let runtime = FlowRuntime::new(Arc::new(NodeHandlerRouter::new()));

    let execution = Execution::new(definition.id)
        .with_payload(payload)
        .with_triggered_by("cli");

    // Subscribe to events for real-time output
    let mut events = runtime.subscribe_events();

    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::ExecutionStarted { .. } => {
                    println!("▶️  Execution started");
                }
                ExecutionEvent::StepStarted { node_id, step_type, step_order, .. } => {
                    println!("  ⚡ Step {}: node '{}' ({:?})", step_order, node_id, step_type);
                }
                ExecutionEvent::StepCompleted { node_id, duration_ms, .. } => {
                    println!("  ✅ Node '{}' completed in {}ms", node_id, duration_ms);
                }
                ExecutionEvent::StepFailed { node_id, error, .. } => {
                    println!("  ❌ Node '{}' failed: {}", node_id, error);
                }
                ExecutionEvent::ExecutionCompleted { success, duration_ms, .. } => {
                    if success {
                        println!("✨ Execution completed successfully in {}ms", duration_ms);
                    } else {
                        println!("💥 Execution failed after {}ms", duration_ms);
                    }
                }
            }
        }
    });

    let result = runtime.execute(&execution, &definition).await;

    // Wait for events to finish printing
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    println!();
    println!("📊 Execution Trace:");
    for step in runtime.steps(execution.id).await? {
        let status = match step.step_status {
            StepStatus::Completed => "COMPLETED",
            StepStatus::Failed => "FAILED",
            StepStatus::Running => "RUNNING",
        };
        println!(
            "   {}. {} [{}] {}ms",
            step.step_order,
            step.step_id,
            status,
            step.duration_ms.unwrap_or(0)
        );
        if let Some(error) = &step.error_message {
            println!("      error: {}", error);
        }
    }

    let context = result?;
    println!();
    println!("📤 Final context ({} keys):", context.len());
    for (key, value) in context.iter() {
        println!("   {}: {:?}", key, value);
    }

    Ok(())
}

fn validate_flow(file: PathBuf) -> Result<()> {
    println!("🔍 Validating flow definition: {}", file.display());

    let definition_json = std::fs::read_to_string(&file)?;
    let definition: FlowDefinition = serde_json::from_str(&definition_json)?;
    definition.validate()?;

    println!("✅ Flow definition is valid:");
    println!("   Name: {}", definition.name);
    println!("   Nodes: {}", definition.nodes.len());
    println!("   Edges: {}", definition.edges.len());

    Ok(())
}

fn list_handlers() {
    println!("📦 Built-in node handlers:");
    println!();

    for (node_type, description) in NodeHandlerRouter::handled_types() {
        println!("  • {}", node_type);
        println!("    {}", description);
    }

    println!();
    println!("Adapter nodes dispatch through the adapter registry supplied");
    println!("by the embedding application.");
}

fn create_example_flow(output: PathBuf) -> Result<()> {
    let mut definition = FlowDefinition::new("Example Flow");
    definition.description = Some("Waits briefly, stamps the context, then ends".to_string());

    let start_id = definition.add_node(Node::new("start", NodeType::Start).with_name("Start"));
    let wait_id = definition.add_node(
        Node::new("wait", NodeType::Wait)
            .with_name("Pause")
            .with_config("durationMs", 250i64),
    );
    let stamp_id = definition.add_node(
        Node::new("stamp", NodeType::Utility)
            .with_name("Stamp Context")
            .with_config(
                "output",
                Value::Object(HashMap::from([(
                    "stamped".to_string(),
                    Value::Bool(true),
                )])),
            ),
    );
    let end_id = definition.add_node(Node::new("end", NodeType::End).with_name("End"));

    definition.connect(start_id, wait_id.clone());
    definition.connect(wait_id, stamp_id.clone());
    definition.connect(stamp_id, end_id);

    let json = serde_json::to_string_pretty(&definition)?;
    std::fs::write(&output, json)?;

    println!("✨ Created example flow definition: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  flux run --file {} --input '{{\"orderId\": \"A-1001\"}}'", output.display());

    Ok(())
}
