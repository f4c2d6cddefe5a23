use actix_cors::Cors;
use actix_web::{
    get, post, web, App, HttpResponse, HttpServer, Responder, Result as ActixResult,
};
use actix_ws::Message;
use fluxcore::{Execution, ExecutionStatus, FlowDefinition, FlowId, Value};
use fluxnodes::NodeHandlerRouter;
use fluxruntime::FlowRuntime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

/// Application state shared across handlers
struct AppState {
    runtime: Arc<FlowRuntime>,
    flows: Arc<RwLock<HashMap<FlowId, FlowDefinition>>>,
}

/// Request body for triggering an execution
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteRequest {
    #[serde(default)]
    payload: HashMap<String, serde_json::Value>,
    #[serde(default)]
    correlation_id: Option<String>,
    #[serde(default)]
    triggered_by: Option<String>,
}

/// Response for flow creation
#[derive(Debug, Serialize)]
struct FlowResponse {
    id: Uuid,
    message: String,
}

/// Response for execution trigger
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionResponse {
    execution_id: Uuid,
    status: ExecutionStatus,
    steps: usize,
}

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Health check endpoint
#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "fluxserver"
    }))
}

/// List all flow definitions
#[get("/api/flows")]
async fn list_flows(data: web::Data<AppState>) -> ActixResult<impl Responder> {
    let flows = data.flows.read().await;
    let flow_list: Vec<_> = flows
        .values()
        .map(|f| {
            serde_json::json!({
                "id": f.id,
                "name": f.name,
                "description": f.description,
                "nodes": f.nodes.len(),
                "edges": f.edges.len(),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(flow_list))
}

/// Create a new flow definition
#[post("/api/flows")]
async fn create_flow(
    data: web::Data<AppState>,
    definition: web::Json<FlowDefinition>,
) -> ActixResult<impl Responder> {
    let definition = definition.into_inner();

    if let Err(e) = definition.validate() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
        }));
    }

    let flow_id = definition.id;
    info!("Creating flow definition: {} ({})", definition.name, flow_id);

    data.flows.write().await.insert(flow_id, definition);

    Ok(HttpResponse::Created().json(FlowResponse {
        id: flow_id,
        message: "Flow definition created successfully".to_string(),
    }))
}

/// Get a specific flow definition
#[get("/api/flows/{id}")]
async fn get_flow(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let flow_id = path.into_inner();
    let flows = data.flows.read().await;

    match flows.get(&flow_id) {
        Some(definition) => Ok(HttpResponse::Ok().json(definition)),
        None => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Flow {} not found", flow_id),
        })),
    }
}

/// Delete a flow definition
#[actix_web::delete("/api/flows/{id}")]
async fn delete_flow(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let flow_id = path.into_inner();
    let mut flows = data.flows.write().await;

    match flows.remove(&flow_id) {
        Some(_) => {
            info!("Deleted flow definition: {}", flow_id);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Flow definition deleted successfully"
            })))
        }
        None => Ok(HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Flow {} not found", flow_id),
        })),
    }
}

/// Trigger an execution of a flow definition
#[post("/api/flows/{id}/executions")]
async fn execute_flow(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ExecuteRequest>,
) -> ActixResult<impl Responder> {
    let flow_id = path.into_inner();
    let req = req.into_inner();

    let definition = match data.flows.read().await.get(&flow_id) {
        Some(definition) => definition.clone(),
        None => {
            return Ok(HttpResponse::NotFound().json(ErrorResponse {
                error: format!("Flow {} not found", flow_id),
            }))
        }
    };

    let payload: HashMap<String, Value> = req
        .payload
        .into_iter()
        .map(|(k, v)| (k, Value::Json(v)))
        .collect();

    let mut execution = Execution::new(flow_id)
        .with_payload(payload)
        .with_triggered_by(req.triggered_by.unwrap_or_else(|| "api".to_string()));
    if let Some(correlation_id) = req.correlation_id {
        execution = execution.with_correlation_id(correlation_id);
    }

    info!("Executing flow {} as execution {}", flow_id, execution.id);

    let result = data.runtime.execute(&execution, &definition).await;
    let steps = data
        .runtime
        .steps(execution.id)
        .await
        .map(|s| s.len())
        .unwrap_or(0);

    match result {
        Ok(_) => {
            info!("Execution {} completed ({} steps)", execution.id, steps);
            Ok(HttpResponse::Ok().json(ExecutionResponse {
                execution_id: execution.id,
                status: ExecutionStatus::Completed,
                steps,
            }))
        }
        Err(e) => {
            error!("Execution {} failed: {}", execution.id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "executionId": execution.id,
                "status": ExecutionStatus::Failed,
                "steps": steps,
                "error": e.to_string(),
            })))
        }
    }
}

/// Execution trace query
#[get("/api/executions/{id}/steps")]
async fn get_execution_steps(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ActixResult<impl Responder> {
    let execution_id = path.into_inner();

    match data.runtime.steps(execution_id).await {
        Ok(steps) => Ok(HttpResponse::Ok().json(steps)),
        Err(e) => Ok(HttpResponse::InternalServerError().json(ErrorResponse {
            error: e.to_string(),
        })),
    }
}

/// WebSocket endpoint for real-time execution events
#[get("/api/events")]
async fn websocket_events(
    req: actix_web::HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let (res, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    info!("WebSocket client connected");

    let mut events = data.runtime.subscribe_events();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            if let Ok(json) = serde_json::to_string(&event) {
                                if session.text(json).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(_) => break,
                    }
                }

                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }

                else => break,
            }
        }

        info!("WebSocket client disconnected");
        let _ = session.close(None).await;
    });

    Ok(res)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🚀 Starting flux server");

    let runtime = FlowRuntime::new(Arc::new(NodeHandlerRouter::new()));

    info!("✅ Runtime initialized with built-in node handlers");

    let app_state = web::Data::new(AppState {
        runtime: Arc::new(runtime),
        flows: Arc::new(RwLock::new(HashMap::new())),
    });

    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    info!("🌐 Server starting on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .service(health_check)
            .service(list_flows)
            .service(create_flow)
            .service(get_flow)
            .service(delete_flow)
            .service(execute_flow)
            .service(get_execution_steps)
            .service(websocket_events)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
