use axum::{routing::post, Json, Router};
use clap::Parser;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Deterministic stand-in for the search/research engine.
///
/// Point the CLI at it with `DEEP_SEARCH_ENGINE_URL=http://127.0.0.1:<port>`.
/// Queries starting with `fail` get an engine error string back.
#[derive(clap::Parser, Debug)]
struct Args {
    /// Port to bind on localhost. Use 0 for an ephemeral port.
    #[arg(long, default_value_t = 8787)]
    port: u16,
}

async fn search(Json(body): Json<Value>) -> String {
    let query = body["query"].as_str().unwrap_or("");
    let provider = body["provider"].as_str().unwrap_or("brave");
    let n = body["max_results"].as_u64().unwrap_or(10).min(5);
    if query.starts_with("fail") {
        return format!("Error: {provider} provider rejected the query");
    }
    let results: Vec<Value> = (1..=n)
        .map(|i| {
            json!({
                "title": format!("{query} #{i}"),
                "link": format!("https://example.test/{provider}/{i}"),
                "snippet": format!("fixture result {i} from {provider}"),
            })
        })
        .collect();
    json!({ "answer": format!("Fixture answer for {query}"), "results": results }).to_string()
}

async fn research(Json(body): Json<Value>) -> String {
    let query = body["query"].as_str().unwrap_or("");
    let model_class = body["model_class"].as_str().unwrap_or("reasoning_mini");
    format!("# {query}\n\n_Model class: {model_class}_\n\nNothing was actually researched.\n")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let app = Router::new()
        .route("/search", post(search))
        .route("/research", post(research));

    let bind = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = TcpListener::bind(bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));
    let addr = listener.local_addr().expect("local_addr");
    eprintln!("fixture_engine_listening: http://{addr}");

    axum::serve(listener, app).await.expect("axum serve");
}
