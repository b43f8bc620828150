#![cfg(feature = "stdio")]

use std::collections::BTreeSet;

#[test]
fn deep_search_stdio_lists_tools_and_searches() {
    // Spawns the server as a child process; skipped by default.
    if std::env::var("DEEP_SEARCH_E2E").ok().as_deref() != Some("1") {
        eprintln!("skipping: set DEEP_SEARCH_E2E=1 to run this test");
        return;
    }

    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    rt.block_on(async {
        use axum::{routing::post, Json, Router};
        use rmcp::{
            model::CallToolRequestParam,
            service::ServiceExt,
            transport::{ConfigureCommandExt, TokioChildProcess},
        };

        let engine = Router::new()
            .route(
                "/search",
                post(|Json(body): Json<serde_json::Value>| async move {
                    serde_json::json!({
                        "answer": format!("about {}", body["query"].as_str().unwrap_or("")),
                        "results": [{"title": "Hit", "link": "http://hit", "snippet": "s"}]
                    })
                    .to_string()
                }),
            )
            .route("/research", post(|| async { "# Report\n\ndone" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, engine).await.expect("axum serve");
        });

        let bin = assert_cmd::cargo::cargo_bin!("deep-search");
        let service = ()
            .serve(TokioChildProcess::new(
                tokio::process::Command::new(bin).configure(|cmd| {
                    cmd.args(["serve"]);
                    cmd.current_dir(std::env::temp_dir());
                    cmd.env_remove("ENV_FILE");
                    cmd.env("DEEP_SEARCH_ENGINE_URL", format!("http://{addr}"));
                    cmd.env("LOG_LEVEL", "ERROR");
                }),
            )?)
            .await?;

        let tools = service.list_tools(Default::default()).await?;
        let names: BTreeSet<String> = tools
            .tools
            .iter()
            .map(|t| t.name.clone().into_owned())
            .collect();
        assert_eq!(
            names,
            BTreeSet::from(["comprehensive_research".to_string(), "deep_search".to_string()])
        );

        let resources = service.list_resources(Default::default()).await?;
        assert!(resources.resources.is_empty());

        let resp = service
            .call_tool(CallToolRequestParam {
                name: "deep_search".into(),
                arguments: Some(
                    serde_json::json!({"query": "tides", "provider": "openai", "maxResults": 2})
                        .as_object()
                        .cloned()
                        .unwrap(),
                ),
            })
            .await?;
        let blocks: Vec<String> = resp
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect();
        assert_eq!(blocks.len(), 3, "{blocks:?}");
        assert!(blocks[0].contains("about tides"));
        assert!(blocks[1].contains("1. **Hit**\n   URL: http://hit\n   s\n"));
        assert!(blocks[2].contains("using openai provider. Found 1 results."));

        let resp = service
            .call_tool(CallToolRequestParam {
                name: "comprehensive_research".into(),
                arguments: Some(
                    serde_json::json!({"query": "tides"})
                        .as_object()
                        .cloned()
                        .unwrap(),
                ),
            })
            .await?;
        let report = resp
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default();
        assert_eq!(report, "# Report\n\ndone");

        let err = service
            .call_tool(CallToolRequestParam {
                name: "deep_search".into(),
                arguments: Some(
                    serde_json::json!({"query": "   "})
                        .as_object()
                        .cloned()
                        .unwrap(),
                ),
            })
            .await;
        assert!(err.is_err(), "blank query should be rejected");

        service.cancel().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
    .expect("mcp stdio contract");
}
