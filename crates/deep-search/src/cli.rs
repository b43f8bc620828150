use crate::{ResearchCmd, SearchCmd};
use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use deep_search_core::{render, ArgumentBag, Dispatcher, FormattedOutput, Outcome, Surface};
use deep_search_local::engine::{DEFAULT_ENGINE_URL, ENGINE_TOKEN_VAR, ENGINE_URL_VAR};
use deep_search_local::{EnvReport, HttpEngine};
use serde_json::{json, Value};
use std::path::Path;

/// Every flag goes into the bag as the user typed it; the dispatcher coerces.
fn search_args(cmd: &SearchCmd) -> ArgumentBag {
    let mut bag = ArgumentBag::new();
    bag.insert("query".into(), json!(cmd.query));
    bag.insert("provider".into(), json!(cmd.provider));
    bag.insert("maxResults".into(), json!(cmd.max_results));
    bag.insert("includeAnswer".into(), json!(cmd.include_answer));
    bag
}

fn research_args(cmd: &ResearchCmd) -> ArgumentBag {
    let mut bag = ArgumentBag::new();
    bag.insert("query".into(), json!(cmd.query));
    bag.insert("modelClass".into(), json!(cmd.model_class));
    bag
}

pub(crate) async fn search(dispatcher: &Dispatcher, cmd: SearchCmd) -> Result<()> {
    eprintln!("🔍 Searching for: \"{}\"", cmd.query);
    eprintln!("📍 Provider: {}", cmd.provider);

    let outcome = dispatcher.dispatch("search", &search_args(&cmd)).await?;
    let Outcome::Search(found) = &outcome else {
        bail!("search returned a non-search outcome");
    };

    if let Some(path) = cmd.output.as_deref() {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let record = render::file_record(found, &timestamp);
        write_output(path, &serde_json::to_string_pretty(&record)?)?;
        eprintln!("✅ Results saved to: {}", path.display());
        return Ok(());
    }

    if let FormattedOutput::Console { stdout, status } = render::format(&outcome, Surface::Console)
    {
        print!("{stdout}");
        if let Some(status) = status {
            eprintln!("\n{status}");
        }
    }
    Ok(())
}

pub(crate) async fn research(dispatcher: &Dispatcher, cmd: ResearchCmd) -> Result<()> {
    eprintln!("🔬 Researching: \"{}\"", cmd.query);
    eprintln!("🧠 Model class: {}", cmd.model_class);
    eprintln!("⏳ This may take several minutes...");

    let outcome = dispatcher.dispatch("research", &research_args(&cmd)).await?;
    let Outcome::Research(done) = &outcome else {
        bail!("research returned a non-research outcome");
    };

    if let Some(path) = cmd.output.as_deref() {
        write_output(path, &done.report)?;
        eprintln!("✅ Report saved to: {}", path.display());
        return Ok(());
    }
    if let FormattedOutput::Console { stdout, .. } = render::format(&outcome, Surface::Console) {
        print!("{stdout}");
    }
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

/// Engine errors already read "Error: ..."; don't double the prefix.
pub(crate) fn error_line(e: &anyhow::Error) -> String {
    let msg = format!("{e:#}");
    if msg.starts_with("Error:") {
        msg
    } else {
        format!("Error: {msg}")
    }
}

pub(crate) fn doctor(env: &EnvReport, output: &str) -> Result<()> {
    let endpoint = std::env::var(ENGINE_URL_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());
    let token_configured = std::env::var(ENGINE_TOKEN_VAR)
        .ok()
        .is_some_and(|v| !v.trim().is_empty());
    // Building the engine is cheap and validates the endpoint without any network IO.
    let engine_check = match HttpEngine::new(reqwest::Client::new(), &endpoint, None) {
        Ok(_) => json!({ "name": "engine_endpoint", "ok": true }),
        Err(e) => json!({ "name": "engine_endpoint", "ok": false, "error": e.to_string() }),
    };
    let credentials_hint = if env.has_credentials() {
        Value::Null
    } else {
        json!("Set ENV_FILE to a .env file containing at least one provider API key")
    };
    let credentials_check = json!({
        "name": "credentials",
        "ok": env.has_credentials(),
        "hint": credentials_hint,
    });
    let env_check = json!({
        "name": "env_file",
        "ok": env.error.is_none(),
        "error": env.error,
    });
    let checks = vec![env_check, credentials_check, engine_check];
    let ok = checks.iter().all(|c| c["ok"].as_bool() == Some(true));

    let payload = json!({
        "schema_version": 1,
        "kind": "doctor",
        "ok": ok,
        "name": "deep-search",
        "version": env!("CARGO_PKG_VERSION"),
        "env": env,
        "engine": {
            "endpoint": endpoint,
            "token_configured": token_configured,
        },
        "checks": checks,
    });

    match output.to_ascii_lowercase().as_str() {
        "text" => print!("{}", doctor_text(&payload)),
        _ => println!("{payload}"),
    }
    Ok(())
}

fn doctor_text(payload: &Value) -> String {
    let mut out = format!(
        "deep-search {}\nengine: {}\n",
        payload["version"].as_str().unwrap_or(""),
        payload["engine"]["endpoint"].as_str().unwrap_or("")
    );
    let creds: Vec<&str> = payload["env"]["credentials"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    out.push_str(&format!(
        "credentials: {}\n",
        if creds.is_empty() {
            "(none)".to_string()
        } else {
            creds.join(", ")
        }
    ));
    out.push_str("checks:\n");
    if let Some(checks) = payload["checks"].as_array() {
        for c in checks {
            let mark = if c["ok"].as_bool() == Some(true) { "ok" } else { "FAIL" };
            out.push_str(&format!("  {mark:4} {}\n", c["name"].as_str().unwrap_or("")));
        }
    }
    out
}

pub(crate) fn version(output: &str) {
    match output.to_ascii_lowercase().as_str() {
        "text" => println!("deep-search {}", env!("CARGO_PKG_VERSION")),
        _ => println!(
            "{}",
            json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "deep-search",
                "version": env!("CARGO_PKG_VERSION"),
            })
        ),
    }
}
