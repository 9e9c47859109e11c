//! Command-line entry point.
//!
//! Usage:
//!   DEEPSEEK_API_KEY=... SCRAPINGANT_API_KEY=... rivalscope <url> [company name]

use rivalscope::{AgentRegistry, Coordinator, Settings};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("Usage: rivalscope <url> [company name]");
        return ExitCode::from(2);
    };
    let company = {
        let rest: Vec<String> = args.collect();
        (!rest.is_empty()).then(|| rest.join(" "))
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let registry = Arc::new(AgentRegistry::standard());
    let pipeline = Coordinator::from_settings(&settings, registry);
    tracing::debug!("agents: {:?}", pipeline.health());

    let output = match pipeline.analyze(&url, company).await {
        Ok(report) => serde_json::json!({ "success": true, "report": report }),
        Err(e) => {
            serde_json::to_value(&e).unwrap_or_else(|_| serde_json::json!({ "success": false }))
        }
    };
    let failed = output["success"] == false;

    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }

    if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
