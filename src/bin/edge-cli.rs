use std::path::PathBuf;
use std::sync::Mutex;

use axum::http::{HeaderMap, Method, StatusCode};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use url::Url;

use apex_edge::cache::{CacheKey, MemoryCache};
use apex_edge::config::{load_config, EdgeConfig};
use apex_edge::edge::{canonical_url, EdgeHandler};
use apex_edge::http::{EdgeResponse, IncomingRequest};
use apex_edge::origin::{Origin, OriginError};
use apex_edge::policy::TransformDirectives;

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Operator CLI for the apexenterprises.net edge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how the edge would handle a URL, without network access
    Explain {
        url: String,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, default_value = "GET")]
        method: String,
    },
    /// Request a URL from a running edge without following redirects
    Fetch { url: String },
}

/// Stands in for the origin: records the directives and answers 200.
#[derive(Default)]
struct DryRunOrigin {
    directives: Mutex<Option<TransformDirectives>>,
}

impl Origin for DryRunOrigin {
    async fn fetch(
        &self,
        _request: &IncomingRequest,
        directives: &TransformDirectives,
    ) -> Result<EdgeResponse, OriginError> {
        if let Ok(mut slot) = self.directives.lock() {
            *slot = Some(directives.clone());
        }
        Ok(EdgeResponse::new(StatusCode::OK, ""))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let report = match cli.command {
        Commands::Explain { url, config, method } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => EdgeConfig::default(),
            };
            explain(&config, method.parse()?, Url::parse(&url)?).await?
        }
        Commands::Fetch { url } => fetch(&url).await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn explain(
    config: &EdgeConfig,
    method: Method,
    url: Url,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut config = config.clone();
    config.cache.enabled = false;
    let handler = EdgeHandler::from_config(&config, MemoryCache::new(1), DryRunOrigin::default())?;

    let policy = handler.policy();
    let cache_key = CacheKey::new(&method, canonical_url(&policy, &url).as_url());
    let request = IncomingRequest {
        method,
        url: url.clone(),
        headers: HeaderMap::new(),
        body: Default::default(),
    };
    let outcome = handler.handle(request).await?;

    let directives = match handler.origin().directives.lock().ok().and_then(|slot| slot.clone()) {
        Some(d) => json!({
            "header": d.to_header_value(),
            "parsed": serde_json::to_value(&d)?,
        }),
        None => Value::Null,
    };

    Ok(json!({
        "url": url.as_str(),
        "stage": outcome.stage.as_str(),
        "status": outcome.response.status.as_u16(),
        "headers": headers_json(&outcome.response.headers),
        "origin_directives": directives,
        "cache_key": cache_key.as_str(),
        "cached_after_response": !outcome.deferred.is_empty(),
    }))
}

async fn fetch(url: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let res = client.get(url).send().await?;

    Ok(json!({
        "url": url,
        "status": res.status().as_u16(),
        "headers": headers_json(res.headers()),
    }))
}

fn headers_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.insert(name.as_str().to_string(), Value::String(value));
    }
    Value::Object(map)
}
