//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::SourceKind;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    source: SourceInfo,
    queue: QueueInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    batch_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    streams: Vec<String>,
}

#[derive(Serialize)]
struct QueueInfo {
    buffer_size: usize,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let plan = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&plan, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&plan, args);
    }

    Ok(())
}

fn build_config_info(plan: &contracts::DispatchPlan, args: &InfoArgs) -> ConfigInfo {
    let source = match plan.source.kind {
        SourceKind::Synthetic => SourceInfo {
            kind: "synthetic".to_string(),
            batch_size: plan.source.batch_size,
            rate_hz: Some(plan.source.rate_hz),
            path: None,
            speed: None,
            streams: if args.streams {
                plan.source.streams.clone()
            } else {
                Vec::new()
            },
        },
        SourceKind::Replay => SourceInfo {
            kind: "replay".to_string(),
            batch_size: plan.source.batch_size,
            rate_hz: None,
            path: plan.source.path.as_ref().map(|p| p.display().to_string()),
            speed: Some(plan.source.speed),
            streams: Vec::new(),
        },
    };

    let sinks = if args.sinks {
        plan.sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                params: s.params.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", plan.version),
        source,
        queue: QueueInfo {
            buffer_size: plan.queue.buffer_size,
        },
        sinks,
    }
}

fn print_config_info(plan: &contracts::DispatchPlan, args: &InfoArgs) {
    println!("\n=== Configuration: {} ===\n", args.config.display());
    println!("Version: {:?}", plan.version);

    println!("\nSource:");
    println!("  Kind: {:?}", plan.source.kind);
    println!("  Batch size: {}", plan.source.batch_size);
    match plan.source.kind {
        SourceKind::Synthetic => {
            println!("  Rate: {} Hz", plan.source.rate_hz);
            if args.streams {
                println!("  Streams ({}):", plan.source.streams.len());
                for stream in &plan.source.streams {
                    println!("    - {}", stream);
                }
            } else {
                println!("  Streams: {}", plan.source.streams.len());
            }
        }
        SourceKind::Replay => {
            if let Some(ref path) = plan.source.path {
                println!("  Path: {}", path.display());
            }
            println!("  Speed: {}x", plan.source.speed);
        }
    }

    println!("\nQueue:");
    println!("  Buffer size: {}", plan.queue.buffer_size);

    println!("\nSinks ({}):", plan.sinks.len());
    for sink in &plan.sinks {
        println!("  - {} ({:?})", sink.name, sink.sink_type);
        if args.sinks {
            for (key, value) in &sink.params {
                println!("      {}: {}", key, value);
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_config_info_json_shape() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[source]
kind = "synthetic"
streams = ["alpha", "beta"]

[[sinks]]
name = "log"
sink_type = "log"
"#
        )
        .unwrap();
        file.flush().unwrap();

        let plan = config_loader::ConfigLoader::load_from_path(file.path()).unwrap();
        let args = InfoArgs {
            config: file.path().to_path_buf(),
            json: true,
            streams: true,
            sinks: true,
        };

        let info = build_config_info(&plan, &args);
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"kind\":\"synthetic\""));
        assert!(json.contains("alpha"));
        assert!(json.contains("\"sink_type\":\"Log\""));
    }
}
