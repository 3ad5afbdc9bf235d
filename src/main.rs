// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use std::env;
use std::time::Instant;
use the_buildchain::config::{load_config, EngineConfig, RuntimeBuilder};
use the_buildchain::demo::{self, items::ArtifactResult, items::LaunchMode};
use the_buildchain::engine::Lookup;
use tracing_subscriber::EnvFilter;

const DEFAULT_FINAL_ITEM: &str = "ArtifactResult";
const DEFAULT_LAUNCH_MODE: &str = "prod";

struct Args {
    plan_only: bool,
    mode: String,
    config_file: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        plan_only: false,
        mode: DEFAULT_LAUNCH_MODE.to_string(),
        config_file: None,
    };

    let mut raw = env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--plan" => args.plan_only = true,
            "--mode" => {
                args.mode = raw.next().context("--mode needs a value (prod, dev, test)")?;
            }
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            _ if args.config_file.is_none() => args.config_file = Some(arg.clone()),
            _ => bail!("only one config file may be given"),
        }
    }
    Ok(args)
}

fn usage() {
    eprintln!("Usage: the-buildchain [--plan] [--mode <prod|dev|test>] [config.yaml|config.toml]");
    eprintln!("Example: the-buildchain configs/demo.yaml");
    eprintln!("Example: the-buildchain --plan configs/demo.toml");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            usage();
            return Err(e);
        }
    };

    let config = match &args.config_file {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path))?,
        None => EngineConfig {
            final_items: vec![DEFAULT_FINAL_ITEM.to_string()],
            ..EngineConfig::default()
        },
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (chain, executor) = RuntimeBuilder::from_config(&config, demo::demo_chain()?)?;

    if args.plan_only {
        println!("{}", serde_json::to_string_pretty(&chain.plan())?);
        return Ok(());
    }

    println!("🚀 Build Chain");
    println!("═══════════════════════════════════");
    println!("📋 Configuration: {}", args.config_file.as_deref().unwrap_or("<built-in>"));
    println!("🔧 Strategy: {}", executor.strategy());
    println!("🧱 Steps: {} kept of {} registered", chain.step_count(), chain.registered_count());
    for (wave, steps) in chain.waves().iter().enumerate() {
        let ids: Vec<&str> = steps.iter().map(|id| id.as_str()).collect();
        println!("  wave {}: {}", wave, ids.join(", "));
    }

    let start = Instant::now();
    let result = chain
        .execution()
        .provide(LaunchMode(args.mode.clone()))
        .run_with(executor.as_ref())
        .await?;

    println!("\n📊 Execution Results:");
    println!("⏱️  Execution Time: {:?}", start.elapsed());
    println!("🔢 Steps Executed: {}", result.executed_steps().len());

    for item in chain.final_items() {
        match result.get(item) {
            Lookup::NotProduced => println!("  {}: not produced", item.short_name()),
            Lookup::Single(_) => println!("  {}: produced", item.short_name()),
            Lookup::Multi(values) => println!("  {}: {} value(s)", item.short_name(), values.len()),
            Lookup::Marker => println!("  {}: present", item.short_name()),
        }
    }

    if let Some(artifact) = result.consume::<ArtifactResult>() {
        println!("\n🎯 Artifact:");
        println!("{}", serde_json::to_string_pretty(artifact)?);
    }

    Ok(())
}
