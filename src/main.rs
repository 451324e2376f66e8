use std::{env, process};

use anyhow::Context;
use log::info;
use serde::Serialize;

use discriminative_lr::{
    LayerLrAssigner, RunConfig,
    manifest::Manifest,
    report::{log_summary, summarize},
};

#[derive(Serialize)]
struct BindingRecord<'a> {
    name: &'a str,
    lr: f32,
    params: Vec<&'a str>,
}

fn run(manifest_path: &str, config_path: &str) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("loading manifest {manifest_path}"))?;
    let config = RunConfig::load(config_path)
        .with_context(|| format!("loading run config {config_path}"))?;

    let store = manifest.build().context("building parameter store")?;

    let assigner = LayerLrAssigner::with_traversal(config.traversal);
    let bindings = assigner.assign_model(&store, &config.decay);
    info!(
        "assigned {} binding(s) from base_lr={} with multiplier={}",
        bindings.len(),
        config.decay.base_lr,
        config.decay.multiplier
    );

    log_summary(&summarize(&bindings));

    for binding in &bindings {
        let record = BindingRecord {
            name: &binding.name,
            lr: binding.lr,
            params: binding
                .params
                .iter()
                .filter_map(|&id| store.name(id))
                .collect(),
        };

        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <manifest.json> <config.json>", args[0]);
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2]) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
