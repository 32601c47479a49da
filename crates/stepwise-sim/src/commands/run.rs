use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use stepwise_engine::{compare, Comparison, Dataset, Experiment, RunConfig, Simulation, SubsetSummary};
use tracing::info;

use crate::demo;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
}

#[derive(Debug, Serialize)]
struct RunReport {
    seed: u64,
    seed_label: Option<String>,
    timesteps: usize,
    runs: usize,
    members: Vec<String>,
    records: usize,
    summary: Vec<SubsetSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    comparison: Vec<Comparison>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let report = build_report(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_report(config: &RunConfig) -> Result<RunReport, Box<dyn Error>> {
    let model = demo::model()?.with_params(&config.params)?;

    let (members, dataset) = if config.variants.is_empty() {
        let dataset = Simulation::from_config(model, config).run()?;
        (vec!["base".to_string()], dataset)
    } else {
        let mut simulations = Vec::with_capacity(config.variants.len());
        for variant in &config.variants {
            simulations.push(Simulation::from_config(model.with_params(&variant.params)?, config));
        }
        let experiment = Experiment::new(simulations)
            .with_labels(config.variants.iter().map(|v| v.label.clone()));
        (experiment.labels().to_vec(), experiment.run()?)
    };
    info!(records = dataset.len(), members = members.len(), "run finished");

    Ok(RunReport {
        seed: config.seed_policy.master_seed,
        seed_label: config.seed_policy.label.clone(),
        timesteps: config.timesteps,
        runs: config.runs,
        comparison: first_pair(&dataset, members.len()),
        records: dataset.len(),
        summary: dataset.summarize(demo::METRICS),
        members,
    })
}

fn first_pair(dataset: &Dataset, members: usize) -> Vec<Comparison> {
    if members < 2 {
        return Vec::new();
    }
    compare(
        &dataset.for_simulation(0),
        &dataset.for_simulation(1),
        demo::OBJECTIVES,
    )
}
