use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use stepwise_core::Configuration;
use stepwise_engine::RunConfig;

use crate::demo;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
}

#[derive(Debug, Serialize)]
struct MemberConfigurations {
    label: String,
    configurations: Vec<Configuration>,
}

pub fn run(args: &ResolveArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let members = resolve_members(&config)?;
    println!("{}", serde_json::to_string_pretty(&members)?);
    Ok(())
}

fn resolve_members(config: &RunConfig) -> Result<Vec<MemberConfigurations>, Box<dyn Error>> {
    let base = demo::base_params().merged(&config.params);
    if config.variants.is_empty() {
        return Ok(vec![MemberConfigurations {
            label: "base".to_string(),
            configurations: base.resolve()?,
        }]);
    }
    let mut members = Vec::with_capacity(config.variants.len());
    for variant in &config.variants {
        members.push(MemberConfigurations {
            label: variant.label.clone(),
            configurations: base.merged(&variant.params).resolve()?,
        });
    }
    Ok(members)
}
