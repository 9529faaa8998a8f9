//! `scenec convert`: rehome models into a target asset tree.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::ConvertConfig;
use crate::reader::ModelAssets;
use crate::utils::fs::write_json_file;

/// Move the first node named `node` into its own file named `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub node: String,
    pub name: String,
}

impl FromStr for Extraction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((node, name)) if !node.is_empty() && !name.is_empty() => Ok(Self {
                node: node.to_string(),
                name: name.to_string(),
            }),
            _ => Err(format!("expected NODE=NAME, got '{s}'")),
        }
    }
}

#[derive(Args, Debug)]
pub struct ConvertCommand {
    /// Directory all source keys are relative to.
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Directory to write into. Without it models are only probed.
    #[arg(long, value_name = "DIR")]
    target_root: Option<PathBuf>,

    /// Prefix under the target root, e.g. `Models/Door`.
    #[arg(long, value_name = "PATH")]
    target_path: Option<String>,

    /// Probe option characters (`btrspud`, or `A` for all).
    #[arg(long, value_name = "OPTS")]
    probe: Option<String>,

    /// Extract the first node named NODE into the model NAME. Repeatable.
    #[arg(long = "extract", value_name = "NODE=NAME")]
    extractions: Vec<Extraction>,

    /// Write a JSON report of every model's dependencies to FILE.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Model files to convert.
    #[arg(required = true, value_name = "MODEL")]
    models: Vec<PathBuf>,
}

impl ConvertCommand {
    fn overrides(&self) -> ConvertConfig {
        ConvertConfig {
            source_root: self.source_root.clone(),
            target_root: self.target_root.clone(),
            target_path: self.target_path.clone(),
            probe: self.probe.clone(),
            ..Default::default()
        }
    }

    pub fn execute(self, settings: ConvertConfig) -> Result<()> {
        let settings = settings.merged(self.overrides());
        let mut convert = settings.build()?;

        if settings.target_root.is_none() {
            info!("No target root given, probing only");
            if convert.probe_options().is_none() {
                convert.set_probe_options("");
            }
        }

        for extraction in self.extractions {
            let Extraction { node, name } = extraction;
            convert.add_processor(move |assets: &mut ModelAssets<'_>| {
                let info = assets.model();
                match info.find_first(&node) {
                    Some(id) => {
                        info.extract_submodel(id, &name)?;
                    }
                    None => warn!("No node named '{}' in {}", node, info.name()),
                }
                Ok(())
            });
        }

        let mut reports = Vec::with_capacity(self.models.len());
        for model in &self.models {
            let info = convert
                .convert(model)
                .with_context(|| format!("Failed to convert {}", model.display()))?;
            let report = info.report();
            if settings.target_root.is_some() {
                println!("{} {}", "Converted".green().bold(), model.display());
                print!("{report}");
            }
            reports.push(report);
        }

        if let Some(path) = &self.report {
            write_json_file(path, &reports)?;
            println!("{} {}", "Report written to".green(), path.display());
        }
        Ok(())
    }
}
