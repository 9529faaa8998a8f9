//! `scenec probe`: describe models on stdout.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::ConvertConfig;
use crate::model::ModelInfo;
use crate::probe::{Probe, ProbeOptions};

#[derive(Args, Debug)]
pub struct ProbeCommand {
    /// Directory all source keys are relative to. Defaults to the working
    /// directory.
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Option characters (`btrspud`, or `A` for all).
    #[arg(long, value_name = "OPTS")]
    options: Option<String>,

    /// Model files to describe.
    #[arg(required = true, value_name = "MODEL")]
    models: Vec<PathBuf>,
}

impl ProbeCommand {
    pub fn execute(self, settings: ConvertConfig) -> Result<()> {
        let mut settings = settings.merged(ConvertConfig {
            source_root: self.source_root,
            ..Default::default()
        });
        settings.source_root.get_or_insert_with(|| PathBuf::from("."));
        let convert = settings.build()?;
        let reader = convert.reader();
        let root = reader.asset_root().map(Path::to_path_buf).unwrap_or_default();

        let options = self.options.as_deref().or(settings.probe.as_deref()).unwrap_or_default();
        let probe = Probe::new(ProbeOptions::parse(options));

        for model in &self.models {
            let scene = reader
                .load_model(model)
                .with_context(|| format!("Failed to load {}", model.display()))?;
            let name = model
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let info = ModelInfo::new(root.clone(), name, scene);

            println!("{}", info.name());
            for line in probe.describe(&info) {
                println!("{line}");
            }
        }
        Ok(())
    }
}
