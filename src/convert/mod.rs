//! Conversion pipeline: load a model, run processors over it, write it out.
//!
//! Processors run in a fixed order for every model: the probe first, then
//! user processors in the order they were added, and the writer last.
//!
//! ```rust,no_run
//! use scenec_cli::convert::Convert;
//! use scenec_cli::reader::AssetReader;
//! use std::path::Path;
//!
//! # fn example() -> scenec_cli::core::Result<()> {
//! let mut convert = Convert::new(AssetReader::new(Path::new("downloads/door"))?);
//! convert.set_target_root("assets");
//! convert.set_target_asset_path("Models/Door");
//! convert.add_processor(|assets: &mut scenec_cli::reader::ModelAssets<'_>| {
//!     let info = assets.model();
//!     if let Some(handle) = info.find_first("handle") {
//!         info.extract_submodel(handle, "handle")?;
//!     }
//!     Ok(())
//! });
//! let info = convert.convert(Path::new("downloads/door/door.scn"))?;
//! println!("{}", info.report());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::{ConvertError, Result};
use crate::model::ModelInfo;
use crate::probe::{Probe, ProbeOptions};
use crate::reader::{AssetReader, ModelAssets};
use crate::writer::AssetWriter;

/// A step applied to every converted model.
pub trait ModelProcessor {
    fn apply(&mut self, assets: &mut ModelAssets<'_>) -> Result<()>;
}

impl<F> ModelProcessor for F
where
    F: FnMut(&mut ModelAssets<'_>) -> Result<()>,
{
    fn apply(&mut self, assets: &mut ModelAssets<'_>) -> Result<()> {
        self(assets)
    }
}

/// Drives the conversion of one or more models.
pub struct Convert {
    reader: AssetReader,
    probe: Option<Probe>,
    processors: Vec<Box<dyn ModelProcessor>>,
    writer: Option<AssetWriter>,
    asset_path: Option<String>,
}

impl Convert {
    #[must_use]
    pub fn new(reader: AssetReader) -> Self {
        Self {
            reader,
            probe: None,
            processors: Vec::new(),
            writer: None,
            asset_path: None,
        }
    }

    #[must_use]
    pub fn reader(&self) -> &AssetReader {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut AssetReader {
        &mut self.reader
    }

    pub fn set_source_root(&mut self, root: &Path) -> Result<()> {
        self.reader.set_asset_root(root)
    }

    /// Enable writing into `target_root`.
    pub fn set_target_root(&mut self, target_root: impl Into<PathBuf>) {
        match &mut self.writer {
            Some(writer) => writer.set_target_root(target_root),
            None => {
                let mut writer = AssetWriter::new(target_root);
                writer.set_asset_path(self.asset_path.clone());
                self.writer = Some(writer);
            }
        }
    }

    /// Prefix for everything written below the target root.
    pub fn set_target_asset_path(&mut self, asset_path: impl Into<String>) {
        let asset_path = asset_path.into();
        if let Some(writer) = &mut self.writer {
            writer.set_asset_path(Some(asset_path.clone()));
        }
        self.asset_path = Some(asset_path);
    }

    #[must_use]
    pub fn writer(&self) -> Option<&AssetWriter> {
        self.writer.as_ref()
    }

    pub fn writer_mut(&mut self) -> Option<&mut AssetWriter> {
        self.writer.as_mut()
    }

    /// Turn on probe output. Options accumulate over calls.
    pub fn set_probe_options(&mut self, options: &str) {
        self.probe.get_or_insert_with(Probe::default).options_mut().merge(options);
    }

    #[must_use]
    pub fn probe_options(&self) -> Option<ProbeOptions> {
        self.probe.as_ref().map(Probe::options)
    }

    /// Add a processor. It runs after the probe and before the writer.
    pub fn add_processor(&mut self, processor: impl ModelProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    pub fn clear_processors(&mut self) {
        self.processors.clear();
    }

    /// Load `file` and run every processor over it.
    pub fn convert(&mut self, file: &Path) -> Result<ModelInfo> {
        if self.reader.asset_root().is_none() {
            warn!("No source root specified, using local directory.");
            self.reader.set_asset_root(Path::new("."))?;
        }
        info!("Convert: {}", file.display());

        let scene = self.reader.load_model(file)?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ConvertError::invalid_argument(format!("{} names no file", file.display())))?;
        let root = self.reader.asset_root().map(Path::to_path_buf).unwrap_or_default();

        let mut info = ModelInfo::new(root, name, scene);
        self.run_processors(&mut info)?;
        Ok(info)
    }

    pub fn run_processors(&mut self, info: &mut ModelInfo) -> Result<()> {
        if self.probe.is_none() && self.processors.is_empty() && self.writer.is_none() {
            warn!("No output configured, probing instead.");
            self.probe = Some(Probe::default());
        }
        info!("Processing: {}", info.name());

        let mut assets = ModelAssets::new(&self.reader, info);
        if let Some(probe) = &mut self.probe {
            probe.apply(&mut assets)?;
        }
        for processor in &mut self.processors {
            processor.apply(&mut assets)?;
        }
        if let Some(writer) = &mut self.writer {
            writer.apply(&mut assets)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Convert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Convert")
            .field("reader", &self.reader)
            .field("probe", &self.probe)
            .field("processors", &self.processors.len())
            .field("writer", &self.writer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::tempdir;

    const MODEL: &str = r#"{"root": {"name": "box", "node": {"group": {"children": [
        {"name": "lid", "node": {"group": {}}}
    ]}}}}"#;

    #[test]
    fn test_processors_run_before_writer() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        fs::write(source.path().join("box.scn"), MODEL).unwrap();

        let mut convert = Convert::new(AssetReader::new(source.path()).unwrap());
        convert.set_target_root(target.path());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        convert.add_processor(move |assets: &mut ModelAssets<'_>| {
            // Nothing has been written yet
            log.borrow_mut().push(assets.info().name().to_string());
            let lid = assets.model().find_first("lid").expect("lid");
            assets.model().extract_submodel(lid, "lid")?;
            Ok(())
        });

        let info = convert.convert(&source.path().join("box.scn")).unwrap();
        assert_eq!(seen.borrow().as_slice(), ["box.scn"]);
        assert!(target.path().join("box.scn").is_file());
        assert!(target.path().join("lid.scn").is_file());
        assert_eq!(info.report().generated_count(), 1);
    }

    #[test]
    fn test_asset_path_applies_to_later_writer() {
        let mut convert = Convert::new(AssetReader::default());
        convert.set_target_asset_path("Models/Box");
        convert.set_target_root("/out");
        assert_eq!(convert.writer().unwrap().asset_path(), Some("Models/Box"));
    }

    #[test]
    fn test_probe_options_accumulate() {
        let mut convert = Convert::new(AssetReader::default());
        assert!(convert.probe_options().is_none());
        convert.set_probe_options("b");
        convert.set_probe_options("d");
        let options = convert.probe_options().unwrap();
        assert!(options.bounds && options.dependencies);
    }

    #[test]
    fn test_default_probe_when_nothing_configured() {
        let source = tempdir().unwrap();
        fs::write(source.path().join("box.scn"), MODEL).unwrap();
        let mut convert = Convert::new(AssetReader::new(source.path()).unwrap());
        convert.convert(&source.path().join("box.scn")).unwrap();
        assert_eq!(convert.probe_options(), Some(ProbeOptions::default()));
    }
}
