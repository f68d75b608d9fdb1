//! Output writing: the configuration YAML and the run log.

use std::path::{Path, PathBuf};

use serde_yaml::Mapping;
use tracing::{debug, info};

use autobank_shared::{AutoBankError, Result, RunLog};

/// Extension of the generated configuration file.
pub const OUTPUT_EXTENSION: &str = "yaml";

/// `<basename of work_dir>.yaml`.
pub fn output_file_name(work_dir: &Path) -> Result<String> {
    let name = match work_dir.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            let resolved =
                std::fs::canonicalize(work_dir).map_err(|e| AutoBankError::io(work_dir, e))?;
            resolved.file_name().map(|n| n.to_os_string()).ok_or_else(|| {
                AutoBankError::config(format!(
                    "cannot derive an output name from {}",
                    resolved.display()
                ))
            })?
        }
    };

    let name = name.into_string().map_err(|raw| {
        AutoBankError::config(format!("directory name {raw:?} is not valid UTF-8"))
    })?;
    Ok(format!("{name}.{OUTPUT_EXTENSION}"))
}

/// Serialize the configuration document. Nested mappings indent by two spaces.
pub fn render_document(document: &Mapping) -> Result<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone)]
pub struct WrittenOutputs {
    pub config_path: PathBuf,
    pub log_path: PathBuf,
}

/// Overwrite both output files in `work_dir`.
pub fn write_outputs(
    work_dir: &Path,
    config_name: &str,
    yaml: &str,
    log_name: &str,
    log: &RunLog,
) -> Result<WrittenOutputs> {
    let config_path = work_dir.join(config_name);
    std::fs::write(&config_path, yaml).map_err(|e| AutoBankError::io(&config_path, e))?;
    debug!(path = ?config_path, bytes = yaml.len(), "wrote configuration");

    let log_path = work_dir.join(log_name);
    std::fs::write(&log_path, log.render()).map_err(|e| AutoBankError::io(&log_path, e))?;
    info!(config = ?config_path, log = ?log_path, "outputs written");

    Ok(WrittenOutputs {
        config_path,
        log_path,
    })
}
