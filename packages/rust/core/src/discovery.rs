//! Sound-bank file discovery in the working directory.

use std::path::Path;

use tracing::{debug, warn};

use autobank_shared::{AutoBankError, Result};

/// List entries of `dir` whose name ends with `.<extension>`, ignoring case.
///
/// Names are returned in directory-listing order. Fails with
/// [`AutoBankError::NoInputFiles`] when nothing matches.
pub fn discover_inputs(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let suffix = format!(".{}", extension.to_lowercase());
    let entries = std::fs::read_dir(dir).map_err(|e| AutoBankError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AutoBankError::io(dir, e))?;
        match entry.file_name().into_string() {
            Ok(name) => {
                if name.to_lowercase().ends_with(&suffix) {
                    files.push(name);
                }
            }
            Err(raw) => warn!(?raw, "skipping entry with non UTF-8 name"),
        }
    }

    if files.is_empty() {
        return Err(AutoBankError::NoInputFiles {
            extension: extension.to_uppercase(),
        });
    }

    debug!(count = files.len(), "discovered input files");
    Ok(files)
}
