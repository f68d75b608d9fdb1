//! End-to-end bank build: discover → parse → accumulate → merge → sort → emit.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, instrument, warn};

use autobank_shared::{BuildConfig, LogEntry, PatchTable, Result, RunLog};

use crate::collate::PatchCollator;
use crate::discovery::discover_inputs;
use crate::emit::{output_file_name, render_document, write_outputs};
use crate::parser::PresetParser;
use crate::seed::SeedDocument;

/// Log reason for a file that parsed cleanly but held no presets.
pub const NO_PRESETS_FOUND: &str = "No presets found.";

/// Result of a [`build_bank`] run.
#[derive(Debug)]
pub struct BankResult {
    /// Path of the written configuration document.
    pub config_path: PathBuf,
    /// Path of the written run log.
    pub log_path: PathBuf,
    /// Per-file outcomes, in discovery order.
    pub run_log: RunLog,
    /// Number of distinct patch names in the output.
    pub patch_count: usize,
    /// Files that contributed presets.
    pub files_processed: usize,
    /// Files that were skipped.
    pub files_skipped: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting build status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a file is handed to the parser.
    fn file_started(&self, file: &str, current: usize, total: usize);
    /// Called when the build completes.
    fn done(&self, result: &BankResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_started(&self, _file: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BankResult) {}
}

/// Run the full build in `work_dir`.
///
/// 1. Seed: static header/footer or template
/// 2. Discover input files
/// 3. Parse each file in order and fold presets into the patch table
/// 4. Sort patch names
/// 5. Write the configuration document and the run log
///
/// Nothing is written if a step before 5 fails. Per-file parser failures
/// only produce a log line.
#[instrument(skip_all, fields(dir = %work_dir.display(), seed = %config.seed))]
pub async fn build_bank<P: PresetParser>(
    work_dir: &Path,
    config: &BuildConfig,
    parser: &P,
    progress: &dyn ProgressReporter,
) -> Result<BankResult> {
    let start = Instant::now();
    let output_name = output_file_name(work_dir)?;

    // --- Phase 1: Seed ---
    progress.phase("Preparing configuration");
    let mut seed = SeedDocument::load(config.seed, work_dir, &config.template)?;
    let collator = PatchCollator::new()?;

    // --- Phase 2: Discovery ---
    progress.phase("Discovering sound banks");
    let files = discover_inputs(work_dir, &config.extension)?;
    info!(count = files.len(), "found sound banks");

    // --- Phase 3: Parse + accumulate ---
    let run_log = accumulate(&files, parser, seed.patches_mut(), progress).await;

    // --- Phase 4: Sort ---
    progress.phase("Sorting patches");
    collator.sort(seed.patches_mut());
    let patch_count = seed.patches().len();

    // --- Phase 5: Emit ---
    progress.phase("Writing outputs");
    let yaml = render_document(&seed.into_document())?;
    let written = write_outputs(work_dir, &output_name, &yaml, &config.log_file, &run_log)?;

    let files_processed = run_log
        .entries()
        .iter()
        .filter(|e| matches!(e, LogEntry::Processed { .. }))
        .count();

    let result = BankResult {
        config_path: written.config_path,
        log_path: written.log_path,
        files_skipped: run_log.len() - files_processed,
        files_processed,
        run_log,
        patch_count,
        elapsed: start.elapsed(),
    };

    info!(
        patches = result.patch_count,
        processed = result.files_processed,
        skipped = result.files_skipped,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "bank build complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Parse `files` one at a time and record their presets into `patches`.
///
/// Returns one log entry per file. Parser errors never escape.
pub async fn accumulate<P: PresetParser>(
    files: &[String],
    parser: &P,
    patches: &mut PatchTable,
    progress: &dyn ProgressReporter,
) -> RunLog {
    let mut log = RunLog::new();
    let total = files.len();

    for (i, file) in files.iter().enumerate() {
        progress.file_started(file, i + 1, total);

        match parser.parse(file).await {
            Ok(presets) if presets.is_empty() => {
                info!(%file, "no presets found");
                log.skipped(file, NO_PRESETS_FOUND);
            }
            Ok(presets) => {
                for preset in &presets {
                    patches.record(file, preset);
                }
                info!(%file, presets = presets.len(), "processed");
                log.processed(file);
            }
            Err(e) => {
                warn!(%file, error = %e, "parse failed, skipping file");
                log.skipped(file, e.to_string());
            }
        }
    }

    log
}
