//! Core domain types: preset records, the patch table, and the run log.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{AutoBankError, Result};

/// Placeholder patch name for presets the parser returns without one.
pub const UNNAMED_PATCH: &str = "Unnamed";

// ---------------------------------------------------------------------------
// PresetRecord
// ---------------------------------------------------------------------------

/// One preset as reported by the external parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRecord {
    /// Display name. May be missing, `null`, or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Program number.
    pub preset: u32,
    /// Bank number.
    pub bank: u32,
}

impl PresetRecord {
    /// Name used as the patch key, falling back to [`UNNAMED_PATCH`].
    pub fn effective_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNNAMED_PATCH,
        }
    }

    /// Reference string pointing at this preset inside `file`.
    pub fn reference(&self, file: &str) -> String {
        reference_string(file, self.preset, self.bank)
    }
}

/// Format `<file>:<preset>:<bank>` with both numbers zero-padded to at least
/// three digits.
pub fn reference_string(file: &str, preset: u32, bank: u32) -> String {
    format!("{file}:{preset:03}:{bank:03}")
}

// ---------------------------------------------------------------------------
// PatchTable
// ---------------------------------------------------------------------------

/// All instances collected under one patch name.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    name: String,
    instances: Mapping,
    next_index: u64,
}

impl Patch {
    fn new(name: String) -> Self {
        Self {
            name,
            instances: Mapping::new(),
            next_index: 1,
        }
    }

    /// Adopt an instance map that already exists in a template.
    ///
    /// Numbering continues after the highest numeric key, or after the entry
    /// count when that is larger, so seeded entries are never overwritten.
    fn seeded(name: String, instances: Mapping) -> Self {
        let highest = instances
            .keys()
            .filter_map(|key| match key {
                Value::String(s) => s.parse::<u64>().ok(),
                Value::Number(n) => n.as_u64(),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        let next_index = highest.max(instances.len() as u64) + 1;
        Self {
            name,
            instances,
            next_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instance map in insertion order (`"1"`, `"2"`, ...).
    pub fn instances(&self) -> &Mapping {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Reference stored under a 1-based index.
    pub fn get(&self, index: u64) -> Option<&str> {
        self.instances
            .get(Value::String(index.to_string()))
            .and_then(Value::as_str)
    }

    fn push(&mut self, reference: String) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        self.instances
            .insert(Value::String(index.to_string()), Value::String(reference));
        index
    }
}

/// Patch name to instance map, in first-seen order until [`PatchTable::sort_by`].
///
/// Index counters live on each [`Patch`], so numbering for a name carries on
/// across every file processed in a run.
#[derive(Debug, Clone, Default)]
pub struct PatchTable {
    patches: Vec<Patch>,
    positions: HashMap<String, usize>,
}

impl PatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an existing `patches` mapping (e.g. from a template).
    pub fn from_mapping(mapping: Mapping) -> Result<Self> {
        let mut table = Self::new();
        for (key, value) in mapping {
            let name = match key {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(AutoBankError::config(format!(
                        "unsupported patch name in template: {other:?}"
                    )));
                }
            };
            let instances = match value {
                Value::Mapping(m) => m,
                Value::Null => Mapping::new(),
                _ => {
                    return Err(AutoBankError::config(format!(
                        "template patch '{name}' is not a mapping"
                    )));
                }
            };
            table.positions.insert(name.clone(), table.patches.len());
            table.patches.push(Patch::seeded(name, instances));
        }
        Ok(table)
    }

    /// Append `reference` under `name`, creating the patch on first use.
    /// Returns the 1-based index it was stored under.
    pub fn insert(&mut self, name: &str, reference: String) -> u64 {
        let position = match self.positions.get(name) {
            Some(&position) => position,
            None => {
                let position = self.patches.len();
                self.patches.push(Patch::new(name.to_string()));
                self.positions.insert(name.to_string(), position);
                position
            }
        };
        self.patches[position].push(reference)
    }

    /// Record one parsed preset found in `file`.
    pub fn record(&mut self, file: &str, preset: &PresetRecord) -> u64 {
        self.insert(preset.effective_name(), preset.reference(file))
    }

    pub fn get(&self, name: &str) -> Option<&Patch> {
        self.positions.get(name).map(|&i| &self.patches[i])
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }

    /// Patch names in current order.
    pub fn names(&self) -> Vec<&str> {
        self.patches.iter().map(Patch::name).collect()
    }

    /// Stable sort of patches by name. Instance maps are left as they are.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&str, &str) -> Ordering,
    {
        self.patches.sort_by(|a, b| compare(&a.name, &b.name));
        self.positions = self
            .patches
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
    }

    /// Convert into the YAML mapping written under `patches`.
    pub fn into_mapping(self) -> Mapping {
        self.patches
            .into_iter()
            .map(|p| (Value::String(p.name), Value::Mapping(p.instances)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// RunLog
// ---------------------------------------------------------------------------

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    Processed { file: String },
    Skipped { file: String, reason: String },
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processed { file } => write!(f, "Processed {file}"),
            Self::Skipped { file, reason } => write!(f, "Skipped {file}: {reason}"),
        }
    }
}

/// Append-only per-file log, written once at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&mut self, file: impl Into<String>) {
        self.entries.push(LogEntry::Processed { file: file.into() });
    }

    pub fn skipped(&mut self, file: impl Into<String>, reason: impl Into<String>) {
        self.entries.push(LogEntry::Skipped {
            file: file.into(),
            reason: reason.into(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rendered lines, one per file.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Newline-joined text with no trailing newline.
    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(name: Option<&str>, preset: u32, bank: u32) -> PresetRecord {
        PresetRecord {
            name: name.map(String::from),
            preset,
            bank,
        }
    }

    #[test]
    fn reference_string_pads_to_three_digits() {
        assert_eq!(reference_string("organ.sf2", 7, 0), "organ.sf2:007:000");
        assert_eq!(reference_string("a.sf2", 127, 128), "a.sf2:127:128");
    }

    #[test]
    fn reference_string_widens_without_truncation() {
        assert_eq!(reference_string("a.sf2", 1000, 12345), "a.sf2:1000:12345");
    }

    #[test]
    fn preset_record_deserializes_parser_output() {
        let json = r#"[
            {"name": "Piano", "preset": 0, "bank": 0},
            {"preset": 3, "bank": 1},
            {"name": null, "preset": 4, "bank": 1},
            {"name": "", "preset": 5, "bank": 1}
        ]"#;
        let records: Vec<PresetRecord> = serde_json::from_str(json).expect("parse");
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].effective_name(), "Piano");
        assert_eq!(records[1].effective_name(), UNNAMED_PATCH);
        assert_eq!(records[2].effective_name(), UNNAMED_PATCH);
        assert_eq!(records[3].effective_name(), UNNAMED_PATCH);
    }

    #[test]
    fn negative_program_number_is_rejected() {
        let json = r#"[{"name": "X", "preset": -1, "bank": 0}]"#;
        assert!(serde_json::from_str::<Vec<PresetRecord>>(json).is_err());
    }

    #[test]
    fn indices_continue_across_files() {
        let mut table = PatchTable::new();
        assert_eq!(table.record("a.sf2", &preset(Some("Piano"), 0, 0)), 1);
        assert_eq!(table.record("a.sf2", &preset(Some("Strings"), 48, 0)), 1);
        assert_eq!(table.record("a.sf2", &preset(Some("Piano"), 1, 0)), 2);
        assert_eq!(table.record("b.sf2", &preset(Some("Piano"), 0, 8)), 3);

        let piano = table.get("Piano").expect("piano");
        assert_eq!(piano.len(), 3);
        assert_eq!(piano.get(1), Some("a.sf2:000:000"));
        assert_eq!(piano.get(2), Some("a.sf2:001:000"));
        assert_eq!(piano.get(3), Some("b.sf2:000:008"));
        assert_eq!(table.names(), vec!["Piano", "Strings"]);
    }

    #[test]
    fn names_are_case_sensitive_keys() {
        let mut table = PatchTable::new();
        table.insert("piano", "a.sf2:000:000".into());
        table.insert("Piano", "a.sf2:001:000".into());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("piano").map(Patch::len), Some(1));
    }

    #[test]
    fn sort_rebuilds_lookup() {
        let mut table = PatchTable::new();
        table.insert("b", "x.sf2:000:000".into());
        table.insert("a", "x.sf2:001:000".into());
        table.sort_by(|l, r| l.cmp(r));
        assert_eq!(table.names(), vec!["a", "b"]);

        assert_eq!(table.insert("b", "x.sf2:002:000".into()), 2);
        assert_eq!(table.get("b").map(Patch::len), Some(2));
    }

    #[test]
    fn into_mapping_keeps_string_indices() {
        let mut table = PatchTable::new();
        table.insert("Piano", "a.sf2:000:000".into());
        let mapping = table.into_mapping();
        let piano = mapping
            .get(Value::String("Piano".into()))
            .and_then(Value::as_mapping)
            .expect("piano mapping");
        let (key, value) = piano.iter().next().expect("one instance");
        assert_eq!(key, &Value::String("1".into()));
        assert_eq!(value.as_str(), Some("a.sf2:000:000"));
    }

    #[test]
    fn seeded_patches_continue_numbering() {
        let seed: Mapping =
            serde_yaml::from_str("Piano:\n  '1': old.sf2:000:000\n  '2': old.sf2:001:000\n")
                .expect("yaml");
        let mut table = PatchTable::from_mapping(seed).expect("seed");
        assert_eq!(table.insert("Piano", "a.sf2:002:000".into()), 3);
        assert_eq!(table.insert("Organ", "a.sf2:016:000".into()), 1);
    }

    #[test]
    fn seeded_patch_must_be_mapping() {
        let seed: Mapping = serde_yaml::from_str("Piano: a.sf2:000:000\n").expect("yaml");
        let err = PatchTable::from_mapping(seed).unwrap_err();
        assert!(err.to_string().contains("not a mapping"));
    }

    #[test]
    fn run_log_renders_without_trailing_newline() {
        let mut log = RunLog::new();
        log.processed("a.sf2");
        log.skipped("b.sf2", "No presets found.");
        assert_eq!(log.len(), 2);
        assert_eq!(
            log.render(),
            "Processed a.sf2\nSkipped b.sf2: No presets found."
        );
    }
}
