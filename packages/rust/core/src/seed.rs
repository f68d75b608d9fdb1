//! Seed documents: the configuration the patch table is merged into.
//!
//! Either the fixed router/init/fluidsynth header and footer, or a YAML
//! template read from the working directory.

use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use autobank_shared::{AutoBankError, PatchTable, Result, SeedMode};

/// Top-level key holding the patch table.
pub const PATCHES_KEY: &str = "patches";

// ---------------------------------------------------------------------------
// Static header/footer
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RouterRule {
    #[serde(rename = "type")]
    kind: &'static str,
    chan: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    par1: Option<u8>,
}

const fn cc(chan: &'static str, par1: u8) -> RouterRule {
    RouterRule {
        kind: "cc",
        chan,
        par1: Some(par1),
    }
}

const ROUTER_RULES: [RouterRule; 6] = [
    cc("1=2-6", 1),
    cc("1=2-10", 7),
    cc("1=2-6", 64),
    cc("1=2-16", 91),
    cc("1=2-16", 93),
    RouterRule {
        kind: "pbend",
        chan: "1=2-6",
        par1: None,
    },
];

const INIT_MESSAGES: [&str; 11] = [
    "cc:1:75:30",
    "cc:1:92:80",
    "cc:5:37:80",
    "cc:5:71:0",
    "cc:5:73:0",
    "cc:5:74:0",
    "cc:6:37:80",
    "cc:6:71:0",
    "cc:6:73:0",
    "cc:6:74:0",
    "cc:13:7:0",
];

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

// ---------------------------------------------------------------------------
// SeedDocument
// ---------------------------------------------------------------------------

/// A configuration document with its `patches` entry lifted out into a
/// [`PatchTable`] for accumulation.
///
/// The `patches` key keeps its slot in the document, so merging back never
/// moves unrelated keys.
#[derive(Debug, Clone)]
pub struct SeedDocument {
    document: Mapping,
    patches: PatchTable,
}

impl SeedDocument {
    /// Build the seed for `mode`, reading the template from `work_dir` when
    /// needed.
    pub fn load(mode: SeedMode, work_dir: &Path, template: &str) -> Result<Self> {
        match mode {
            SeedMode::Static => Self::static_header_footer(),
            SeedMode::Template => Self::load_template(&work_dir.join(template)),
        }
    }

    /// `router_rules`, an empty `patches`, then `init` and `fluidsettings`.
    pub fn static_header_footer() -> Result<Self> {
        let mut document = Mapping::new();
        document.insert(key("router_rules"), serde_yaml::to_value(&ROUTER_RULES)?);
        document.insert(key(PATCHES_KEY), Value::Mapping(Mapping::new()));

        let mut init = Mapping::new();
        init.insert(key("messages"), serde_yaml::to_value(INIT_MESSAGES)?);
        document.insert(key("init"), Value::Mapping(init));

        let mut fluidsettings = Mapping::new();
        fluidsettings.insert(key("synth.reverb.room-size"), Value::from(0.3));
        fluidsettings.insert(key("synth.reverb.damp"), Value::Null);
        document.insert(key("fluidsettings"), Value::Mapping(fluidsettings));

        Ok(Self {
            document,
            patches: PatchTable::new(),
        })
    }

    /// Read and parse a YAML template.
    pub fn load_template(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AutoBankError::io(path, e))?;
        info!(?path, "loaded template");

        let value: Value = serde_yaml::from_str(&content).map_err(|e| {
            AutoBankError::config(format!("failed to parse {}: {e}", path.display()))
        })?;
        Self::from_template(value)
    }

    /// Adopt an already parsed template.
    ///
    /// An empty document counts as an empty mapping. Existing patches are
    /// kept and later presets with the same name number after them.
    pub fn from_template(value: Value) -> Result<Self> {
        let mut document = match value {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => {
                return Err(AutoBankError::config(
                    "template must be a YAML mapping at the top level",
                ));
            }
        };

        let patches = match document.get_mut(PATCHES_KEY) {
            Some(slot) => match std::mem::replace(slot, Value::Mapping(Mapping::new())) {
                Value::Mapping(existing) => PatchTable::from_mapping(existing)?,
                Value::Null => PatchTable::new(),
                _ => {
                    return Err(AutoBankError::config(
                        "template key 'patches' must be a mapping",
                    ));
                }
            },
            None => {
                debug!("template has no patches key, starting empty");
                document.insert(key(PATCHES_KEY), Value::Mapping(Mapping::new()));
                PatchTable::new()
            }
        };

        Ok(Self { document, patches })
    }

    pub fn patches(&self) -> &PatchTable {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut PatchTable {
        &mut self.patches
    }

    /// Put the patch table back into its slot and return the full document.
    pub fn into_document(self) -> Mapping {
        let Self {
            mut document,
            patches,
        } = self;
        document.insert(key(PATCHES_KEY), Value::Mapping(patches.into_mapping()));
        document
    }
}
