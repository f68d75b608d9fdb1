//! Locale-aware ordering of patch names.
//!
//! Patch names sort with the `en` collation at primary strength: case and
//! accents are ignored, so `apple`, `Apple` and `Äpple` compare equal and
//! keep their relative order.

use std::cmp::Ordering;

use icu::collator::{Collator, CollatorOptions, Strength};
use icu::locid::locale;

use autobank_shared::{AutoBankError, PatchTable, Result};

/// Case- and accent-insensitive comparator for patch names.
pub struct PatchCollator {
    collator: Collator,
}

impl PatchCollator {
    /// `en` collator at primary strength.
    pub fn new() -> Result<Self> {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Primary);
        let collator = Collator::try_new(&locale!("en").into(), options)
            .map_err(|e| AutoBankError::config(format!("collator unavailable: {e:?}")))?;
        Ok(Self { collator })
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        self.collator.compare(left, right)
    }

    /// Reorder the table's patches; equal names keep their encounter order.
    pub fn sort(&self, patches: &mut PatchTable) {
        patches.sort_by(|a, b| self.compare(a, b));
    }
}
