//! CFOP rule table.
//!
//! The table is assembled through [`RuleTableBuilder`] and frozen into a
//! [`RuleTable`], which exposes lookups only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Expected codes for one CFOP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Normalized four-digit CFOP.
    pub cfop: String,
    /// Expected ICMS CST; `None` means no ICMS rule for this CFOP.
    pub icms_expected: Option<String>,
    /// Expected CST shared by PIS and COFINS.
    pub pis_cofins_expected: Option<String>,
    /// CFOP exactly as the rule table displays it.
    pub cfop_display: String,
}

/// Accumulates rule entries. Later entries for the same CFOP replace
/// earlier ones.
#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    entries: BTreeMap<String, RuleEntry>,
    overwritten: Vec<String>,
}

impl RuleTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the entry it replaced, if any.
    pub fn insert(&mut self, entry: RuleEntry) -> Option<RuleEntry> {
        let key = entry.cfop.clone();
        let previous = self.entries.insert(key.clone(), entry);
        if previous.is_some() && !self.overwritten.contains(&key) {
            self.overwritten.push(key);
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> RuleTable {
        RuleTable {
            entries: self.entries,
            overwritten: self.overwritten,
        }
    }
}

/// Immutable CFOP → expected-code lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    entries: BTreeMap<String, RuleEntry>,
    overwritten: Vec<String>,
}

impl RuleTable {
    /// Builds a table from entries in order (last occurrence wins).
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = RuleEntry>,
    {
        let mut builder = RuleTableBuilder::new();
        for entry in entries {
            builder.insert(entry);
        }
        builder.build()
    }

    /// Looks up a normalized CFOP. The empty CFOP never matches.
    pub fn get(&self, cfop: &str) -> Option<&RuleEntry> {
        if cfop.is_empty() {
            return None;
        }
        self.entries.get(cfop)
    }

    pub fn contains(&self, cfop: &str) -> bool {
        self.get(cfop).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by CFOP.
    pub fn iter(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.values()
    }

    /// CFOPs that appeared more than once in the source table, in the order
    /// the first repeat was seen.
    pub fn overwritten(&self) -> &[String] {
        &self.overwritten
    }
}
