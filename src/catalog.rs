use crate::strain::{StrainId, StrainRecord};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN_GENETICS_JSON: &str = include_str!("../assets/strain_genetics.json");

/// Read-only repository of strain records, keyed by id, kept in declaration
/// order. Constructed once and never mutated; the engine receives it by
/// injection so tests can run against small synthetic catalogs.
#[derive(Clone, Debug)]
pub struct StrainCatalog {
    records: Vec<StrainRecord>,
    index: HashMap<StrainId, usize>,
}

impl StrainCatalog {
    pub fn new(records: Vec<StrainRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if index.insert(record.id.clone(), pos).is_some() {
                return Err(anyhow!("Duplicate strain id '{}' in catalog", record.id));
            }
        }
        Ok(Self { records, index })
    }

    pub fn from_json_str(json_text: &str) -> Result<Self> {
        let records: Vec<StrainRecord> = serde_json::from_str(json_text)
            .map_err(|e| anyhow!("Catalog is not a JSON array of strain records: {e}"))?;
        Self::new(records)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Could not read catalog file '{}': {e}", path.display()))?;
        Self::from_json_str(&text)
            .map_err(|e| anyhow!("Bad catalog file '{}': {e}", path.display()))
    }

    pub fn lookup(&self, id: &str) -> Option<&StrainRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Records in catalog declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &StrainRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names_sorted(&self) -> Vec<String> {
        let mut ret: Vec<String> = self.records.iter().map(|r| r.id.clone()).collect();
        ret.sort();
        ret
    }

    /// Reports referential oddities: parent/child ids that name no record,
    /// and `parentRoles` keys that name no declared parent. Informational
    /// only; dangling references stay tolerated at expansion time.
    pub fn lint(&self) -> Vec<String> {
        let mut findings = vec![];
        for record in &self.records {
            for parent in &record.parents {
                if !self.contains(parent) {
                    findings.push(format!(
                        "Strain '{}' lists unknown parent '{}'",
                        record.id, parent
                    ));
                }
            }
            for child in &record.children {
                if !self.contains(child) {
                    findings.push(format!(
                        "Strain '{}' lists unknown child '{}'",
                        record.id, child
                    ));
                }
            }
            for role_key in record.parent_roles.keys() {
                if !record.parents.iter().any(|p| p == role_key) {
                    findings.push(format!(
                        "Strain '{}' assigns a role to '{}', which is not among its parents",
                        record.id, role_key
                    ));
                }
            }
        }
        findings.sort();
        findings
    }
}

impl Default for StrainCatalog {
    fn default() -> Self {
        Self::from_json_str(BUILTIN_GENETICS_JSON).expect("Builtin strain catalog is invalid")
    }
}
