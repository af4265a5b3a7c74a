//! Module error lookup table built from runtime metadata.

use crate::ClientError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use zkv_types::{ModuleError, ModuleErrorMeta};

/// One metadata entry, as served by the node gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleErrorEntry {
    pub pallet_index: u8,
    pub error_index: u8,
    #[serde(flatten)]
    pub meta: ModuleErrorMeta,
}

/// Maps `(pallet index, error variant)` to the error's metadata.
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    errors: HashMap<(u8, u8), ModuleErrorMeta>,
}

impl ErrorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one error variant.
    pub fn insert(&mut self, pallet_index: u8, error_index: u8, meta: ModuleErrorMeta) {
        self.errors.insert((pallet_index, error_index), meta);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_error(
        mut self,
        pallet_index: u8,
        error_index: u8,
        section: &str,
        name: &str,
        docs: &[&str],
    ) -> Self {
        self.insert(
            pallet_index,
            error_index,
            ModuleErrorMeta {
                section: section.to_string(),
                name: name.to_string(),
                docs: docs.iter().map(|d| d.to_string()).collect(),
            },
        );
        self
    }

    /// Find the metadata for a module error.
    pub fn find(&self, error: &ModuleError) -> Result<&ModuleErrorMeta, ClientError> {
        self.errors
            .get(&(error.index, error.variant()))
            .ok_or(ClientError::UnknownModuleError {
                index: error.index,
                variant: error.variant(),
            })
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl FromIterator<ModuleErrorEntry> for ErrorRegistry {
    fn from_iter<I: IntoIterator<Item = ModuleErrorEntry>>(iter: I) -> Self {
        let mut registry = Self::new();
        for entry in iter {
            registry.insert(entry.pallet_index, entry.error_index, entry.meta);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_registered_error() {
        let registry = ErrorRegistry::new().with_error(
            9,
            1,
            "settlementGroth16Pallet",
            "VerifyError",
            &["Proof verification failed."],
        );

        let meta = registry.find(&ModuleError::new(9, 1)).unwrap();
        assert_eq!(meta.name, "VerifyError");

        assert!(matches!(
            registry.find(&ModuleError::new(9, 2)),
            Err(ClientError::UnknownModuleError {
                index: 9,
                variant: 2
            })
        ));
    }

    #[test]
    fn test_collect_from_gateway_entries() {
        let json = r#"[
            {"pallet_index": 3, "error_index": 0, "section": "poe", "name": "TooEarly", "docs": []},
            {"pallet_index": 9, "error_index": 1, "section": "settlementFFlonkPallet", "name": "InvalidInput"}
        ]"#;
        let entries: Vec<ModuleErrorEntry> = serde_json::from_str(json).unwrap();
        let registry: ErrorRegistry = entries.into_iter().collect();
        assert_eq!(registry.len(), 2);
        assert!(registry.find(&ModuleError::new(3, 0)).is_ok());
    }
}
