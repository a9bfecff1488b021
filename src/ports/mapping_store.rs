//! Persistence port for the identifier → canonical symbol mapping.

use crate::domain::error::SignalError;
use std::collections::BTreeMap;

pub trait MappingStore {
    fn load(&self) -> Result<BTreeMap<String, String>, SignalError>;
    fn save(&self, mapping: &BTreeMap<String, String>) -> Result<(), SignalError>;
}
