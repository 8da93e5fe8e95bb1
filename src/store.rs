/// In-memory provider directory.
///
/// Owns every `Provider` the engine knows about. Construct it on startup
/// (usually from configuration) and `clear` it between test runs.

use crate::error::{Result, ScheduleError};
use crate::models::Provider;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ProviderDirectory {
    providers: HashMap<String, Provider>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory, rejecting invalid providers and duplicate ids.
    pub fn from_providers(providers: impl IntoIterator<Item = Provider>) -> Result<Self> {
        let mut directory = Self::new();
        for provider in providers {
            provider.validate()?;
            if directory.contains(&provider.id) {
                return Err(ScheduleError::InvalidProvider {
                    message: format!("Duplicate provider id: {}", provider.id),
                });
            }
            directory.insert(provider);
        }
        Ok(directory)
    }

    /// Add or replace a provider, returning the previous entry.
    pub fn insert(&mut self, provider: Provider) -> Option<Provider> {
        self.providers.insert(provider.id.clone(), provider)
    }

    pub fn get(&self, provider_id: &str) -> Option<&Provider> {
        self.providers.get(provider_id)
    }

    pub fn get_mut(&mut self, provider_id: &str) -> Option<&mut Provider> {
        self.providers.get_mut(provider_id)
    }

    pub fn require(&self, provider_id: &str) -> Result<&Provider> {
        self.get(provider_id)
            .ok_or_else(|| ScheduleError::ProviderNotFound(provider_id.to_string()))
    }

    pub fn require_mut(&mut self, provider_id: &str) -> Result<&mut Provider> {
        self.get_mut(provider_id)
            .ok_or_else(|| ScheduleError::ProviderNotFound(provider_id.to_string()))
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.providers.contains_key(provider_id)
    }

    /// All providers sorted by id.
    pub fn providers(&self) -> Vec<&Provider> {
        let mut providers: Vec<&Provider> = self.providers.values().collect();
        providers.sort_by(|a, b| a.id.cmp(&b.id));
        providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn clear(&mut self) {
        self.providers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: &str) -> Provider {
        Provider::new(id.to_string(), format!("Dr. {}", id), "General Practice".to_string()).unwrap()
    }

    #[test]
    fn test_from_providers_rejects_duplicates() {
        let result = ProviderDirectory::from_providers(vec![provider("p1"), provider("p1")]);
        assert!(matches!(result, Err(ScheduleError::InvalidProvider { .. })));
    }

    #[test]
    fn test_lookup_and_listing() {
        let mut directory =
            ProviderDirectory::from_providers(vec![provider("p2"), provider("p1")]).unwrap();
        assert_eq!(directory.len(), 2);
        let ids: Vec<&str> = directory.providers().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);

        assert!(directory.require("p1").is_ok());
        assert!(matches!(
            directory.require("missing"),
            Err(ScheduleError::ProviderNotFound(id)) if id == "missing"
        ));

        directory.clear();
        assert!(directory.is_empty());
    }
}
