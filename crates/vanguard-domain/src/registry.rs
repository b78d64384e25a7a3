//! Domain agent registry
//!
//! Agents are keyed by canonical id; human-facing vertical names resolve
//! through a fixed alias table. The registry is an ordinary value: build it
//! once at startup and hand it to whatever needs agent lookup.

use crate::agent::DomainAgent;
use crate::energy::EnergyAgent;
use crate::error::DomainError;
use crate::government::GovernmentAgent;
use crate::insurance::InsuranceAgent;
use crate::policy::DomainPolicies;
use crate::types::{DomainInput, DomainOutput};
use dashmap::DashMap;
use std::sync::Arc;

/// Vertical alias -> canonical agent id
const VERTICAL_ALIASES: &[(&str, &str)] = &[
    ("energy", "energy-agent"),
    ("oil-gas", "energy-agent"),
    ("oil-and-gas", "energy-agent"),
    ("oilgas", "energy-agent"),
    ("petroleum", "energy-agent"),
    ("mineral-rights", "energy-agent"),
    ("government", "government-agent"),
    ("federal", "government-agent"),
    ("govcon", "government-agent"),
    ("public-sector", "government-agent"),
    ("defense", "government-agent"),
    ("insurance", "insurance-agent"),
    ("p-and-c", "insurance-agent"),
    ("property-casualty", "insurance-agent"),
    ("claims", "insurance-agent"),
    ("underwriting", "insurance-agent"),
];

/// Canonical agent id for a vertical alias
///
/// Case-insensitive and trimmed; unknown names are returned as-is so a
/// canonical id can be passed where a vertical is expected.
#[must_use]
pub fn resolve_vertical(vertical: &str) -> String {
    let key = vertical.trim().to_lowercase();
    VERTICAL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key.clone(), |(_, id)| (*id).to_string())
}

/// Registry of domain agents
#[derive(Debug, Default)]
pub struct DomainAgentRegistry {
    agents: DashMap<String, Arc<dyn DomainAgent>>,
}

impl DomainAgentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with exactly one agent per domain
    ///
    /// # Errors
    /// `DomainError::Pattern` if an agent's pattern table fails to compile.
    pub fn with_default_agents(policies: &DomainPolicies) -> Result<Self, DomainError> {
        let registry = Self::new();
        registry.register(Arc::new(EnergyAgent::new(policies.energy.clone())?));
        registry.register(Arc::new(GovernmentAgent::new(policies.government.clone())?));
        registry.register(Arc::new(InsuranceAgent::new(policies.insurance.clone())?));
        Ok(registry)
    }

    /// Register an agent under its descriptor id; an existing entry is replaced
    pub fn register(&self, agent: Arc<dyn DomainAgent>) {
        let id = agent.descriptor().id.to_string();
        if self.agents.insert(id.clone(), agent).is_some() {
            tracing::warn!(agent = %id, "domain agent re-registered, previous instance replaced");
        } else {
            tracing::debug!(agent = %id, "domain agent registered");
        }
    }

    /// Agent by canonical id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn DomainAgent>> {
        self.agents.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Agent by vertical alias
    #[must_use]
    pub fn get_by_vertical(&self, vertical: &str) -> Option<Arc<dyn DomainAgent>> {
        self.get(&resolve_vertical(vertical))
    }

    /// Agents advertising `capability`, ordered by id
    #[must_use]
    pub fn find_by_capability(&self, capability: &str) -> Vec<Arc<dyn DomainAgent>> {
        let mut found: Vec<Arc<dyn DomainAgent>> = self
            .agents
            .iter()
            .filter(|entry| entry.value().descriptor().has_capability(capability))
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        found.sort_by_key(|agent| agent.descriptor().id);
        found
    }

    /// Agent for a vertical, failing when none is registered
    ///
    /// # Errors
    /// `DomainError::NotFound` naming the vertical.
    pub fn get_domain_agent(&self, vertical: &str) -> Result<Arc<dyn DomainAgent>, DomainError> {
        self.get_by_vertical(vertical)
            .ok_or_else(|| DomainError::NotFound(vertical.to_string()))
    }

    /// Look up the vertical's agent and process `input`
    ///
    /// # Errors
    /// `DomainError::NotFound` for an unknown vertical; agent errors propagate unchanged.
    pub async fn process_with_domain_agent(
        &self,
        vertical: &str,
        input: &DomainInput,
    ) -> Result<DomainOutput, DomainError> {
        let agent = self.get_domain_agent(vertical)?;
        agent.process(input).await
    }

    /// Registered ids, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.agents.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of registered agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// No agents registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Aliases resolving to `id`, in table order
    #[must_use]
    pub fn verticals_for(&self, id: &str) -> Vec<&'static str> {
        VERTICAL_ALIASES
            .iter()
            .filter(|(_, target)| *target == id)
            .map(|(alias, _)| *alias)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentType;

    fn registry() -> DomainAgentRegistry {
        DomainAgentRegistry::with_default_agents(&DomainPolicies::default()).unwrap()
    }

    #[test]
    fn default_agents_one_per_domain() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.ids(),
            vec!["energy-agent", "government-agent", "insurance-agent"]
        );
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        let registry = registry();
        let agent = registry.get_by_vertical("  Oil-Gas ").unwrap();
        assert_eq!(agent.descriptor().id, "energy-agent");
        assert_eq!(registry.get_by_vertical("FEDERAL").unwrap().descriptor().id, "government-agent");
    }

    #[test]
    fn canonical_id_works_as_vertical() {
        let registry = registry();
        assert!(registry.get_by_vertical("insurance-agent").is_some());
    }

    #[test]
    fn unknown_vertical_is_not_found() {
        let registry = registry();
        assert!(registry.get_by_vertical("aerospace").is_none());
        let err = registry.get_domain_agent("aerospace").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(ref v) if v == "aerospace"));
    }

    #[test]
    fn re_register_overwrites() {
        let registry = registry();
        let replacement = Arc::new(EnergyAgent::new(crate::policy::EnergyPolicy::default()).unwrap());
        registry.register(replacement);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn capability_search_is_sorted() {
        let registry = registry();
        let found = registry.find_by_capability("benchmarking");
        let ids: Vec<&str> = found.iter().map(|a| a.descriptor().id).collect();
        assert_eq!(ids, vec!["energy-agent", "insurance-agent"]);
        assert!(registry.find_by_capability("telepathy").is_empty());
    }

    #[test]
    fn verticals_for_lists_aliases() {
        let registry = registry();
        let aliases = registry.verticals_for("insurance-agent");
        assert!(aliases.contains(&"p-and-c"));
        assert_eq!(aliases.len(), 5);
    }

    #[tokio::test]
    async fn process_with_unknown_vertical_fails() {
        let registry = registry();
        let input = DomainInput::new(DocumentType::Lease, "text");
        let err = registry.process_with_domain_agent("maritime", &input).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn process_with_empty_content_is_validation_error() {
        let registry = registry();
        let input = DomainInput::new(DocumentType::Lease, "");
        let err = registry.process_with_domain_agent("energy", &input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
