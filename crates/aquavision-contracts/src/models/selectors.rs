use super::registry::{Capability, ModelRegistry, ModelSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: ModelSpec,
    pub requested: Option<String>,
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("No models available for capabilities [{0}].")]
    NoCandidates(String),
}

#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    pub registry: ModelRegistry,
}

impl ModelSelector {
    pub fn new(registry: Option<ModelRegistry>) -> Self {
        Self {
            registry: registry.unwrap_or_default(),
        }
    }

    /// Picks the requested model when it has every capability, else the first
    /// registered model that does, recording why it fell back.
    pub fn select(
        &self,
        requested: Option<&str>,
        capabilities: &[Capability],
    ) -> Result<ModelSelection, SelectionError> {
        let wanted = capabilities
            .iter()
            .map(|item| item.name())
            .collect::<Vec<_>>()
            .join(", ");
        let requested = requested.map(str::trim).filter(|value| !value.is_empty());
        let fallback_reason = if let Some(requested_value) = requested {
            if let Some(model) = self.registry.ensure(requested_value, capabilities) {
                return Ok(ModelSelection {
                    model,
                    requested: Some(requested_value.to_string()),
                    fallback_reason: None,
                });
            }
            format!("Requested model '{requested_value}' unavailable for [{wanted}].")
        } else {
            "No model specified; using default.".to_string()
        };

        let Some(model) = self.registry.by_capabilities(capabilities).into_iter().next() else {
            return Err(SelectionError::NoCandidates(wanted));
        };
        Ok(ModelSelection {
            model,
            requested: requested.map(str::to_string),
            fallback_reason: Some(fallback_reason),
        })
    }
}
