use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Accepts inline images alongside text.
    Vision,
    /// Honours a response schema with JSON output.
    StructuredText,
    /// Returns inline image parts.
    ImageOutput,
}

impl Capability {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vision => "vision",
            Self::StructuredText => "structured_text",
            Self::ImageOutput => "image_output",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<Capability>,
}

impl ModelSpec {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn capability_names(&self) -> Vec<&'static str> {
        self.capabilities.iter().map(|item| item.name()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    /// Models supporting every listed capability, in registration order.
    pub fn by_capabilities(&self, capabilities: &[Capability]) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| capabilities.iter().all(|item| model.supports(*item)))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capabilities: &[Capability]) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if capabilities.iter().all(|item| model.supports(*item)) {
            return Some(model.clone());
        }
        None
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str, capabilities: &[Capability]| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                provider: "gemini".to_string(),
                capabilities: capabilities.to_vec(),
            },
        );
    };

    insert(
        "gemini-2.5-flash",
        &[Capability::Vision, Capability::StructuredText],
    );
    insert(
        "gemini-2.5-pro",
        &[Capability::Vision, Capability::StructuredText],
    );
    insert(
        "gemini-2.0-flash",
        &[Capability::Vision, Capability::StructuredText],
    );
    insert("gemini-2.5-flash-image", &[Capability::ImageOutput]);
    insert("gemini-3-pro-image-preview", &[Capability::ImageOutput]);

    map
}
