use crate::shared::ids::RepositoryFormat;

/// Resource kind a form instance is created for. Fixed for the form's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeTemplate {
    format: RepositoryFormat,
}

impl ResourceTypeTemplate {
    pub fn new(format: RepositoryFormat) -> Self {
        Self { format }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        RepositoryFormat::parse(raw.trim()).map(Self::new)
    }

    pub fn format(&self) -> &RepositoryFormat {
        &self.format
    }
}
