//! Template catalog - the set of documents this server can produce.
//!
//! The catalog is loaded once at startup by scanning the template directory
//! and is immutable afterwards, so it can be shared behind an `Arc` across
//! concurrent requests without locking.

pub mod loader;
pub mod model;

pub use loader::TemplateCatalog;
pub use model::{FieldSpec, FieldType, TemplateDescriptor};

use thiserror::Error;

/// Errors raised by the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Fatal at startup: the catalog must not come up against templates it
    /// cannot validate.
    #[error("failed to load template '{template}': {reason}")]
    Load { template: String, reason: String },
    #[error("failed to read template directory: {0}")]
    DirIo(#[source] std::io::Error),
    /// Recoverable: the user asked for a template id that does not exist.
    #[error("unknown template id '{0}'")]
    NotFound(String),
}

impl CatalogError {
    pub fn load(template: &str, reason: impl Into<String>) -> Self {
        Self::Load {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
