//! Shared application state, built once at startup.

use std::sync::Arc;

use crate::catalog::{CatalogError, TemplateCatalog};
use crate::config::Config;
use crate::convert::{PdfConverter, SofficeConverter};
use crate::deliver::DeliveryCoordinator;
use crate::report::Reporter;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<DeliveryCoordinator>,
    pub reporter: Reporter,
    pub chat_token: String,
}

impl AppState {
    /// Wire the production stack: catalog from the configured directory,
    /// LibreOffice converter, webhook reporter. Fails fast on a catalog
    /// that does not validate.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let catalog = Arc::new(TemplateCatalog::load(&config.template_dir)?);
        let converter: Arc<dyn PdfConverter> = Arc::new(SofficeConverter::new(
            config.soffice_bin.clone(),
            config.convert_timeout,
        ));
        Ok(Self::with_parts(
            catalog,
            converter,
            Reporter::new(config.report_webhook_url.clone()),
            config.chat_token.clone(),
        ))
    }

    /// Assemble state from explicit parts. Tests use this to substitute a
    /// converter double.
    pub fn with_parts(
        catalog: Arc<TemplateCatalog>,
        converter: Arc<dyn PdfConverter>,
        reporter: Reporter,
        chat_token: String,
    ) -> Self {
        Self {
            coordinator: Arc::new(DeliveryCoordinator::new(catalog, converter)),
            reporter,
            chat_token,
        }
    }
}
