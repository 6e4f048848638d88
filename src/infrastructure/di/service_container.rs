//! Service container for dependency injection
//!
//! Wires up the menu service with its store.

use std::sync::Arc;

use crate::application::services::MenuService;
use crate::config::Settings;
use crate::infrastructure::traits::{JsonFileStore, MenuStore};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Menu store abstraction
    pub store: Arc<dyn MenuStore>,
}

impl ServiceContainer {
    /// Create a new service container backed by the configured menu file.
    pub fn new(settings: Settings) -> Self {
        let store = Arc::new(JsonFileStore::new(settings.menu_file.clone()));
        Self::with_deps(settings, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, store: Arc<dyn MenuStore>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, store }
    }

    /// Menu service with the store already loaded.
    pub fn menu_service(&self) -> InfraResult<MenuService> {
        let mut service = MenuService::new(Arc::clone(&self.store), &self.settings);
        service.load()?;
        Ok(service)
    }
}
