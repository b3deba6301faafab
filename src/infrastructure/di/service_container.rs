//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{LineService, StationService};
use crate::config::Settings;
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::store::Store;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Station and line storage
    pub store: Arc<Store>,

    pub lines: LineService,
    pub stations: StationService,
}

impl ServiceContainer {
    /// Create a new service container backed by `settings.data_file`.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::with_fs(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with a custom filesystem (for testing).
    pub fn with_fs(settings: Settings, fs: Arc<dyn FileSystem>) -> InfraResult<Self> {
        let store = Store::open(&settings.data_file, fs)?;
        Ok(Self::with_store(settings, store))
    }

    /// Create a service container that keeps everything in memory.
    pub fn in_memory(settings: Settings) -> Self {
        Self::with_store(settings, Store::in_memory())
    }

    fn with_store(settings: Settings, store: Store) -> Self {
        let settings = Arc::new(settings);
        let store = Arc::new(store);
        let lines = LineService::new(store.clone(), store.clone());
        let stations = StationService::new(store.clone());

        Self {
            settings,
            store,
            lines,
            stations,
        }
    }
}
