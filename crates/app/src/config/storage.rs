//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Where the client keeps its data.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding local storage and the document backend
    #[arg(long, env = "HITEA_DATA_DIR", default_value = ".hitea", global = true)]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// The key-value mirror: cart, timers and session.
    #[must_use]
    pub fn local_storage_path(&self) -> PathBuf {
        self.data_dir.join("local-storage.json")
    }

    /// The document backend: menu, orders, ratings and users.
    #[must_use]
    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join("documents.json")
    }
}
