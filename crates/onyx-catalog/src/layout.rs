use crate::catalog::ExportFormat;
use crate::descriptor::ModelDescriptor;
use crate::error::CatalogResult;
use std::path::{Path, PathBuf};

pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Filesystem layout of the models directory.
///
/// Default layout is `./models/{id}.{ext}` plus `./models/metadata.json`.
#[derive(Debug, Clone)]
pub struct ModelsLayout {
    root: PathBuf,
}

impl ModelsLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn artifact_path(&self, descriptor: &ModelDescriptor, format: ExportFormat) -> PathBuf {
        self.root.join(descriptor.artifact_filename(format))
    }

    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE_NAME)
    }

    /// Create the models directory. A no-op when it already exists.
    pub fn ensure_dirs(&self) -> CatalogResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

impl Default for ModelsLayout {
    fn default() -> Self {
        Self::new(PathBuf::from("models"))
    }
}
