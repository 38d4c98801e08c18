//! Fixtures
//!
//! YAML descriptions of a cart, used by the CLI and integration tests.
//!
//! ```yaml
//! uploads:
//!   - name: benchy.stl
//!     material: PETG
//!     weight: 100
//! imports:
//!   - https://www.thingiverse.com/thing/123-cool-bracket
//! ```

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::CartItem,
    materials::MaterialKind,
    session::{Session, SessionError},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A fixture entry was rejected by the session
    #[error("fixture entry {index} rejected: {source}")]
    Entry {
        /// Position of the entry (uploads first, then imports)
        index: usize,

        /// Underlying error
        source: SessionError,
    },
}

/// Uploaded file in a cart fixture
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadFixture {
    /// File name
    pub name: String,

    /// Print material
    pub material: MaterialKind,

    /// Estimated weight in grams
    pub weight: f64,
}

/// Cart fixture
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartFixture {
    /// Uploaded files, quoted from their material and weight
    pub uploads: Vec<UploadFixture>,

    /// Listing URLs to import
    pub imports: Vec<String>,
}

impl CartFixture {
    /// Load a cart fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a cart fixture from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the document is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(contents)?)
    }

    /// Add every upload, then every import, to the session's cart.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Entry`] for the first entry the session rejects.
    /// Entries before it remain in the cart.
    pub fn apply(&self, session: &mut Session) -> Result<Vec<CartItem>, FixtureError> {
        let mut added = Vec::with_capacity(self.uploads.len() + self.imports.len());

        for upload in &self.uploads {
            let item = session
                .add_upload(&upload.name, upload.material, upload.weight)
                .map_err(|source| FixtureError::Entry {
                    index: added.len(),
                    source,
                })?;

            added.push(item);
        }

        for url in &self.imports {
            let item = session
                .import_url(url)
                .map_err(|source| FixtureError::Entry {
                    index: added.len(),
                    source,
                })?;

            added.push(item);
        }

        Ok(added)
    }
}
