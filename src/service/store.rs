// SPDX-License-Identifier: MIT OR Apache-2.0

//! The service file store.
//!
//! This module provides `ServiceConfigStore`, which loads a service file from
//! a storage backend, applies list/load/create/update/delete operations to the
//! parsed document, and writes the result back.

use crate::adapters::{LocalFileStorage, ServiceFileLocator};
use crate::domain::{
    Result, ServiceCatalog, ServiceEntry, ServiceError, ServiceFile, ServiceName, ServiceParams,
};
use crate::ports::ServiceFileStorage;
use std::path::{Path, PathBuf};

/// Outcome of [`ServiceConfigStore::upsert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    /// A new section was appended
    Created,
    /// An existing section was rewritten
    Updated,
}

/// Reads, edits and persists a PostgreSQL service file.
///
/// Before each mutation the store re-reads the file, so changes another
/// process made since the store was opened are kept. A failed operation
/// leaves both the file and the in-memory document untouched.
///
/// # Examples
///
/// ```rust
/// use pgservice::adapters::InMemoryStorage;
/// use pgservice::domain::{ServiceCatalog, ServiceParams};
/// use pgservice::service::ServiceConfigStore;
///
/// # fn main() -> pgservice::domain::Result<()> {
/// let storage = InMemoryStorage::with_contents("[prod]\nhost=db1\nport=5432\n");
/// let mut store = ServiceConfigStore::open(Box::new(storage.clone()))?;
///
/// let params: ServiceParams = [("host", "localhost"), ("port", "5432")].into_iter().collect();
/// store.create("dev", &params)?;
///
/// assert_eq!(store.list(), vec!["prod", "dev"]);
/// assert_eq!(
///     storage.contents().as_deref(),
///     Some("[prod]\nhost=db1\nport=5432\n\n[dev]\nhost=localhost\nport=5432\n")
/// );
/// # Ok(())
/// # }
/// ```
pub struct ServiceConfigStore {
    storage: Box<dyn ServiceFileStorage>,
    file: ServiceFile,
    required_params: Vec<String>,
    refresh_before_write: bool,
}

impl ServiceConfigStore {
    /// Creates a new store builder.
    pub fn builder() -> ServiceConfigStoreBuilder {
        ServiceConfigStoreBuilder::new()
    }

    /// Opens a store over `storage` with default options.
    pub fn open(storage: Box<dyn ServiceFileStorage>) -> Result<Self> {
        Self::builder().with_storage(storage).build()
    }

    /// Opens the service file at `path` with default options.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().with_path(path).build()
    }

    /// Opens the service file at its platform default location.
    pub fn open_default() -> Result<Self> {
        Self::builder().build()
    }

    /// Returns every entry in file order.
    pub fn entries(&self) -> Vec<ServiceEntry> {
        self.file.entries()
    }

    /// Returns the parsed document as last read or written.
    pub fn document(&self) -> &ServiceFile {
        &self.file
    }

    /// Returns the backing file path, if storage is a file.
    pub fn path(&self) -> Option<&Path> {
        self.storage.location()
    }

    /// Returns the keys every written service must have.
    pub fn required_params(&self) -> &[String] {
        &self.required_params
    }

    /// Re-reads the file from storage.
    ///
    /// # Errors
    ///
    /// On a read or parse failure the previous document is kept.
    pub fn reload(&mut self) -> Result<()> {
        self.file = Self::read_file(self.storage.as_ref())?;
        tracing::debug!(
            "Reloaded {} services from {}",
            self.file.len(),
            self.storage.name()
        );
        Ok(())
    }

    /// Creates `name` if it is absent, otherwise updates it.
    pub fn upsert(&mut self, name: &str, params: &ServiceParams) -> Result<Upsert> {
        let name = ServiceName::new(name)?;
        self.check_required(&name, params)?;

        let outcome = self.mutate(|file| {
            if file.contains(name.as_str()) {
                file.replace(name.as_str(), params)?;
                Ok(Upsert::Updated)
            } else {
                file.push(name.clone(), params)?;
                Ok(Upsert::Created)
            }
        })?;

        tracing::info!(
            "{} service '{}' in {}",
            match outcome {
                Upsert::Created => "Created",
                Upsert::Updated => "Updated",
            },
            name,
            self.storage.name()
        );
        Ok(outcome)
    }

    fn read_file(storage: &dyn ServiceFileStorage) -> Result<ServiceFile> {
        match storage.read()? {
            Some(text) => ServiceFile::parse(&text),
            None => {
                tracing::debug!("No service file in {}, starting empty", storage.name());
                Ok(ServiceFile::new())
            }
        }
    }

    fn check_required(&self, name: &ServiceName, params: &ServiceParams) -> Result<()> {
        let missing = params.missing(&self.required_params);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::MissingParams {
                name: name.to_string(),
                missing,
            })
        }
    }

    /// Applies `edit` to a fresh copy of the document, writes it, then
    /// adopts it.
    fn mutate<T>(&mut self, edit: impl FnOnce(&mut ServiceFile) -> Result<T>) -> Result<T> {
        let mut file = if self.refresh_before_write {
            Self::read_file(self.storage.as_ref())?
        } else {
            self.file.clone()
        };

        let outcome = edit(&mut file)?;
        self.storage.write(&file.render())?;
        self.file = file;
        Ok(outcome)
    }
}

impl ServiceCatalog for ServiceConfigStore {
    fn list(&self) -> Vec<ServiceName> {
        self.file.names().cloned().collect()
    }

    fn load(&self, name: &str) -> Result<ServiceParams> {
        self.file.get(name).ok_or_else(|| ServiceError::NotFound {
            name: name.trim().to_string(),
        })
    }

    fn create(&mut self, name: &str, params: &ServiceParams) -> Result<()> {
        let name = ServiceName::new(name)?;
        self.check_required(&name, params)?;

        self.mutate(|file| file.push(name.clone(), params))?;
        tracing::info!("Created service '{}' in {}", name, self.storage.name());
        Ok(())
    }

    fn update(&mut self, name: &str, params: &ServiceParams) -> Result<()> {
        let name = ServiceName::new(name)?;
        self.check_required(&name, params)?;

        self.mutate(|file| file.replace(name.as_str(), params))?;
        tracing::info!("Updated service '{}' in {}", name, self.storage.name());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        self.mutate(|file| file.remove(name))?;
        tracing::info!("Deleted service '{}' from {}", name.trim(), self.storage.name());
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.file.contains(name)
    }
}

/// Builder for constructing a `ServiceConfigStore`.
///
/// # Examples
///
/// ```rust,no_run
/// use pgservice::service::ServiceConfigStore;
///
/// # fn main() -> pgservice::domain::Result<()> {
/// let store = ServiceConfigStore::builder()
///     .with_path("/home/me/.pg_service.conf")
///     .backup(false)
///     .create_if_missing(true)
///     .require_connection_params()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ServiceConfigStoreBuilder {
    storage: Option<Box<dyn ServiceFileStorage>>,
    path: Option<PathBuf>,
    backup: bool,
    create_if_missing: bool,
    refresh_before_write: bool,
    required_params: Vec<String>,
}

impl ServiceConfigStoreBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            storage: None,
            path: None,
            backup: true,
            create_if_missing: false,
            refresh_before_write: true,
            required_params: Vec::new(),
        }
    }

    /// Uses a custom storage backend. Takes precedence over `with_path`.
    pub fn with_storage(mut self, storage: Box<dyn ServiceFileStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Uses the service file at `path` instead of the default location.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets whether a `.bak` copy is made before each write.
    ///
    /// Only applies to the file storage the builder creates itself.
    pub fn backup(mut self, enabled: bool) -> Self {
        self.backup = enabled;
        self
    }

    /// Creates an empty file on open if none exists.
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Sets whether the file is re-read before each mutation (default on).
    pub fn refresh_before_write(mut self, enabled: bool) -> Self {
        self.refresh_before_write = enabled;
        self
    }

    /// Requires the given keys on create, update and upsert.
    pub fn require_params<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_params.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Requires `host`, `port`, `dbname` and `user`.
    pub fn require_connection_params(self) -> Self {
        self.require_params(ServiceParams::CONNECTION_KEYS.iter().copied())
    }

    /// Opens the store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::LocationError` if no path was given and none
    /// can be resolved, or the read/parse error of the existing file.
    pub fn build(self) -> Result<ServiceConfigStore> {
        let mut storage: Box<dyn ServiceFileStorage> = match self.storage {
            Some(storage) => storage,
            None => {
                let path = match self.path {
                    Some(path) => path,
                    None => ServiceFileLocator::new().locate()?,
                };
                Box::new(LocalFileStorage::new(path).backup(self.backup))
            }
        };

        if self.create_if_missing {
            storage.ensure_exists()?;
        }

        let file = ServiceConfigStore::read_file(storage.as_ref())?;
        match storage.location() {
            Some(path) => tracing::debug!(
                "Opened service file {} with {} services",
                path.display(),
                file.len()
            ),
            None => tracing::debug!(
                "Opened {} service storage with {} services",
                storage.name(),
                file.len()
            ),
        }

        Ok(ServiceConfigStore {
            storage,
            file,
            required_params: self.required_params,
            refresh_before_write: self.refresh_before_write,
        })
    }
}

impl Default for ServiceConfigStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryStorage;

    const PROD: &str = "[prod]\nhost=db1\nport=5432\n";

    fn params(pairs: &[(&str, &str)]) -> ServiceParams {
        pairs.iter().copied().collect()
    }

    fn open(contents: &str) -> (ServiceConfigStore, InMemoryStorage) {
        let storage = InMemoryStorage::with_contents(contents);
        let store = ServiceConfigStore::open(Box::new(storage.clone())).unwrap();
        (store, storage)
    }

    /// Storage whose writes always fail.
    struct ReadOnly(String);

    impl ServiceFileStorage for ReadOnly {
        fn name(&self) -> &str {
            "read-only"
        }

        fn location(&self) -> Option<&Path> {
            None
        }

        fn read(&self) -> Result<Option<String>> {
            Ok(Some(self.0.clone()))
        }

        fn write(&mut self, _contents: &str) -> Result<()> {
            Err(ServiceError::from(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_open_missing_is_empty() {
        let store = ServiceConfigStore::open(Box::new(InMemoryStorage::new())).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_open_create_if_missing() {
        let storage = InMemoryStorage::new();
        ServiceConfigStore::builder()
            .with_storage(Box::new(storage.clone()))
            .create_if_missing(true)
            .build()
            .unwrap();
        assert_eq!(storage.contents().as_deref(), Some(""));
    }

    #[test]
    fn test_open_malformed() {
        let storage = InMemoryStorage::with_contents("host=db1\n");
        let result = ServiceConfigStore::open(Box::new(storage));
        assert!(matches!(result, Err(ServiceError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_load() {
        let (store, _) = open(PROD);
        let prod = store.load("prod").unwrap();
        assert_eq!(prod.get("host"), Some("db1"));
        assert!(store.load("dev").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create() {
        let (mut store, storage) = open(PROD);
        store
            .create("dev", &params(&[("host", "localhost")]))
            .unwrap();
        assert_eq!(store.list(), vec!["prod", "dev"]);
        assert_eq!(
            storage.contents().as_deref(),
            Some("[prod]\nhost=db1\nport=5432\n\n[dev]\nhost=localhost\n")
        );
    }

    #[test]
    fn test_create_duplicate_leaves_file() {
        let (mut store, storage) = open(PROD);
        let err = store.create("prod", &params(&[("host", "x")])).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(storage.contents().as_deref(), Some(PROD));
    }

    #[test]
    fn test_create_invalid_name() {
        let (mut store, _) = open(PROD);
        let err = store.create("  ", &params(&[])).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidName { .. }));
    }

    #[test]
    fn test_update() {
        let (mut store, storage) = open("[prod]\nhost=db1\nport=5432");
        store
            .update("prod", &params(&[("host", "db2"), ("port", "5432")]))
            .unwrap();
        assert_eq!(
            storage.contents().as_deref(),
            Some("[prod]\nhost=db2\nport=5432")
        );
    }

    #[test]
    fn test_update_missing() {
        let (mut store, storage) = open(PROD);
        assert!(store
            .update("dev", &params(&[("host", "x")]))
            .unwrap_err()
            .is_not_found());
        assert_eq!(storage.contents().as_deref(), Some(PROD));
    }

    #[test]
    fn test_delete() {
        let (mut store, storage) = open("[prod]\nhost=db1\n\n[dev]\nhost=localhost\n");
        store.delete("prod").unwrap();
        assert_eq!(store.list(), vec!["dev"]);
        assert_eq!(storage.contents().as_deref(), Some("[dev]\nhost=localhost\n"));
        assert!(store.delete("prod").unwrap_err().is_not_found());
    }

    #[test]
    fn test_upsert() {
        let (mut store, _) = open(PROD);
        assert_eq!(
            store.upsert("dev", &params(&[("host", "a")])).unwrap(),
            Upsert::Created
        );
        assert_eq!(
            store.upsert("dev", &params(&[("host", "b")])).unwrap(),
            Upsert::Updated
        );
        assert_eq!(store.load("dev").unwrap().get("host"), Some("b"));
    }

    #[test]
    fn test_required_params() {
        let storage = InMemoryStorage::with_contents(PROD);
        let mut store = ServiceConfigStore::builder()
            .with_storage(Box::new(storage.clone()))
            .require_connection_params()
            .build()
            .unwrap();

        assert_eq!(store.required_params(), ["host", "port", "dbname", "user"]);

        let err = store
            .create("dev", &params(&[("host", "localhost"), ("port", "5432")]))
            .unwrap_err();
        match err {
            ServiceError::MissingParams { missing, .. } => {
                assert_eq!(missing, vec!["dbname".to_string(), "user".to_string()])
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(storage.contents().as_deref(), Some(PROD));
    }

    #[test]
    fn test_refresh_before_write_keeps_external_edit() {
        let (mut store, storage) = open(PROD);
        storage.set_contents("[prod]\nhost=db1\nport=5432\n\n[other]\nhost=x\n");

        store
            .create("dev", &params(&[("host", "localhost")]))
            .unwrap();
        assert_eq!(store.list(), vec!["prod", "other", "dev"]);
    }

    #[test]
    fn test_without_refresh_uses_memory() {
        let storage = InMemoryStorage::with_contents(PROD);
        let mut store = ServiceConfigStore::builder()
            .with_storage(Box::new(storage.clone()))
            .refresh_before_write(false)
            .build()
            .unwrap();
        storage.set_contents("[other]\n");

        store
            .create("dev", &params(&[("host", "localhost")]))
            .unwrap();
        assert_eq!(store.list(), vec!["prod", "dev"]);
    }

    #[test]
    fn test_failed_write_keeps_document() {
        let mut store = ServiceConfigStore::open(Box::new(ReadOnly(PROD.to_string()))).unwrap();
        let err = store.delete("prod").unwrap_err();
        assert!(matches!(err, ServiceError::IoError(_)));
        assert_eq!(store.list(), vec!["prod"]);
    }

    #[test]
    fn test_reload() {
        let (mut store, storage) = open(PROD);
        storage.set_contents("[dev]\n");
        assert_eq!(store.list(), vec!["prod"]);
        store.reload().unwrap();
        assert_eq!(store.list(), vec!["dev"]);
    }

    #[test]
    fn test_reload_parse_error_keeps_document() {
        let (mut store, storage) = open(PROD);
        storage.set_contents("garbage\n");
        assert!(store.reload().is_err());
        assert_eq!(store.list(), vec!["prod"]);
    }

    #[test]
    fn test_document_tracks_writes() {
        let (mut store, storage) = open("# shared\n\n[prod]\nhost=db1\n");
        assert!(store.required_params().is_empty());
        assert_eq!(store.document().render(), "# shared\n\n[prod]\nhost=db1\n");

        store.delete("prod").unwrap();
        assert_eq!(store.document().render(), "# shared\n\n");
        assert_eq!(storage.contents(), Some(store.document().render()));
    }

    #[test]
    fn test_path_for_memory_storage() {
        let (store, _) = open(PROD);
        assert_eq!(store.path(), None);
    }
}
