use async_trait::async_trait;
use fd_lock::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{assign_id, matches_all, Collection, DocumentStore, Patch, Predicate, StoreError};

type Documents = BTreeMap<String, Value>;

const LOCK_FILE: &str = ".casedesk.lock";

/// Document store persisted as one JSON file per collection.
///
/// `{data_dir}/cases.json` holds an object mapping id to document. Every
/// operation holds an OS-level lock on `{data_dir}/.casedesk.lock` (shared for
/// reads, exclusive for writes), so several CLI processes can work on the same
/// directory. Writes go to a temporary file that is renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        info!(data_dir = %data_dir.display(), "Opened file store");
        Ok(Self { data_dir })
    }

    async fn read<T, F>(&self, collection: Collection, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Documents) -> Result<T, StoreError> + Send + 'static,
    {
        let dir = self.data_dir.clone();
        tokio::task::spawn_blocking(move || {
            let mut lock = RwLock::new(open_lock_file(&dir)?);
            let _guard = lock.read().map_err(|e| StoreError::Lock {
                reason: e.to_string(),
            })?;
            let documents = load(&collection_path(&dir, collection))?;
            f(&documents)
        })
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))?
    }

    async fn write<T, F>(&self, collection: Collection, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Documents) -> Result<T, StoreError> + Send + 'static,
    {
        let dir = self.data_dir.clone();
        tokio::task::spawn_blocking(move || {
            let mut lock = RwLock::new(open_lock_file(&dir)?);
            let _guard = lock.write().map_err(|e| StoreError::Lock {
                reason: e.to_string(),
            })?;
            let path = collection_path(&dir, collection);
            let mut documents = load(&path)?;
            let result = f(&mut documents)?;
            save(&path, &documents)?;
            Ok(result)
        })
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))?
    }
}

fn collection_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.as_str()))
}

fn open_lock_file(dir: &Path) -> Result<File, StoreError> {
    Ok(OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(dir.join(LOCK_FILE))?)
}

fn load(path: &Path) -> Result<Documents, StoreError> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(Documents::new()),
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Documents::new()),
        Err(e) => Err(e.into()),
    }
}

fn save(path: &Path, documents: &Documents) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp)?;
        serde_json::to_writer_pretty(&mut file, documents)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn not_found(collection: Collection, id: &str) -> StoreError {
    StoreError::NotFound {
        collection,
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let id = id.to_string();
        self.read(collection, move |docs| Ok(docs.get(&id).cloned()))
            .await
    }

    async fn create(&self, collection: Collection, mut document: Value) -> Result<String, StoreError> {
        let id = assign_id(&mut document)?;
        let key = id.clone();
        self.write(collection, move |docs| {
            docs.insert(key, document);
            Ok(())
        })
        .await?;
        debug!(%collection, %id, "document created");
        Ok(id)
    }

    async fn patch(&self, collection: Collection, id: &str, patch: &Patch) -> Result<(), StoreError> {
        let id = id.to_string();
        let patch = patch.clone();
        self.write(collection, move |docs| {
            let document = docs.get_mut(&id).ok_or_else(|| not_found(collection, &id))?;
            let mut updated = document.clone();
            patch.apply_to(&mut updated)?;
            *document = updated;
            Ok(())
        })
        .await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let id = id.to_string();
        self.write(collection, move |docs| {
            docs.remove(&id)
                .map(|_| ())
                .ok_or_else(|| not_found(collection, &id))
        })
        .await
    }

    async fn query(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<Vec<Value>, StoreError> {
        let predicates = predicates.to_vec();
        self.read(collection, move |docs| {
            Ok(docs
                .values()
                .filter(|doc| matches_all(doc, &predicates))
                .cloned()
                .collect())
        })
        .await
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
