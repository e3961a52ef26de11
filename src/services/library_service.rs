use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Library was not found by id `{0}`")]
    NotFound(String),
    #[error("Path `{0}` was not unique.")]
    PathNotUnique(String),
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct LibraryUpdate {
    pub name: Option<String>,
    pub path: Option<String>,
}

/// In-process library registry. Paths are unique across libraries.
#[derive(Debug, Default)]
pub struct LibraryService {
    libraries: RwLock<HashMap<Uuid, Library>>,
}

impl LibraryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new library root
    pub async fn create(&self, name: &str, path: &str) -> Result<Library, LibraryError> {
        let mut libraries = self.libraries.write().await;
        if libraries.values().any(|l| l.path == path) {
            return Err(LibraryError::PathNotUnique(path.to_string()));
        }

        let now = Utc::now();
        let library = Library {
            id: Uuid::new_v4(),
            name: name.to_string(),
            path: path.to_string(),
            created_at: now,
            updated_at: now,
        };
        libraries.insert(library.id, library.clone());
        Ok(library)
    }

    /// All libraries, oldest first
    pub async fn find_all(&self) -> Vec<Library> {
        let libraries = self.libraries.read().await;
        let mut all: Vec<Library> = libraries.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        all
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Library, LibraryError> {
        let key = parse_id(id)?;
        self.libraries
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    pub async fn update_by_id(&self, id: &str, update: LibraryUpdate) -> Result<Library, LibraryError> {
        let key = parse_id(id)?;
        let mut libraries = self.libraries.write().await;

        if let Some(path) = &update.path {
            let taken = libraries.values().any(|l| l.id != key && &l.path == path);
            if taken {
                return Err(LibraryError::PathNotUnique(path.clone()));
            }
        }

        let library = libraries
            .get_mut(&key)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;

        let mut changed = false;
        if let Some(name) = update.name.filter(|n| *n != library.name) {
            library.name = name;
            changed = true;
        }
        if let Some(path) = update.path.filter(|p| *p != library.path) {
            library.path = path;
            changed = true;
        }
        if changed {
            library.updated_at = Utc::now();
        }

        Ok(library.clone())
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<(), LibraryError> {
        let key = parse_id(id)?;
        self.libraries
            .write()
            .await
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }
}

fn parse_id(id: &str) -> Result<Uuid, LibraryError> {
    Uuid::parse_str(id).map_err(|_| LibraryError::NotFound(id.to_string()))
}
