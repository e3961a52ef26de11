use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const MIN_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("File was not found by id `{0}`")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileSortOrder {
    Name,
    Size,
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Paging, sorting and filtering for [`FileService::find_all`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileQuery {
    pub page: u32,
    pub size: u32,
    pub order: FileSortOrder,
    pub direction: SortDirection,
    /// Case-insensitive substring of the file name.
    pub name: Option<String>,
}

impl Default for FileQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: MIN_PAGE_SIZE,
            order: FileSortOrder::default(),
            direction: SortDirection::default(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: u32,
    pub size: u32,
    pub total_elements: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilePage {
    pub results: Vec<FileRecord>,
    pub page: PageInfo,
}

/// In-process file catalogue, read through `/files`.
#[derive(Debug, Default)]
pub struct FileService {
    files: RwLock<HashMap<Uuid, FileRecord>>,
}

impl FileService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file to the catalogue.
    pub async fn register(&self, name: &str, size: u64) -> FileRecord {
        let now = Utc::now();
        let file = FileRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            size,
            created_at: now,
            updated_at: now,
        };
        self.files.write().await.insert(file.id, file.clone());
        file
    }

    pub async fn find_all(&self, query: &FileQuery) -> FilePage {
        let needle = query.name.as_deref().map(str::to_lowercase);
        let mut matching: Vec<FileRecord> = self
            .files
            .read()
            .await
            .values()
            .filter(|f| match &needle {
                Some(needle) => f.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.order).then_with(|| a.id.cmp(&b.id));
            match query.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total_elements = matching.len();
        let size = query.size.max(1) as usize;
        let results = matching
            .into_iter()
            .skip(query.page as usize * size)
            .take(size)
            .collect();

        FilePage {
            results,
            page: PageInfo {
                number: query.page,
                size: query.size,
                total_elements,
                total_pages: total_elements.div_ceil(size),
            },
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<FileRecord, FileError> {
        let key = Uuid::parse_str(id).map_err(|_| FileError::NotFound(id.to_string()))?;
        self.files
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or_else(|| FileError::NotFound(id.to_string()))
    }
}

fn compare(a: &FileRecord, b: &FileRecord, order: FileSortOrder) -> Ordering {
    match order {
        FileSortOrder::Name => a.name.cmp(&b.name),
        FileSortOrder::Size => a.size.cmp(&b.size),
        FileSortOrder::CreatedAt => a.created_at.cmp(&b.created_at),
        FileSortOrder::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}
