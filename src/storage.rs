//! Paper storage
//!
//! Papers live in a single JSON file (`papers.json` in the data directory by
//! default) together with the id of the paper that was open last:
//!
//! ```json
//! { "papers": [{ "id": "1718000000000", "content": "...", "title": "...",
//!                "date": 1718000000000, "texture": "cream" }],
//!   "last_paper_id": "1718000000000" }
//! ```
//!
//! Mutations only touch memory; call [`PaperStore::flush`] to persist.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Titles are the first line of a paper, cut to this many characters
const TITLE_CHARS: usize = 20;

const UNTITLED: &str = "Untitled";

/// Paper background
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    #[default]
    Cream,
    White,
    Lined,
    Grid,
}

impl Texture {
    pub const ALL: [Texture; 4] = [Texture::Cream, Texture::White, Texture::Lined, Texture::Grid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Texture::Cream => "cream",
            Texture::White => "white",
            Texture::Lined => "lined",
            Texture::Grid => "grid",
        }
    }
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Texture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Texture::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown texture '{}' (expected cream, white, lined or grid)", s))
    }
}

/// One saved paper
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Paper {
    pub id: String,
    pub content: String,
    pub title: String,
    /// Last modification, milliseconds since the Unix epoch
    pub date: i64,
    #[serde(default)]
    pub texture: Texture,
}

impl Paper {
    fn new(id: String, texture: Texture, now: i64) -> Self {
        Self {
            id,
            content: String::new(),
            title: UNTITLED.to_string(),
            date: now,
            texture,
        }
    }
}

/// Title shown in paper lists: the first line, truncated
pub fn title_for(content: &str) -> String {
    let title: String = content
        .split('\n')
        .next()
        .unwrap_or_default()
        .chars()
        .take(TITLE_CHARS)
        .collect();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct PaperFile {
    #[serde(default)]
    papers: Vec<Paper>,
    #[serde(default)]
    last_paper_id: Option<String>,
}

/// The collection of papers plus the current selection
#[derive(Debug)]
pub struct PaperStore {
    path: PathBuf,
    default_texture: Texture,
    papers: Vec<Paper>,
    current: String,
}

impl PaperStore {
    /// Load the store at `path`, creating a first paper if there is none
    ///
    /// A missing file is an empty store. The last-opened paper becomes
    /// current, or the first one if that id no longer exists.
    pub fn open(path: impl Into<PathBuf>, default_texture: Texture) -> Result<Self, StorageError> {
        let path = path.into();

        let file = if path.exists() {
            let json = std::fs::read_to_string(&path)?;
            if json.trim().is_empty() {
                PaperFile::default()
            } else {
                serde_json::from_str(&json)?
            }
        } else {
            tracing::debug!("No paper file at {:?}, starting fresh", path);
            PaperFile::default()
        };

        let mut store = Self {
            path,
            default_texture,
            papers: file.papers,
            current: String::new(),
        };

        match file
            .last_paper_id
            .filter(|id| store.papers.iter().any(|p| &p.id == id))
            .or_else(|| store.papers.first().map(|p| p.id.clone()))
        {
            Some(id) => store.current = id,
            None => {
                store.create(default_texture);
            }
        }

        tracing::debug!(
            "Opened {} paper(s) from {:?}, current: {}",
            store.papers.len(),
            store.path,
            store.current
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All papers in creation order
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn get(&self, id: &str) -> Option<&Paper> {
        self.papers.iter().find(|p| p.id == id)
    }

    /// The paper being typed on
    pub fn current(&self) -> &Paper {
        // The store is never empty and `current` always names a member.
        self.get(&self.current).unwrap_or(&self.papers[0])
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    /// Append an empty paper and make it current
    pub fn create(&mut self, texture: Texture) -> &Paper {
        let now = now_millis();
        let mut id = now;
        while self.get(&id.to_string()).is_some() {
            id += 1;
        }
        let paper = Paper::new(id.to_string(), texture, now);
        tracing::info!("Created paper {}", paper.id);
        self.current = paper.id.clone();
        self.papers.push(paper);
        self.current()
    }

    /// Append an empty paper with the configured texture
    pub fn create_default(&mut self) -> &Paper {
        self.create(self.default_texture)
    }

    /// Make `id` the current paper
    pub fn select(&mut self, id: &str) -> Result<&Paper, StorageError> {
        if self.get(id).is_none() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        self.current = id.to_string();
        Ok(self.current())
    }

    /// Replace the current paper's text, refreshing its title and date
    pub fn save_content(&mut self, content: &str) {
        let current = self.current.clone();
        if let Some(paper) = self.papers.iter_mut().find(|p| p.id == current) {
            paper.content = content.to_string();
            paper.title = title_for(content);
            paper.date = now_millis();
        }
    }

    pub fn set_texture(&mut self, id: &str, texture: Texture) -> Result<(), StorageError> {
        let paper = self
            .papers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        paper.texture = texture;
        Ok(())
    }

    /// Remove a paper; the last one left cannot be deleted
    ///
    /// Deleting the current paper selects the first remaining one.
    pub fn delete(&mut self, id: &str) -> Result<Paper, StorageError> {
        let index = self
            .papers
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        if self.papers.len() <= 1 {
            return Err(StorageError::LastPaper);
        }

        let removed = self.papers.remove(index);
        if self.current == removed.id {
            self.current = self.papers[0].id.clone();
        }
        tracing::info!("Deleted paper {}", removed.id);
        Ok(removed)
    }

    /// Write the store to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = PaperFile {
            papers: self.papers.clone(),
            last_paper_id: Some(self.current.clone()),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // Write-then-rename so a crash never leaves half a file behind
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::trace!("Flushed {} paper(s) to {:?}", self.papers.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, PaperStore) {
        let dir = TempDir::new().unwrap();
        let store = PaperStore::open(dir.path().join("papers.json"), Texture::Cream).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_empty_creates_one_paper() {
        let (_dir, store) = open_temp();
        assert_eq!(store.papers().len(), 1);
        let paper = store.current();
        assert_eq!(paper.content, "");
        assert_eq!(paper.title, "Untitled");
        assert_eq!(paper.texture, Texture::Cream);
        assert_eq!(store.current_id(), paper.id);
    }

    #[test]
    fn test_title_for() {
        assert_eq!(title_for(""), "Untitled");
        assert_eq!(title_for("\nsecond line"), "Untitled");
        assert_eq!(title_for("Dear diary\nToday"), "Dear diary");
        assert_eq!(title_for("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmnopqrst");
        assert_eq!(title_for("ééééééééééééééééééééééé").chars().count(), 20);
    }

    #[test]
    fn test_save_content_updates_title() {
        let (_dir, mut store) = open_temp();
        store.save_content("Chapter One\nIt was night.");
        assert_eq!(store.current().title, "Chapter One");
        assert_eq!(store.current().content, "Chapter One\nIt was night.");
    }

    #[test]
    fn test_create_ids_are_unique() {
        let (_dir, mut store) = open_temp();
        let ids: Vec<String> = (0..5).map(|_| store.create(Texture::Grid).id.clone()).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        assert_eq!(store.current_id(), ids[4]);
        assert_eq!(store.current().texture, Texture::Grid);
    }

    #[test]
    fn test_select() {
        let (_dir, mut store) = open_temp();
        let first = store.current_id().to_string();
        store.create_default();
        store.select(&first).unwrap();
        assert_eq!(store.current_id(), first);
        assert!(matches!(
            store.select("nope"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_refuses_last_paper() {
        let (_dir, mut store) = open_temp();
        let id = store.current_id().to_string();
        assert!(matches!(store.delete(&id), Err(StorageError::LastPaper)));
        assert_eq!(store.papers().len(), 1);
    }

    #[test]
    fn test_delete_current_selects_first() {
        let (_dir, mut store) = open_temp();
        let first = store.current_id().to_string();
        let second = store.create_default().id.clone();
        store.delete(&second).unwrap();
        assert_eq!(store.current_id(), first);
        assert!(store.get(&second).is_none());
    }

    #[test]
    fn test_set_texture() {
        let (_dir, mut store) = open_temp();
        let id = store.current_id().to_string();
        store.set_texture(&id, Texture::Lined).unwrap();
        assert_eq!(store.current().texture, Texture::Lined);
        assert!(store.set_texture("missing", Texture::Grid).is_err());
    }

    #[test]
    fn test_flush_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("papers.json");

        let mut store = PaperStore::open(&path, Texture::White).unwrap();
        store.save_content("first paper");
        let first = store.current_id().to_string();
        store.create(Texture::Grid);
        store.save_content("second paper");
        store.select(&first).unwrap();
        store.flush().unwrap();

        let reopened = PaperStore::open(&path, Texture::Cream).unwrap();
        assert_eq!(reopened.papers().len(), 2);
        assert_eq!(reopened.current_id(), first);
        assert_eq!(reopened.current().content, "first paper");
        assert_eq!(reopened.current().texture, Texture::White);
        assert_eq!(reopened.papers()[1].texture, Texture::Grid);
    }

    #[test]
    fn test_stale_last_id_falls_back_to_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("papers.json");
        std::fs::write(
            &path,
            r#"{"papers":[{"id":"1","content":"a","title":"a","date":1}],"last_paper_id":"9"}"#,
        )
        .unwrap();

        let store = PaperStore::open(&path, Texture::Cream).unwrap();
        assert_eq!(store.current_id(), "1");
        assert_eq!(store.current().texture, Texture::Cream);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("papers.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PaperStore::open(&path, Texture::Cream),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_texture_from_str() {
        assert_eq!("Lined".parse::<Texture>().unwrap(), Texture::Lined);
        assert!("plaid".parse::<Texture>().is_err());
        assert_eq!(Texture::Grid.to_string(), "grid");
    }
}
