//! Papers survive between sessions

use clacker::engine::TypingEngine;
use clacker::config::{Config, EngineConfig};
use clacker::error::StorageError;
use clacker::storage::{PaperStore, Texture};
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("papers.json")
}

#[test]
fn resumed_paper_restores_the_carriage() {
    let dir = TempDir::new().unwrap();

    let mut store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    store.save_content("Chapter One\nIt was");
    store.flush().unwrap();

    let store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    let mut engine = TypingEngine::from_config(&EngineConfig::default());
    engine.load(store.current().content.as_str());

    assert_eq!(engine.column(), 6);
    assert_eq!(engine.carriage_offset(), 270 - 6 * 12);
    assert_eq!(store.current().title, "Chapter One");
}

#[test]
fn last_opened_paper_is_remembered() {
    let dir = TempDir::new().unwrap();

    let mut store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    let first = store.current_id().to_string();
    store.save_content("first");
    let second = store.create(Texture::Lined).id.clone();
    store.save_content("second");
    store.flush().unwrap();

    let mut store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    assert_eq!(store.current_id(), second);
    store.select(&first).unwrap();
    store.flush().unwrap();

    let store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    assert_eq!(store.current().content, "first");
}

#[test]
fn deleting_down_to_one_paper() {
    let dir = TempDir::new().unwrap();
    let mut store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    store.create_default();
    store.create_default();
    assert_eq!(store.papers().len(), 3);

    let ids: Vec<String> = store.papers().iter().map(|p| p.id.clone()).collect();
    store.delete(&ids[0]).unwrap();
    store.delete(&ids[1]).unwrap();
    assert!(matches!(store.delete(&ids[2]), Err(StorageError::LastPaper)));
    assert!(matches!(store.delete("unknown"), Err(StorageError::NotFound(_))));
    store.flush().unwrap();

    let store = PaperStore::open(store_path(&dir), Texture::Cream).unwrap();
    assert_eq!(store.papers().len(), 1);
    assert_eq!(store.current_id(), ids[2]);
}

#[test]
fn configured_default_texture_applies_to_new_papers() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.path = store_path(&dir).to_string_lossy().into_owned();
    config.storage.default_texture = Texture::Grid;

    let mut store =
        PaperStore::open(config.resolve_storage_path(), config.storage.default_texture).unwrap();
    assert_eq!(store.current().texture, Texture::Grid);
    assert_eq!(store.create_default().texture, Texture::Grid);
}
