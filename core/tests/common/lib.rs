#![allow(clippy::expect_used)]

use std::path::PathBuf;

use quill_core::config::Config;
use quill_core::config::ConfigOverrides;
use quill_core::config::ConfigToml;
use quill_protocol::Chapter;
use quill_protocol::Character;
use quill_protocol::EntityCatalog;
use quill_protocol::Memo;
use quill_protocol::WorldSetting;
use tempfile::TempDir;

/// Returns a default `Config` whose on-disk state is confined to the provided
/// temporary directory. Using a per-test directory keeps tests hermetic and
/// avoids clobbering a developer's real `~/.quill`.
pub fn load_default_config_for_test(quill_home: &TempDir) -> Config {
    Config::load_from_base_config_with_overrides(
        ConfigToml::default(),
        ConfigOverrides::default(),
        quill_home.path().to_path_buf(),
    )
    .expect("defaults for test should always succeed")
}

/// A small catalog covering every kind, shared by the integration tests.
pub fn sample_catalog() -> EntityCatalog {
    EntityCatalog {
        characters: vec![
            Character {
                id: 7,
                name: "Ada Reyes".to_string(),
            },
            Character {
                id: 8,
                name: "Bram Oduya".to_string(),
            },
        ],
        world_settings: vec![
            WorldSetting {
                id: 3,
                name: "Salt Coast".to_string(),
            },
            WorldSetting {
                id: 9,
                name: "Glass Archive".to_string(),
            },
        ],
        memos: vec![Memo {
            id: 1,
            title: "Timeline".to_string(),
        }],
        chapters: vec![Chapter {
            id: 12,
            title: "The Ferry".to_string(),
        }],
    }
}

/// Write `contents` to `name` inside `dir` and return the full path.
pub fn write_fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
