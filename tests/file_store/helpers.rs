//! Shared fixtures for file-backed store tests.

use camino::{Utf8Path, Utf8PathBuf};
use devflow::config::DevflowConfig;
use devflow::task::adapters::file::FileTaskStore;
use rstest::fixture;
use std::fs;
use tempfile::TempDir;

/// Temporary project with a file store under `Docs/.tasks`.
pub struct TempProject {
    _dir: TempDir,
    pub config: DevflowConfig,
    pub store: FileTaskStore,
}

impl TempProject {
    /// Returns the directory holding task documents.
    pub fn tasks_path(&self) -> Utf8PathBuf {
        self.config.tasks_path()
    }

    /// Writes a raw task document, creating the tasks directory.
    pub fn write_document(&self, file_name: &str, contents: &str) {
        let tasks_path = self.tasks_path();
        fs::create_dir_all(&tasks_path).expect("tasks directory should be created");
        fs::write(tasks_path.join(file_name), contents).expect("document should be written");
    }

    /// Reads a raw task document.
    pub fn read_document(&self, file_name: &str) -> String {
        fs::read_to_string(self.tasks_path().join(file_name)).expect("document should exist")
    }

    /// Lists file names in the tasks directory.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.tasks_path())
            .expect("tasks directory should exist")
            .map(|entry| {
                entry
                    .expect("entry should be readable")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

/// Fixture creating an empty temporary project.
#[fixture]
pub fn project() -> TempProject {
    let dir = TempDir::new().expect("temporary directory should be created");
    let root = Utf8Path::from_path(dir.path())
        .expect("temporary directory should be UTF-8")
        .to_path_buf();
    let config = DevflowConfig::for_root(root);
    let store = FileTaskStore::new(config.tasks_path());
    TempProject {
        _dir: dir,
        config,
        store,
    }
}
