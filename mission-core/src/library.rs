use crate::persistence::PersistenceAdapter;
use crate::store::{load_settings_file, save_settings_file, ConfigStore, SettingsError, Snapshot};
use screen::{ScreenDocument, ScreenError, Settings, WidgetKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error("screen `{0}` not found")]
    NotFound(String),
    #[error("screen name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Screen(#[from] ScreenError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenEntry {
    pub name: String,
    pub widgets: usize,
    pub widget_kinds: Vec<WidgetKind>,
    pub path: PathBuf,
}

/// A directory of named screen files plus the operator's settings defaults.
pub struct ScreenLibrary {
    dir: PathBuf,
    entries: Vec<ScreenEntry>,
}

impl ScreenLibrary {
    const SETTINGS_DEFAULTS_FILE: &'static str = "settings.defaults.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[ScreenEntry] {
        &self.entries
    }

    pub fn screen_file_path(&self, name: &str) -> PathBuf {
        let safe = name.trim().replace(' ', "_");
        self.dir.join(format!("{safe}.json"))
    }

    fn settings_defaults_path(&self) -> PathBuf {
        self.dir.join(Self::SETTINGS_DEFAULTS_FILE)
    }

    /// Re-reads the directory. Files that do not load as screens are skipped.
    pub fn scan(&mut self) -> &[ScreenEntry] {
        let mut entries = Vec::new();
        let settings_path = self.settings_defaults_path();
        if let Ok(dir_entries) = fs::read_dir(&self.dir) {
            for entry in dir_entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some("json")
                    || path == settings_path
                {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                match ScreenDocument::load_from_file(&path) {
                    Ok(document) => entries.push(ScreenEntry {
                        name: name.to_string(),
                        widgets: document.components.len(),
                        widget_kinds: document.components.iter().map(|w| w.kind()).collect(),
                        path,
                    }),
                    Err(err) => log::debug!("skipping {}: {err}", path.display()),
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        self.entries = entries;
        &self.entries
    }

    pub fn save_as(&mut self, name: &str, snapshot: &Snapshot) -> Result<PathBuf, LibraryError> {
        if name.trim().is_empty() {
            return Err(LibraryError::EmptyName);
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.screen_file_path(name);
        let file = fs::File::create(&path)?;
        PersistenceAdapter::serialize(snapshot, std::io::BufWriter::new(file))?;
        log::info!("saved screen `{name}` to {}", path.display());
        self.scan();
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<ScreenDocument, LibraryError> {
        let path = self.screen_file_path(name);
        if !path.exists() {
            return Err(LibraryError::NotFound(name.to_string()));
        }
        let document = ScreenDocument::load_from_file(&path)?;
        log::info!("loaded screen `{name}` from {}", path.display());
        Ok(document)
    }

    pub fn delete(&mut self, name: &str) -> Result<(), LibraryError> {
        let path = self.screen_file_path(name);
        if !path.exists() {
            return Err(LibraryError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        self.scan();
        Ok(())
    }

    /// The saved settings defaults. A missing or unreadable file is replaced
    /// with the built-in defaults.
    pub fn load_settings_defaults(&self) -> Settings {
        let path = self.settings_defaults_path();
        match load_settings_file(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::info!("writing built-in settings defaults ({err})");
                let builtin = Settings::default();
                if let Err(err) = save_settings_file(&path, &builtin) {
                    log::warn!("Failed to write {}: {err}", path.display());
                }
                builtin
            }
        }
    }

    pub fn save_settings_defaults(&self, settings: &Settings) -> Result<(), LibraryError> {
        save_settings_file(&self.settings_defaults_path(), settings)?;
        Ok(())
    }

    /// A store whose defaults come from this library's settings file.
    pub fn open_store(&self) -> ConfigStore {
        ConfigStore::with_default_settings(self.load_settings_defaults())
    }
}
