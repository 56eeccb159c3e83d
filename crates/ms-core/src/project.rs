//! Project discovery and loading

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::migration::SqlMigration;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A migration together with the file it was loaded from
#[derive(Debug, Clone)]
pub struct MigrationFile {
    /// Parsed migration
    pub migration: SqlMigration,

    /// Source file
    pub path: PathBuf,
}

/// Represents a migrasync project
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,

    /// Migrations in registration order
    pub migrations: Vec<MigrationFile>,
}

impl Project {
    /// Load a project from a directory
    pub fn load(path: &Path) -> CoreResult<Self> {
        let root = Self::resolve_root(path)?;
        let config = Config::load_from_dir(&root)?;
        Self::with_config(root, config)
    }

    /// Load a project using an explicit config file
    pub fn load_with_config_file(path: &Path, config_path: &Path) -> CoreResult<Self> {
        let root = Self::resolve_root(path)?;
        let config = Config::load(config_path)?;
        Self::with_config(root, config)
    }

    fn resolve_root(path: &Path) -> CoreResult<PathBuf> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !root.exists() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }
        Ok(root)
    }

    fn with_config(root: PathBuf, config: Config) -> CoreResult<Self> {
        let migrations = discover_migrations(&config.migration_paths_absolute(&root))?;
        Ok(Self {
            root,
            config,
            migrations,
        })
    }

    /// Migrations without their source paths, in registration order
    pub fn sql_migrations(&self) -> Vec<SqlMigration> {
        self.migrations.iter().map(|f| f.migration.clone()).collect()
    }

    /// Database path resolved against the project root
    pub fn database_path(&self) -> String {
        self.config.database_path(&self.root)
    }
}

/// Load migration files from each directory, in directory order and then
/// file-name order within a directory.
///
/// Missing directories are skipped. Only `.yml`/`.yaml` files directly inside
/// a directory are considered.
pub fn discover_migrations(dirs: &[PathBuf]) -> CoreResult<Vec<MigrationFile>> {
    let mut files = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for dir in dirs {
        if !dir.is_dir() {
            log::debug!("Migration directory not found, skipping: {}", dir.display());
            continue;
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_yaml(p))
            .collect();
        paths.sort();

        for path in paths {
            let file = load_migration_file(&path)?;
            if let Some(previous) = seen.get(&file.migration.id) {
                return Err(CoreError::DuplicateMigration {
                    id: file.migration.id.clone(),
                    path1: previous.display().to_string(),
                    path2: path.display().to_string(),
                });
            }
            seen.insert(file.migration.id.clone(), path);
            files.push(file);
        }
    }

    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

/// Parse a single migration file; `id` defaults to the file stem.
pub fn load_migration_file(path: &Path) -> CoreResult<MigrationFile> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut migration: SqlMigration =
        serde_yaml::from_str(&content).map_err(|e| CoreError::MigrationParseError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;

    if migration.id.trim().is_empty() {
        migration.id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }

    if migration.forward.trim().is_empty() {
        return Err(CoreError::MigrationInvalid {
            id: migration.id,
            path: path.display().to_string(),
            reason: "forward SQL is empty".to_string(),
        });
    }

    Ok(MigrationFile {
        migration,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
