//! Temporary projects for command tests

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::cli::GlobalArgs;

/// A project directory with a file-backed DuckDB database
pub(crate) struct TestProject {
    pub(crate) dir: TempDir,
}

impl TestProject {
    /// Project named `test_app` whose migrations create one table each
    pub(crate) fn new(tables: &[(&str, i64)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("migrasync.yml"),
            "name: test_app\ndatabase:\n  type: duckdb\n  path: app.duckdb\ndefault_limit: 1\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("migrations")).unwrap();

        let project = Self { dir };
        for (table, order) in tables {
            project.add_table(table, *order);
        }
        project
    }

    /// Write a migration file creating `table`
    pub(crate) fn add_table(&self, table: &str, order: i64) {
        self.write_migration(
            &format!("{order:03}_{table}"),
            order,
            &format!("CREATE TABLE {table} (id INTEGER);"),
            &format!("DROP TABLE {table};"),
        );
    }

    /// Write a raw migration file
    pub(crate) fn write_migration(&self, id: &str, order: i64, forward: &str, backward: &str) {
        let content = format!(
            "order: {order}\ndescription: {id}\nforward: |\n  {forward}\nbackward: |\n  {backward}\n"
        );
        fs::write(self.migrations_dir().join(format!("{id}.yml")), content).unwrap();
    }

    /// Remove a migration file
    pub(crate) fn remove_migration(&self, id: &str) {
        fs::remove_file(self.migrations_dir().join(format!("{id}.yml"))).unwrap();
    }

    pub(crate) fn migrations_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("migrations")
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn global(&self) -> GlobalArgs {
        GlobalArgs {
            verbose: false,
            project_dir: self.root().to_path_buf(),
            config: None,
            database: None,
        }
    }

    /// Whether `table` exists in the project database
    pub(crate) async fn table_exists(&self, table: &str) -> bool {
        use ms_db::{Database, DuckDbBackend};

        let db = DuckDbBackend::from_path(&self.root().join("app.duckdb")).unwrap();
        let mut tx = db.begin().await.unwrap();
        let exists = tx.table_exists(table).await.unwrap();
        tx.commit().await.unwrap();
        exists
    }
}
