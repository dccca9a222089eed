use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension};
use std::path::Path;

use super::traits::Storage;
use crate::types::{NewTree, Tree, TreeId};

const DB_SCHEMA_VERSION: i64 = 1;

const TREE_COLUMNS: &str =
    "id, common_name, scientific_name, location, height, description, is_favorite, created_at";

#[derive(Clone)]
pub struct SqliteStorage {
    pub path: String,
}

fn map_tree_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tree> {
    let is_favorite: i64 = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(err)))?
        .with_timezone(&Utc);

    Ok(Tree {
        id: row.get(0)?,
        common_name: row.get(1)?,
        scientific_name: row.get(2)?,
        location: row.get(3)?,
        height: row.get(4)?,
        description: row.get(5)?,
        is_favorite: is_favorite != 0,
        created_at,
    })
}

fn db_list_trees(conn: &Connection) -> rusqlite::Result<Vec<Tree>> {
    let mut stmt = conn.prepare(&format!("SELECT {TREE_COLUMNS} FROM trees ORDER BY id"))?;
    let rows = stmt
        .query_map([], map_tree_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn db_insert_tree(conn: &Connection, tree: &NewTree) -> rusqlite::Result<Tree> {
    conn.query_row(
        &format!(
            r#"
            INSERT INTO trees (
                common_name, scientific_name, location, height, description, is_favorite
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {TREE_COLUMNS}
            "#
        ),
        params![
            tree.common_name,
            tree.scientific_name,
            tree.location,
            tree.height,
            tree.description,
            tree.is_favorite as i64
        ],
        map_tree_row,
    )
}

fn db_load_tree(conn: &Connection, id: TreeId) -> rusqlite::Result<Option<Tree>> {
    conn.query_row(
        &format!("SELECT {TREE_COLUMNS} FROM trees WHERE id = ?1"),
        params![id],
        map_tree_row,
    )
    .optional()
}

fn db_delete_tree(conn: &Connection, id: TreeId) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM trees WHERE id = ?1", params![id])
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    pub fn reset_all(&self) -> Result<()> {
        if !std::path::Path::new(&self.path).exists() {
            return Ok(());
        }
        std::fs::remove_file(&self.path)?;
        Ok(())
    }

    pub fn init(&self) -> Result<()> {
        self.with_conn(|_conn| Ok(()))?;
        Ok(())
    }

    fn with_conn<F, T>(&self, f: F) -> rusqlite::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(500))?;

        Self::migrate(&conn)?;
        f(&conn)
    }

    fn migrate(conn: &Connection) -> rusqlite::Result<()> {
        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        if version == 0 {
            conn.execute_batch(
                r#"
            CREATE TABLE trees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                common_name TEXT NOT NULL CHECK (length(trim(common_name)) > 0),
                scientific_name TEXT,
                location TEXT NOT NULL CHECK (length(trim(location)) > 0),
                height REAL CHECK (height IS NULL OR height >= 0),
                description TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0 CHECK (is_favorite IN (0, 1)),
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
        "#,
            )?;
            conn.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
            return Ok(());
        }

        Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::ErrorCode::SchemaChanged as i32),
            Some("database schema version mismatch; please run with --reset option".to_string()),
        ))
    }
}

impl Storage for SqliteStorage {
    fn list_trees(&self) -> Result<Vec<Tree>> {
        let rows = self.with_conn(db_list_trees)?;
        Ok(rows)
    }

    fn create_tree(&self, tree: &NewTree) -> Result<Tree> {
        let row = self.with_conn(|conn| db_insert_tree(conn, tree))?;
        log::debug!("🌱 Stored tree {} ({})", row.id, row.common_name);
        Ok(row)
    }

    fn load_tree(&self, id: TreeId) -> Result<Option<Tree>> {
        let row = self.with_conn(|conn| db_load_tree(conn, id))?;
        Ok(row)
    }

    fn delete_tree(&self, id: TreeId) -> Result<bool> {
        let removed = self.with_conn(|conn| db_delete_tree(conn, id))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::DB_SCHEMA_VERSION;
    use rusqlite::{Connection, OptionalExtension};
    use std::{
        collections::HashSet,
        time::{SystemTime, UNIX_EPOCH},
    };

    fn unique_temp_file(prefix: &str, ext: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("{}_{}.{}", prefix, nanos, ext));
        p
    }

    fn fresh_repo(prefix: &str) -> SqliteStorage {
        let path = unique_temp_file(prefix, "db");
        let repo = SqliteStorage::new(&path);
        repo.init().unwrap();
        repo
    }

    #[test]
    fn sqlite_reset_all_ok_when_missing() {
        let path = unique_temp_file("arboretum_reset", "db");
        let repo = SqliteStorage::new(&path);
        repo.reset_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn sqlite_reset_all_removes_existing_file() {
        let path = unique_temp_file("arboretum_reset", "db");
        std::fs::write(&path, b"dummy").unwrap();
        assert!(path.exists());
        let repo = SqliteStorage::new(&path);
        repo.reset_all().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn sqlite_init_initializes_schema() {
        let path = unique_temp_file("arboretum_init", "db");
        let repo = SqliteStorage::new(&path);
        repo.init().unwrap();

        assert!(path.exists());

        let conn = Connection::open(&path).unwrap();
        let table = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='trees'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .unwrap();
        assert_eq!(table.as_deref(), Some("trees"));

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn sqlite_fails_on_mismatched_schema_version() {
        let path = unique_temp_file("arboretum_bad_version", "db");
        let repo = SqliteStorage::new(&path);

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();

        let err = repo
            .init()
            .expect_err("init should fail on version mismatch");
        let msg = format!("{err}");
        assert!(msg.contains("database schema version mismatch"));
        assert!(msg.contains("--reset"));
    }

    #[test]
    fn sqlite_list_is_empty_on_fresh_db() {
        let repo = fresh_repo("arboretum_empty");
        assert!(repo.list_trees().unwrap().is_empty());
    }

    #[test]
    fn sqlite_create_assigns_id_and_timestamp() {
        let repo = fresh_repo("arboretum_create");
        let before = Utc::now() - chrono::Duration::seconds(5);

        let created = repo
            .create_tree(&NewTree::new("Oak", "Yard").with_height(10.0))
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.common_name, "Oak");
        assert_eq!(created.location, "Yard");
        assert_eq!(created.height, Some(10.0));
        assert_eq!(created.scientific_name, None);
        assert!(!created.is_favorite);
        assert!(created.created_at >= before);
    }

    #[test]
    fn sqlite_create_never_reuses_ids() {
        let repo = fresh_repo("arboretum_ids");
        let mut seen = HashSet::new();
        for i in 0..5 {
            let tree = repo
                .create_tree(&NewTree::new(format!("Tree {i}"), "Grove"))
                .unwrap();
            assert!(seen.insert(tree.id), "id {} handed out twice", tree.id);
        }

        // ids of deleted rows are not handed out again
        let last = *seen.iter().max().unwrap();
        repo.delete_tree(last).unwrap();
        let next = repo.create_tree(&NewTree::new("Late", "Grove")).unwrap();
        assert!(!seen.contains(&next.id));
    }

    #[test]
    fn sqlite_load_returns_created_row() {
        let repo = fresh_repo("arboretum_load");
        let created = repo
            .create_tree(
                &NewTree::new("Coast Redwood", "Muir Woods")
                    .with_scientific_name("Sequoia sempervirens")
                    .with_height(76.2)
                    .with_description("A towering giant of the forest.")
                    .favorite(true),
            )
            .unwrap();

        let loaded = repo.load_tree(created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert!(repo.load_tree(999_999).unwrap().is_none());
    }

    #[test]
    fn sqlite_delete_is_idempotent() {
        let repo = fresh_repo("arboretum_delete");
        let created = repo.create_tree(&NewTree::new("Elm", "Street")).unwrap();

        assert!(repo.delete_tree(created.id).unwrap());
        assert!(repo.load_tree(created.id).unwrap().is_none());
        assert!(!repo.delete_tree(created.id).unwrap());
        assert!(!repo.delete_tree(424_242).unwrap());
    }

    #[test]
    fn sqlite_list_reflects_creates_and_deletes() {
        let repo = fresh_repo("arboretum_list");
        let ids: Vec<TreeId> = (0..4)
            .map(|i| {
                repo.create_tree(&NewTree::new(format!("Tree {i}"), "Orchard"))
                    .unwrap()
                    .id
            })
            .collect();
        repo.delete_tree(ids[1]).unwrap();
        repo.delete_tree(ids[3]).unwrap();

        let listed = repo.list_trees().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, ids[0]);
        assert_eq!(listed[1].id, ids[2]);
    }

    #[test]
    fn sqlite_rejects_rows_breaking_table_constraints() {
        let repo = fresh_repo("arboretum_check");
        assert!(repo.create_tree(&NewTree::new("  ", "Yard")).is_err());
        assert!(repo
            .create_tree(&NewTree::new("Oak", "Yard").with_height(-1.0))
            .is_err());
        assert!(repo.list_trees().unwrap().is_empty());
    }
}
