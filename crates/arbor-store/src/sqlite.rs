//! `SQLite` page repository.
//!
//! Wraps a sqlx [`SqlitePool`] behind the blocking [`PageRepository`]
//! interface. Queries run on a private current-thread tokio runtime, so
//! methods must not be called from inside another tokio runtime.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tokio::runtime::Runtime;

use crate::criteria::{Criteria, Value};
use crate::page::{Page, PageId};
use crate::repository::{PageRepository, StoreError, StoreErrorKind};

const BACKEND: &str = "Sqlite";

const SELECT_PAGES: &str = "SELECT id, route_name, slug, url, name, enabled, template, \
     position, parent_id, created_at, updated_at FROM pages";

const ORDER_BY: &str = " ORDER BY position ASC, id ASC";

const CREATE_PAGES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    route_name TEXT,
    slug TEXT,
    url TEXT,
    name TEXT,
    enabled INTEGER NOT NULL DEFAULT 1,
    template TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    parent_id INTEGER REFERENCES pages(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Page repository stored in a `SQLite` database.
pub struct SqliteRepository {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if missing) the database at `url` and ensure the
    /// `pages` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the URL is invalid, the database cannot be
    /// opened or the schema cannot be created.
    pub fn connect(url: &str) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                StoreError::new(StoreErrorKind::Unavailable)
                    .with_backend(BACKEND)
                    .with_message("failed to start runtime")
                    .with_source(e)
            })?;

        let options = SqliteConnectOptions::from_str(url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        // One connection keeps `sqlite::memory:` databases shared across calls.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )
            .map_err(map_sqlx_error)?;

        runtime
            .block_on(sqlx::query(CREATE_PAGES_TABLE).execute(&pool))
            .map_err(map_sqlx_error)?;

        tracing::debug!(url = %url, "Opened page database");

        Ok(Self { runtime, pool })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the schema cannot be created.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:")
    }

    fn fetch(&self, query: &mut QueryBuilder<'_, Sqlite>) -> Result<Vec<Page>, StoreError> {
        let rows = self
            .runtime
            .block_on(query.build().fetch_all(&self.pool))
            .map_err(map_sqlx_error)?;
        rows.iter().map(page_from_row).collect()
    }
}

impl Drop for SqliteRepository {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl PageRepository for SqliteRepository {
    fn find_by(&self, criteria: &Criteria) -> Result<Vec<Page>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_PAGES);
        for (i, (field, value)) in criteria.iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });
            query.push(field.column());
            match value {
                Value::Null => {
                    query.push(" IS NULL");
                }
                Value::Text(text) => {
                    query.push(" = ").push_bind(text.clone());
                }
                Value::Integer(n) => {
                    query.push(" = ").push_bind(*n);
                }
                Value::Bool(b) => {
                    query.push(" = ").push_bind(*b);
                }
            }
        }
        query.push(ORDER_BY);
        self.fetch(&mut query)
    }

    fn find_route_name_not(&self, route_name: &str) -> Result<Vec<Page>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_PAGES);
        query
            .push(" WHERE route_name <> ")
            .push_bind(route_name.to_owned())
            .push(ORDER_BY);
        self.fetch(&mut query)
    }

    fn load_all(&self) -> Result<Vec<Page>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_PAGES);
        query.push(ORDER_BY);
        self.fetch(&mut query)
    }

    fn persist(&self, pages: &mut [Page]) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            for page in pages.iter_mut() {
                match page.id {
                    Some(id) => {
                        let result = sqlx::query(
                            "UPDATE pages SET route_name = ?, slug = ?, url = ?, name = ?, \
                             enabled = ?, template = ?, position = ?, parent_id = ?, \
                             created_at = ?, updated_at = ? WHERE id = ?",
                        )
                        .bind(page.route_name.as_deref())
                        .bind(page.slug.as_deref())
                        .bind(page.url.as_deref())
                        .bind(page.name.as_deref())
                        .bind(page.enabled)
                        .bind(page.template.as_deref())
                        .bind(page.position)
                        .bind(page.parent.map(|p| p.0))
                        .bind(page.created_at)
                        .bind(page.updated_at)
                        .bind(id.0)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_sqlx_error)?;

                        if result.rows_affected() == 0 {
                            return Err(StoreError::new(StoreErrorKind::NotFound)
                                .with_backend(BACKEND)
                                .with_message(format!("page {id}")));
                        }
                    }
                    None => {
                        let result = sqlx::query(
                            "INSERT INTO pages (route_name, slug, url, name, enabled, template, \
                             position, parent_id, created_at, updated_at) \
                             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                        )
                        .bind(page.route_name.as_deref())
                        .bind(page.slug.as_deref())
                        .bind(page.url.as_deref())
                        .bind(page.name.as_deref())
                        .bind(page.enabled)
                        .bind(page.template.as_deref())
                        .bind(page.position)
                        .bind(page.parent.map(|p| p.0))
                        .bind(page.created_at)
                        .bind(page.updated_at)
                        .execute(&mut *tx)
                        .await
                        .map_err(map_sqlx_error)?;

                        page.id = Some(PageId(result.last_insert_rowid()));
                    }
                }
            }

            tx.commit().await.map_err(map_sqlx_error)
        })
    }
}

fn page_from_row(row: &SqliteRow) -> Result<Page, StoreError> {
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(map_sqlx_error)?;
    let parent: Option<i64> = row.try_get("parent_id").map_err(map_sqlx_error)?;

    Ok(Page {
        id: Some(PageId(row.try_get("id").map_err(map_sqlx_error)?)),
        route_name: row.try_get("route_name").map_err(map_sqlx_error)?,
        slug: row.try_get("slug").map_err(map_sqlx_error)?,
        url: row.try_get("url").map_err(map_sqlx_error)?,
        name: row.try_get("name").map_err(map_sqlx_error)?,
        enabled: row.try_get("enabled").map_err(map_sqlx_error)?,
        template: row.try_get("template").map_err(map_sqlx_error)?,
        position: row.try_get("position").map_err(map_sqlx_error)?,
        parent: parent.map(PageId),
        created_at,
        updated_at,
        children: Vec::new(),
        children_loaded: false,
    })
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let kind = match &err {
        sqlx::Error::Database(db) => match db.kind() {
            sqlx::error::ErrorKind::UniqueViolation
            | sqlx::error::ErrorKind::ForeignKeyViolation
            | sqlx::error::ErrorKind::NotNullViolation
            | sqlx::error::ErrorKind::CheckViolation => StoreErrorKind::Constraint,
            _ => StoreErrorKind::Other,
        },
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreErrorKind::Unavailable
        }
        sqlx::Error::RowNotFound => StoreErrorKind::NotFound,
        sqlx::Error::Configuration(_) | sqlx::Error::ColumnNotFound(_) => {
            StoreErrorKind::InvalidField
        }
        _ => StoreErrorKind::Other,
    };
    StoreError::new(kind).with_backend(BACKEND).with_source(err)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::criteria::PageField;
    use crate::page::CMS_ROUTE_NAME;

    fn page(name: &str, route: &str, position: i64, parent: Option<PageId>) -> Page {
        Page {
            name: Some(name.to_owned()),
            route_name: Some(route.to_owned()),
            slug: Some(name.to_lowercase()),
            position,
            parent,
            ..Page::new(Utc::now())
        }
    }

    fn names(pages: &[Page]) -> Vec<&str> {
        pages.iter().filter_map(|p| p.name.as_deref()).collect()
    }

    #[test]
    fn test_persist_assigns_ids() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut pages = [
            page("Home", "homepage", 0, None),
            page("About", CMS_ROUTE_NAME, 1, None),
        ];

        repository.persist(&mut pages).unwrap();

        assert!(pages[0].id.is_some());
        assert!(pages[1].id.is_some());
        assert_ne!(pages[0].id, pages[1].id);
    }

    #[test]
    fn test_persist_updates_existing_page() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut pages = [page("About", CMS_ROUTE_NAME, 0, None)];
        repository.persist(&mut pages).unwrap();

        pages[0].url = Some("/about".to_owned());
        repository.persist(&mut pages).unwrap();

        let loaded = repository.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].url.as_deref(), Some("/about"));
        assert_eq!(loaded[0].id, pages[0].id);
    }

    #[test]
    fn test_persist_update_missing_page_fails_without_writing() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut missing = page("Ghost", CMS_ROUTE_NAME, 0, None);
        missing.id = Some(PageId(42));
        let mut pages = [page("New", CMS_ROUTE_NAME, 0, None), missing];

        let err = repository.persist(&mut pages).unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert!(repository.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_persist_rejects_unknown_parent() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut pages = [page("Orphan", CMS_ROUTE_NAME, 0, Some(PageId(99)))];

        let err = repository.persist(&mut pages).unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::Constraint);
    }

    #[test]
    fn test_load_all_orders_by_position() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut pages = [
            page("Third", CMS_ROUTE_NAME, 2, None),
            page("First", CMS_ROUTE_NAME, 0, None),
            page("Second", CMS_ROUTE_NAME, 1, None),
        ];
        repository.persist(&mut pages).unwrap();

        let loaded = repository.load_all().unwrap();

        assert_eq!(names(&loaded), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_find_by_criteria() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut pages = [
            page("Home", "homepage", 0, None),
            page("About", CMS_ROUTE_NAME, 1, None),
        ];
        repository.persist(&mut pages).unwrap();

        let found = repository
            .find_by(&Criteria::new().eq(PageField::RouteName, "homepage"))
            .unwrap();

        assert_eq!(names(&found), vec!["Home"]);
    }

    #[test]
    fn test_find_by_null_and_bool() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut parent = [page("Parent", CMS_ROUTE_NAME, 0, None)];
        repository.persist(&mut parent).unwrap();
        let mut child = [page("Child", CMS_ROUTE_NAME, 0, parent[0].id)];
        child[0].enabled = false;
        repository.persist(&mut child).unwrap();

        let roots = repository
            .find_by(&Criteria::new().eq(PageField::Parent, Value::Null))
            .unwrap();
        let disabled = repository
            .find_by(&Criteria::new().eq(PageField::Enabled, false))
            .unwrap();

        assert_eq!(names(&roots), vec!["Parent"]);
        assert_eq!(names(&disabled), vec!["Child"]);
        assert_eq!(disabled[0].parent, parent[0].id);
    }

    #[test]
    fn test_find_one_by_no_match() {
        let repository = SqliteRepository::in_memory().unwrap();

        let found = repository
            .find_one_by(&Criteria::new().eq(PageField::Url, "/missing"))
            .unwrap();

        assert!(found.is_none());
    }

    #[test]
    fn test_find_route_name_not() {
        let repository = SqliteRepository::in_memory().unwrap();
        let mut pages = [
            page("Home", "homepage", 0, None),
            page("About", CMS_ROUTE_NAME, 1, None),
            page("Contact", "contact", 2, None),
        ];
        pages[2].route_name = None;
        repository.persist(&mut pages).unwrap();

        let found = repository.find_route_name_not(CMS_ROUTE_NAME).unwrap();

        assert_eq!(names(&found), vec!["Home"]);
    }

    #[test]
    fn test_database_file_is_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("arbor.db").display());
        {
            let repository = SqliteRepository::connect(&url).unwrap();
            repository
                .persist(&mut [page("Home", "homepage", 0, None)])
                .unwrap();
        }

        let repository = SqliteRepository::connect(&url).unwrap();

        assert_eq!(names(&repository.load_all().unwrap()), vec!["Home"]);
    }
}
