//! SurrealDB implementation of [`FilmRepository`].

use chrono::{DateTime, Utc};
use sciff_core::error::SciffResult;
use sciff_core::models::film::{CreateFilm, Film};
use sciff_core::repository::FilmRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct FilmRow {
    title: String,
    category_id: String,
    external_url: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FilmRow {
    fn into_film(self, id: Uuid) -> Result<Film, DbError> {
        Ok(Film {
            id,
            title: self.title,
            category_id: parse_uuid(&self.category_id, "category")?,
            external_url: self.external_url,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the film repository.
#[derive(Clone)]
pub struct SurrealFilmRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFilmRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> FilmRepository for SurrealFilmRepository<C> {
    async fn create(&self, input: CreateFilm) -> SciffResult<Film> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('film', $id) SET \
                 title = $title, \
                 category_id = $category_id, \
                 external_url = $external_url, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("category_id", input.category_id.to_string()))
            .bind(("external_url", input.external_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<FilmRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "film".into(),
            id: id_str,
        })?;

        Ok(row.into_film(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<Film> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('film', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FilmRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "film".into(),
            id: id_str,
        })?;

        Ok(row.into_film(id)?)
    }
}
