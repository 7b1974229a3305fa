//! Authors domain methods on Repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::{blank_to_null, push_like, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorShort, CreateAuthor, UpdateAuthor},
        fold_case, Pagination,
    },
};

const AUTHOR_SHORT_SELECT: &str = r#"
    SELECT a.id, a.name,
           (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) AS book_count
    FROM authors a
"#;

fn push_author_filter(qb: &mut QueryBuilder<'_, Sqlite>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        qb.push(" WHERE ");
        push_like(qb, "a.name_folded", pattern);
    }
}

impl Repository {
    /// Get author by ID
    pub async fn authors_get_by_id(&self, id: i64) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    pub async fn authors_exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search authors by name (pattern already escaped), ordered by name
    pub async fn authors_search(
        &self,
        pattern: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<(Vec<AuthorShort>, i64, Pagination)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM authors a");
        push_author_filter(&mut count, pattern);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let pagination = pagination.clamp_to(total);
        let authors = self
            .authors_find(pattern, pagination.per_page, pagination.offset())
            .await?;

        Ok((authors, total, pagination))
    }

    pub async fn authors_find(
        &self,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<AuthorShort>> {
        let mut qb = QueryBuilder::<Sqlite>::new(AUTHOR_SHORT_SELECT);
        push_author_filter(&mut qb, pattern);
        qb.push(" ORDER BY a.name_folded, a.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<AuthorShort>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Create author
    pub async fn authors_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (name, name_folded, biography, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(fold_case(&data.name))
        .bind(&data.biography)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the fields present in `data`
    pub async fn authors_update(&self, id: i64, data: &UpdateAuthor) -> AppResult<Author> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE authors SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(ref name) = data.name {
            qb.push(", name = ").push_bind(name.clone());
            qb.push(", name_folded = ").push_bind(fold_case(name));
        }
        if let Some(ref biography) = data.biography {
            qb.push(", biography = ").push_bind(blank_to_null(biography));
        }

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Author>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Delete an author; refused while any book references it
    pub async fn authors_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Author {} is referenced by {} book(s)",
                id, books
            )));
        }

        sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_constraint(e, format!("Author {} is referenced by a book", id))
            })?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn authors_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
