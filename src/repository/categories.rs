//! Categories domain methods on Repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::{blank_to_null, push_like, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        category::{Category, CategoryShort, CreateCategory, UpdateCategory},
        fold_case, Pagination,
    },
};

const CATEGORY_SHORT_SELECT: &str = r#"
    SELECT c.id, c.name, c.description,
           (SELECT COUNT(*) FROM books b WHERE b.category_id = c.id) AS book_count
    FROM categories c
"#;

fn push_category_filter(qb: &mut QueryBuilder<'_, Sqlite>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        qb.push(" WHERE ");
        push_like(qb, "c.name_folded", pattern);
    }
}

impl Repository {
    pub async fn categories_get_by_id(&self, id: i64) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    pub async fn categories_exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if a category name is taken (case-insensitive)
    pub async fn categories_name_exists(&self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name_folded = ? AND id != ?)",
        )
        .bind(fold_case(name))
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn categories_search(
        &self,
        pattern: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<(Vec<CategoryShort>, i64, Pagination)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM categories c");
        push_category_filter(&mut count, pattern);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let pagination = pagination.clamp_to(total);
        let categories = self
            .categories_find(pattern, pagination.per_page, pagination.offset())
            .await?;

        Ok((categories, total, pagination))
    }

    pub async fn categories_find(
        &self,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<CategoryShort>> {
        let mut qb = QueryBuilder::<Sqlite>::new(CATEGORY_SHORT_SELECT);
        push_category_filter(&mut qb, pattern);
        qb.push(" ORDER BY c.name_folded, c.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<CategoryShort>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn categories_create(&self, data: &CreateCategory) -> AppResult<Category> {
        let now = Utc::now();
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, name_folded, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(fold_case(&data.name))
        .bind(&data.description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_constraint(e, format!("Category '{}' already exists", data.name)))
    }

    pub async fn categories_update(&self, id: i64, data: &UpdateCategory) -> AppResult<Category> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE categories SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(ref name) = data.name {
            qb.push(", name = ").push_bind(name.clone());
            qb.push(", name_folded = ").push_bind(fold_case(name));
        }
        if let Some(ref description) = data.description {
            qb.push(", description = ").push_bind(blank_to_null(description));
        }

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Category>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "Category name already exists"))?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Delete a category; refused while any book references it
    pub async fn categories_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if books > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} is referenced by {} book(s)",
                id, books
            )));
        }

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::from_constraint(e, format!("Category {} is referenced by a book", id))
            })?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn categories_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
