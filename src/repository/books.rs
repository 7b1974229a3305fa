//! Books domain methods on Repository

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

use super::{blank_to_null, folded_opt, push_like, push_like_any, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookSearchFilter, BookShort, CreateBook, UpdateBook},
        fold_case, Pagination,
    },
};

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author_id, a.name AS author_name,
           b.category_id, c.name AS category_name,
           b.copies, b.publication_year, b.image, b.created_at
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN categories c ON c.id = b.category_id
"#;

const BOOK_COUNT_SELECT: &str = r#"
    SELECT COUNT(*)
    FROM books b
    JOIN authors a ON a.id = b.author_id
    JOIN categories c ON c.id = b.category_id
"#;

fn push_book_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: BookSearchFilter, pattern: Option<&str>) {
    let Some(pattern) = pattern else {
        return;
    };
    qb.push(" WHERE ");
    match filter {
        BookSearchFilter::Title => push_like(qb, "b.title_folded", pattern),
        BookSearchFilter::Author => push_like(qb, "a.name_folded", pattern),
        BookSearchFilter::Category => push_like(qb, "c.name_folded", pattern),
        BookSearchFilter::All => push_like_any(
            qb,
            &[
                "b.title_folded",
                "COALESCE(b.description_folded, '')",
                "a.name_folded",
                "c.name_folded",
            ],
            pattern,
        ),
    }
}

/// Engine-level constraint failures on book writes: a dangling reference is
/// bad input, a duplicate ISBN is a conflict.
fn map_book_write_error(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db) if db.is_foreign_key_violation() => {
            AppError::Validation("Author or category does not exist".to_string())
        }
        Some(db) if db.is_unique_violation() => {
            AppError::Conflict("A book with this ISBN already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}

impl Repository {
    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Check if an ISBN is already used by another book
    pub async fn books_isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ? AND id != ?)")
                .bind(isbn)
                .bind(exclude_id.unwrap_or(0))
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Search books, newest first
    pub async fn books_search(
        &self,
        filter: BookSearchFilter,
        pattern: Option<&str>,
        pagination: Pagination,
    ) -> AppResult<(Vec<BookShort>, i64, Pagination)> {
        let mut count = QueryBuilder::<Sqlite>::new(BOOK_COUNT_SELECT);
        push_book_filter(&mut count, filter, pattern);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let pagination = pagination.clamp_to(total);
        let books = self
            .books_find(filter, pattern, pagination.per_page, pagination.offset())
            .await?;

        Ok((books, total, pagination))
    }

    pub async fn books_find(
        &self,
        filter: BookSearchFilter,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<BookShort>> {
        let mut qb = QueryBuilder::<Sqlite>::new(BOOK_SHORT_SELECT);
        push_book_filter(&mut qb, filter, pattern);
        qb.push(" ORDER BY b.created_at DESC, b.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<BookShort>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Create book
    pub async fn books_create(&self, data: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, title_folded, author_id, category_id, description,
                description_folded, copies, publication_year, isbn, image,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(fold_case(&data.title))
        .bind(data.author_id)
        .bind(data.category_id)
        .bind(&data.description)
        .bind(folded_opt(data.description.as_deref()))
        .bind(data.copies.unwrap_or(1))
        .bind(data.publication_year)
        .bind(&data.isbn)
        .bind(&data.image)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_book_write_error)
    }

    /// Update the fields present in `data`
    pub async fn books_update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE books SET updated_at = ");
        qb.push_bind(Utc::now());

        if let Some(ref title) = data.title {
            qb.push(", title = ").push_bind(title.clone());
            qb.push(", title_folded = ").push_bind(fold_case(title));
        }
        if let Some(author_id) = data.author_id {
            qb.push(", author_id = ").push_bind(author_id);
        }
        if let Some(category_id) = data.category_id {
            qb.push(", category_id = ").push_bind(category_id);
        }
        if let Some(ref description) = data.description {
            qb.push(", description = ").push_bind(blank_to_null(description));
            qb.push(", description_folded = ")
                .push_bind(folded_opt(Some(description.as_str())));
        }
        if let Some(copies) = data.copies {
            qb.push(", copies = ").push_bind(copies);
        }
        if let Some(year) = data.publication_year {
            qb.push(", publication_year = ").push_bind(year);
        }
        if let Some(ref isbn) = data.isbn {
            qb.push(", isbn = ").push_bind(blank_to_null(isbn));
        }
        if let Some(ref image) = data.image {
            qb.push(", image = ").push_bind(blank_to_null(image));
        }

        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Book>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_book_write_error)?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Delete book
    pub async fn books_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    pub async fn books_count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
