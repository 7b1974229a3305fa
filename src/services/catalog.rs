//! Catalog management service: books, authors and categories

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        admin::AuthState,
        author::{Author, AuthorQuery, AuthorShort, CreateAuthor, UpdateAuthor},
        book::{Book, BookQuery, BookShort, CreateBook, UpdateBook},
        category::{Category, CategoryQuery, CategoryShort, CreateCategory, UpdateCategory},
        like_pattern, PaginatedResponse, Pagination,
    },
    repository::Repository,
};

/// Escaped LIKE pattern for a non-blank search term
pub(crate) fn search_pattern(q: Option<&str>) -> Option<String> {
    q.map(str::trim).filter(|q| !q.is_empty()).map(like_pattern)
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ---- Books ----

    /// List or search books, newest first
    pub async fn search_books(&self, auth: &AuthState, query: &BookQuery) -> AppResult<PaginatedResponse<BookShort>> {
        auth.require_admin()?;
        let pattern = search_pattern(query.q.as_deref());
        let (books, total, pagination) = self
            .repository
            .books_search(
                query.search_filter(),
                pattern.as_deref(),
                Pagination::new(query.page, query.per_page),
            )
            .await?;
        Ok(PaginatedResponse::new(books, total, pagination))
    }

    pub async fn get_book(&self, auth: &AuthState, id: i64) -> AppResult<Book> {
        auth.require_admin()?;
        self.repository.books_get_by_id(id).await
    }

    /// Create a book; author and category must already exist
    pub async fn create_book(&self, auth: &AuthState, data: CreateBook) -> AppResult<Book> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;

        self.ensure_book_references(Some(data.author_id), Some(data.category_id))
            .await?;
        if let Some(ref isbn) = data.isbn {
            self.ensure_isbn_free(isbn, None).await?;
        }

        let book = self.repository.books_create(&data).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, auth: &AuthState, id: i64, data: UpdateBook) -> AppResult<Book> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;
        if !data.validate_isbn() {
            return Err(AppError::Validation("isbn: Invalid ISBN".to_string()));
        }

        self.repository.books_get_by_id(id).await?;
        self.ensure_book_references(data.author_id, data.category_id)
            .await?;
        if let Some(isbn) = data.isbn.as_deref().filter(|i| !i.is_empty()) {
            self.ensure_isbn_free(isbn, Some(id)).await?;
        }

        let book = self.repository.books_update(id, &data).await?;
        tracing::info!(book_id = id, "Book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, auth: &AuthState, id: i64) -> AppResult<()> {
        auth.require_admin()?;
        self.repository.books_delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    async fn ensure_book_references(&self, author_id: Option<i64>, category_id: Option<i64>) -> AppResult<()> {
        if let Some(author_id) = author_id {
            if !self.repository.authors_exists(author_id).await? {
                return Err(AppError::Validation(format!(
                    "author_id: Author {} does not exist",
                    author_id
                )));
            }
        }
        if let Some(category_id) = category_id {
            if !self.repository.categories_exists(category_id).await? {
                return Err(AppError::Validation(format!(
                    "category_id: Category {} does not exist",
                    category_id
                )));
            }
        }
        Ok(())
    }

    async fn ensure_isbn_free(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<()> {
        if self.repository.books_isbn_exists(isbn, exclude_id).await? {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }
        Ok(())
    }

    // ---- Authors ----

    /// List or search authors by name
    pub async fn search_authors(&self, auth: &AuthState, query: &AuthorQuery) -> AppResult<PaginatedResponse<AuthorShort>> {
        auth.require_admin()?;
        let pattern = search_pattern(query.q.as_deref());
        let (authors, total, pagination) = self
            .repository
            .authors_search(pattern.as_deref(), Pagination::new(query.page, query.per_page))
            .await?;
        Ok(PaginatedResponse::new(authors, total, pagination))
    }

    pub async fn get_author(&self, auth: &AuthState, id: i64) -> AppResult<Author> {
        auth.require_admin()?;
        self.repository.authors_get_by_id(id).await
    }

    pub async fn create_author(&self, auth: &AuthState, data: CreateAuthor) -> AppResult<Author> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;

        let author = self.repository.authors_create(&data).await?;
        tracing::info!(author_id = author.id, name = %author.name, "Author created");
        Ok(author)
    }

    pub async fn update_author(&self, auth: &AuthState, id: i64, data: UpdateAuthor) -> AppResult<Author> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;

        let author = self.repository.authors_update(id, &data).await?;
        tracing::info!(author_id = id, "Author updated");
        Ok(author)
    }

    /// Delete an author; blocked while books reference it
    pub async fn delete_author(&self, auth: &AuthState, id: i64) -> AppResult<()> {
        auth.require_admin()?;
        self.repository.authors_delete(id).await?;
        tracing::info!(author_id = id, "Author deleted");
        Ok(())
    }

    // ---- Categories ----

    pub async fn search_categories(
        &self,
        auth: &AuthState,
        query: &CategoryQuery,
    ) -> AppResult<PaginatedResponse<CategoryShort>> {
        auth.require_admin()?;
        let pattern = search_pattern(query.q.as_deref());
        let (categories, total, pagination) = self
            .repository
            .categories_search(pattern.as_deref(), Pagination::new(query.page, query.per_page))
            .await?;
        Ok(PaginatedResponse::new(categories, total, pagination))
    }

    pub async fn get_category(&self, auth: &AuthState, id: i64) -> AppResult<Category> {
        auth.require_admin()?;
        self.repository.categories_get_by_id(id).await
    }

    pub async fn create_category(&self, auth: &AuthState, data: CreateCategory) -> AppResult<Category> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;

        if self.repository.categories_name_exists(&data.name, None).await? {
            return Err(AppError::Conflict(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let category = self.repository.categories_create(&data).await?;
        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update_category(&self, auth: &AuthState, id: i64, data: UpdateCategory) -> AppResult<Category> {
        auth.require_admin()?;
        let data = data.normalized();
        data.validate()?;

        self.repository.categories_get_by_id(id).await?;
        if let Some(ref name) = data.name {
            if self.repository.categories_name_exists(name, Some(id)).await? {
                return Err(AppError::Conflict(format!("Category '{}' already exists", name)));
            }
        }

        let category = self.repository.categories_update(id, &data).await?;
        tracing::info!(category_id = id, "Category updated");
        Ok(category)
    }

    /// Delete a category; blocked while books reference it
    pub async fn delete_category(&self, auth: &AuthState, id: i64) -> AppResult<()> {
        auth.require_admin()?;
        self.repository.categories_delete(id).await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}
