use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{BookInput, User};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, trace, warn};

/// Read and mutate a user's profile and saved-book set.
pub struct LibraryService<R: UserRepository> {
    user_repository: Arc<R>,
}

impl<R: UserRepository> LibraryService<R> {
    pub fn new(user_repository: Arc<R>) -> Self {
        Self { user_repository }
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn current_user(&self, user_id: &str) -> Result<User> {
        trace!("Fetching current user");
        self.user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "User not found");
                DomainError::NotFound(format!("User not found: {}", user_id)).into()
            })
    }

    #[instrument(skip(self, book), fields(user_id = user_id, book_id = %book.book_id))]
    pub async fn save_book(&self, user_id: &str, book: BookInput) -> Result<User> {
        trace!("Saving book for user");

        if book.book_id.trim().is_empty() {
            warn!("Save rejected, empty bookId");
            return Err(DomainError::Validation("bookId is required".to_string()).into());
        }

        let user = self
            .user_repository
            .upsert_saved_book(user_id, book)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "User not found while saving book");
                DomainError::NotFound(format!("User not found: {}", user_id))
            })?;

        info!(
            user_id = %user.id,
            book_count = user.saved_books.len(),
            "Book saved"
        );
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = user_id, book_id = book_id))]
    pub async fn remove_book(&self, user_id: &str, book_id: &str) -> Result<User> {
        trace!("Removing book for user");

        let user = self
            .user_repository
            .remove_saved_book(user_id, book_id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = user_id, "User not found while removing book");
                DomainError::NotFound(format!("User not found: {}", user_id))
            })?;

        info!(
            user_id = %user.id,
            book_count = user.saved_books.len(),
            "Book removed"
        );
        Ok(user)
    }
}
