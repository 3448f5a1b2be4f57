use crate::domain::user::{SavedBook, User};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
    /// Adds `book` to the user's saved set, deduplicated by `book_id`
    /// (an existing entry with the same id is replaced). Returns the
    /// updated user, or `None` if no such user.
    async fn upsert_saved_book(&self, user_id: &str, book: SavedBook) -> Result<Option<User>>;
    /// Removes every saved entry matching `book_id`. Returns the updated
    /// user (unchanged when nothing matched), or `None` if no such user.
    async fn remove_saved_book(&self, user_id: &str, book_id: &str) -> Result<Option<User>>;
}
