use crate::domain::repository::UserRepository;
use crate::domain::user::{SavedBook, User};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id, email = %user.email))]
    async fn save_user(&self, user: User) -> Result<()> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        storage.insert(user.id.clone(), user);
        debug!("User saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(email = email))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.values().find(|u| u.email == email).cloned();
        match &user {
            Some(u) => debug!(user_id = %u.id, "User found by email"),
            None => trace!("User not found by email"),
        }
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id))]
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        trace!("Acquiring read lock for user storage");
        let storage = self.storage.read().await;
        let user = storage.get(id).cloned();
        match &user {
            Some(u) => debug!(email = %u.email, "User found by id"),
            None => trace!("User not found by id"),
        }
        Ok(user)
    }

    #[instrument(skip(self, book), fields(user_id = user_id, book_id = %book.book_id))]
    async fn upsert_saved_book(&self, user_id: &str, book: SavedBook) -> Result<Option<User>> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        let Some(user) = storage.get_mut(user_id) else {
            trace!("User not found during book upsert");
            return Ok(None);
        };

        // Set semantics: one entry per book_id, last write wins.
        match user
            .saved_books
            .iter_mut()
            .find(|b| b.book_id == book.book_id)
        {
            Some(existing) => {
                *existing = book;
                debug!("Existing saved book replaced");
            }
            None => {
                user.saved_books.push(book);
                debug!(count = user.saved_books.len(), "Saved book added");
            }
        }

        Ok(Some(user.clone()))
    }

    #[instrument(skip(self), fields(user_id = user_id, book_id = book_id))]
    async fn remove_saved_book(&self, user_id: &str, book_id: &str) -> Result<Option<User>> {
        trace!("Acquiring write lock for user storage");
        let mut storage = self.storage.write().await;
        let Some(user) = storage.get_mut(user_id) else {
            trace!("User not found during book removal");
            return Ok(None);
        };

        let before = user.saved_books.len();
        user.saved_books.retain(|b| b.book_id != book_id);
        debug!(removed = before - user.saved_books.len(), "Saved books removed");

        Ok(Some(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.to_string(),
            username: "tester".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            saved_books: vec![],
        }
    }

    fn book(book_id: &str, title: &str) -> SavedBook {
        SavedBook {
            book_id: book_id.to_string(),
            title: title.to_string(),
            authors: vec![],
            description: String::new(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_save_user_saves_user_correctly() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-1", "test@example.com")).await.unwrap();

        let retrieved = repo.find_user_by_id("user-1").await.unwrap().unwrap();
        assert_eq!(retrieved.id, "user-1");
        assert_eq!(retrieved.email, "test@example.com");
        assert!(retrieved.saved_books.is_empty());
    }

    #[tokio::test]
    async fn test_find_user_by_email_finds_user() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-2", "alice@example.com")).await.unwrap();

        let found = repo.find_user_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, "user-2");
    }

    #[tokio::test]
    async fn test_find_user_by_email_returns_none_for_nonexistent_email() {
        let repo = InMemoryUserRepository::new();
        let found = repo.find_user_by_email("nobody@example.com").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_user_by_id_returns_none_for_nonexistent_id() {
        let repo = InMemoryUserRepository::new();
        let found = repo.find_user_by_id("nonexistent-id").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_upsert_saved_book_appends_new_book() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-3", "b@example.com")).await.unwrap();

        let updated = repo
            .upsert_saved_book("user-3", book("B1", "Dune"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.saved_books.len(), 1);
        assert_eq!(updated.saved_books[0].book_id, "B1");
    }

    #[tokio::test]
    async fn test_upsert_saved_book_is_idempotent_per_book_id() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-4", "c@example.com")).await.unwrap();

        repo.upsert_saved_book("user-4", book("B1", "Dune"))
            .await
            .unwrap();
        let updated = repo
            .upsert_saved_book("user-4", book("B1", "Dune (2nd ed)"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.saved_books.len(), 1);
        assert_eq!(updated.saved_books[0].title, "Dune (2nd ed)");
    }

    #[tokio::test]
    async fn test_upsert_saved_book_preserves_order_of_other_books() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-5", "d@example.com")).await.unwrap();

        repo.upsert_saved_book("user-5", book("B1", "Dune")).await.unwrap();
        repo.upsert_saved_book("user-5", book("B2", "Hyperion")).await.unwrap();
        let updated = repo
            .upsert_saved_book("user-5", book("B1", "Dune Messiah"))
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<&str> = updated.saved_books.iter().map(|b| b.book_id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B2"]);
        assert_eq!(updated.saved_books[0].title, "Dune Messiah");
    }

    #[tokio::test]
    async fn test_upsert_saved_book_returns_none_for_missing_user() {
        let repo = InMemoryUserRepository::new();
        let result = repo.upsert_saved_book("ghost", book("B1", "Dune")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_remove_saved_book_removes_matching_entry() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-6", "e@example.com")).await.unwrap();
        repo.upsert_saved_book("user-6", book("B1", "Dune")).await.unwrap();
        repo.upsert_saved_book("user-6", book("B2", "Hyperion")).await.unwrap();

        let updated = repo
            .remove_saved_book("user-6", "B1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.saved_books.len(), 1);
        assert_eq!(updated.saved_books[0].book_id, "B2");
    }

    #[tokio::test]
    async fn test_remove_saved_book_succeeds_when_nothing_matches() {
        let repo = InMemoryUserRepository::new();
        repo.save_user(user("user-7", "f@example.com")).await.unwrap();
        repo.upsert_saved_book("user-7", book("B1", "Dune")).await.unwrap();

        let updated = repo
            .remove_saved_book("user-7", "B9")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.saved_books.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_book_saves_for_distinct_users() {
        let repo = InMemoryUserRepository::new();
        for i in 0..10 {
            repo.save_user(user(&format!("user-{}", i), &format!("u{}@example.com", i)))
                .await
                .unwrap();
        }

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo_clone = repo.clone();
                tokio::spawn(async move {
                    repo_clone
                        .upsert_saved_book(&format!("user-{}", i), SavedBook {
                            book_id: "B1".to_string(),
                            title: format!("Title {}", i),
                            authors: vec![],
                            description: String::new(),
                            image: String::new(),
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_some());
        }

        for i in 0..10 {
            let found = repo.find_user_by_id(&format!("user-{}", i)).await.unwrap().unwrap();
            assert_eq!(found.saved_books.len(), 1);
        }
    }
}
