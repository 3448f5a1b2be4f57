use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub saved_books: Vec<SavedBook>,
}

/// A user-specific bookmark of an externally-identified book. Unique per
/// user by `book_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedBook {
    pub book_id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// Wire representation of a user: everything except the password hash,
/// plus the saved-book count the client displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub saved_books: Vec<SavedBook>,
    pub book_count: usize,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let book_count = user.saved_books.len();
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            saved_books: user.saved_books,
            book_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Input payload for saving a book; identical shape to [`SavedBook`].
pub type BookInput = SavedBook;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

/// Identity decoded from a session token, rebuilt fresh on every request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub username: String,
}
