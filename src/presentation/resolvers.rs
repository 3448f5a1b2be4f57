use crate::application::auth_service::AuthService;
use crate::application::library_service::LibraryService;
use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{
    AuthPayload, AuthenticatedUser, BookInput, CreateUser, LoginRequest, UserProfile,
};
use anyhow::Result;
use tracing::{instrument, trace, warn};

/// Query/mutation entry points. Every operation takes the caller's
/// identity explicitly; `None` means the request carried no valid token.
pub struct Resolvers<R: UserRepository> {
    auth: AuthService<R>,
    library: LibraryService<R>,
}

impl<R: UserRepository> Resolvers<R> {
    pub fn new(auth: AuthService<R>, library: LibraryService<R>) -> Self {
        Self { auth, library }
    }

    #[instrument(skip(self, identity))]
    pub async fn me(&self, identity: Option<&AuthenticatedUser>) -> Result<UserProfile> {
        let Some(identity) = identity else {
            warn!("Anonymous request to me");
            return Err(DomainError::not_logged_in().into());
        };

        trace!(user_id = %identity.user_id, "Resolving current user");
        // A verified token whose user has vanished is treated the same
        // as no token at all.
        let user = self
            .library
            .current_user(&identity.user_id)
            .await
            .map_err(|e| {
                if matches!(e.downcast_ref::<DomainError>(), Some(DomainError::NotFound(_))) {
                    warn!(user_id = %identity.user_id, "Token references missing user");
                    DomainError::not_logged_in().into()
                } else {
                    e
                }
            })?;

        Ok(user.into())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn add_user(&self, input: CreateUser) -> Result<AuthPayload> {
        let (token, user) = self.auth.register_user(input).await?;
        Ok(AuthPayload {
            token,
            user: user.into(),
        })
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginRequest) -> Result<AuthPayload> {
        let (token, user) = self.auth.login(input).await?;
        Ok(AuthPayload {
            token,
            user: user.into(),
        })
    }

    #[instrument(skip(self, identity, input), fields(book_id = %input.book_id))]
    pub async fn save_book(
        &self,
        identity: Option<&AuthenticatedUser>,
        input: BookInput,
    ) -> Result<UserProfile> {
        let Some(identity) = identity else {
            warn!("Anonymous request to saveBook");
            return Err(DomainError::login_required().into());
        };

        let user = self.library.save_book(&identity.user_id, input).await?;
        Ok(user.into())
    }

    #[instrument(skip(self, identity))]
    pub async fn remove_book(
        &self,
        identity: Option<&AuthenticatedUser>,
        book_id: &str,
    ) -> Result<UserProfile> {
        let Some(identity) = identity else {
            warn!("Anonymous request to removeBook");
            return Err(DomainError::login_required().into());
        };

        let user = self.library.remove_book(&identity.user_id, book_id).await?;
        Ok(user.into())
    }
}
