//! Registration and lookup of users.

use std::sync::Arc;
use studio_core::models::{NewUser, User};
use studio_core::validation::{EmailRequest, NewUserRequest, ValidateRequest};
use studio_core::AppError;
use studio_db::UserStore;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Validate and insert a new user. An email that is already registered is a
    /// [`AppError::Conflict`], whether caught by the lookup or by the unique index.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: NewUserRequest) -> Result<User, AppError> {
        request.check()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A user with email {} already exists",
                request.email
            )));
        }

        let new_user = NewUser::from(request);
        self.users.create(&new_user).await
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn get(&self, request: &EmailRequest) -> Result<User, AppError> {
        request.check()?;

        self.users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", request.email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::InMemoryUsers;

    fn request(email: &str, first: &str, last: &str) -> NewUserRequest {
        NewUserRequest {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_get() {
        let service = UserService::new(Arc::new(InMemoryUsers::default()));

        let created = service
            .register(request("ada@example.com", " Ada ", "Lovelace"))
            .await
            .unwrap();
        assert_eq!(created.first_name, "Ada");

        let found = service
            .get(&EmailRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts_and_keeps_original() {
        let users = Arc::new(InMemoryUsers::default());
        let service = UserService::new(users.clone());

        let original = service
            .register(request("ada@example.com", "Ada", "Lovelace"))
            .await
            .unwrap();
        let err = service
            .register(request("ada@example.com", "Someone", "Else"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(users.len(), 1);

        let found = service
            .get(&EmailRequest {
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(found, original);
    }

    #[tokio::test]
    async fn test_invalid_fields_rejected_before_store() {
        let users = Arc::new(InMemoryUsers::default());
        let service = UserService::new(users.clone());

        let err = service
            .register(request("not-an-email", "Ada", "   "))
            .await
            .unwrap_err();
        match err {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("last_name"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert_eq!(users.len(), 0);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let service = UserService::new(Arc::new(InMemoryUsers::default()));
        let err = service
            .get(&EmailRequest {
                email: "nobody@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
