use async_trait::async_trait;
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        phone: Option<String>,
    ) -> Result<AuthUser, AuthError>;

    async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        hashes: Mutex<HashMap<Uuid, String>>,    // key: user_id
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn create_user(
            &self,
            first_name: &str,
            last_name: &str,
            email: &str,
            password_hash: &str,
            phone: Option<String>,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                phone,
                role: models::user::ROLE_USER.to_string(),
            };
            users.insert(email.to_string(), user.clone());
            self.hashes.lock().unwrap().insert(user.id, password_hash.to_string());
            Ok(user)
        }

        async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let hashes = self.hashes.lock().unwrap();
            Ok(hashes.get(&user_id).cloned())
        }
    }
}
