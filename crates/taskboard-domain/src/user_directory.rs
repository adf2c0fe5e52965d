use std::sync::Arc;

use taskboard_core::{TaskboardError, TaskboardResult};
use tracing::info;

use crate::{
    store::EntityStore,
    user::{normalize_email, validate_email, Role, User, UserSummary},
};

pub struct UserDirectory {
    store: Arc<dyn EntityStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn register_user(
        &self,
        name: &str,
        email: &str,
        role: Option<Role>,
    ) -> TaskboardResult<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskboardError::validation("name", "Name is required"));
        }
        let email = validate_email(email)?;
        if self.store.find_user_by_email(email.clone()).await?.is_some() {
            return Err(TaskboardError::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let user = User::new(name.to_string(), email, role.unwrap_or_default());
        self.store.insert_user(user.clone()).await?;
        info!("Registered user {} as {:?}", user.email, user.role);
        Ok(user)
    }

    pub async fn list_users(&self) -> TaskboardResult<Vec<UserSummary>> {
        let mut users = self.store.list_users().await?;
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users.iter().map(User::summary).collect())
    }

    /// The user a request acts as. An unknown email is a denial, not a lookup miss.
    pub async fn resolve_actor(&self, email: &str) -> TaskboardResult<User> {
        self.store
            .find_user_by_email(normalize_email(email))
            .await?
            .ok_or_else(|| {
                TaskboardError::Unauthorized(format!("Unknown actor {}", email.trim()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockEntityStore;

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let existing = User::new("Ann".into(), "ann@example.com".into(), Role::Member);
        let mut store = MockEntityStore::new();
        store
            .expect_find_user_by_email()
            .withf(|email| email == "ann@example.com")
            .returning(move |_| Ok(Some(existing.clone())));
        store.expect_insert_user().never();

        let users = UserDirectory::new(Arc::new(store));
        let err = users
            .register_user("Ann", " ANN@example.com ", None)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn register_defaults_to_member() {
        let mut store = MockEntityStore::new();
        store.expect_find_user_by_email().returning(|_| Ok(None));
        store.expect_insert_user().times(1).returning(|_| Ok(()));

        let users = UserDirectory::new(Arc::new(store));
        let user = users
            .register_user(" Bo ", "Bo@Example.com", None)
            .await
            .unwrap();
        assert_eq!(user.name, "Bo");
        assert_eq!(user.email, "bo@example.com");
        assert_eq!(user.role, Role::Member);
    }

    #[tokio::test]
    async fn unknown_actor_is_unauthorized() {
        let mut store = MockEntityStore::new();
        store.expect_find_user_by_email().returning(|_| Ok(None));

        let users = UserDirectory::new(Arc::new(store));
        let err = users.resolve_actor("ghost@example.com").await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
