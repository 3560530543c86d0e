//! User service.

use maru_common::AppResult;
use maru_db::{entities::user, repositories::UserRepository};
use serde::Serialize;

use crate::services::group::{GroupService, GroupSummary};

/// Profile of the authenticated user, with group summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub groups: Vec<GroupSummary>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    group_service: GroupService,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, group_service: GroupService) -> Self {
        Self {
            user_repo,
            group_service,
        }
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Profile of a user, with the groups they belong to.
    pub async fn profile(&self, user_id: &str) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let groups = self.group_service.my_groups(user_id).await?;

        Ok(UserProfile {
            user_id: user.id,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role,
            groups,
        })
    }

    /// Delete an account. Memberships, contents, and reactions cascade.
    pub async fn delete_account(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.delete(user_id).await?;
        tracing::info!(user_id = %user_id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maru_common::AppError;
    use maru_db::repositories::GroupRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            provider: "kakao".to_string(),
            provider_user_id: format!("kakao-{id}"),
            username: "tester".to_string(),
            email: Some("tester@example.com".to_string()),
            avatar_url: None,
            role: "user".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(
            UserRepository::new(user_db),
            GroupService::new(GroupRepository::new(group_db)),
        );

        let result = service.profile("missing").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_profile_includes_basic_fields() {
        use maru_db::entities::{group, group_member};

        let user = create_test_user("u1");
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<(group_member::Model, group::Model)>::new()])
                .into_connection(),
        );

        let service = UserService::new(
            UserRepository::new(user_db),
            GroupService::new(GroupRepository::new(group_db)),
        );

        let profile = service.profile("u1").await.unwrap();
        assert_eq!(profile.username, "tester");
        assert_eq!(profile.email.as_deref(), Some("tester@example.com"));
        assert!(profile.groups.is_empty());
    }
}
