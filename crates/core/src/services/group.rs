//! Group service.

use chrono::Utc;
use maru_common::{AppError, AppResult, IdGenerator};
use maru_db::{
    entities::{group, group_member, group_member::MembershipStatus},
    repositories::GroupRepository,
};
use sea_orm::Set;
use serde::Serialize;

/// Group summary for profile and listing responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group_id: String,
    pub group_name: String,
    pub group_image: Option<String>,
}

impl From<group::Model> for GroupSummary {
    fn from(g: group::Model) -> Self {
        Self {
            group_id: g.id,
            group_name: g.name,
            group_image: g.photo_path,
        }
    }
}

/// Service for managing groups and memberships.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a group by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_id(id).await
    }

    /// Create a group. The creator becomes an ACTIVE member.
    pub async fn create(
        &self,
        user_id: &str,
        name: String,
        photo_path: Option<String>,
    ) -> AppResult<group::Model> {
        let now = Utc::now();
        let group_id = self.id_gen.generate();

        let group_model = group::ActiveModel {
            id: Set(group_id.clone()),
            name: Set(name),
            photo_path: Set(photo_path),
            created_at: Set(now.into()),
        };
        let member_model = group_member::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            group_id: Set(group_id),
            status: Set(MembershipStatus::Active),
            joined_at: Set(now.into()),
            updated_at: Set(None),
        };

        let group = self
            .group_repo
            .create_with_owner(group_model, member_model)
            .await?;
        tracing::info!(group_id = %group.id, user_id = %user_id, "Group created");
        Ok(group)
    }

    /// Join a group as an ACTIVE member.
    ///
    /// A returning NON_MEMBER is reactivated; a banned user stays banned.
    pub async fn join(&self, user_id: &str, group_id: &str) -> AppResult<group_member::Model> {
        self.group_repo.get_by_id(group_id).await?;

        match self.group_repo.find_membership(user_id, group_id).await? {
            Some(membership) => match membership.status {
                MembershipStatus::Active => Err(AppError::AlreadyExists(format!(
                    "User {user_id} is already a member of group {group_id}"
                ))),
                MembershipStatus::Banned => Err(AppError::Forbidden(
                    "Banned users cannot rejoin the group".to_string(),
                )),
                MembershipStatus::NonMember => {
                    self.group_repo
                        .update_membership_status(membership, MembershipStatus::Active)
                        .await
                }
            },
            None => {
                let model = group_member::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    group_id: Set(group_id.to_string()),
                    status: Set(MembershipStatus::Active),
                    joined_at: Set(Utc::now().into()),
                    updated_at: Set(None),
                };
                self.group_repo.create_membership(model).await
            }
        }
    }

    /// Leave a group. The membership row is kept as NON_MEMBER so existing
    /// posts stay attributable.
    pub async fn leave(&self, user_id: &str, group_id: &str) -> AppResult<()> {
        let membership = self
            .group_repo
            .find_membership(user_id, group_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {user_id} has no membership in group {group_id}"))
            })?;

        self.group_repo
            .update_membership_status(membership, MembershipStatus::NonMember)
            .await?;
        tracing::info!(group_id = %group_id, user_id = %user_id, "Member left group");
        Ok(())
    }

    /// The caller's membership row in a group, or not-found.
    ///
    /// Gates group-scoped reads: having a row (even BANNED) permits reading,
    /// while a missing row is indistinguishable from an unknown group.
    pub async fn require_membership(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> AppResult<group_member::Model> {
        self.group_repo
            .find_membership(user_id, group_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {user_id} has no membership in group {group_id}"))
            })
    }

    /// Groups a user currently belongs to (NON_MEMBER rows are skipped).
    pub async fn my_groups(&self, user_id: &str) -> AppResult<Vec<GroupSummary>> {
        let rows = self.group_repo.find_groups_for_user(user_id).await?;

        Ok(rows
            .into_iter()
            .filter(|(membership, _)| membership.status != MembershipStatus::NonMember)
            .filter_map(|(_, group)| group.map(Into::into))
            .collect())
    }
}
