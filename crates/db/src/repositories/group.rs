//! Group repository.

use std::sync::Arc;

use crate::entities::{Group, GroupMember, group, group_member, group_member::MembershipStatus};
use chrono::Utc;
use maru_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// Group repository for database operations.
#[derive(Clone)]
pub struct GroupRepository {
    db: Arc<DatabaseConnection>,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<group::Model>> {
        Group::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a group by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<group::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::GroupNotFound(id.to_string()))
    }

    /// Create a group and an ACTIVE membership for its creator in one
    /// transaction.
    pub async fn create_with_owner(
        &self,
        group_model: group::ActiveModel,
        member_model: group_member::ActiveModel,
    ) -> AppResult<group::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let group = group_model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        member_model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(group)
    }

    /// Find a user's membership row in a group.
    pub async fn find_membership(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> AppResult<Option<group_member::Model>> {
        GroupMember::find()
            .filter(group_member::Column::UserId.eq(user_id))
            .filter(group_member::Column::GroupId.eq(group_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a membership row.
    pub async fn create_membership(
        &self,
        model: group_member::ActiveModel,
    ) -> AppResult<group_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the status of an existing membership.
    pub async fn update_membership_status(
        &self,
        membership: group_member::Model,
        status: MembershipStatus,
    ) -> AppResult<group_member::Model> {
        let mut active: group_member::ActiveModel = membership.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Groups a user belongs to, with the membership status, newest first.
    pub async fn find_groups_for_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<(group_member::Model, Option<group::Model>)>> {
        GroupMember::find()
            .filter(group_member::Column::UserId.eq(user_id))
            .order_by_desc(group_member::Column::JoinedAt)
            .find_also_related(Group)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
