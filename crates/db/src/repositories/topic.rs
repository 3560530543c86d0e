//! Topic repository.

use std::sync::Arc;

use crate::entities::{Topic, TopicSet, topic, topic_set};
use maru_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
};

/// Topic repository for database operations.
#[derive(Clone)]
pub struct TopicRepository {
    db: Arc<DatabaseConnection>,
}

impl TopicRepository {
    /// Create a new topic repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a topic by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<topic::Model>> {
        Topic::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a topic by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<topic::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TopicNotFound(id.to_string()))
    }

    /// Find the topic issued to a group for a specific day.
    pub async fn find_by_group_and_date(
        &self,
        group_id: &str,
        date: chrono::NaiveDate,
    ) -> AppResult<Option<topic::Model>> {
        Topic::find()
            .filter(topic::Column::GroupId.eq(group_id))
            .filter(topic::Column::IssueDate.eq(date))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a topic exists for a group and day.
    pub async fn exists_for_group_and_date(
        &self,
        group_id: &str,
        date: chrono::NaiveDate,
    ) -> AppResult<bool> {
        Ok(self.find_by_group_and_date(group_id, date).await?.is_some())
    }

    /// Insert a topic, ignoring a (`group_id`, `issue_date`) conflict.
    ///
    /// Returns the number of rows inserted: 0 means another request
    /// materialized the day's topic first and the caller should re-read.
    pub async fn insert_ignoring_conflict(&self, model: topic::ActiveModel) -> AppResult<u64> {
        Topic::insert(model)
            .on_conflict(
                OnConflict::columns([topic::Column::GroupId, topic::Column::IssueDate])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Draw one random entry from the prompt pool.
    pub async fn random_pool_entry(&self) -> AppResult<Option<topic_set::Model>> {
        TopicSet::find()
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of entries in the prompt pool.
    pub async fn pool_size(&self) -> AppResult<u64> {
        TopicSet::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_topic(id: &str, group_id: &str, date: NaiveDate) -> topic::Model {
        topic::Model {
            id: id.to_string(),
            group_id: group_id.to_string(),
            issue_date: date,
            body: "What made you smile today?".to_string(),
            byte_len: 26,
        }
    }

    #[tokio::test]
    async fn test_find_by_group_and_date_found() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let topic = create_test_topic("t1", "g1", date);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[topic]])
                .into_connection(),
        );

        let repo = TopicRepository::new(db);
        let result = repo.find_by_group_and_date("g1", date).await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "t1");
    }

    #[tokio::test]
    async fn test_exists_for_group_and_date_false() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<topic::Model>::new()])
                .into_connection(),
        );

        let repo = TopicRepository::new(db);
        assert!(!repo.exists_for_group_and_date("g1", date).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_ignoring_conflict_reports_loss() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let model: topic::ActiveModel = create_test_topic("t1", "g1", date).into();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = TopicRepository::new(db);
        let inserted = repo.insert_ignoring_conflict(model).await.unwrap();

        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_random_pool_entry() {
        let entry = topic_set::Model {
            id: 7,
            body: "Describe your morning.".to_string(),
            byte_len: 22,
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );

        let repo = TopicRepository::new(db);
        let result = repo.random_pool_entry().await.unwrap();

        assert_eq!(result.unwrap().id, 7);
    }
}
