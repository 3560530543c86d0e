//! Topic service.
//!
//! Resolves the daily prompt for a group, materializing it on first access.

use chrono::NaiveDate;
use chrono_tz::Asia::Seoul;
use maru_common::{AppError, AppResult, IdGenerator};
use maru_db::{
    entities::{group, topic},
    repositories::{GroupRepository, TopicRepository},
};

/// A day's topic together with neighbouring-day pagination flags.
#[derive(Debug, Clone)]
pub struct TopicDay {
    /// The topic issued for the requested day.
    pub topic: topic::Model,
    /// Whether a topic exists for the previous day.
    pub has_prev_day: bool,
    /// Whether a topic exists for the next day.
    pub has_next_day: bool,
}

/// Topic service for business logic.
#[derive(Clone)]
pub struct TopicService {
    topic_repo: TopicRepository,
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl TopicService {
    /// Create a new topic service.
    #[must_use]
    pub const fn new(topic_repo: TopicRepository, group_repo: GroupRepository) -> Self {
        Self {
            topic_repo,
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// The service day. The product counts days in KST regardless of where
    /// the server runs.
    #[must_use]
    pub fn today() -> NaiveDate {
        chrono::Utc::now().with_timezone(&Seoul).date_naive()
    }

    /// Resolve the topic for a group and day, with prev/next-day flags.
    ///
    /// Bounds are checked first: days after today and days before the group's
    /// registration date are not viewable.
    pub async fn topic_of_the_day(&self, group_id: &str, date: NaiveDate) -> AppResult<TopicDay> {
        let group = self.group_repo.get_by_id(group_id).await?;
        Self::validate_view_date(&group, date, Self::today())?;

        let topic = self.resolve(group_id, date).await?;

        let has_prev_day = match date.pred_opt() {
            Some(prev) => {
                self.topic_repo
                    .exists_for_group_and_date(group_id, prev)
                    .await?
            }
            None => false,
        };
        let has_next_day = match date.succ_opt() {
            Some(next) => {
                self.topic_repo
                    .exists_for_group_and_date(group_id, next)
                    .await?
            }
            None => false,
        };

        Ok(TopicDay {
            topic,
            has_prev_day,
            has_next_day,
        })
    }

    /// Get an existing topic by id.
    pub async fn get_by_id(&self, topic_id: &str) -> AppResult<topic::Model> {
        self.topic_repo.get_by_id(topic_id).await
    }

    /// Return the topic for (group, day), materializing one on first access.
    ///
    /// The insert ignores a (group, day) conflict; losing the race means
    /// another request inserted first, so we re-read the winner's row.
    async fn resolve(&self, group_id: &str, date: NaiveDate) -> AppResult<topic::Model> {
        if let Some(existing) = self.topic_repo.find_by_group_and_date(group_id, date).await? {
            return Ok(existing);
        }

        let entry = self
            .topic_repo
            .random_pool_entry()
            .await?
            .ok_or_else(|| AppError::Internal("Topic pool is empty".to_string()))?;

        let topic = topic::Model {
            id: self.id_gen.generate(),
            group_id: group_id.to_string(),
            issue_date: date,
            body: entry.body,
            byte_len: entry.byte_len,
        };

        let inserted = self
            .topic_repo
            .insert_ignoring_conflict(topic.clone().into())
            .await?;

        if inserted == 0 {
            tracing::debug!(group_id = %group_id, %date, "Lost topic insert race, re-reading");
            return self
                .topic_repo
                .find_by_group_and_date(group_id, date)
                .await?
                .ok_or_else(|| {
                    AppError::Internal("Topic vanished after insert conflict".to_string())
                });
        }

        tracing::info!(group_id = %group_id, %date, topic_id = %topic.id, "Issued topic for day");
        Ok(topic)
    }

    /// Reject days after today and days before the group was registered.
    fn validate_view_date(
        group: &group::Model,
        date: NaiveDate,
        today: NaiveDate,
    ) -> AppResult<()> {
        if date > today {
            return Err(AppError::ViewAfterToday);
        }
        let reg_date = group.created_at.with_timezone(&Seoul).date_naive();
        if date < reg_date {
            return Err(AppError::ViewBeforeGroupRegDate);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use maru_db::entities::topic_set;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_group(id: &str, created_at: chrono::DateTime<Utc>) -> group::Model {
        group::Model {
            id: id.to_string(),
            name: "family".to_string(),
            photo_path: None,
            created_at: created_at.into(),
        }
    }

    fn create_test_topic(id: &str, group_id: &str, date: NaiveDate) -> topic::Model {
        topic::Model {
            id: id.to_string(),
            group_id: group_id.to_string(),
            issue_date: date,
            body: "What made you smile today?".to_string(),
            byte_len: 26,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_rejects_future_date() {
        let group = create_test_group("g1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let result =
            TopicService::validate_view_date(&group, date(2099, 1, 1), date(2024, 6, 15));
        assert!(matches!(result, Err(AppError::ViewAfterToday)));
    }

    #[test]
    fn test_validate_rejects_pre_registration_date() {
        let group = create_test_group("g1", Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let result =
            TopicService::validate_view_date(&group, date(2024, 5, 31), date(2024, 6, 15));
        assert!(matches!(result, Err(AppError::ViewBeforeGroupRegDate)));
    }

    #[test]
    fn test_validate_accepts_today() {
        let group = create_test_group("g1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let result =
            TopicService::validate_view_date(&group, date(2024, 6, 15), date(2024, 6, 15));
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_registration_date_uses_kst() {
        // 2024-06-01 20:00 UTC is already 2024-06-02 in KST, so 2024-06-01
        // falls before the registration date.
        let group = create_test_group("g1", Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap());
        let result = TopicService::validate_view_date(&group, date(2024, 6, 1), date(2024, 6, 15));
        assert!(matches!(result, Err(AppError::ViewBeforeGroupRegDate)));
    }

    #[tokio::test]
    async fn test_resolve_returns_existing_topic() {
        let day = date(2024, 6, 10);
        let existing = create_test_topic("t1", "g1", day);

        let topic_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = TopicService::new(
            TopicRepository::new(topic_db),
            GroupRepository::new(group_db),
        );

        let topic = service.resolve("g1", day).await.unwrap();
        assert_eq!(topic.id, "t1");
    }

    #[tokio::test]
    async fn test_resolve_materializes_from_pool() {
        let day = date(2024, 6, 10);
        let entry = topic_set::Model {
            id: 3,
            body: "Describe your morning.".to_string(),
            byte_len: 22,
        };

        let topic_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // no topic for the day yet
                .append_query_results([Vec::<topic::Model>::new()])
                // pool draw
                .append_query_results([[entry]])
                // conflict-free insert
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = TopicService::new(
            TopicRepository::new(topic_db),
            GroupRepository::new(group_db),
        );

        let topic = service.resolve("g1", day).await.unwrap();
        assert_eq!(topic.body, "Describe your morning.");
        assert_eq!(topic.issue_date, day);
    }

    #[tokio::test]
    async fn test_resolve_rereads_after_losing_race() {
        let day = date(2024, 6, 10);
        let entry = topic_set::Model {
            id: 3,
            body: "Describe your morning.".to_string(),
            byte_len: 22,
        };
        let winner = create_test_topic("winner", "g1", day);

        let topic_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // no topic for the day yet
                .append_query_results([Vec::<topic::Model>::new()])
                // pool draw
                .append_query_results([[entry]])
                // insert hits the unique constraint, zero rows
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                // re-read finds the winner's row
                .append_query_results([[winner]])
                .into_connection(),
        );
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = TopicService::new(
            TopicRepository::new(topic_db),
            GroupRepository::new(group_db),
        );

        let topic = service.resolve("g1", day).await.unwrap();
        assert_eq!(topic.id, "winner");
    }

    #[tokio::test]
    async fn test_resolve_fails_on_empty_pool() {
        let day = date(2024, 6, 10);

        let topic_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<topic::Model>::new()])
                .append_query_results([Vec::<topic_set::Model>::new()])
                .into_connection(),
        );
        let group_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = TopicService::new(
            TopicRepository::new(topic_db),
            GroupRepository::new(group_db),
        );

        let result = service.resolve("g1", day).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
