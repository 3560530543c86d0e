//! Content service.

use std::collections::HashMap;

use chrono::NaiveDate;
use chrono_tz::Asia::Seoul;
use maru_common::{AppError, AppResult, IdGenerator};
use maru_db::{
    entities::{content, content_reaction::ReactionKind, topic},
    repositories::{
        ContentRepository, GroupRepository, ReactionRepository, TopicRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

/// A post with its per-kind reaction counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDto {
    pub content_id: String,
    pub user_id: String,
    pub text: String,
    pub img_path: Option<String>,
    pub created_at: String,
    pub count_by_reaction: HashMap<&'static str, u64>,
}

/// The editable fields of a post, for pre-filling an edit form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentEditView {
    pub content_id: String,
    pub text: String,
    pub img_path: Option<String>,
}

/// One calendar-day representative for the monthly view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    pub content_id: String,
    pub topic_id: String,
    pub user_id: String,
    pub img_path: Option<String>,
    /// The calendar day this entry represents (YYYY-MM-DD, KST).
    pub date: String,
}

/// The daily prompt as returned alongside its posts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDto {
    pub topic_id: String,
    pub group_id: String,
    pub issue_date: String,
    pub body: String,
    pub byte_len: i32,
}

impl From<topic::Model> for TopicDto {
    fn from(t: topic::Model) -> Self {
        Self {
            topic_id: t.id,
            group_id: t.group_id,
            issue_date: t.issue_date.to_string(),
            body: t.body,
            byte_len: t.byte_len,
        }
    }
}

/// Content service for business logic.
#[derive(Clone)]
pub struct ContentService {
    content_repo: ContentRepository,
    topic_repo: TopicRepository,
    group_repo: GroupRepository,
    user_repo: UserRepository,
    reaction_repo: ReactionRepository,
    id_gen: IdGenerator,
}

impl ContentService {
    /// Create a new content service.
    #[must_use]
    pub const fn new(
        content_repo: ContentRepository,
        topic_repo: TopicRepository,
        group_repo: GroupRepository,
        user_repo: UserRepository,
        reaction_repo: ReactionRepository,
    ) -> Self {
        Self {
            content_repo,
            topic_repo,
            group_repo,
            user_repo,
            reaction_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post for a topic.
    ///
    /// Requires a membership row in the group and a status that allows
    /// writes. A member posts at most once per topic.
    pub async fn create(
        &self,
        user_id: &str,
        group_id: &str,
        topic_id: &str,
        text: String,
        img_path: Option<String>,
    ) -> AppResult<content::Model> {
        self.user_repo.get_by_id(user_id).await?;

        let membership = self
            .group_repo
            .find_membership(user_id, group_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {user_id} has no membership in group {group_id}"))
            })?;
        if !membership.status.can_write() {
            return Err(AppError::Forbidden(
                "Membership status does not allow posting".to_string(),
            ));
        }

        let topic = self.topic_repo.get_by_id(topic_id).await?;
        if topic.group_id != group_id {
            return Err(AppError::BadRequest(
                "Topic does not belong to this group".to_string(),
            ));
        }

        if self.content_repo.has_posted(user_id, topic_id).await? {
            return Err(AppError::AlreadyExists(format!(
                "Content already exists for user {user_id} and topic {topic_id}"
            )));
        }

        let model = content::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            topic_id: Set(topic_id.to_string()),
            text: Set(text),
            img_path: Set(img_path),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.content_repo.create(model).await?;
        tracing::info!(content_id = %created.id, user_id = %user_id, topic_id = %topic_id, "Content created");
        Ok(created)
    }

    /// Update a post's text and, when provided, its image.
    pub async fn update(
        &self,
        user_id: &str,
        group_id: &str,
        content_id: &str,
        text: String,
        img_path: Option<String>,
    ) -> AppResult<content::Model> {
        let existing = self
            .authorize_mutation(user_id, group_id, content_id)
            .await?;

        let mut active: content::ActiveModel = existing.into();
        active.text = Set(text);
        if let Some(img) = img_path {
            active.img_path = Set(Some(img));
        }

        self.content_repo.update(active).await
    }

    /// Delete a post. Its reactions cascade at the database level.
    ///
    /// Returns the deleted row so callers can clean up the stored image.
    pub async fn delete(
        &self,
        user_id: &str,
        group_id: &str,
        content_id: &str,
    ) -> AppResult<content::Model> {
        let existing = self
            .authorize_mutation(user_id, group_id, content_id)
            .await?;

        self.content_repo.delete(existing.clone()).await?;
        tracing::info!(content_id = %content_id, user_id = %user_id, "Content deleted");
        Ok(existing)
    }

    /// A single post with its reaction counts.
    pub async fn detail(&self, content_id: &str) -> AppResult<ContentDto> {
        let content = self.content_repo.get_by_id(content_id).await?;
        self.to_dto(content).await
    }

    /// The editable fields of a post.
    pub async fn edit_view(&self, content_id: &str) -> AppResult<ContentEditView> {
        let content = self.content_repo.get_by_id(content_id).await?;
        Ok(ContentEditView {
            content_id: content.id,
            text: content.text,
            img_path: content.img_path,
        })
    }

    /// All posts for a topic, oldest first, each with reaction counts.
    pub async fn contents_for_topic(&self, topic_id: &str) -> AppResult<Vec<ContentDto>> {
        let contents = self.content_repo.find_by_topic(topic_id).await?;

        let mut dtos = Vec::with_capacity(contents.len());
        for content in contents {
            dtos.push(self.to_dto(content).await?);
        }
        Ok(dtos)
    }

    /// One representative post per calendar day of a month.
    ///
    /// The representative is the earliest post of the day that has an image;
    /// if no post that day has one, the earliest post overall. The calendar
    /// view shows a thumbnail when it can.
    pub async fn monthly(
        &self,
        group_id: &str,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<MonthlyEntry>> {
        self.group_repo.get_by_id(group_id).await?;

        let (from, to) = month_bounds(year, month)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month: {year}-{month:02}")))?;

        let rows = self
            .content_repo
            .find_by_group_between(group_id, from, to)
            .await?;

        Ok(pick_daily_representatives(rows)
            .into_iter()
            .map(|(day, row)| MonthlyEntry {
                content_id: row.id,
                topic_id: row.topic_id,
                user_id: row.user_id,
                img_path: row.img_path,
                date: day.to_string(),
            })
            .collect())
    }

    /// Shared gate for update and delete.
    ///
    /// A missing membership row is reported as not-found, distinguishing
    /// "not a member at all" from "member but restricted". Non-authors and
    /// restricted members are rejected.
    async fn authorize_mutation(
        &self,
        user_id: &str,
        group_id: &str,
        content_id: &str,
    ) -> AppResult<content::Model> {
        let membership = self
            .group_repo
            .find_membership(user_id, group_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User {user_id} has no membership in group {group_id}"))
            })?;

        let content = self.content_repo.get_by_id(content_id).await?;

        if content.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can modify this content".to_string(),
            ));
        }
        if !membership.status.can_write() {
            return Err(AppError::Forbidden(
                "Membership status does not allow modifying content".to_string(),
            ));
        }

        Ok(content)
    }

    async fn to_dto(&self, content: content::Model) -> AppResult<ContentDto> {
        let reactions = self.reaction_repo.find_by_content(&content.id).await?;

        let mut count_by_reaction: HashMap<&'static str, u64> =
            ReactionKind::ALL.iter().map(|k| (k.label(), 0)).collect();
        for reaction in &reactions {
            *count_by_reaction.entry(reaction.kind.label()).or_insert(0) += 1;
        }

        Ok(ContentDto {
            content_id: content.id,
            user_id: content.user_id,
            text: content.text,
            img_path: content.img_path,
            created_at: content.created_at.to_rfc3339(),
            count_by_reaction,
        })
    }
}

/// `[from, to)` bounds of a KST calendar month.
fn month_bounds(
    year: i32,
    month: u32,
) -> Option<(
    chrono::DateTime<chrono::FixedOffset>,
    chrono::DateTime<chrono::FixedOffset>,
)> {
    use chrono::TimeZone;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    let from = Seoul
        .from_local_datetime(&first.and_hms_opt(0, 0, 0)?)
        .single()?
        .fixed_offset();
    let to = Seoul
        .from_local_datetime(&next_first.and_hms_opt(0, 0, 0)?)
        .single()?
        .fixed_offset();

    Some((from, to))
}

/// Reduce rows (ordered by creation time ascending) to one per calendar day.
///
/// Within a day the earliest row with a non-empty image path wins; days with
/// no imaged row fall back to the earliest row.
fn pick_daily_representatives(rows: Vec<content::Model>) -> Vec<(NaiveDate, content::Model)> {
    let mut reps: Vec<(NaiveDate, content::Model, bool)> = Vec::new();

    for row in rows {
        let day = row.created_at.with_timezone(&Seoul).date_naive();
        let has_img = row.img_path.as_deref().is_some_and(|p| !p.is_empty());

        // Rows arrive ordered by creation time, so a day's rows are
        // contiguous and the current day is always the last entry.
        let same_day = reps.last().is_some_and(|(last_day, _, _)| *last_day == day);
        if same_day {
            if let Some((_, chosen, chosen_has_img)) = reps.last_mut()
                && !*chosen_has_img
                && has_img
            {
                *chosen = row;
                *chosen_has_img = true;
            }
        } else {
            reps.push((day, row, has_img));
        }
    }

    reps.into_iter().map(|(day, row, _)| (day, row)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use maru_db::entities::{group_member, group_member::MembershipStatus, user};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn mock_db() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            provider: "kakao".to_string(),
            provider_user_id: format!("kakao-{id}"),
            username: "tester".to_string(),
            email: None,
            avatar_url: None,
            role: "user".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_membership(
        user_id: &str,
        group_id: &str,
        status: MembershipStatus,
    ) -> group_member::Model {
        group_member::Model {
            id: format!("m-{user_id}"),
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
            status,
            joined_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_topic(id: &str, group_id: &str) -> topic::Model {
        topic::Model {
            id: id.to_string(),
            group_id: group_id.to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            body: "What made you smile today?".to_string(),
            byte_len: 26,
        }
    }

    fn content_at(
        id: &str,
        user_id: &str,
        created_at: chrono::DateTime<Utc>,
        img_path: Option<&str>,
    ) -> content::Model {
        content::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            topic_id: "t1".to_string(),
            text: "entry".to_string(),
            img_path: img_path.map(ToString::to_string),
            created_at: created_at.into(),
        }
    }

    fn service(
        content_db: Arc<sea_orm::DatabaseConnection>,
        topic_db: Arc<sea_orm::DatabaseConnection>,
        group_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
        reaction_db: Arc<sea_orm::DatabaseConnection>,
    ) -> ContentService {
        ContentService::new(
            ContentRepository::new(content_db),
            TopicRepository::new(topic_db),
            GroupRepository::new(group_db),
            UserRepository::new(user_db),
            ReactionRepository::new(reaction_db),
        )
    }

    // KST is UTC+9, so 03:00 UTC is mid-day KST and days line up with UTC.
    fn kst_midday(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 3, 0, 0).unwrap()
    }

    #[test]
    fn test_representative_prefers_earliest_with_image() {
        let rows = vec![
            content_at("c1", "u1", kst_midday(2024, 6, 1), None),
            content_at("c2", "u2", kst_midday(2024, 6, 1), Some("/files/a.png")),
            content_at("c3", "u3", kst_midday(2024, 6, 1), Some("/files/b.png")),
        ];

        let reps = pick_daily_representatives(rows);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].1.id, "c2");
    }

    #[test]
    fn test_representative_falls_back_to_earliest() {
        let rows = vec![
            content_at("c1", "u1", kst_midday(2024, 6, 2), None),
            content_at("c2", "u2", kst_midday(2024, 6, 2), None),
        ];

        let reps = pick_daily_representatives(rows);
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].1.id, "c1");
    }

    #[test]
    fn test_representative_empty_image_path_counts_as_missing() {
        let rows = vec![
            content_at("c1", "u1", kst_midday(2024, 6, 3), Some("")),
            content_at("c2", "u2", kst_midday(2024, 6, 3), Some("/files/a.png")),
        ];

        let reps = pick_daily_representatives(rows);
        assert_eq!(reps[0].1.id, "c2");
    }

    #[test]
    fn test_representatives_one_per_day_ordered() {
        let rows = vec![
            content_at("c1", "u1", kst_midday(2024, 6, 1), None),
            content_at("c2", "u2", kst_midday(2024, 6, 2), Some("/files/a.png")),
            content_at("c3", "u3", kst_midday(2024, 6, 2), None),
            content_at("c4", "u4", kst_midday(2024, 6, 5), None),
        ];

        let reps = pick_daily_representatives(rows);
        let ids: Vec<&str> = reps.iter().map(|(_, r)| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c4"]);
        assert!(reps.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_month_bounds_december_rolls_over() {
        let (from, to) = month_bounds(2024, 12).unwrap();
        assert!(from < to);
        assert_eq!(to.with_timezone(&Seoul).date_naive().to_string(), "2025-01-01");
    }

    #[test]
    fn test_month_bounds_rejects_invalid_month() {
        assert!(month_bounds(2024, 13).is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_topic_post_rejected() {
        let user = create_test_user("u1");
        let membership = create_test_membership("u1", "g1", MembershipStatus::Active);
        let topic = create_test_topic("t1", "g1");
        let prior = content_at("c0", "u1", kst_midday(2024, 6, 10), None);

        let content_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // has_posted finds the prior post
                .append_query_results([[prior]])
                .into_connection(),
        );
        let topic_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[topic]])
                .into_connection(),
        );
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[membership]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = service(content_db, topic_db, group_db, user_db, mock_db());

        let result = service
            .create("u1", "g1", "t1", "second".to_string(), None)
            .await;
        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_banned_member_rejected() {
        let user = create_test_user("u1");
        let membership = create_test_membership("u1", "g1", MembershipStatus::Banned);

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[membership]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = service(mock_db(), mock_db(), group_db, user_db, mock_db());

        let result = service
            .create("u1", "g1", "t1", "entry".to_string(), None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_without_membership_is_not_found() {
        let user = create_test_user("u1");

        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group_member::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = service(mock_db(), mock_db(), group_db, user_db, mock_db());

        let result = service
            .create("u1", "g1", "t1", "entry".to_string(), None)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_topic_from_other_group_rejected() {
        let user = create_test_user("u1");
        let membership = create_test_membership("u1", "g1", MembershipStatus::Active);
        let foreign_topic = create_test_topic("t1", "g2");

        let topic_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[foreign_topic]])
                .into_connection(),
        );
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[membership]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = service(mock_db(), topic_db, group_db, user_db, mock_db());

        let result = service
            .create("u1", "g1", "t1", "entry".to_string(), None)
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_rejected() {
        // B is an ACTIVE member but did not write the post.
        let membership = create_test_membership("b", "g1", MembershipStatus::Active);
        let content = content_at("c1", "a", kst_midday(2024, 6, 10), None);

        let content_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[content]])
                .into_connection(),
        );
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[membership]])
                .into_connection(),
        );

        let service = service(content_db, mock_db(), group_db, mock_db(), mock_db());

        let result = service.delete("b", "g1", "c1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_by_banned_author_rejected() {
        // The author's own post, but the author has been banned since.
        let membership = create_test_membership("a", "g1", MembershipStatus::Banned);
        let content = content_at("c1", "a", kst_midday(2024, 6, 10), None);

        let content_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[content]])
                .into_connection(),
        );
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[membership]])
                .into_connection(),
        );

        let service = service(content_db, mock_db(), group_db, mock_db(), mock_db());

        let result = service
            .update("a", "g1", "c1", "edited".to_string(), None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_active_author_succeeds() {
        let membership = create_test_membership("a", "g1", MembershipStatus::Active);
        let content = content_at("c1", "a", kst_midday(2024, 6, 10), Some("/files/a.png"));

        let content_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[content]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let group_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[membership]])
                .into_connection(),
        );

        let service = service(content_db, mock_db(), group_db, mock_db(), mock_db());

        let deleted = service.delete("a", "g1", "c1").await.unwrap();
        assert_eq!(deleted.img_path.as_deref(), Some("/files/a.png"));
    }

    #[tokio::test]
    async fn test_detail_includes_reaction_counts() {
        use maru_db::entities::content_reaction;

        let content = content_at("c1", "a", kst_midday(2024, 6, 10), None);
        let reaction = content_reaction::Model {
            id: "r1".to_string(),
            content_id: "c1".to_string(),
            user_id: "b".to_string(),
            kind: ReactionKind::Love,
            created_at: Utc::now().into(),
        };

        let content_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[content]])
                .into_connection(),
        );
        let reaction_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reaction]])
                .into_connection(),
        );

        let service = service(content_db, mock_db(), mock_db(), mock_db(), reaction_db);

        let dto = service.detail("c1").await.unwrap();
        assert_eq!(dto.count_by_reaction["LOVE"], 1);
        assert_eq!(dto.count_by_reaction["LIKE"], 0);
    }
}
