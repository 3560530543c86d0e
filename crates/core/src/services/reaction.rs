//! Reaction service.

use std::collections::HashMap;

use maru_common::{AppError, AppResult, IdGenerator};
use maru_db::{
    entities::{content_reaction, content_reaction::ReactionKind},
    repositories::{ContentRepository, ReactionRepository, UserRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Result of submitting a reaction.
///
/// A second submission of the same kind removes the reaction, so callers need
/// to distinguish "added" from "removed".
#[derive(Debug, Clone)]
pub enum ReactionOutcome {
    /// A reaction row now exists with this model.
    Added(content_reaction::Model),
    /// The previous reaction was removed; the pair is back to no reaction.
    Removed,
}

/// Per-kind reaction counts for a piece of content.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionStats {
    /// Count per kind label, every kind present even when zero.
    pub counts: HashMap<&'static str, u64>,
    /// The caller's current reaction, if any.
    pub my_reaction: Option<ReactionKind>,
}

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    content_repo: ContentRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        reaction_repo: ReactionRepository,
        content_repo: ContentRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            reaction_repo,
            content_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a reaction to a piece of content.
    ///
    /// State machine per (content, user):
    /// - no reaction + kind K -> reacted with K
    /// - reacted with K + kind K -> no reaction (toggle off)
    /// - reacted with K + kind K' -> reacted with K' (replace)
    ///
    /// The label is validated before any lookup so an unknown kind never
    /// touches the database.
    pub async fn submit(
        &self,
        content_id: &str,
        user_id: &str,
        label: &str,
    ) -> AppResult<ReactionOutcome> {
        let kind = ReactionKind::from_label(label)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown reaction kind: {label}")))?;

        self.content_repo.get_by_id(content_id).await?;
        self.user_repo.get_by_id(user_id).await?;

        let existing = self
            .reaction_repo
            .find_by_content_and_user(content_id, user_id)
            .await?;

        match existing {
            Some(reaction) if reaction.kind == kind => {
                self.reaction_repo.delete(reaction).await?;
                tracing::debug!(content_id = %content_id, user_id = %user_id, "Reaction toggled off");
                Ok(ReactionOutcome::Removed)
            }
            Some(reaction) => {
                // Replace is delete-then-insert, so the row gets a fresh
                // created_at. The net state is what matters to callers.
                let model = self.new_reaction_model(content_id, user_id, kind);
                let created = self.reaction_repo.replace(reaction, model).await?;
                tracing::debug!(content_id = %content_id, user_id = %user_id, kind = kind.label(), "Reaction replaced");
                Ok(ReactionOutcome::Added(created))
            }
            None => {
                let model = self.new_reaction_model(content_id, user_id, kind);
                let created = self.reaction_repo.create(model).await?;
                tracing::debug!(content_id = %content_id, user_id = %user_id, kind = kind.label(), "Reaction added");
                Ok(ReactionOutcome::Added(created))
            }
        }
    }

    /// Per-kind reaction counts for a piece of content, plus the caller's own
    /// reaction when a caller is known.
    pub async fn stats(
        &self,
        content_id: &str,
        caller_id: Option<&str>,
    ) -> AppResult<ReactionStats> {
        self.content_repo.get_by_id(content_id).await?;

        let reactions = self.reaction_repo.find_by_content(content_id).await?;

        let mut counts: HashMap<&'static str, u64> =
            ReactionKind::ALL.iter().map(|k| (k.label(), 0)).collect();
        let mut my_reaction = None;

        for reaction in &reactions {
            *counts.entry(reaction.kind.label()).or_insert(0) += 1;
            if caller_id == Some(reaction.user_id.as_str()) {
                my_reaction = Some(reaction.kind);
            }
        }

        Ok(ReactionStats {
            counts,
            my_reaction,
        })
    }

    fn new_reaction_model(
        &self,
        content_id: &str,
        user_id: &str,
        kind: ReactionKind,
    ) -> content_reaction::ActiveModel {
        content_reaction::ActiveModel {
            id: Set(self.id_gen.generate()),
            content_id: Set(content_id.to_string()),
            user_id: Set(user_id.to_string()),
            kind: Set(kind),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
