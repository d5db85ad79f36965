use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{TeamReviewRow, TournamentReviewRow};
use crate::store::{
    NewTeamReview, NewTournamentReview, ReviewStore, StoreResult, TeamReviewPatch,
    TournamentReviewPatch,
};

use super::PgStore;

const TEAM_REVIEW_COLUMNS: &str = "id, team_id, user_id, coaching, value, organization, \
     playing_time, overall_rating, comment, created_at, updated_at";

const TOURNAMENT_REVIEW_COLUMNS: &str =
    "id, tournament_id, user_id, overall_rating, comment, created_at, updated_at";

#[async_trait]
impl ReviewStore for PgStore {
    async fn insert_team_review(&self, review: NewTeamReview) -> StoreResult<TeamReviewRow> {
        let row = sqlx::query_as::<_, TeamReviewRow>(&format!(
            r#"
            INSERT INTO team_reviews
                (id, team_id, user_id, coaching, value, organization, playing_time, overall_rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TEAM_REVIEW_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(review.team_id)
        .bind(review.user_id)
        .bind(review.coaching)
        .bind(review.value)
        .bind(review.organization)
        .bind(review.playing_time)
        .bind(review.overall_rating)
        .bind(&review.comment)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    async fn get_team_review(&self, id: Uuid) -> StoreResult<Option<TeamReviewRow>> {
        let row = sqlx::query_as::<_, TeamReviewRow>(&format!(
            "SELECT {TEAM_REVIEW_COLUMNS} FROM team_reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn list_team_reviews(&self, team_id: Uuid) -> StoreResult<Vec<TeamReviewRow>> {
        let rows = sqlx::query_as::<_, TeamReviewRow>(&format!(
            r#"
            SELECT {TEAM_REVIEW_COLUMNS}
            FROM team_reviews
            WHERE team_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(team_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn update_team_review(
        &self,
        id: Uuid,
        patch: TeamReviewPatch,
    ) -> StoreResult<Option<TeamReviewRow>> {
        let row = sqlx::query_as::<_, TeamReviewRow>(&format!(
            r#"
            UPDATE team_reviews SET
                coaching = COALESCE($2, coaching),
                value = COALESCE($3, value),
                organization = COALESCE($4, organization),
                playing_time = COALESCE($5, playing_time),
                overall_rating = COALESCE($6, overall_rating),
                comment = COALESCE($7, comment),
                updated_at = now()
            WHERE id = $1
            RETURNING {TEAM_REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.coaching)
        .bind(patch.value)
        .bind(patch.organization)
        .bind(patch.playing_time)
        .bind(patch.overall_rating)
        .bind(patch.comment)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn delete_team_review(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM team_reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_tournament_review(
        &self,
        review: NewTournamentReview,
    ) -> StoreResult<TournamentReviewRow> {
        let row = sqlx::query_as::<_, TournamentReviewRow>(&format!(
            r#"
            INSERT INTO tournament_reviews (id, tournament_id, user_id, overall_rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TOURNAMENT_REVIEW_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(review.tournament_id)
        .bind(review.user_id)
        .bind(review.overall_rating)
        .bind(&review.comment)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    async fn get_tournament_review(&self, id: Uuid) -> StoreResult<Option<TournamentReviewRow>> {
        let row = sqlx::query_as::<_, TournamentReviewRow>(&format!(
            "SELECT {TOURNAMENT_REVIEW_COLUMNS} FROM tournament_reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn list_tournament_reviews(
        &self,
        tournament_id: Uuid,
    ) -> StoreResult<Vec<TournamentReviewRow>> {
        let rows = sqlx::query_as::<_, TournamentReviewRow>(&format!(
            r#"
            SELECT {TOURNAMENT_REVIEW_COLUMNS}
            FROM tournament_reviews
            WHERE tournament_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(tournament_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn update_tournament_review(
        &self,
        id: Uuid,
        patch: TournamentReviewPatch,
    ) -> StoreResult<Option<TournamentReviewRow>> {
        let row = sqlx::query_as::<_, TournamentReviewRow>(&format!(
            r#"
            UPDATE tournament_reviews SET
                overall_rating = COALESCE($2, overall_rating),
                comment = COALESCE($3, comment),
                updated_at = now()
            WHERE id = $1
            RETURNING {TOURNAMENT_REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.overall_rating)
        .bind(patch.comment)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn delete_tournament_review(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tournament_reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
