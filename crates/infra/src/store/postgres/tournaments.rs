use async_trait::async_trait;
use uuid::Uuid;

use crate::models::TournamentRow;
use crate::pagination::LimitOffset;
use crate::store::{NewTournament, StoreResult, TournamentPatch, TournamentStore};

use super::PgStore;

const TOURNAMENT_COLUMNS: &str =
    "id, name, location, description, created_by, created_at, updated_at";

#[async_trait]
impl TournamentStore for PgStore {
    async fn insert_tournament(&self, tournament: NewTournament) -> StoreResult<TournamentRow> {
        let row = sqlx::query_as::<_, TournamentRow>(&format!(
            r#"
            INSERT INTO tournaments (id, name, location, description, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TOURNAMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&tournament.name)
        .bind(&tournament.location)
        .bind(&tournament.description)
        .bind(tournament.created_by)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    async fn get_tournament(&self, id: Uuid) -> StoreResult<Option<TournamentRow>> {
        let row = sqlx::query_as::<_, TournamentRow>(&format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn list_tournaments(&self, page: Option<LimitOffset>) -> StoreResult<Vec<TournamentRow>> {
        let page = page.unwrap_or_default();

        let rows = sqlx::query_as::<_, TournamentRow>(&format!(
            r#"
            SELECT {TOURNAMENT_COLUMNS}
            FROM tournaments
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn update_tournament(
        &self,
        id: Uuid,
        patch: TournamentPatch,
    ) -> StoreResult<Option<TournamentRow>> {
        let row = sqlx::query_as::<_, TournamentRow>(&format!(
            r#"
            UPDATE tournaments SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                description = COALESCE($4, description),
                updated_at = now()
            WHERE id = $1
            RETURNING {TOURNAMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.location)
        .bind(patch.description)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn delete_tournament(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tournaments WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
