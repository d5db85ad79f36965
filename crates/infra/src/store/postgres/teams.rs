use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{TeamRow, TeamStatus};
use crate::pagination::LimitOffset;
use crate::store::{NewTeam, StoreResult, TeamFilter, TeamPatch, TeamStore};

use super::PgStore;

const TEAM_COLUMNS: &str = "id, name, location, state, age_groups, description, contact_email, \
     status, suggested_by, approved_by, approved_at, rejection_reason, created_at, updated_at";

#[async_trait]
impl TeamStore for PgStore {
    async fn insert_team(&self, team: NewTeam) -> StoreResult<TeamRow> {
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            INSERT INTO teams
                (id, name, location, state, age_groups, description, contact_email, status, suggested_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&team.name)
        .bind(&team.location)
        .bind(&team.state)
        .bind(&team.age_groups)
        .bind(&team.description)
        .bind(&team.contact_email)
        .bind(TeamStatus::Pending.as_str())
        .bind(team.suggested_by)
        .fetch_one(self.pool())
        .await?;

        Ok(row)
    }

    async fn get_team(&self, id: Uuid) -> StoreResult<Option<TeamRow>> {
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn list_teams(
        &self,
        status: &str,
        filter: &TeamFilter,
        page: Option<LimitOffset>,
    ) -> StoreResult<Vec<TeamRow>> {
        let mut query = sqlx::QueryBuilder::new(format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE status = "
        ));
        query.push_bind(status.to_owned());

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.to_lowercase());
            query.push(" AND (");
            query.push("LOWER(name) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR LOWER(location) LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR LOWER(COALESCE(description, '')) LIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        if let Some(state) = &filter.state {
            query.push(" AND state = ");
            query.push_bind(state.to_uppercase());
        }

        if let Some(age_group) = &filter.age_group {
            query.push(" AND ");
            query.push_bind(age_group.clone());
            query.push(" = ANY(age_groups)");
        }

        // Moderation queue reads oldest first; everything else newest first.
        if status == TeamStatus::Pending.as_str() {
            query.push(" ORDER BY created_at ASC");
        } else {
            query.push(" ORDER BY created_at DESC");
        }

        if let Some(page) = page {
            query.push(" LIMIT ");
            query.push_bind(page.limit);
            query.push(" OFFSET ");
            query.push_bind(page.offset);
        }

        let rows = query
            .build_query_as::<TeamRow>()
            .fetch_all(self.pool())
            .await?;

        Ok(rows)
    }

    async fn update_team(&self, id: Uuid, patch: TeamPatch) -> StoreResult<Option<TeamRow>> {
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            UPDATE teams SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                state = COALESCE($4, state),
                age_groups = COALESCE($5, age_groups),
                description = COALESCE($6, description),
                contact_email = COALESCE($7, contact_email),
                updated_at = now()
            WHERE id = $1
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.location)
        .bind(patch.state)
        .bind(patch.age_groups)
        .bind(patch.description)
        .bind(patch.contact_email)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
        admin_id: Uuid,
        at: DateTime<Utc>,
        rejection_reason: Option<String>,
    ) -> StoreResult<Option<TeamRow>> {
        // Single-statement compare-and-set on the status column; under two
        // concurrent approvals exactly one UPDATE matches.
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            UPDATE teams SET
                status = $3,
                approved_by = $4,
                approved_at = $5,
                rejection_reason = $6,
                updated_at = now()
            WHERE id = $1 AND status = $2
            RETURNING {TEAM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(admin_id)
        .bind(at)
        .bind(rejection_reason)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }
}
