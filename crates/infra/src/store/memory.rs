//! In-memory store used by the integration tests. Implements the same
//! contract as the Postgres backend; it is never substituted for a failed
//! database at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    ChatMessageRow, ChatRoomRow, TeamReviewRow, TeamRow, TeamStatus, TournamentReviewRow,
    TournamentRow, UserRow,
};
use crate::pagination::LimitOffset;
use crate::store::{
    ChatStore, HealthStore, NewChatMessage, NewChatRoom, NewTeam, NewTeamReview, NewTournament,
    NewTournamentReview, NewUser, ReviewStore, StoreError, StoreResult, TeamFilter, TeamPatch,
    TeamReviewPatch, TeamStore, TournamentPatch, TournamentReviewPatch, TournamentStore, UserStore,
};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserRow>,
    teams: HashMap<Uuid, TeamRow>,
    tournaments: HashMap<Uuid, TournamentRow>,
    team_reviews: HashMap<Uuid, TeamReviewRow>,
    tournament_reviews: HashMap<Uuid, TournamentReviewRow>,
    rooms: HashMap<Uuid, ChatRoomRow>,
    messages: Vec<ChatMessageRow>,
}

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paged<T>(rows: Vec<T>, page: Option<LimitOffset>) -> Vec<T> {
    match page {
        Some(p) => rows
            .into_iter()
            .skip(p.offset.max(0) as usize)
            .take(p.limit.max(0) as usize)
            .collect(),
        None => rows,
    }
}

#[async_trait]
impl HealthStore for MemStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!("user {}", user.email)));
        }

        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<UserRow>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl TeamStore for MemStore {
    async fn insert_team(&self, team: NewTeam) -> StoreResult<TeamRow> {
        let now = Utc::now();
        let row = TeamRow {
            id: Uuid::new_v4(),
            name: team.name,
            location: team.location,
            state: team.state,
            age_groups: team.age_groups,
            description: team.description,
            contact_email: team.contact_email,
            status: TeamStatus::Pending.as_str().to_owned(),
            suggested_by: team.suggested_by,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.teams.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_team(&self, id: Uuid) -> StoreResult<Option<TeamRow>> {
        Ok(self.inner.read().await.teams.get(&id).cloned())
    }

    async fn list_teams(
        &self,
        status: &str,
        filter: &TeamFilter,
        page: Option<LimitOffset>,
    ) -> StoreResult<Vec<TeamRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<TeamRow> = inner
            .teams
            .values()
            .filter(|t| t.status == status)
            .filter(|t| match &filter.search {
                Some(search) => {
                    let needle = search.to_lowercase();
                    t.name.to_lowercase().contains(&needle)
                        || t.location.to_lowercase().contains(&needle)
                        || t.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&needle))
                }
                None => true,
            })
            .filter(|t| match &filter.state {
                Some(state) => t.state.eq_ignore_ascii_case(state),
                None => true,
            })
            .filter(|t| match &filter.age_group {
                Some(tag) => t.age_groups.iter().any(|g| g == tag),
                None => true,
            })
            .cloned()
            .collect();

        if status == TeamStatus::Pending.as_str() {
            rows.sort_by_key(|t| t.created_at);
        } else {
            rows.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        }

        Ok(paged(rows, page))
    }

    async fn update_team(&self, id: Uuid, patch: TeamPatch) -> StoreResult<Option<TeamRow>> {
        let mut inner = self.inner.write().await;
        let Some(team) = inner.teams.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            team.name = name;
        }
        if let Some(location) = patch.location {
            team.location = location;
        }
        if let Some(state) = patch.state {
            team.state = state;
        }
        if let Some(age_groups) = patch.age_groups {
            team.age_groups = age_groups;
        }
        if let Some(description) = patch.description {
            team.description = Some(description);
        }
        if let Some(contact_email) = patch.contact_email {
            team.contact_email = Some(contact_email);
        }
        team.updated_at = Utc::now();

        Ok(Some(team.clone()))
    }

    async fn delete_team(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.teams.remove(&id).is_some();
        if removed {
            inner.team_reviews.retain(|_, r| r.team_id != id);
        }
        Ok(removed)
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
        let mut inner = self.inner.write().await;
        let Some(team) = inner.teams.get_mut(&id) else {
            return Ok(None);
        };
        if team.status != from {
            return Ok(None);
        }

        team.status = to.to_owned();
        team.approved_by = Some(admin_id);
        team.approved_at = Some(at);
        team.rejection_reason = rejection_reason;
        team.updated_at = at;

        Ok(Some(team.clone()))
    }
}

#[async_trait]
impl TournamentStore for MemStore {
    async fn insert_tournament(&self, tournament: NewTournament) -> StoreResult<TournamentRow> {
        let now = Utc::now();
        let row = TournamentRow {
            id: Uuid::new_v4(),
            name: tournament.name,
            location: tournament.location,
            description: tournament.description,
            created_by: tournament.created_by,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .tournaments
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_tournament(&self, id: Uuid) -> StoreResult<Option<TournamentRow>> {
        Ok(self.inner.read().await.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self, page: Option<LimitOffset>) -> StoreResult<Vec<TournamentRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<TournamentRow> = inner.tournaments.values().cloned().collect();
        rows.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        Ok(paged(rows, page))
    }

    async fn update_tournament(
        &self,
        id: Uuid,
        patch: TournamentPatch,
    ) -> StoreResult<Option<TournamentRow>> {
        let mut inner = self.inner.write().await;
        let Some(tournament) = inner.tournaments.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            tournament.name = name;
        }
        if let Some(location) = patch.location {
            tournament.location = location;
        }
        if let Some(description) = patch.description {
            tournament.description = Some(description);
        }
        tournament.updated_at = Utc::now();

        Ok(Some(tournament.clone()))
    }

    async fn delete_tournament(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.tournaments.remove(&id).is_some();
        if removed {
            inner.tournament_reviews.retain(|_, r| r.tournament_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl ReviewStore for MemStore {
    async fn insert_team_review(&self, review: NewTeamReview) -> StoreResult<TeamReviewRow> {
        let now = Utc::now();
        let row = TeamReviewRow {
            id: Uuid::new_v4(),
            team_id: review.team_id,
            user_id: review.user_id,
            coaching: review.coaching,
            value: review.value,
            organization: review.organization,
            playing_time: review.playing_time,
            overall_rating: review.overall_rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .team_reviews
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_team_review(&self, id: Uuid) -> StoreResult<Option<TeamReviewRow>> {
        Ok(self.inner.read().await.team_reviews.get(&id).cloned())
    }

    async fn list_team_reviews(&self, team_id: Uuid) -> StoreResult<Vec<TeamReviewRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<TeamReviewRow> = inner
            .team_reviews
            .values()
            .filter(|r| r.team_id == team_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(rows)
    }

    async fn update_team_review(
        &self,
        id: Uuid,
        patch: TeamReviewPatch,
    ) -> StoreResult<Option<TeamReviewRow>> {
        let mut inner = self.inner.write().await;
        let Some(review) = inner.team_reviews.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(coaching) = patch.coaching {
            review.coaching = coaching;
        }
        if let Some(value) = patch.value {
            review.value = value;
        }
        if let Some(organization) = patch.organization {
            review.organization = organization;
        }
        if let Some(playing_time) = patch.playing_time {
            review.playing_time = playing_time;
        }
        if let Some(overall_rating) = patch.overall_rating {
            review.overall_rating = overall_rating;
        }
        if let Some(comment) = patch.comment {
            review.comment = Some(comment);
        }
        review.updated_at = Utc::now();

        Ok(Some(review.clone()))
    }

    async fn delete_team_review(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.team_reviews.remove(&id).is_some())
    }

    async fn insert_tournament_review(
        &self,
        review: NewTournamentReview,
    ) -> StoreResult<TournamentReviewRow> {
        let now = Utc::now();
        let row = TournamentReviewRow {
            id: Uuid::new_v4(),
            tournament_id: review.tournament_id,
            user_id: review.user_id,
            overall_rating: review.overall_rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .tournament_reviews
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_tournament_review(&self, id: Uuid) -> StoreResult<Option<TournamentReviewRow>> {
        Ok(self.inner.read().await.tournament_reviews.get(&id).cloned())
    }

    async fn list_tournament_reviews(
        &self,
        tournament_id: Uuid,
    ) -> StoreResult<Vec<TournamentReviewRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<TournamentReviewRow> = inner
            .tournament_reviews
            .values()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(rows)
    }

    async fn update_tournament_review(
        &self,
        id: Uuid,
        patch: TournamentReviewPatch,
    ) -> StoreResult<Option<TournamentReviewRow>> {
        let mut inner = self.inner.write().await;
        let Some(review) = inner.tournament_reviews.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(overall_rating) = patch.overall_rating {
            review.overall_rating = overall_rating;
        }
        if let Some(comment) = patch.comment {
            review.comment = Some(comment);
        }
        review.updated_at = Utc::now();

        Ok(Some(review.clone()))
    }

    async fn delete_tournament_review(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .tournament_reviews
            .remove(&id)
            .is_some())
    }
}

#[async_trait]
impl ChatStore for MemStore {
    async fn insert_room(&self, room: NewChatRoom) -> StoreResult<ChatRoomRow> {
        let row = ChatRoomRow {
            id: Uuid::new_v4(),
            name: room.name,
            room_type: room.room_type,
            state: room.state,
            created_at: Utc::now(),
        };
        self.inner.write().await.rooms.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_room(&self, id: Uuid) -> StoreResult<Option<ChatRoomRow>> {
        Ok(self.inner.read().await.rooms.get(&id).cloned())
    }

    async fn list_rooms(&self) -> StoreResult<Vec<ChatRoomRow>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<ChatRoomRow> = inner.rooms.values().cloned().collect();
        rows.sort_by(|a, b| (&a.room_type, &a.name).cmp(&(&b.room_type, &b.name)));
        Ok(rows)
    }

    async fn insert_message(&self, message: NewChatMessage) -> StoreResult<ChatMessageRow> {
        let row = ChatMessageRow {
            id: Uuid::new_v4(),
            room_id: message.room_id,
            user_id: message.user_id,
            user_name: message.user_name,
            content: message.content,
            created_at: Utc::now(),
        };
        self.inner.write().await.messages.push(row.clone());
        Ok(row)
    }

    async fn list_messages(
        &self,
        room_id: Uuid,
        page: Option<LimitOffset>,
    ) -> StoreResult<Vec<ChatMessageRow>> {
        let inner = self.inner.read().await;
        let rows: Vec<ChatMessageRow> = inner
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();
        Ok(paged(rows, page.or_else(|| Some(LimitOffset::default()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transition_is_a_compare_and_set() {
        let store = MemStore::new();
        let team = store
            .insert_team(NewTeam {
                name: "Test Team".into(),
                location: "Test City".into(),
                state: "GA".into(),
                age_groups: vec!["12U".into()],
                description: None,
                contact_email: None,
                suggested_by: None,
            })
            .await
            .unwrap();

        let admin = Uuid::new_v4();
        let now = Utc::now();

        let approved = store
            .transition_status(team.id, "pending", "approved", admin, now, None)
            .await
            .unwrap();
        assert_eq!(approved.unwrap().status, "approved");

        // Second transition finds no pending row.
        let second = store
            .transition_status(team.id, "pending", "rejected", admin, now, None)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn deleting_a_team_removes_its_reviews() {
        let store = MemStore::new();
        let team = store
            .insert_team(NewTeam {
                name: "Cascade".into(),
                location: "Atlanta".into(),
                state: "GA".into(),
                age_groups: vec!["14U".into()],
                description: None,
                contact_email: None,
                suggested_by: None,
            })
            .await
            .unwrap();

        store
            .insert_team_review(NewTeamReview {
                team_id: team.id,
                user_id: None,
                coaching: 4,
                value: 4,
                organization: 4,
                playing_time: 4,
                overall_rating: 4,
                comment: None,
            })
            .await
            .unwrap();

        assert!(store.delete_team(team.id).await.unwrap());
        assert!(store.list_team_reviews(team.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemStore::new();
        let user = NewUser {
            email: "dup@example.com".into(),
            name: "Dup".into(),
            password_hash: "hash".into(),
            role: "USER".into(),
        };
        store.insert_user(user.clone()).await.unwrap();
        let err = store.insert_user(user).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
