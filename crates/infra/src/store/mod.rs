//! Store contract for the entity layer.
//!
//! Every handler talks to persistence through these traits, never through a
//! concrete backend, so the same contract is served by Postgres in
//! production and by an in-memory implementation in tests. A missing row is
//! `Ok(None)`, never an error; callers can always tell "empty" apart from
//! "the backing store failed".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ChatMessageRow, ChatRoomRow, TeamReviewRow, TeamRow, TournamentReviewRow, TournamentRow,
    UserRow,
};
use crate::pagination::LimitOffset;

mod memory;
mod postgres;

pub use memory::MemStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("{0} already exists")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewTeam {
    pub name: String,
    pub location: String,
    pub state: String,
    pub age_groups: Vec<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub suggested_by: Option<Uuid>,
}

/// Fields a suggester or admin may edit. Status is deliberately absent;
/// it only moves through `transition_status`.
#[derive(Debug, Clone, Default)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub age_groups: Option<Vec<String>>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub search: Option<String>,
    pub state: Option<String>,
    pub age_group: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTournament {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct TournamentPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTeamReview {
    pub team_id: Uuid,
    pub user_id: Option<Uuid>,
    pub coaching: i16,
    pub value: i16,
    pub organization: i16,
    pub playing_time: i16,
    pub overall_rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamReviewPatch {
    pub coaching: Option<i16>,
    pub value: Option<i16>,
    pub organization: Option<i16>,
    pub playing_time: Option<i16>,
    pub overall_rating: Option<i16>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTournamentReview {
    pub tournament_id: Uuid,
    pub user_id: Option<Uuid>,
    pub overall_rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TournamentReviewPatch {
    pub overall_rating: Option<i16>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewChatRoom {
    pub name: String,
    pub room_type: String,
    pub state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub room_id: Uuid,
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub content: String,
}

#[async_trait]
pub trait HealthStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRow>;
    async fn get_user_by_id(&self, id: Uuid) -> StoreResult<Option<UserRow>>;
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn insert_team(&self, team: NewTeam) -> StoreResult<TeamRow>;
    async fn get_team(&self, id: Uuid) -> StoreResult<Option<TeamRow>>;

    /// List teams in one lifecycle state, optionally paged. Pending teams
    /// come back oldest first (moderation queue order), everything else
    /// newest first. `min_rating` is a read-time aggregate and is filtered
    /// by the caller.
    async fn list_teams(
        &self,
        status: &str,
        filter: &TeamFilter,
        page: Option<LimitOffset>,
    ) -> StoreResult<Vec<TeamRow>>;

    async fn update_team(&self, id: Uuid, patch: TeamPatch) -> StoreResult<Option<TeamRow>>;
    async fn delete_team(&self, id: Uuid) -> StoreResult<bool>;

    /// Atomically move a team from `from` to `to`, recording the acting
    /// admin and timestamp. Returns `None` when no row currently holds the
    /// `from` status, so two concurrent approvals cannot both win.
    async fn transition_status(
        &self,
        id: Uuid,
        from: &str,
        to: &str,
        admin_id: Uuid,
        at: DateTime<Utc>,
        rejection_reason: Option<String>,
    ) -> StoreResult<Option<TeamRow>>;
}

#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn insert_tournament(&self, tournament: NewTournament) -> StoreResult<TournamentRow>;
    async fn get_tournament(&self, id: Uuid) -> StoreResult<Option<TournamentRow>>;
    async fn list_tournaments(&self, page: Option<LimitOffset>) -> StoreResult<Vec<TournamentRow>>;
    async fn update_tournament(
        &self,
        id: Uuid,
        patch: TournamentPatch,
    ) -> StoreResult<Option<TournamentRow>>;
    async fn delete_tournament(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert_team_review(&self, review: NewTeamReview) -> StoreResult<TeamReviewRow>;
    async fn get_team_review(&self, id: Uuid) -> StoreResult<Option<TeamReviewRow>>;
    /// Newest first.
    async fn list_team_reviews(&self, team_id: Uuid) -> StoreResult<Vec<TeamReviewRow>>;
    async fn update_team_review(
        &self,
        id: Uuid,
        patch: TeamReviewPatch,
    ) -> StoreResult<Option<TeamReviewRow>>;
    async fn delete_team_review(&self, id: Uuid) -> StoreResult<bool>;

    async fn insert_tournament_review(
        &self,
        review: NewTournamentReview,
    ) -> StoreResult<TournamentReviewRow>;
    async fn get_tournament_review(&self, id: Uuid) -> StoreResult<Option<TournamentReviewRow>>;
    async fn list_tournament_reviews(
        &self,
        tournament_id: Uuid,
    ) -> StoreResult<Vec<TournamentReviewRow>>;
    async fn update_tournament_review(
        &self,
        id: Uuid,
        patch: TournamentReviewPatch,
    ) -> StoreResult<Option<TournamentReviewRow>>;
    async fn delete_tournament_review(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn insert_room(&self, room: NewChatRoom) -> StoreResult<ChatRoomRow>;
    async fn get_room(&self, id: Uuid) -> StoreResult<Option<ChatRoomRow>>;
    async fn list_rooms(&self) -> StoreResult<Vec<ChatRoomRow>>;
    async fn insert_message(&self, message: NewChatMessage) -> StoreResult<ChatMessageRow>;
    /// Oldest first within the page, so clients can render history in order.
    async fn list_messages(
        &self,
        room_id: Uuid,
        page: Option<LimitOffset>,
    ) -> StoreResult<Vec<ChatMessageRow>>;
}

pub trait Store:
    HealthStore + UserStore + TeamStore + TournamentStore + ReviewStore + ChatStore
{
}

impl<T> Store for T where
    T: HealthStore + UserStore + TeamStore + TournamentStore + ReviewStore + ChatStore
{
}
