// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, types::Json};

use crate::{
    models::{
        checkpoint::{Checkpoint, Question},
        submission::SubmissionRecord,
        team::Team,
    },
    store::{CheckpointStore, TeamMutator, TeamStore},
    tracker::error::ProgressError,
};

/// Maps driver failures onto the retryable store error.
fn unavailable(err: sqlx::Error) -> ProgressError {
    tracing::error!("Database error: {:?}", err);
    ProgressError::StoreUnavailable(err.to_string())
}

/// Represents the 'teams' table in the database.
#[derive(FromRow)]
struct TeamRow {
    team_code: String,
    team_name: String,
    assigned_route: Vec<i64>,
    current_index: i32,
}

impl TeamRow {
    fn into_team(self, submissions: Vec<SubmissionRecord>) -> Result<Team, ProgressError> {
        let current_index = usize::try_from(self.current_index).map_err(|_| {
            ProgressError::InvalidRecord(format!(
                "team '{}' has a negative route index",
                self.team_code
            ))
        })?;

        Team::restore(
            self.team_code,
            self.team_name,
            self.assigned_route,
            current_index,
            submissions,
        )
    }
}

/// Represents the 'checkpoints' table. Questions are a JSON array.
#[derive(FromRow)]
struct CheckpointRow {
    id: i64,
    location: String,
    questions: Json<Vec<Question>>,
}

async fn fetch_team(
    conn: &mut PgConnection,
    team_code: &str,
    for_update: bool,
) -> Result<Option<Team>, ProgressError> {
    let sql = if for_update {
        "SELECT team_code, team_name, assigned_route, current_index FROM teams WHERE team_code = $1 FOR UPDATE"
    } else {
        "SELECT team_code, team_name, assigned_route, current_index FROM teams WHERE team_code = $1"
    };

    let row = sqlx::query_as::<_, TeamRow>(sql)
        .bind(team_code)
        .fetch_optional(&mut *conn)
        .await
        .map_err(unavailable)?;

    let Some(row) = row else {
        return Ok(None);
    };

    let submissions = sqlx::query_as::<_, SubmissionRecord>(
        r#"
        SELECT team_code, checkpoint_id, question_id, submitted_answer, photo_ref, accepted, created_at
        FROM submissions
        WHERE team_code = $1
        ORDER BY id ASC
        "#,
    )
    .bind(team_code)
    .fetch_all(&mut *conn)
    .await
    .map_err(unavailable)?;

    row.into_team(submissions).map(Some)
}

/// PostgreSQL-backed team store.
#[derive(Clone)]
pub struct PgTeamStore {
    pool: PgPool,
}

impl PgTeamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamStore for PgTeamStore {
    async fn get(&self, team_code: &str) -> Result<Option<Team>, ProgressError> {
        let mut conn = self.pool.acquire().await.map_err(unavailable)?;
        fetch_team(&mut conn, team_code, false).await
    }

    /// Runs the mutator inside a transaction holding the team's row lock.
    /// Dropping the future before commit rolls everything back.
    async fn update(
        &self,
        team_code: &str,
        mutator: TeamMutator<'_>,
    ) -> Result<Team, ProgressError> {
        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        let mut team = fetch_team(&mut tx, team_code, true)
            .await?
            .ok_or_else(|| ProgressError::UnknownTeam(team_code.to_string()))?;

        let recorded = team.submissions().len();
        mutator(&mut team)?;

        for record in &team.submissions()[recorded..] {
            sqlx::query(
                r#"
                INSERT INTO submissions
                    (team_code, checkpoint_id, question_id, submitted_answer, photo_ref, accepted, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(&record.team_code)
            .bind(record.checkpoint_id)
            .bind(&record.question_id)
            .bind(&record.submitted_answer)
            .bind(&record.photo_ref)
            .bind(record.accepted)
            .bind(record.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;
        }

        let current_index = i32::try_from(team.current_index()).map_err(|_| {
            ProgressError::InvalidRecord(format!("route of team '{}' is too long", team_code))
        })?;

        sqlx::query("UPDATE teams SET current_index = $1 WHERE team_code = $2")
            .bind(current_index)
            .bind(team_code)
            .execute(&mut *tx)
            .await
            .map_err(unavailable)?;

        tx.commit().await.map_err(unavailable)?;

        Ok(team)
    }

    async fn insert(&self, team: Team) -> Result<bool, ProgressError> {
        let result = sqlx::query(
            r#"
            INSERT INTO teams (team_code, team_name, assigned_route, current_index)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (team_code) DO NOTHING
            "#,
        )
        .bind(team.team_code())
        .bind(team.team_name())
        .bind(team.assigned_route())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(result.rows_affected() == 1)
    }
}

/// PostgreSQL-backed checkpoint store.
#[derive(Clone)]
pub struct PgCheckpointStore {
    pool: PgPool,
}

impl PgCheckpointStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for PgCheckpointStore {
    async fn get(&self, checkpoint_id: i64) -> Result<Option<Checkpoint>, ProgressError> {
        let row = sqlx::query_as::<_, CheckpointRow>(
            "SELECT id, location, questions FROM checkpoints WHERE id = $1",
        )
        .bind(checkpoint_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(|row| Checkpoint::new(row.id, row.location, row.questions.0))
            .transpose()
    }

    async fn insert(&self, checkpoint: Checkpoint) -> Result<bool, ProgressError> {
        let result = sqlx::query(
            r#"
            INSERT INTO checkpoints (id, location, questions)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(checkpoint.id())
        .bind(checkpoint.location())
        .bind(Json(checkpoint.questions()))
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        Ok(result.rows_affected() == 1)
    }
}
