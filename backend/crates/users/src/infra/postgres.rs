//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::StoredPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{post::Post, user::User, web_session::WebSession};
use crate::domain::repository::{PostRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    PostId, SessionId, UserId, email::Email, user_name::UserName,
};
use crate::error::{UniqueField, UsersError, UsersResult};

const USER_COLUMNS: &str = r#"
    user_id,
    name,
    email,
    phone,
    linkedin,
    password_hash,
    provider_subject,
    post_ids,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed users repository
#[derive(Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user_where(&self, column: &str, value: &str) -> UsersResult<Option<User>> {
        // `column` is always one of the fixed names below, never user input
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

/// Translate unique-index violations into the field that collided
fn map_write_error(err: sqlx::Error) -> UsersError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(field) = db_err.constraint().and_then(UniqueField::from_constraint) {
                return UsersError::Taken(field);
            }
        }
    }
    UsersError::Database(err)
}

fn post_uuids(post_ids: &[PostId]) -> Vec<Uuid> {
    post_ids.iter().map(|id| *id.as_uuid()).collect()
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgUsersRepository {
    async fn create(&self, user: &User) -> UsersResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                name,
                email,
                phone,
                linkedin,
                password_hash,
                provider_subject,
                post_ids,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.phone)
        .bind(&user.linkedin)
        .bind(user.password.as_ref().map(StoredPassword::as_phc_string))
        .bind(&user.provider_subject)
        .bind(post_uuids(&user.post_ids))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> UsersResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_name(&self, name: &str) -> UsersResult<Option<User>> {
        self.find_user_where("name", name).await
    }

    async fn find_by_email(&self, email: &str) -> UsersResult<Option<User>> {
        self.find_user_where("email", email).await
    }

    async fn find_by_phone(&self, phone: &str) -> UsersResult<Option<User>> {
        self.find_user_where("phone", phone).await
    }

    async fn find_by_linkedin(&self, linkedin: &str) -> UsersResult<Option<User>> {
        self.find_user_where("linkedin", linkedin).await
    }

    async fn find_by_provider_subject(&self, subject: &str) -> UsersResult<Option<User>> {
        self.find_user_where("provider_subject", subject).await
    }

    async fn update(&self, user: &User) -> UsersResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                phone = $4,
                linkedin = $5,
                password_hash = $6,
                provider_subject = $7,
                post_ids = $8,
                updated_at = $9
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.phone)
        .bind(&user.linkedin)
        .bind(user.password.as_ref().map(StoredPassword::as_phc_string))
        .bind(&user.provider_subject)
        .bind(post_uuids(&user.post_ids))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(UsersError::UserNotFound);
        }

        Ok(())
    }

    async fn delete_by_id(&self, user_id: &UserId) -> UsersResult<Option<User>> {
        let sql = format!("DELETE FROM users WHERE user_id = $1 RETURNING {USER_COLUMNS}");

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// Post Repository Implementation
// ============================================================================

impl PostRepository for PgUsersRepository {
    async fn find_by_ids(&self, post_ids: &[PostId]) -> UsersResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT
                post_id,
                owner_id,
                title,
                created_at
            FROM posts
            WHERE post_id = ANY($1)
            ORDER BY array_position($1, post_id)
            "#,
        )
        .bind(post_uuids(post_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    async fn delete_many(&self, post_ids: &[PostId]) -> UsersResult<u64> {
        let deleted = sqlx::query("DELETE FROM posts WHERE post_id = ANY($1)")
            .bind(post_uuids(post_ids))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgUsersRepository {
    async fn find_session(&self, session_id: &SessionId) -> UsersResult<Option<WebSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                name,
                message,
                oauth_state,
                pkce_verifier,
                created_at,
                last_activity_at,
                expires_at_ms
            FROM user_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn save_session(&self, session: &WebSession) -> UsersResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (
                session_id,
                user_id,
                name,
                message,
                oauth_state,
                pkce_verifier,
                created_at,
                last_activity_at,
                expires_at_ms
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                name = EXCLUDED.name,
                message = EXCLUDED.message,
                oauth_state = EXCLUDED.oauth_state,
                pkce_verifier = EXCLUDED.pkce_verifier,
                last_activity_at = EXCLUDED.last_activity_at,
                expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.user_id.map(UserId::into_uuid))
        .bind(&session.name)
        .bind(&session.message)
        .bind(&session.oauth_state)
        .bind(&session.pkce_verifier)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .bind(session.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_session(&self, session_id: &SessionId) -> UsersResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> UsersResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM user_sessions WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired user sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    linkedin: Option<String>,
    password_hash: Option<String>,
    provider_subject: Option<String>,
    post_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> UsersResult<User> {
        let password = self
            .password_hash
            .map(|hash| StoredPassword::from_phc_string(hash))
            .transpose()
            .map_err(|e| UsersError::Internal(format!("stored password hash: {e}")))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            name: UserName::from_db(self.name),
            email: Email::from_db(self.email),
            phone: self.phone,
            linkedin: self.linkedin,
            password,
            provider_subject: self.provider_subject,
            post_ids: self.post_ids.into_iter().map(PostId::from_uuid).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    owner_id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            post_id: PostId::from_uuid(self.post_id),
            owner_id: UserId::from_uuid(self.owner_id),
            title: self.title,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    user_id: Option<Uuid>,
    name: Option<String>,
    message: Option<String>,
    oauth_state: Option<String>,
    pkce_verifier: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    expires_at_ms: i64,
}

impl SessionRow {
    fn into_session(self) -> WebSession {
        WebSession {
            session_id: SessionId::from_uuid(self.session_id),
            user_id: self.user_id.map(UserId::from_uuid),
            name: self.name,
            message: self.message,
            oauth_state: self.oauth_state,
            pkce_verifier: self.pkce_verifier,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            expires_at_ms: self.expires_at_ms,
        }
    }
}
