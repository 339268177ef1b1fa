use crate::auth::repo_types::User;
use crate::db::now_ts;
use sqlx::SqliteConnection;

impl User {
    /// Find a user by email.
    pub async fn find_by_email(
        conn: &mut SqliteConnection,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, hashed_password, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await
    }

    /// Create a new user with an already hashed password.
    pub async fn create(
        conn: &mut SqliteConnection,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password, created_at)
            VALUES (?, ?, ?)
            RETURNING id, email, hashed_password, created_at
            "#,
        )
        .bind(email)
        .bind(hashed_password)
        .bind(now_ts())
        .fetch_one(conn)
        .await
    }
}
