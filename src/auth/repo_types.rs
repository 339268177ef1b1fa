use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    /// Login identifier and token subject.
    pub email: String,
    /// Argon2 PHC string; never leaves the server.
    pub hashed_password: String,
    /// Unix seconds.
    pub created_at: i64,
}
