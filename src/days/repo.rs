use sqlx::SqliteConnection;

use super::repo_types::DayRow;
use crate::db::now_ts;

pub async fn list_by_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Vec<DayRow>, sqlx::Error> {
    sqlx::query_as::<_, DayRow>(
        r#"
        SELECT id, user_id, date, payload, created_at
        FROM days
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

pub async fn exists_for_date(
    conn: &mut SqliteConnection,
    user_id: i64,
    date: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT id
        FROM days
        WHERE user_id = ? AND date = ?
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(conn)
    .await?;
    Ok(row.is_some())
}

pub async fn insert(
    conn: &mut SqliteConnection,
    user_id: i64,
    date: &str,
    payload: &str,
) -> Result<DayRow, sqlx::Error> {
    sqlx::query_as::<_, DayRow>(
        r#"
        INSERT INTO days (user_id, date, payload, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, date, payload, created_at
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(payload)
    .bind(now_ts())
    .fetch_one(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;
    use crate::error::is_unique_violation;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_db() -> sqlx::SqlitePool {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("memory db");
        crate::db::init_schema(&db).await.expect("schema");
        db
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner_and_newest_first() {
        let db = memory_db().await;
        let mut conn = db.acquire().await.unwrap();
        let a = User::create(&mut conn, "a@x.com", "h").await.unwrap();
        let b = User::create(&mut conn, "b@x.com", "h").await.unwrap();

        insert(&mut conn, a.id, "2024-01-02", "{}").await.unwrap();
        insert(&mut conn, a.id, "2024-01-01", "{}").await.unwrap();
        insert(&mut conn, b.id, "2024-01-01", "{}").await.unwrap();

        let rows = list_by_user(&mut conn, a.id).await.unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
        assert!(rows.iter().all(|r| r.user_id == a.id));
    }

    #[tokio::test]
    async fn exists_for_date_checks_owner_and_date() {
        let db = memory_db().await;
        let mut conn = db.acquire().await.unwrap();
        let a = User::create(&mut conn, "a@x.com", "h").await.unwrap();
        let b = User::create(&mut conn, "b@x.com", "h").await.unwrap();
        insert(&mut conn, a.id, "2024-01-01", "{}").await.unwrap();

        assert!(exists_for_date(&mut conn, a.id, "2024-01-01").await.unwrap());
        assert!(!exists_for_date(&mut conn, a.id, "2024-01-02").await.unwrap());
        assert!(!exists_for_date(&mut conn, b.id, "2024-01-01").await.unwrap());
    }

    #[tokio::test]
    async fn second_insert_for_same_date_hits_unique_index() {
        let db = memory_db().await;
        let mut conn = db.acquire().await.unwrap();
        let a = User::create(&mut conn, "a@x.com", "h").await.unwrap();
        insert(&mut conn, a.id, "2024-01-01", "{}").await.unwrap();
        let err = insert(&mut conn, a.id, "2024-01-01", "{}").await.unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
