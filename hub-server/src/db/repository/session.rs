//! Session Repository

use super::RepoResult;
use shared::models::{ActorKind, Session};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, actor_kind, actor_id, created_at, expires_at, user_agent";

pub async fn create(pool: &SqlitePool, session: &Session) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO session (id, actor_kind, actor_id, created_at, expires_at, user_agent) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&session.id)
    .bind(session.actor_kind)
    .bind(session.actor_id)
    .bind(session.created_at)
    .bind(session.expires_at)
    .bind(&session.user_agent)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(&format!(
        "SELECT {COLUMNS} FROM session WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

pub async fn find_by_actor(
    pool: &SqlitePool,
    kind: ActorKind,
    actor_id: i64,
) -> RepoResult<Vec<Session>> {
    let sessions = sqlx::query_as::<_, Session>(&format!(
        "SELECT {COLUMNS} FROM session WHERE actor_kind = ? AND actor_id = ? ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(kind)
    .bind(actor_id)
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

/// Returns whether a row was removed
pub async fn delete(pool: &SqlitePool, id: &str) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM session WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Drop every session of an actor (account disabled or deleted)
pub async fn delete_by_actor(pool: &SqlitePool, kind: ActorKind, actor_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM session WHERE actor_kind = ? AND actor_id = ?")
        .bind(kind)
        .bind(actor_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

/// Drop the sessions of every account holding a role (permissions changed)
pub async fn delete_by_role(pool: &SqlitePool, kind: ActorKind, role_id: i64) -> RepoResult<u64> {
    let accounts = match kind {
        ActorKind::Admin => "admin_user",
        ActorKind::Staff => "staff_user",
        ActorKind::Customer => return Ok(0),
    };
    let rows = sqlx::query(&format!(
        "DELETE FROM session WHERE actor_kind = ? AND actor_id IN (SELECT id FROM {accounts} WHERE role_id = ?)"
    ))
    .bind(kind)
    .bind(role_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Drop the sessions of every staff account of a restaurant
pub async fn delete_by_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "DELETE FROM session WHERE actor_kind = ? AND actor_id IN (SELECT id FROM staff_user WHERE restaurant_id = ?)",
    )
    .bind(ActorKind::Staff)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Keep the newest `max` sessions of an actor, delete the rest
///
/// Expired sessions of the actor are purged first. Returns the ids of the
/// evicted (still valid) sessions.
pub async fn enforce_limit(
    pool: &SqlitePool,
    kind: ActorKind,
    actor_id: i64,
    max: u32,
    now: i64,
) -> RepoResult<Vec<String>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM session WHERE actor_kind = ? AND actor_id = ? AND expires_at <= ?")
        .bind(kind)
        .bind(actor_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    let evicted: Vec<String> = sqlx::query_scalar(
        "SELECT id FROM session WHERE actor_kind = ? AND actor_id = ? ORDER BY created_at DESC, rowid DESC LIMIT -1 OFFSET ?",
    )
    .bind(kind)
    .bind(actor_id)
    .bind(i64::from(max))
    .fetch_all(&mut *tx)
    .await?;

    for id in &evicted {
        sqlx::query("DELETE FROM session WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(evicted)
}

/// Remove every expired session
pub async fn purge_expired(pool: &SqlitePool, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM session WHERE expires_at <= ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::restaurant::tests::approved;
    use crate::db::repository::staff_user;

    fn session(id: &str, actor_id: i64, created_at: i64, expires_at: i64) -> Session {
        Session {
            id: id.to_string(),
            actor_kind: ActorKind::Customer,
            actor_id,
            created_at,
            expires_at,
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn oldest_sessions_are_evicted() {
        let db = DbService::in_memory().await.unwrap();
        for (i, id) in ["s1", "s2", "s3", "s4"].iter().enumerate() {
            create(&db.pool, &session(id, 1, 1_000 + i as i64, 100_000))
                .await
                .unwrap();
        }
        create(&db.pool, &session("other", 2, 500, 100_000)).await.unwrap();

        let evicted = enforce_limit(&db.pool, ActorKind::Customer, 1, 3, 2_000)
            .await
            .unwrap();
        assert_eq!(evicted, vec!["s1".to_string()]);

        let left: Vec<String> = find_by_actor(&db.pool, ActorKind::Customer, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(left, vec!["s4", "s3", "s2"]);
        assert!(find_by_id(&db.pool, "other").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_count() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, &session("old", 1, 1, 10)).await.unwrap();
        create(&db.pool, &session("a", 1, 20, 10_000)).await.unwrap();
        create(&db.pool, &session("b", 1, 30, 10_000)).await.unwrap();

        let evicted = enforce_limit(&db.pool, ActorKind::Customer, 1, 2, 100)
            .await
            .unwrap();
        assert!(evicted.is_empty());
        assert!(find_by_id(&db.pool, "old").await.unwrap().is_none());
        assert_eq!(
            find_by_actor(&db.pool, ActorKind::Customer, 1)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn actor_kinds_are_independent() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, &session("c", 1, 1, 10_000)).await.unwrap();
        let mut staff = session("s", 1, 2, 10_000);
        staff.actor_kind = ActorKind::Staff;
        create(&db.pool, &staff).await.unwrap();

        let evicted = enforce_limit(&db.pool, ActorKind::Staff, 1, 1, 5)
            .await
            .unwrap();
        assert!(evicted.is_empty());
        assert_eq!(delete_by_actor(&db.pool, ActorKind::Customer, 1).await.unwrap(), 1);
        assert!(delete(&db.pool, "s").await.unwrap());
        assert!(!delete(&db.pool, "s").await.unwrap());
    }

    #[tokio::test]
    async fn staff_sessions_dropped_by_role_and_restaurant() {
        let db = DbService::in_memory().await.unwrap();
        let (a, owner_a) = approved(&db.pool, "a").await;
        let (_, owner_b) = approved(&db.pool, "b").await;
        let role_a = staff_user::find_by_id(&db.pool, a.id, owner_a)
            .await
            .unwrap()
            .unwrap()
            .role_id;

        for (id, actor_id) in [("a1", owner_a), ("a2", owner_a), ("b1", owner_b)] {
            let mut s = session(id, actor_id, 1, 10_000);
            s.actor_kind = ActorKind::Staff;
            create(&db.pool, &s).await.unwrap();
        }
        // Same numeric id under another actor class stays untouched
        create(&db.pool, &session("c1", owner_a, 1, 10_000)).await.unwrap();

        assert_eq!(delete_by_role(&db.pool, ActorKind::Staff, role_a).await.unwrap(), 2);
        assert_eq!(delete_by_role(&db.pool, ActorKind::Customer, role_a).await.unwrap(), 0);
        assert!(find_by_id(&db.pool, "b1").await.unwrap().is_some());
        assert!(find_by_id(&db.pool, "c1").await.unwrap().is_some());

        assert_eq!(delete_by_restaurant(&db.pool, a.id).await.unwrap(), 0);
        let mut s = session("a3", owner_a, 2, 10_000);
        s.actor_kind = ActorKind::Staff;
        create(&db.pool, &s).await.unwrap();
        assert_eq!(delete_by_restaurant(&db.pool, a.id).await.unwrap(), 1);
        assert!(find_by_id(&db.pool, "b1").await.unwrap().is_some());
    }
}
