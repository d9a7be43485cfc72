//! Login sessions
//!
//! Every issued token is backed by a `session` row. A token is only
//! accepted while its session exists and has not expired, so logout and
//! the per-actor session limit revoke tokens immediately.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{LoginResponse, Session, UserInfo};
use shared::util::now_millis;

use super::{CurrentUser, JwtError};
use crate::core::ServerState;
use crate::db::repository::session as session_repo;
use crate::security_log;

/// Principal that passed a credential check, before a session exists
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: CurrentUser,
    pub email: String,
}

/// Validate a bearer token against the JWT signature and the session table
pub async fn authenticate_token(state: &ServerState, token: &str) -> AppResult<CurrentUser> {
    let claims = state.jwt_service.validate_token(token).map_err(|e| match e {
        JwtError::ExpiredToken => AppError::token_expired(),
        other => {
            security_log!("WARN", "token_rejected", error = other.to_string());
            AppError::invalid_token("Invalid token")
        }
    })?;

    let user = CurrentUser::try_from(claims).map_err(|e| AppError::invalid_token(e.to_string()))?;

    let session = session_repo::find_by_id(&state.db.pool, &user.session_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SessionExpired))?;

    if session.is_expired(now_millis())
        || session.actor_kind != user.kind
        || session.actor_id != user.id
    {
        return Err(AppError::new(ErrorCode::SessionExpired));
    }

    Ok(user)
}

/// Create a session for `principal`, enforce the session limit and issue a token
pub async fn open_session(
    state: &ServerState,
    principal: Principal,
    user_agent: Option<String>,
) -> AppResult<LoginResponse> {
    let now = now_millis();
    let expires_at = now + state.jwt_service.config.expiration_millis();
    let session = Session {
        id: uuid::Uuid::new_v4().to_string(),
        actor_kind: principal.user.kind,
        actor_id: principal.user.id,
        created_at: now,
        expires_at,
        user_agent,
    };
    session_repo::create(&state.db.pool, &session).await?;

    let evicted = session_repo::enforce_limit(
        &state.db.pool,
        session.actor_kind,
        session.actor_id,
        state.config.max_sessions_per_actor,
        now,
    )
    .await?;
    for id in &evicted {
        security_log!(
            "INFO",
            "session_evicted",
            actor = session.actor_kind.to_string(),
            actor_id = session.actor_id,
            session_id = id.clone()
        );
    }

    let mut user = principal.user;
    user.session_id = session.id.clone();
    let token = state
        .jwt_service
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to issue token: {e}")))?;

    tracing::info!(
        actor = %user.kind,
        actor_id = user.id,
        evicted = evicted.len(),
        "Login session opened"
    );

    Ok(LoginResponse {
        token,
        expires_at,
        user: user_info(&user, principal.email),
    })
}

/// Delete the session behind the current token
pub async fn close_session(state: &ServerState, user: &CurrentUser) -> AppResult<()> {
    if session_repo::delete(&state.db.pool, &user.session_id).await? {
        tracing::info!(actor = %user.kind, actor_id = user.id, "Logged out");
    }
    Ok(())
}

pub fn user_info(user: &CurrentUser, email: String) -> UserInfo {
    UserInfo {
        id: user.id,
        name: user.name.clone(),
        email,
        kind: user.kind,
        restaurant_id: user.restaurant_id,
        role: user.role.clone(),
        permissions: user.permissions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use shared::models::ActorKind;

    fn principal(id: i64) -> Principal {
        Principal {
            user: CurrentUser {
                id,
                name: "Cleo".into(),
                kind: ActorKind::Customer,
                restaurant_id: None,
                role: "customer".into(),
                permissions: vec![],
                session_id: String::new(),
            },
            email: "cleo@example.com".into(),
        }
    }

    #[tokio::test]
    async fn token_lives_and_dies_with_its_session() {
        let state = ServerState::for_tests(Config::for_tests()).await.unwrap();
        let login = open_session(&state, principal(1), None).await.unwrap();

        let user = authenticate_token(&state, &login.token).await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(login.user.email, "cleo@example.com");

        close_session(&state, &user).await.unwrap();
        let err = authenticate_token(&state, &login.token).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionExpired);
    }

    #[tokio::test]
    async fn oldest_sessions_are_evicted() {
        let mut config = Config::for_tests();
        config.max_sessions_per_actor = 2;
        let state = ServerState::for_tests(config).await.unwrap();

        let first = open_session(&state, principal(7), None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = open_session(&state, principal(7), None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let third = open_session(&state, principal(7), None).await.unwrap();

        assert!(authenticate_token(&state, &first.token).await.is_err());
        assert!(authenticate_token(&state, &second.token).await.is_ok());
        assert!(authenticate_token(&state, &third.token).await.is_ok());
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let state = ServerState::for_tests(Config::for_tests()).await.unwrap();
        let err = authenticate_token(&state, "not.a.jwt").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }
}
