use crate::config::rd::RD;
use crate::errors::{ApiError, ApiResult};
use crate::model::user::{LoginRequest, Session, User};
use crate::store::Storage;
use anyhow::Context;
use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

pub struct AuthService;

impl AuthService {
    pub fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn verify_password(user: &User, password: &str) -> bool {
        user.password_hash == Self::hash_password(password)
    }

    /// Checks the credentials and opens a session that expires after `ttl_secs`.
    pub async fn login<S>(store: &S, rd: &RD, ttl_secs: u64, req: &LoginRequest) -> ApiResult<Session>
    where
        S: Storage + ?Sized,
    {
        let user = store
            .find_user(&req.username)
            .await?
            .filter(|user| Self::verify_password(user, &req.password))
            .ok_or_else(|| ApiError::Unauthorized("wrong username or password".to_string()))?;

        let token = Uuid::new_v4().to_string();
        let mut conn = rd.get().await.context("Redis Error")?;
        conn.set_ex::<_, _, ()>(session_key(&token), &user.username, ttl_secs)
            .await
            .context("Redis Error")?;

        info!("{} logged in", user.username);
        Ok(Session {
            token,
            username: user.username,
        })
    }

    /// Looks up the session behind `token`. Unknown and expired tokens resolve to `None`.
    pub async fn resolve(rd: &RD, token: &str) -> ApiResult<Option<Session>> {
        let mut conn = rd.get().await.context("Redis Error")?;
        let username: Option<String> = conn.get(session_key(token)).await.context("Redis Error")?;

        Ok(username.map(|username| Session {
            token: token.to_string(),
            username,
        }))
    }

    pub async fn logout(rd: &RD, token: &str) -> ApiResult<()> {
        let mut conn = rd.get().await.context("Redis Error")?;
        conn.del::<_, ()>(session_key(token)).await.context("Redis Error")?;
        Ok(())
    }
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}
