use anyhow::Context;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use std::ops::Deref;

pub type RedisPool = Pool<RedisConnectionManager>;

/// Redis connections for sessions and login rate limiting.
/// Connections are opened on first use, not when the pool is built.
pub struct RD {
    pub pool: RedisPool,
}

impl RD {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let redis_manager = RedisConnectionManager::new(url)?;
        let redis_pool = Pool::builder().build(redis_manager).await?;

        Ok(RD { pool: redis_pool })
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.pool.get().await.context("Redis Error")?;
        let _pong: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .context("Redis Error")?;
        Ok(())
    }
}

impl Deref for RD {
    type Target = RedisPool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
