//! Redis client implementation with connection management

use crate::Result;
use redis::{aio::ConnectionManager, AsyncCommands};

/// Redis client with automatic reconnection
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
}

impl RedisClient {
    /// Connect to Redis server
    ///
    /// Supports both redis:// and rediss:// (TLS) URLs
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Get connection manager (for advanced operations)
    pub fn connection_mut(&mut self) -> &mut ConnectionManager {
        &mut self.conn
    }

    // ============================================================================
    // Key-Value Operations
    // ============================================================================

    /// GET - Get value by key
    pub async fn get<T: redis::FromRedisValue>(&mut self, key: &str) -> Result<Option<T>> {
        self.conn.get(key).await
    }

    /// SETEX - Set key with expiry in seconds
    pub async fn set_ex<V>(&mut self, key: &str, value: V, seconds: u64) -> Result<()>
    where
        V: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.set_ex(key, value, seconds).await
    }

    /// DEL - Delete one or more keys
    pub async fn del<K>(&mut self, keys: K) -> Result<i64>
    where
        K: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.del(keys).await
    }

    /// EXPIRE - Set expiry time in seconds
    pub async fn expire(&mut self, key: &str, seconds: i64) -> Result<bool> {
        self.conn.expire(key, seconds).await
    }

    /// TTL - Get remaining time to live in seconds
    ///
    /// Returns -2 if the key does not exist, -1 if it has no expiry
    pub async fn ttl(&mut self, key: &str) -> Result<i64> {
        self.conn.ttl(key).await
    }

    /// KEYS - Enumerate keys matching a pattern
    ///
    /// O(keyspace) scan; reserved for maintenance operations
    pub async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        self.conn.keys(pattern).await
    }

    // ============================================================================
    // Atomic Operations
    // ============================================================================

    /// INCR - Increment integer value
    pub async fn incr(&mut self, key: &str) -> Result<i64> {
        self.conn.incr(key, 1).await
    }

    // ============================================================================
    // List Operations
    // ============================================================================

    /// RPUSH - Push to tail of list, returns new length
    pub async fn rpush<V>(&mut self, key: &str, value: V) -> Result<i64>
    where
        V: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.rpush(key, value).await
    }

    /// LPOP - Pop from head of list
    pub async fn lpop<T: redis::FromRedisValue>(&mut self, key: &str) -> Result<Option<T>> {
        self.conn.lpop(key, None).await
    }

    /// LLEN - Get list length
    pub async fn llen(&mut self, key: &str) -> Result<i64> {
        self.conn.llen(key).await
    }

    // ============================================================================
    // Set Operations
    // ============================================================================

    /// SADD - Add member to set, returns number of members added (0|1)
    pub async fn sadd<V>(&mut self, key: &str, member: V) -> Result<i64>
    where
        V: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.sadd(key, member).await
    }

    /// SISMEMBER - Check if member exists in set
    pub async fn sismember<V>(&mut self, key: &str, member: V) -> Result<bool>
    where
        V: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.sismember(key, member).await
    }

    // ============================================================================
    // Sorted-Set Operations
    // ============================================================================

    /// ZADD - Add member with score, returns number of members added (0|1)
    pub async fn zadd<M>(&mut self, key: &str, member: M, score: i64) -> Result<i64>
    where
        M: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.zadd(key, member, score).await
    }

    /// ZREM - Remove member, returns number of members removed (0|1)
    pub async fn zrem<M>(&mut self, key: &str, member: M) -> Result<i64>
    where
        M: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.zrem(key, member).await
    }

    /// ZSCORE - Score of a member, None if absent
    pub async fn zscore<M>(&mut self, key: &str, member: M) -> Result<Option<i64>>
    where
        M: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.zscore(key, member).await
    }

    /// ZRANGEBYSCORE - Members with scores in [min, max], ascending
    ///
    /// Bounds accept either numeric scores or "-inf"/"+inf"
    pub async fn zrangebyscore<L, U>(
        &mut self,
        key: &str,
        min: L,
        max: U,
    ) -> Result<Vec<String>>
    where
        L: redis::ToRedisArgs + Send + Sync,
        U: redis::ToRedisArgs + Send + Sync,
    {
        self.conn.zrangebyscore(key, min, max).await
    }

    /// ZRANGE - Members by rank; 0..-1 for the whole set
    pub async fn zrange(&mut self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.conn.zrange(key, start, stop).await
    }

    /// ZREMRANGEBYSCORE - Remove members with scores in [min, max],
    /// returns number removed
    pub async fn zrembyscore(&mut self, key: &str, min: i64, max: i64) -> Result<i64> {
        self.conn.zrembyscore(key, min, max).await
    }

    // ============================================================================
    // Hash Operations
    // ============================================================================

    /// HINCRBY - Increment hash field by delta, returns new value
    pub async fn hincr(&mut self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.conn.hincr(key, field, delta).await
    }

    /// HGET - Get hash field value, None if absent
    pub async fn hget<T: redis::FromRedisValue>(
        &mut self,
        key: &str,
        field: &str,
    ) -> Result<Option<T>> {
        self.conn.hget(key, field).await
    }

    /// HDEL - Delete hash field, returns number of fields removed
    pub async fn hdel(&mut self, key: &str, field: &str) -> Result<i64> {
        self.conn.hdel(key, field).await
    }

    /// HKEYS - All field names of a hash
    pub async fn hkeys(&mut self, key: &str) -> Result<Vec<String>> {
        self.conn.hkeys(key).await
    }
}
