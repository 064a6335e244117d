// ============================================================================
// Group Delivery Tracking
// ============================================================================
//
// Fans a single message out to many recipients without storing one copy
// per recipient. The group index (ZSET scored by expiry) holds the live
// message IDs; a per-message tracking set records which recipient flags
// already acknowledged.
//
// Tracking-set lifetime invariant: the set must outlive the index
// entry. It is created with twice the message TTL and re-pinned to its
// remaining TTL on every acknowledgement, so it can never expire while
// the message is still discoverable.

use crate::score;
use anyhow::{Context, Result};
use courier_config::RedisKeyPrefixes;
use courier_redis::RedisClient;

/// Sentinel member so the tracking set exists before any recipient
/// acknowledges
const TRACKING_SENTINEL: &str = "0";

pub(crate) struct GroupTracker<'a> {
    client: &'a mut RedisClient,
    prefixes: &'a RedisKeyPrefixes,
}

impl<'a> GroupTracker<'a> {
    pub(crate) fn new(client: &'a mut RedisClient, prefixes: &'a RedisKeyPrefixes) -> Self {
        Self { client, prefixes }
    }

    fn index_key(&self, group_key: &str) -> String {
        format!("{}{}", self.prefixes.group, group_key)
    }

    fn seen_key(&self, message_id: &str) -> String {
        format!("{}{}", self.prefixes.seen, message_id)
    }

    /// Registers a group message living for `ttl_seconds`. The tracking
    /// set is created before the index entry: a reader of the group
    /// index must never observe an ID whose tracking set does not yet
    /// exist.
    pub(crate) async fn publish(
        &mut self,
        group_key: &str,
        message_id: &str,
        ttl_seconds: i64,
    ) -> Result<i64> {
        let seen_key = self.seen_key(message_id);
        self.client
            .sadd(&seen_key, TRACKING_SENTINEL)
            .await
            .context("Failed to create delivery-tracking set")?;
        self.client
            .expire(&seen_key, ttl_seconds * 2)
            .await
            .context("Failed to set delivery-tracking set TTL")?;

        let added = self
            .client
            .zadd(&self.index_key(group_key), message_id, score::in_seconds(ttl_seconds))
            .await
            .context("Failed to register group message")?;

        tracing::debug!(
            group = %group_key,
            message_id = %message_id,
            ttl_seconds = ttl_seconds,
            "Published group message"
        );

        Ok(added)
    }

    /// Marks `recipient_flag` as having received the message. Returns
    /// the number of flags newly recorded (0 on re-acknowledgement, set
    /// semantics give at-most-once effect). A tracking set whose TTL
    /// already reached zero means the message's window has definitively
    /// closed; marking is then a no-op returning 0.
    ///
    /// The TTL-read / SADD / EXPIRE sequence is not atomic as a whole;
    /// a concurrent expiry between the read and the add can record one
    /// extra or one missed acknowledgement, never corruption.
    pub(crate) async fn mark_seen(
        &mut self,
        recipient_flag: &str,
        message_id: &str,
    ) -> Result<i64> {
        let seen_key = self.seen_key(message_id);

        let ttl = self
            .client
            .ttl(&seen_key)
            .await
            .context("Failed to read delivery-tracking set TTL")?;
        if ttl <= 0 {
            return Ok(0);
        }

        let added = self
            .client
            .sadd(&seen_key, recipient_flag)
            .await
            .context("Failed to mark group message recipient")?;

        // Pin the TTL back to the remaining lifetime just read, in case
        // the membership add reset it
        self.client
            .expire(&seen_key, ttl)
            .await
            .context("Failed to refresh delivery-tracking set TTL")?;

        Ok(added)
    }

    /// Every live message ID in the group that `recipient_flag` has not
    /// yet been marked for. One membership test per live message; group
    /// messages are expected to be few and short-lived, so the scan is
    /// the accepted cost.
    pub(crate) async fn pending(
        &mut self,
        group_key: &str,
        recipient_flag: &str,
    ) -> Result<Vec<String>> {
        if recipient_flag.is_empty() {
            return Ok(Vec::new());
        }

        let alive = self
            .client
            .zrangebyscore(&self.index_key(group_key), score::now(), "+inf")
            .await
            .context("Failed to read live group messages")?;

        let mut unseen = Vec::new();
        for message_id in alive {
            let seen = self
                .client
                .sismember(&self.seen_key(&message_id), recipient_flag)
                .await
                .context("Failed to test group message membership")?;

            if !seen {
                unseen.push(message_id);
            }
        }

        Ok(unseen)
    }

    /// True iff the message still has an entry in the group index,
    /// i.e. it has not been retracted
    pub(crate) async fn exists(&mut self, group_key: &str, message_id: &str) -> Result<bool> {
        let entry = self
            .client
            .zscore(&self.index_key(group_key), message_id)
            .await
            .context("Failed to look up group message")?;

        Ok(entry.is_some())
    }

    /// Removes the index entry. The tracking set is left to expire
    /// naturally.
    pub(crate) async fn retract(&mut self, group_key: &str, message_id: &str) -> Result<i64> {
        self.client
            .zrem(&self.index_key(group_key), message_id)
            .await
            .context("Failed to retract group message")
    }
}
