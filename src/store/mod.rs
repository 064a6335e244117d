// ============================================================================
// Message Store
// ============================================================================
//
// Redis-only bookkeeping for message delivery. One concern per module:
// - ids.rs:         atomic message-ID counters
// - idempotency.rs: request fingerprint marks
// - broadcast.rs:   broadcast queues
// - delayed.rs:     delayed delivery index
// - group.rs:       group fan-out tracking
// - recipient.rs:   per-user / per-device pending indices
// - ack.rs:         acknowledgement counters
// - gc.rs:          expired-entry sweep
// - official.rs:    official message class and its rate limit
//
// ============================================================================

mod ack;
mod broadcast;
mod delayed;
mod gc;
mod group;
mod idempotency;
mod ids;
mod official;
mod recipient;

#[cfg(test)]
mod tests;

pub use recipient::DeliveryReport;

use anyhow::Result;
use chrono::{DateTime, Utc};
use courier_config::{Config, RedisKeyPrefixes};
use courier_redis::RedisClient;

/// Message-delivery bookkeeping engine over Redis
///
/// Dynamic, short-lived, low-risk delivery state lives here: message-ID
/// counters, pending indices, acknowledgement tracking, rate-limit
/// buckets. Message payloads (except broadcast queue entries) are never
/// stored; the store only tracks IDs and lifecycle.
///
/// Correctness relies on Redis's per-command atomicity. Operations are
/// independent and may run concurrently from many callers; the only
/// exception is `sweep_expired`, which must not overlap with itself.
pub struct MessageStore {
    client: RedisClient,
    prefixes: RedisKeyPrefixes,
}

impl MessageStore {
    pub async fn connect(config: &Config) -> Result<Self> {
        tracing::debug!("Connecting to Redis...");

        let is_tls = config.redis_url.starts_with("rediss://");
        if is_tls {
            tracing::info!("Redis TLS enabled (rediss://)");
        }

        let client = RedisClient::connect(&config.redis_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

        tracing::info!(
            message_ttl_days = config.message_ttl_days,
            "Message store connected"
        );

        Ok(Self {
            client,
            prefixes: config.redis_key_prefixes.clone(),
        })
    }

    pub async fn ping(&mut self) -> Result<()> {
        let _: () = redis::cmd("PING")
            .query_async(self.client.connection_mut())
            .await?;
        Ok(())
    }

    // ============================================================================
    // Message IDs (delegated to ids module)
    // ============================================================================

    /// New strictly-increasing message ID for `counter_key`
    pub async fn next_message_id(&mut self, counter_key: &str) -> Result<i64> {
        ids::IdGenerator::new(&mut self.client, &self.prefixes)
            .next(counter_key)
            .await
    }

    // ============================================================================
    // Request Fingerprints (delegated to idempotency module)
    // ============================================================================

    /// Remember which message ID a request fingerprint produced
    pub async fn mark_request(
        &mut self,
        fingerprint: &str,
        message_id: &str,
        ttl_seconds: i64,
    ) -> Result<()> {
        idempotency::RequestMarks::new(&mut self.client, &self.prefixes)
            .mark(fingerprint, message_id, ttl_seconds)
            .await
    }

    /// Message ID previously produced for this fingerprint; `None`
    /// means "not previously seen"
    pub async fn lookup_request(&mut self, fingerprint: &str) -> Result<Option<String>> {
        idempotency::RequestMarks::new(&mut self.client, &self.prefixes)
            .lookup(fingerprint)
            .await
    }

    // ============================================================================
    // Broadcast Queues (delegated to broadcast module)
    // ============================================================================

    /// Append a payload to a broadcast queue, returns the new length
    pub async fn push_broadcast(&mut self, queue_key: &str, payload: &[u8]) -> Result<i64> {
        broadcast::Broadcasts::new(&mut self.client)
            .push(queue_key, payload)
            .await
    }

    /// Take one payload off a broadcast queue; non-blocking, `None`
    /// when empty
    pub async fn pop_broadcast(&mut self, queue_key: &str) -> Result<Option<Vec<u8>>> {
        broadcast::Broadcasts::new(&mut self.client)
            .pop(queue_key)
            .await
    }

    pub async fn broadcast_len(&mut self, queue_key: &str) -> Result<i64> {
        broadcast::Broadcasts::new(&mut self.client)
            .len(queue_key)
            .await
    }

    // ============================================================================
    // Delayed Delivery (delegated to delayed module)
    // ============================================================================

    /// Schedule a message ID for release at `due_time`
    pub async fn schedule_delayed(
        &mut self,
        index_key: &str,
        due_time: DateTime<Utc>,
        message_id: &str,
    ) -> Result<i64> {
        delayed::DelayedIndex::new(&mut self.client)
            .schedule(index_key, due_time, message_id)
            .await
    }

    /// Message IDs whose scheduled time has passed; not consumed, call
    /// `remove_delayed` once handled
    pub async fn due_delayed(&mut self, index_key: &str) -> Result<Vec<String>> {
        delayed::DelayedIndex::new(&mut self.client)
            .due(index_key)
            .await
    }

    pub async fn remove_delayed(&mut self, index_key: &str, message_id: &str) -> Result<i64> {
        delayed::DelayedIndex::new(&mut self.client)
            .remove(index_key, message_id)
            .await
    }

    // ============================================================================
    // Group Messages (delegated to group module)
    // ============================================================================

    /// Register a group message living for `ttl_seconds`
    pub async fn publish_group(
        &mut self,
        group_key: &str,
        message_id: &str,
        ttl_seconds: i64,
    ) -> Result<i64> {
        group::GroupTracker::new(&mut self.client, &self.prefixes)
            .publish(group_key, message_id, ttl_seconds)
            .await
    }

    /// Record that `recipient_flag` received the group message; when
    /// `user_id` is a concrete user (> 0) the acknowledgement is also
    /// forwarded to the user's pending index and audit log. Returns the
    /// number of flags newly recorded (0 on re-acknowledgement or after
    /// the message's window closed).
    pub async fn acknowledge_group(
        &mut self,
        reject: bool,
        user_id: i64,
        recipient_flag: &str,
        message_id: &str,
    ) -> Result<i64> {
        let marked = group::GroupTracker::new(&mut self.client, &self.prefixes)
            .mark_seen(recipient_flag, message_id)
            .await?;

        // Per-recipient bookkeeping runs on every path, including a
        // closed group window
        if user_id > 0 {
            recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
                .acknowledge_user(reject, user_id, message_id)
                .await?;
        }

        Ok(marked)
    }

    /// Live group message IDs the recipient has not yet been marked for
    pub async fn pending_group(
        &mut self,
        group_key: &str,
        recipient_flag: &str,
    ) -> Result<Vec<String>> {
        group::GroupTracker::new(&mut self.client, &self.prefixes)
            .pending(group_key, recipient_flag)
            .await
    }

    /// Whether the group message is still registered (not retracted)
    pub async fn group_message_exists(
        &mut self,
        group_key: &str,
        message_id: &str,
    ) -> Result<bool> {
        group::GroupTracker::new(&mut self.client, &self.prefixes)
            .exists(group_key, message_id)
            .await
    }

    /// Withdraw a group message before its expiry
    pub async fn retract_group(&mut self, group_key: &str, message_id: &str) -> Result<i64> {
        group::GroupTracker::new(&mut self.client, &self.prefixes)
            .retract(group_key, message_id)
            .await
    }

    // ============================================================================
    // User Messages (delegated to recipient module)
    // ============================================================================

    pub async fn register_user_message(
        &mut self,
        user_id: i64,
        ttl_seconds: i64,
        message_id: &str,
    ) -> Result<i64> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .register_user(user_id, ttl_seconds, message_id)
            .await
    }

    /// Remove a pending user message on acknowledgement, recording the
    /// accept/reject outcome in the audit log. Returns 1 if the message
    /// was pending, 0 otherwise.
    pub async fn acknowledge_user_message(
        &mut self,
        reject: bool,
        user_id: i64,
        message_id: &str,
    ) -> Result<i64> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .acknowledge_user(reject, user_id, message_id)
            .await
    }

    pub async fn due_user_messages(&mut self, user_id: i64) -> Result<Vec<String>> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .due_user(user_id)
            .await
    }

    /// Delivered log, rejected log, and pending entries that expired
    /// unacknowledged
    pub async fn user_delivery_report(&mut self, user_id: i64) -> Result<DeliveryReport> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .report(user_id)
            .await
    }

    // ============================================================================
    // Device Messages (delegated to recipient module)
    // ============================================================================

    pub async fn register_device_message(
        &mut self,
        device_key: &str,
        ttl_seconds: i64,
        message_id: &str,
    ) -> Result<i64> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .register_device(device_key, ttl_seconds, message_id)
            .await
    }

    pub async fn acknowledge_device_message(
        &mut self,
        device_key: &str,
        message_id: &str,
    ) -> Result<i64> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .acknowledge_device(device_key, message_id)
            .await
    }

    pub async fn due_device_messages(&mut self, device_key: &str) -> Result<Vec<String>> {
        recipient::RecipientIndex::new(&mut self.client, &self.prefixes)
            .due_device(device_key)
            .await
    }

    // ============================================================================
    // Acknowledgement Counters (delegated to ack module)
    // ============================================================================

    pub async fn increment_ack(&mut self, namespace: &str, message_id: &str) -> Result<i64> {
        ack::AckCounters::new(&mut self.client)
            .increment(namespace, message_id)
            .await
    }

    pub async fn ack_count(&mut self, namespace: &str, message_id: &str) -> Result<i64> {
        ack::AckCounters::new(&mut self.client)
            .count(namespace, message_id)
            .await
    }

    /// Consume `amount` acknowledgements; never leaves a negative count
    pub async fn reset_ack(
        &mut self,
        namespace: &str,
        message_id: &str,
        amount: i64,
    ) -> Result<()> {
        ack::AckCounters::new(&mut self.client)
            .reset_by(namespace, message_id, amount)
            .await
    }

    pub async fn acked_message_ids(&mut self, namespace: &str) -> Result<Vec<String>> {
        ack::AckCounters::new(&mut self.client)
            .acked_ids(namespace)
            .await
    }

    // ============================================================================
    // Maintenance (delegated to gc module)
    // ============================================================================

    /// Remove entries older than `retention_seconds` from every ordered
    /// index. Store-wide scan; run on a schedule, never concurrently
    /// with itself.
    pub async fn sweep_expired(&mut self, retention_seconds: i64) -> Result<i64> {
        gc::Sweeper::new(&mut self.client)
            .sweep(retention_seconds)
            .await
    }

    // ============================================================================
    // Official Message Class (delegated to official module)
    // ============================================================================

    pub async fn mark_official_message(
        &mut self,
        message_id: &str,
        ttl_seconds: i64,
    ) -> Result<()> {
        official::OfficialClass::new(&mut self.client, &self.prefixes)
            .mark_official(message_id, ttl_seconds)
            .await
    }

    pub async fn is_official_message(&mut self, message_id: &str) -> Result<bool> {
        official::OfficialClass::new(&mut self.client, &self.prefixes)
            .is_official(message_id)
            .await
    }

    /// Record an official-message send to this device in today's
    /// rate-limit bucket
    pub async fn mark_official_device(&mut self, device_key: &str) -> Result<i64> {
        official::OfficialClass::new(&mut self.client, &self.prefixes)
            .mark_device(device_key)
            .await
    }

    /// Whether the device may not receive another official message.
    /// Fails closed: store errors during the bucket scan count as
    /// saturated.
    pub async fn official_device_saturated(&mut self, device_key: &str) -> Result<bool> {
        official::OfficialClass::new(&mut self.client, &self.prefixes)
            .is_saturated(device_key)
            .await
    }
}
