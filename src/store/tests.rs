// ============================================================================
// Message Store Module Tests
// ============================================================================
// Manager-level tests against a live Redis instance.
// Run with: cargo test -- --ignored  (requires redis://localhost:6379)

use super::*;
use crate::score;
use chrono::Duration;
use courier_redis::RedisClient;

// ============================================================================
// Test Helpers
// ============================================================================

async fn get_test_client() -> RedisClient {
    RedisClient::connect("redis://localhost:6379")
        .await
        .expect("Failed to connect to Redis")
}

fn get_test_prefixes() -> RedisKeyPrefixes {
    Config::from_env()
        .expect("Failed to create test config")
        .redis_key_prefixes
}

fn unique(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test_{}_{}", tag, nanos)
}

fn unique_user_id() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos() as i64
        & 0x7fff_ffff_ffff
}

// ============================================================================
// IdGenerator Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_message_ids_strictly_increase() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let counter = unique("counter");

    let first = ids::IdGenerator::new(&mut client, &prefixes)
        .next(&counter)
        .await
        .expect("Failed to generate first id");
    let second = ids::IdGenerator::new(&mut client, &prefixes)
        .next(&counter)
        .await
        .expect("Failed to generate second id");

    assert_eq!(second, first + 1);

    // Cleanup
    let key = format!("{}{}", prefixes.counter, counter);
    client.del(&key).await.ok();
}

// ============================================================================
// RequestMarks Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_request_mark_lookup() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let fingerprint = unique("fp");

    let mut marks = idempotency::RequestMarks::new(&mut client, &prefixes);

    // Not previously seen
    let missing = marks.lookup(&fingerprint).await.expect("Failed to look up");
    assert_eq!(missing, None);

    marks
        .mark(&fingerprint, "msg-42", 60)
        .await
        .expect("Failed to mark request");

    let found = marks.lookup(&fingerprint).await.expect("Failed to look up");
    assert_eq!(found, Some("msg-42".to_string()));

    // Empty fingerprint is a no-op on both paths
    marks.mark("", "msg-43", 60).await.expect("Empty mark failed");
    assert_eq!(marks.lookup("").await.expect("Empty lookup failed"), None);

    // Cleanup
    let key = format!("{}{}", prefixes.request, fingerprint);
    client.del(&key).await.ok();
}

// ============================================================================
// Broadcasts Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_broadcast_fifo() {
    let mut client = get_test_client().await;
    let queue = unique("queue");

    let mut broadcasts = broadcast::Broadcasts::new(&mut client);

    let len = broadcasts
        .push(&queue, b"first")
        .await
        .expect("Failed to push");
    assert_eq!(len, 1);
    let len = broadcasts
        .push(&queue, b"second")
        .await
        .expect("Failed to push");
    assert_eq!(len, 2);

    // Empty payload and empty queue key are no-ops
    assert_eq!(broadcasts.push(&queue, b"").await.expect("Push failed"), 0);
    assert_eq!(broadcasts.push("", b"x").await.expect("Push failed"), 0);

    let head = broadcasts.pop(&queue).await.expect("Failed to pop");
    assert_eq!(head, Some(b"first".to_vec()));
    let head = broadcasts.pop(&queue).await.expect("Failed to pop");
    assert_eq!(head, Some(b"second".to_vec()));

    // Queue-empty is not an error
    let empty = broadcasts.pop(&queue).await.expect("Failed to pop empty");
    assert_eq!(empty, None);
}

// ============================================================================
// DelayedIndex Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_delayed_due_visibility() {
    let mut client = get_test_client().await;
    let index = unique("delayed");

    let mut delayed = delayed::DelayedIndex::new(&mut client);

    delayed
        .schedule(&index, Utc::now() - Duration::seconds(5), "past")
        .await
        .expect("Failed to schedule past message");
    delayed
        .schedule(&index, Utc::now() + Duration::seconds(100), "future")
        .await
        .expect("Failed to schedule future message");

    let due = delayed.due(&index).await.expect("Failed to read due");
    assert_eq!(due, vec!["past".to_string()]);

    // `due` does not consume; removal is explicit
    let due_again = delayed.due(&index).await.expect("Failed to re-read due");
    assert_eq!(due_again, vec!["past".to_string()]);

    let removed = delayed.remove(&index, "past").await.expect("Failed to remove");
    assert_eq!(removed, 1);
    let removed = delayed.remove(&index, "past").await.expect("Failed to re-remove");
    assert_eq!(removed, 0);

    // Cleanup
    client.del(&index).await.ok();
}

// ============================================================================
// GroupTracker Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_group_acknowledge_idempotent() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let group = unique("group");
    let message_id = unique("gmsg");

    let mut tracker = group::GroupTracker::new(&mut client, &prefixes);

    tracker
        .publish(&group, &message_id, 60)
        .await
        .expect("Failed to publish group message");

    assert!(tracker
        .exists(&group, &message_id)
        .await
        .expect("Failed to check existence"));

    // Pending before any acknowledgement
    let pending = tracker
        .pending(&group, "flag-a")
        .await
        .expect("Failed to read pending");
    assert!(pending.contains(&message_id));

    // First acknowledgement records the flag, second is a no-op
    let first = tracker
        .mark_seen("flag-a", &message_id)
        .await
        .expect("Failed to mark seen");
    assert_eq!(first, 1);
    let second = tracker
        .mark_seen("flag-a", &message_id)
        .await
        .expect("Failed to re-mark seen");
    assert_eq!(second, 0);

    // Acknowledged flag filtered out, others still pending
    let pending_a = tracker
        .pending(&group, "flag-a")
        .await
        .expect("Failed to read pending");
    assert!(!pending_a.contains(&message_id));
    let pending_b = tracker
        .pending(&group, "flag-b")
        .await
        .expect("Failed to read pending");
    assert!(pending_b.contains(&message_id));

    // Empty flag short-circuits
    let pending_empty = tracker
        .pending(&group, "")
        .await
        .expect("Failed to read pending");
    assert!(pending_empty.is_empty());

    // Retraction removes the index entry only
    tracker
        .retract(&group, &message_id)
        .await
        .expect("Failed to retract");
    assert!(!tracker
        .exists(&group, &message_id)
        .await
        .expect("Failed to check existence after retract"));

    // Cleanup
    let seen_key = format!("{}{}", prefixes.seen, message_id);
    let index_key = format!("{}{}", prefixes.group, group);
    client.del(&seen_key).await.ok();
    client.del(&index_key).await.ok();
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_group_closed_window_is_noop() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let message_id = unique("gmsg_closed");

    let mut tracker = group::GroupTracker::new(&mut client, &prefixes);

    // No tracking set was ever created: TTL reads as missing, marking
    // records nothing
    let marked = tracker
        .mark_seen("flag-a", &message_id)
        .await
        .expect("Failed to mark seen");
    assert_eq!(marked, 0);
}

// ============================================================================
// RecipientIndex Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_user_message_lifecycle() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let user_id = unique_user_id();

    let mut index = recipient::RecipientIndex::new(&mut client, &prefixes);

    index
        .register_user(user_id, 60, "m1")
        .await
        .expect("Failed to register user message");

    let due = index.due_user(user_id).await.expect("Failed to read due");
    assert_eq!(due, vec!["m1".to_string()]);

    let removed = index
        .acknowledge_user(false, user_id, "m1")
        .await
        .expect("Failed to acknowledge");
    assert_eq!(removed, 1);

    let due = index.due_user(user_id).await.expect("Failed to re-read due");
    assert!(due.is_empty());

    // Acknowledging an absent message removes nothing but still logs
    let removed = index
        .acknowledge_user(true, user_id, "m2")
        .await
        .expect("Failed to acknowledge absent");
    assert_eq!(removed, 0);

    let report = index.report(user_id).await.expect("Failed to read report");
    assert_eq!(report.delivered, vec!["m1".to_string()]);
    assert_eq!(report.rejected, vec!["m2".to_string()]);
    assert!(report.timed_out.is_empty());

    // User id 0 is "no recipient"
    assert_eq!(index.register_user(0, 60, "m3").await.expect("Register failed"), 0);
    assert!(index.due_user(0).await.expect("Due failed").is_empty());

    // Cleanup
    let user_key = format!("{}{}", prefixes.user, user_id);
    let delivered = format!("{}{}{}", prefixes.user, user_id, prefixes.delivered_suffix);
    let rejected = format!("{}{}{}", prefixes.user, user_id, prefixes.rejected_suffix);
    client.del(&user_key).await.ok();
    client.del(&delivered).await.ok();
    client.del(&rejected).await.ok();
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_user_report_timed_out() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let user_id = unique_user_id();

    let mut index = recipient::RecipientIndex::new(&mut client, &prefixes);

    // Registered with an already-elapsed lifetime: absent from due,
    // reported as timed out
    index
        .register_user(user_id, -5, "expired")
        .await
        .expect("Failed to register expired message");

    assert!(index.due_user(user_id).await.expect("Due failed").is_empty());

    let report = index.report(user_id).await.expect("Failed to read report");
    assert_eq!(report.timed_out, vec!["expired".to_string()]);

    // Cleanup
    let user_key = format!("{}{}", prefixes.user, user_id);
    client.del(&user_key).await.ok();
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_device_message_lifecycle() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let device = unique("device");

    let mut index = recipient::RecipientIndex::new(&mut client, &prefixes);

    index
        .register_device(&device, 60, "d1")
        .await
        .expect("Failed to register device message");

    let due = index.due_device(&device).await.expect("Failed to read due");
    assert_eq!(due, vec!["d1".to_string()]);

    let removed = index
        .acknowledge_device(&device, "d1")
        .await
        .expect("Failed to acknowledge");
    assert_eq!(removed, 1);
    assert!(index.due_device(&device).await.expect("Due failed").is_empty());

    // Empty device key is "no recipient"
    assert_eq!(
        index.register_device("", 60, "d2").await.expect("Register failed"),
        0
    );

    // Cleanup
    let device_key = format!("{}{}", prefixes.device, device);
    client.del(&device_key).await.ok();
}

// ============================================================================
// AckCounters Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_ack_counter_reset_by() {
    let mut client = get_test_client().await;
    let namespace = unique("acks");

    let mut counters = ack::AckCounters::new(&mut client);

    for expected in 1..=3 {
        let count = counters
            .increment(&namespace, "m1")
            .await
            .expect("Failed to increment");
        assert_eq!(count, expected);
    }

    // Partial consume decrements by exactly the amount
    counters
        .reset_by(&namespace, "m1", 2)
        .await
        .expect("Failed to reset by 2");
    assert_eq!(counters.count(&namespace, "m1").await.expect("Count failed"), 1);

    // Consuming at least the remainder deletes the field
    counters
        .reset_by(&namespace, "m1", 5)
        .await
        .expect("Failed to reset by 5");
    assert_eq!(counters.count(&namespace, "m1").await.expect("Count failed"), 0);

    let acked = counters.acked_ids(&namespace).await.expect("Hkeys failed");
    assert!(acked.is_empty());

    // Cleanup
    client.del(&namespace).await.ok();
}

// ============================================================================
// Sweeper Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_sweep_respects_retention() {
    let mut client = get_test_client().await;
    let index = unique("sweep");

    let stale = score::encode(Utc::now() - Duration::hours(2));
    client
        .zadd(&index, "stale", stale)
        .await
        .expect("Failed to seed stale entry");
    client
        .zadd(&index, "fresh", score::in_seconds(100))
        .await
        .expect("Failed to seed fresh entry");

    let removed = gc::Sweeper::new(&mut client)
        .sweep(3600)
        .await
        .expect("Failed to sweep");
    assert!(removed >= 1);

    let remaining = client
        .zrange(&index, 0, -1)
        .await
        .expect("Failed to read index");
    assert_eq!(remaining, vec!["fresh".to_string()]);

    // Cleanup
    client.del(&index).await.ok();
}

// ============================================================================
// OfficialClass Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Redis
async fn test_official_flag() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let message_id = unique("official");

    let mut official = official::OfficialClass::new(&mut client, &prefixes);

    assert!(!official
        .is_official(&message_id)
        .await
        .expect("Failed to check flag"));

    official
        .mark_official(&message_id, 60)
        .await
        .expect("Failed to flag message");

    assert!(official
        .is_official(&message_id)
        .await
        .expect("Failed to check flag"));

    // Cleanup
    let key = format!("{}{}", prefixes.official, message_id);
    client.del(&key).await.ok();
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_official_device_caps_across_window() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let device = unique("official_window");

    let bucket_for = |days_back: i64| {
        format!(
            "{}{}",
            prefixes.official_limit,
            score::day_bucket(Utc::now() - Duration::days(days_back))
        )
    };

    // Two sends on earlier days within the trailing window stay under
    // the cap
    for days_back in 1..=2 {
        client
            .sadd(&bucket_for(days_back), &device)
            .await
            .expect("Failed to seed bucket");
    }
    let mut official = official::OfficialClass::new(&mut client, &prefixes);
    assert!(!official
        .is_saturated(&device)
        .await
        .expect("Failed to check saturation"));

    // The third send reaches the cap
    client
        .sadd(&bucket_for(3), &device)
        .await
        .expect("Failed to seed bucket");
    let mut official = official::OfficialClass::new(&mut client, &prefixes);
    assert!(official
        .is_saturated(&device)
        .await
        .expect("Failed to check saturation"));

    // Cleanup: remove only this device from the seeded buckets
    use redis::AsyncCommands;
    for days_back in 1..=3 {
        let _: i64 = client
            .connection_mut()
            .srem(&bucket_for(days_back), &device)
            .await
            .expect("Failed to clean bucket");
    }
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_official_device_saturates_same_day() {
    let mut client = get_test_client().await;
    let prefixes = get_test_prefixes();
    let device = unique("official_device");

    let mut official = official::OfficialClass::new(&mut client, &prefixes);

    assert!(!official
        .is_saturated(&device)
        .await
        .expect("Failed to check saturation"));

    let added = official
        .mark_device(&device)
        .await
        .expect("Failed to mark device");
    assert_eq!(added, 1);

    // One send today is enough
    assert!(official
        .is_saturated(&device)
        .await
        .expect("Failed to check saturation"));

    // Cleanup: remove only this device from today's bucket
    use redis::AsyncCommands;
    let bucket = format!(
        "{}{}",
        prefixes.official_limit,
        score::day_bucket(Utc::now())
    );
    let _: i64 = client
        .connection_mut()
        .srem(&bucket, &device)
        .await
        .expect("Failed to clean bucket");
}
