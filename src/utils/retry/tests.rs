use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fast() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        initial_delay_ms: 10,
        max_delay_ms: 100,
        backoff_multiplier: 2.0,
        timeout_secs: 5,
    }
}

#[test]
fn test_default_retry_config() {
    let c = RetryConfig::default();
    assert_eq!(c.max_retries, 3);
    assert_eq!(c.initial_delay_ms, 1000);
    assert_eq!(c.max_delay_ms, 10000);
    assert_eq!(c.timeout_secs, 30);
}

#[test]
fn test_base_delay_exponential_and_capped() {
    let c = RetryConfig::default();
    assert_eq!(c.base_delay_ms(0), 1000);
    assert_eq!(c.base_delay_ms(1), 2000);
    assert_eq!(c.base_delay_ms(2), 4000);
    assert_eq!(c.base_delay_ms(10), 10000);
}

#[test]
fn test_delay_jitter_bounds() {
    let c = RetryConfig::default();
    for _ in 0..50 {
        let d = c.delay_for(1, None).as_millis();
        assert!((2000..=2500).contains(&d), "delay {} out of range", d);
    }
}

#[test]
fn test_retry_after_hint_wins() {
    let c = RetryConfig::default();
    assert_eq!(c.delay_for(0, Some(7)), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn test_transient_then_success() {
    let calls = AtomicUsize::new(0);
    let result = with_retry(&fast(), "fetch", || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(ScrollError::transient("reset"))
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_permission_not_retried() {
    let calls = AtomicUsize::new(0);
    let result: ScrollResult<()> = with_retry(&fast(), "fetch", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(ScrollError::Permission("#secret".into())) }
    })
    .await;
    assert!(matches!(result, Err(ScrollError::Permission(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted() {
    let calls = AtomicUsize::new(0);
    let result: ScrollResult<()> = with_retry(&fast(), "fetch", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(ScrollError::transient("503")) }
    })
    .await;
    assert!(matches!(result, Err(ScrollError::Transient { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_transient() {
    let config = RetryConfig {
        max_retries: 0,
        ..fast()
    };
    let result: ScrollResult<()> = with_retry(&config, "slow call", || async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    })
    .await;
    match result {
        Err(ScrollError::Transient { message, .. }) => assert!(message.contains("timed out")),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_no_replay_after_timeout() {
    let calls = AtomicUsize::new(0);
    let result: ScrollResult<()> = with_retry_no_replay(&fast(), "send batch", || {
        calls.fetch_add(1, Ordering::SeqCst);
        async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    })
    .await;
    assert!(matches!(result, Err(ScrollError::Transient { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_replay_still_retries_rejections() {
    let calls = AtomicUsize::new(0);
    let result = with_retry_no_replay(&fast(), "send batch", || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                Err(ScrollError::Transient {
                    message: "rate limited".into(),
                    retry_after: Some(1),
                })
            } else {
                Ok(n)
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
