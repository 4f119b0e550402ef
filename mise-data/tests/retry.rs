use mise_data::{with_retry, DataError, RetryPolicy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn fast(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::ZERO)
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let result: Result<(), _> = with_retry(&fast(3), "test", move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(DataError::Backend {
            status: 503,
            message: "unavailable".into(),
        })
    })
    .await;
    assert!(matches!(result, Err(DataError::Backend { status: 503, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let result: Result<(), _> = with_retry(&fast(3), "test", move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(DataError::Backend {
            status: 404,
            message: "missing".into(),
        })
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transport_error_then_success() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let result = with_retry(&fast(3), "test", move || async move {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Err(DataError::Transport("connection reset".into()))
        } else {
            Ok(n)
        }
    })
    .await;
    assert_eq!(result, Ok(1));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn zero_attempts_still_runs_once() {
    let counter = AtomicU32::new(0);
    let calls = &counter;
    let _ = with_retry(&fast(0), "test", move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(DataError::Transport("down".into()))
    })
    .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_grows_linearly() {
    let policy = RetryPolicy::new(3, Duration::from_millis(1000));
    assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
    assert_eq!(policy.delay_for(2), Duration::from_millis(2000));

    let start = tokio::time::Instant::now();
    let _ = with_retry(&policy, "test", move || async move {
        Err::<(), _>(DataError::Transport("down".into()))
    })
    .await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(3000));
    assert!(elapsed < Duration::from_millis(3100));
}

#[test]
fn delay_saturates_on_huge_base() {
    let policy = RetryPolicy::new(3, Duration::MAX / 2);
    assert_eq!(policy.delay_for(1), Duration::MAX / 2);
    assert_eq!(policy.delay_for(3), Duration::MAX);
}
