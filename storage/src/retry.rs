use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::sleep;

/// Retries a storage operation with exponential backoff, doubling the delay
/// after each failed attempt. The final error is returned unchanged.
pub async fn retry_with_backoff<F, T, E>(
    mut operation: F,
    max_retries: usize,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Pin<Box<dyn Future<Output = Result<T, E>> + Send>>,
    E: std::fmt::Display,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Attempt {attempt}/{} failed: {err}. Retrying in {delay:?}",
                    max_retries + 1
                );
                sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn retries_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result: Result<usize, String> = retry_with_backoff(
            move || {
                let counter = counter.clone();
                Box::pin(async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok(n)
                    }
                })
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let result: Result<(), String> = retry_with_backoff(
            || Box::pin(async { Err("still down".to_string()) }),
            1,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(result, Err("still down".to_string()));
    }
}
