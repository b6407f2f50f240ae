//! Bounded, sequential retry without backoff.

use std::fmt::Display;
use std::future::Future;

use tracing::warn;

/// Why [`retry`] gave up.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every allowed attempt failed; carries the last failure.
    Exhausted { attempts: u32, last_error: E },
    /// A failure that another attempt cannot fix.
    Aborted { attempt: u32, error: E },
}

/// Run `op` up to `max_attempts` times (at least once), back to back.
///
/// `op` receives the 1-based attempt number. Failures for which
/// `is_transient` is false stop immediately. `on_retry` is called with the
/// failed attempt number and its error whenever another attempt follows.
pub async fn retry<T, E, Op, Fut>(
    max_attempts: u32,
    is_transient: impl Fn(&E) -> bool,
    mut on_retry: impl FnMut(u32, &E),
    mut op: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if !is_transient(&error) => {
                return Err(RetryError::Aborted { attempt, error });
            }
            Err(error) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last_error: error,
                });
            }
            Err(error) => {
                warn!(attempt, max_attempts, %error, "attempt failed, trying again");
                on_retry(attempt, &error);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Flaky(u32),
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn transient(e: &TestError) -> bool {
        matches!(e, TestError::Flaky(_))
    }

    /// Fails the first `k` attempts, then succeeds.
    async fn flaky(k: u32, max_attempts: u32) -> (Result<u32, RetryError<TestError>>, u32, u32) {
        let calls = Cell::new(0);
        let retries = Cell::new(0);
        let result = retry(
            max_attempts,
            transient,
            |_, _| retries.set(retries.get() + 1),
            |attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt <= k {
                        Err(TestError::Flaky(attempt))
                    } else {
                        Ok(attempt)
                    }
                }
            },
        )
        .await;
        (result, calls.get(), retries.get())
    }

    #[tokio::test]
    async fn first_try_success() {
        let (result, calls, retries) = flaky(0, 3).await;
        assert_eq!(result, Ok(1));
        assert_eq!(calls, 1);
        assert_eq!(retries, 0);
    }

    #[tokio::test]
    async fn succeeds_within_budget() {
        for k in 1..=2 {
            let (result, calls, retries) = flaky(k, 3).await;
            assert_eq!(result, Ok(k + 1));
            assert_eq!(calls, k + 1);
            assert_eq!(retries, k);
        }
    }

    #[tokio::test]
    async fn exhausts_after_budget() {
        let (result, calls, retries) = flaky(3, 3).await;
        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                attempts: 3,
                last_error: TestError::Flaky(3),
            })
        );
        assert_eq!(calls, 3);
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let (result, calls, _) = flaky(5, 0).await;
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn fatal_error_aborts_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry(
            3,
            transient,
            |_, _| {},
            |_| {
                calls.set(calls.get() + 1);
                async { Err(TestError::Fatal) }
            },
        )
        .await;

        assert_eq!(
            result,
            Err(RetryError::Aborted {
                attempt: 1,
                error: TestError::Fatal,
            })
        );
        assert_eq!(calls.get(), 1);
    }
}
