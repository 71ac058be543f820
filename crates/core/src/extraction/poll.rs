//! Bounded polling with an injectable sleeper.

use std::future::Future;
use std::time::Duration;

/// Suspends the current task. Swapped out in tests to avoid real delays.
pub trait Sleeper: Send + Sync {
    /// Sleeps for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How often and how many times to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between checks.
    pub interval: Duration,
    /// Maximum number of checks.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState<T> {
    /// Done.
    Ready(T),
    /// Not yet, check again.
    Pending,
    /// Will never become ready.
    Failed(String),
}

/// Why polling stopped without a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollError<E> {
    /// The remote side reported a terminal failure.
    Failed(String),
    /// All attempts were used up.
    Exhausted {
        /// Number of checks made.
        attempts: u32,
    },
    /// A check itself failed.
    Check(E),
}

/// Runs `check` until it reports ready or failed, sleeping between attempts.
///
/// `check` receives the 1-based attempt number. There is no sleep after the
/// last attempt.
///
/// # Errors
///
/// Returns [`PollError::Failed`] on a terminal state, [`PollError::Exhausted`]
/// when the policy runs out, or [`PollError::Check`] when a check errors.
pub async fn poll_until<T, E, F, Fut, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut check: F,
) -> Result<T, PollError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollState<T>, E>>,
    S: Sleeper,
{
    for attempt in 1..=policy.max_attempts {
        match check(attempt).await.map_err(PollError::Check)? {
            PollState::Ready(value) => return Ok(value),
            PollState::Failed(reason) => return Err(PollError::Failed(reason)),
            PollState::Pending => {
                if attempt < policy.max_attempts {
                    sleeper.sleep(policy.interval).await;
                }
            }
        }
    }

    Err(PollError::Exhausted {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records requested sleeps and returns immediately.
    #[derive(Debug, Default)]
    pub struct RecordingSleeper {
        pub sleeps: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn count(&self) -> usize {
            self.sleeps.lock().unwrap().len()
        }
    }

    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_secs(2),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_ready_on_third_attempt() {
        let sleeper = RecordingSleeper::default();

        let result: Result<&str, PollError<()>> = poll_until(&policy(30), &sleeper, |n| async move {
            Ok(if n == 3 {
                PollState::Ready("active")
            } else {
                PollState::Pending
            })
        })
        .await;

        assert_eq!(result, Ok("active"));
        assert_eq!(sleeper.count(), 2);
        assert!(sleeper.sleeps.lock().unwrap().iter().all(|d| *d == Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_failed_state_stops_immediately() {
        let sleeper = RecordingSleeper::default();

        let result: Result<(), PollError<()>> = poll_until(&policy(30), &sleeper, |_| async {
            Ok(PollState::Failed("FAILED".to_string()))
        })
        .await;

        assert_eq!(result, Err(PollError::Failed("FAILED".to_string())));
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_after_max_attempts() {
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;

        let result: Result<(), PollError<()>> = poll_until(&policy(30), &sleeper, |_| {
            calls += 1;
            async { Ok(PollState::Pending) }
        })
        .await;

        assert_eq!(result, Err(PollError::Exhausted { attempts: 30 }));
        assert_eq!(calls, 30);
        assert_eq!(sleeper.count(), 29);
    }

    #[tokio::test]
    async fn test_check_error_propagates() {
        let sleeper = RecordingSleeper::default();

        let result: Result<(), PollError<&str>> =
            poll_until(&policy(5), &sleeper, |_| async { Err("connection reset") }).await;

        assert_eq!(result, Err(PollError::Check("connection reset")));
    }

    #[tokio::test]
    async fn test_zero_attempts_is_exhausted() {
        let sleeper = RecordingSleeper::default();

        let result: Result<(), PollError<()>> =
            poll_until(&policy(0), &sleeper, |_| async { Ok(PollState::Ready(())) }).await;

        assert_eq!(result, Err(PollError::Exhausted { attempts: 0 }));
    }
}
