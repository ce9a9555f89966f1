//! 指数バックオフ + ジッターの再試行
//!
//! 待ち時間は `min(max_delay, base_delay * 2^attempt) * jitter`。
//! 再試行できるかどうかは呼び出し側の判定関数で決める。

use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 試行回数の上限（初回を含む）
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// ジッター倍率の範囲 `[low, high)`
    pub jitter: (f64, f64),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_millis(800),
            max_delay: Duration::from_secs(30),
            jitter: (0.5, 1.5),
        }
    }
}

impl RetryPolicy {
    /// ジッター前の待ち時間（attempt は0始まり）
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2f64.powi(attempt.min(31) as i32);
        let secs = (self.base_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let (low, high) = self.jitter;
        let factor = if high > low {
            rand::thread_rng().gen_range(low..high)
        } else {
            low
        };
        self.backoff(attempt).mul_f64(factor.max(0.0))
    }

    /// `tokio::time::sleep` で待ちながら実行する
    pub async fn run<T, E, F, Fut, C>(&self, op: F, is_transient: C) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        self.run_with_sleep(op, is_transient, tokio::time::sleep).await
    }

    /// 待ち方を差し替えられる版
    pub async fn run_with_sleep<T, E, F, Fut, C, S, SFut>(
        &self,
        mut op: F,
        is_transient: C,
        mut sleep: S,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: std::fmt::Display,
        S: FnMut(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) && attempt + 1 < max_attempts => {
                    let delay = self.delay_for(attempt);
                    log::info!(
                        "一時的なエラーのため {:.2}秒後に再試行します ({}/{}): {}",
                        delay.as_secs_f64(),
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
