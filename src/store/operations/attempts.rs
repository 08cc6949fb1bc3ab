use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::choice::Choice;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// 答题历史，仅追加：每次提交一行，从不修改或删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptLog {
    pub id: String,
    pub user_id: String,
    pub question_id: String,
    pub answer: Choice,
    pub is_correct: bool,
    pub pomodoro_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 某一天的作答汇总。
#[derive(Debug, Clone, Copy, Default)]
pub struct DayAttemptStats {
    pub total: u64,
    pub correct: u64,
}

impl Store {
    pub fn create_attempt(&self, attempt: &AttemptLog) -> Result<(), StoreError> {
        let ts = attempt.created_at.timestamp_millis();
        let key = keys::attempt_key(&attempt.user_id, ts, &attempt.id);
        self.attempts
            .insert(key.as_bytes(), Self::serialize(attempt)?)?;
        Ok(())
    }

    /// 最新在前返回用户的作答历史。
    pub fn get_user_attempts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<AttemptLog>, StoreError> {
        let prefix = keys::attempt_prefix(user_id);
        let mut attempts = Vec::new();
        for item in self.attempts.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            attempts.push(Self::deserialize::<AttemptLog>(&value)?);
            if attempts.len() >= limit {
                break;
            }
        }
        Ok(attempts)
    }

    /// 统计某用户某一天（UTC 日历日）的作答数与答对数。
    /// 键按时间倒序排列，一旦扫描到早于该日的记录即可停止。
    pub fn count_attempts_on_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<DayAttemptStats, StoreError> {
        let prefix = keys::attempt_prefix(user_id);
        let mut stats = DayAttemptStats::default();

        for item in self.attempts.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let attempt: AttemptLog = Self::deserialize(&value)?;
            let attempt_date = attempt.created_at.date_naive();
            if attempt_date < date {
                break;
            }
            if attempt_date == date {
                stats.total += 1;
                if attempt.is_correct {
                    stats.correct += 1;
                }
            }
        }

        Ok(stats)
    }

    /// 统计某个番茄钟会话内的作答数与答对数。
    /// 会话没有独立索引，按最新在前扫描最多 scan_limit 条。
    pub fn count_session_attempts(
        &self,
        user_id: &str,
        session_id: &str,
        scan_limit: usize,
    ) -> Result<DayAttemptStats, StoreError> {
        let prefix = keys::attempt_prefix(user_id);
        let mut stats = DayAttemptStats::default();
        let mut scanned = 0usize;

        for item in self.attempts.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            scanned += 1;
            let attempt: AttemptLog = Self::deserialize(&value)?;
            if attempt.pomodoro_session_id.as_deref() == Some(session_id) {
                stats.total += 1;
                if attempt.is_correct {
                    stats.correct += 1;
                }
            }
            if scanned >= scan_limit {
                break;
            }
        }

        Ok(stats)
    }
}
