use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// 一次已完成的专注（番茄钟）会话。客户端在会话结束时提交一次，仅追加。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusLog {
    pub id: String,
    pub user_id: String,
    pub duration_secs: u32,
    pub questions_completed: u64,
    pub correct_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn create_focus_log(&self, log: &FocusLog) -> Result<(), StoreError> {
        let ts = log.created_at.timestamp_millis();
        let key = keys::focus_log_key(&log.user_id, ts, &log.id);
        self.focus_logs.insert(key.as_bytes(), Self::serialize(log)?)?;
        Ok(())
    }

    /// 某一天（UTC 日历日）完成的专注会话数。键按时间倒序，可提前终止扫描。
    pub fn count_focus_logs_on_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<u64, StoreError> {
        let prefix = keys::focus_log_prefix(user_id);
        let mut count = 0u64;

        for item in self.focus_logs.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let log: FocusLog = Self::deserialize(&value)?;
            let log_date = log.created_at.date_naive();
            if log_date < date {
                break;
            }
            if log_date == date {
                count += 1;
            }
        }

        Ok(count)
    }
}
