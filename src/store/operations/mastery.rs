use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CAS_RETRIES;
use crate::progress::choice::Choice;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// 每个（用户，题目）一条的掌握状态记录。首次作答时创建，之后只更新，从不删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub user_id: String,
    pub question_id: String,
    pub last_answer: Choice,
    pub last_correct: bool,
    pub attempt_count: u32,
    pub consecutive_correct: u32,
    pub status: MasteryStatus,
    pub last_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// 封闭的状态枚举，取代原型里的自由字符串，让非法状态不可表示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MasteryStatus {
    Normal,
    NeedsReview,
    Mastered,
}

impl Store {
    pub fn get_mastery_record(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> Result<Option<MasteryRecord>, StoreError> {
        let key = keys::mastery_key(user_id, question_id);
        match self.mastery_records.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// 以 CAS 循环更新（或创建）掌握记录。
    ///
    /// 闭包必须是纯函数：冲突时会对最新的记录重新求值，
    /// 保证并发提交下 attempt_count 与 consecutive_correct 不丢失更新。
    pub fn update_mastery_record<F>(
        &self,
        user_id: &str,
        question_id: &str,
        apply: F,
    ) -> Result<MasteryRecord, StoreError>
    where
        F: Fn(Option<MasteryRecord>) -> MasteryRecord,
    {
        let key = keys::mastery_key(user_id, question_id);

        for _ in 0..MAX_CAS_RETRIES {
            let current_raw = self.mastery_records.get(key.as_bytes())?;
            let current = current_raw
                .as_ref()
                .map(|raw| Self::deserialize::<MasteryRecord>(raw))
                .transpose()?;

            let next = apply(current);
            let next_bytes = Self::serialize(&next)?;

            let swap = self.mastery_records.compare_and_swap(
                key.as_bytes(),
                current_raw.clone(),
                Some(next_bytes),
            )?;

            if swap.is_ok() {
                return Ok(next);
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "mastery_record".to_string(),
            key,
            attempts: MAX_CAS_RETRIES,
        })
    }

    /// 按状态列出某用户的掌握记录，按最近作答时间倒序。
    pub fn list_mastery_by_status(
        &self,
        user_id: &str,
        status: MasteryStatus,
        limit: usize,
    ) -> Result<Vec<MasteryRecord>, StoreError> {
        let prefix = keys::mastery_prefix(user_id);
        let mut records = Vec::new();
        for item in self.mastery_records.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let record: MasteryRecord = Self::deserialize(&value)?;
            if record.status == status {
                records.push(record);
            }
        }

        records.sort_by(|a, b| b.last_attempt_at.cmp(&a.last_attempt_at));
        records.truncate(limit);
        Ok(records)
    }

    pub fn count_mastery_by_status(
        &self,
        user_id: &str,
        status: MasteryStatus,
    ) -> Result<u64, StoreError> {
        let prefix = keys::mastery_prefix(user_id);
        let mut count = 0u64;
        for item in self.mastery_records.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            let record: MasteryRecord = Self::deserialize(&value)?;
            if record.status == status {
                count += 1;
            }
        }
        Ok(count)
    }
}
