use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CAS_RETRIES;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// 每用户一条的成长档案：经验、等级、连续学习天数与全局连胜。
/// 首次提交答案时惰性创建。不变式：level == level_for(xp)。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub xp: i64,
    pub level: u32,
    pub day_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub current_streak: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            xp: 0,
            level: 1,
            day_streak: 0,
            last_activity_date: None,
            current_streak: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Store {
    pub fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let key = keys::profile_key(user_id);
        match (self.user_profiles.get(key.as_bytes()))? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// 以 CAS 循环更新（或创建）用户档案；闭包冲突时会对最新值重新求值。
    pub fn update_profile<F>(&self, user_id: &str, apply: F) -> Result<Profile, StoreError>
    where
        F: Fn(Option<Profile>) -> Profile,
    {
        let key = keys::profile_key(user_id);

        for _ in 0..MAX_CAS_RETRIES {
            let current_raw = self.user_profiles.get(key.as_bytes())?;
            let current = current_raw
                .as_ref()
                .map(|raw| Self::deserialize::<Profile>(raw))
                .transpose()?;

            let next = apply(current);
            let next_bytes = Self::serialize(&next)?;

            let swap = self.user_profiles.compare_and_swap(
                key.as_bytes(),
                current_raw.clone(),
                Some(next_bytes),
            )?;

            if swap.is_ok() {
                return Ok(next);
            }
        }

        Err(StoreError::CasRetryExhausted {
            entity: "profile".to_string(),
            key,
            attempts: MAX_CAS_RETRIES,
        })
    }
}
