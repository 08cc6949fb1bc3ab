use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub token_type: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl Store {
    pub fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        let key = keys::session_key(&session.token_hash);
        let index_key = keys::session_user_index_key(&session.user_id, &session.token_hash);
        let session_bytes = Self::serialize(session)?;

        let key_bytes = key.as_bytes().to_vec();
        let index_key_bytes = index_key.as_bytes().to_vec();
        self.sessions
            .transaction(move |tx| {
                tx.insert(key_bytes.as_slice(), session_bytes.as_slice())?;
                tx.insert(index_key_bytes.as_slice(), &[] as &[u8])?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError<()>| match e {
                sled::transaction::TransactionError::Abort(()) => {
                    StoreError::Sled(sled::Error::Unsupported("transaction aborted".into()))
                }
                sled::transaction::TransactionError::Storage(se) => StoreError::Sled(se),
            })?;
        Ok(())
    }

    /// 获取会话，如果已过期或已撤销则返回 None。
    /// 不产生删除副作用——过期会话的清理由专用后台任务 cleanup_expired_sessions 负责。
    pub fn get_session(&self, token_hash: &str) -> Result<Option<Session>, StoreError> {
        let key = keys::session_key(token_hash);
        let Some(raw) = self.sessions.get(key.as_bytes())? else {
            return Ok(None);
        };

        let session = Self::deserialize::<Session>(&raw)?;
        if session.revoked || session.expires_at <= Utc::now() {
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        let key = keys::session_key(token_hash);
        let raw = self.sessions.get(key.as_bytes())?;

        let session_key_bytes = key.as_bytes().to_vec();
        let index_key_bytes = raw
            .as_ref()
            .and_then(|r| Self::deserialize::<Session>(r).ok())
            .map(|session| {
                keys::session_user_index_key(&session.user_id, token_hash)
                    .as_bytes()
                    .to_vec()
            });

        self.sessions
            .transaction(move |tx| {
                if let Some(ref idx_key) = index_key_bytes {
                    tx.remove(idx_key.as_slice())?;
                }
                tx.remove(session_key_bytes.as_slice())?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError<()>| match e {
                sled::transaction::TransactionError::Abort(()) => {
                    StoreError::Sled(sled::Error::Unsupported("transaction aborted".into()))
                }
                sled::transaction::TransactionError::Storage(se) => StoreError::Sled(se),
            })?;

        Ok(())
    }

    pub fn delete_user_sessions(&self, user_id: &str) -> Result<usize, StoreError> {
        let prefix = format!("user:{}:", user_id);
        let mut hashes = Vec::new();
        for item in self.sessions.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let key_text = String::from_utf8_lossy(&key);
            if let Some(hash) = key_text.strip_prefix(&prefix) {
                hashes.push(hash.to_string());
            }
        }

        for hash in &hashes {
            self.delete_session(hash)?;
        }

        Ok(hashes.len())
    }

    /// 物理删除已过期/已撤销的会话记录，返回删除条数。
    pub fn cleanup_expired_sessions(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut expired = Vec::new();

        for item in self.sessions.iter() {
            let (key, value) = item?;
            let key_text = String::from_utf8_lossy(&key);
            // 跳过用户索引键
            if key_text.starts_with("user:") {
                continue;
            }
            let Ok(session) = Self::deserialize::<Session>(&value) else {
                continue;
            };
            if session.revoked || session.expires_at <= now {
                expired.push(session.token_hash.clone());
            }
        }

        for hash in &expired {
            self.delete_session(hash)?;
        }

        Ok(expired.len())
    }
}
