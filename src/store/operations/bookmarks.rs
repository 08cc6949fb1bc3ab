use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub user_id: String,
    pub question_id: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// 幂等保存：同一（用户，题目）重复收藏保留最早的创建时间。
    pub fn upsert_bookmark(&self, bookmark: &Bookmark) -> Result<Bookmark, StoreError> {
        let key = keys::bookmark_key(&bookmark.user_id, &bookmark.question_id);

        if let Some(raw) = self.bookmarks.get(key.as_bytes())? {
            return Self::deserialize(&raw);
        }

        self.bookmarks
            .insert(key.as_bytes(), Self::serialize(bookmark)?)?;
        Ok(bookmark.clone())
    }

    pub fn get_bookmark(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> Result<Option<Bookmark>, StoreError> {
        let key = keys::bookmark_key(user_id, question_id);
        match self.bookmarks.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// 删除收藏；不存在时返回 false。
    pub fn delete_bookmark(&self, user_id: &str, question_id: &str) -> Result<bool, StoreError> {
        let key = keys::bookmark_key(user_id, question_id);
        Ok(self.bookmarks.remove(key.as_bytes())?.is_some())
    }

    pub fn list_bookmarks(&self, user_id: &str, limit: usize) -> Result<Vec<Bookmark>, StoreError> {
        let prefix = keys::bookmark_prefix(user_id);
        let mut bookmarks = Vec::new();
        for item in self.bookmarks.scan_prefix(prefix.as_bytes()) {
            let (_, value) = item?;
            bookmarks.push(Self::deserialize::<Bookmark>(&value)?);
        }

        bookmarks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookmarks.truncate(limit);
        Ok(bookmarks)
    }
}
