use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// 题库中的一道题。内容由运维侧导入，服务只读。
///
/// `correct_answer` 保留录入时的原始编码（可能是片假名），
/// 比较时通过 `progress::choice::normalize` 统一。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub year: String,
    pub session: String,
    pub category: String,
    pub question_number: u32,
    pub content: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub explanation: String,
    pub difficulty: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn upsert_question(&self, question: &Question) -> Result<(), StoreError> {
        let key = keys::question_key(&question.id);
        self.questions
            .insert(key.as_bytes(), Self::serialize(question)?)?;
        Ok(())
    }

    pub fn get_question(&self, question_id: &str) -> Result<Option<Question>, StoreError> {
        let key = keys::question_key(question_id);
        match self.questions.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_questions(
        &self,
        year: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Question>, StoreError> {
        let mut questions = Vec::new();
        for item in self.questions.iter() {
            let (_, value) = item?;
            let question: Question = Self::deserialize(&value)?;
            if let Some(y) = year {
                if question.year != y {
                    continue;
                }
            }
            questions.push(question);
        }

        questions.sort_by(|a, b| {
            (a.year.as_str(), a.session.as_str(), a.question_number)
                .cmp(&(b.year.as_str(), b.session.as_str(), b.question_number))
        });
        Ok(questions.into_iter().skip(offset).take(limit).collect())
    }

    pub fn count_questions(&self, year: Option<&str>) -> Result<u64, StoreError> {
        let mut count = 0u64;
        for item in self.questions.iter() {
            let (_, value) = item?;
            if let Some(y) = year {
                let question: Question = Self::deserialize(&value)?;
                if question.year != y {
                    continue;
                }
            }
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn sample_question(id: &str, year: &str, number: u32) -> Question {
        Question {
            id: id.to_string(),
            year: year.to_string(),
            session: "AM".to_string(),
            category: "network".to_string(),
            question_number: number,
            content: format!("question {number}"),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct_answer: "B".to_string(),
            explanation: "because".to_string(),
            difficulty: "normal".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_and_get() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        store.upsert_question(&sample_question("q1", "2023", 1)).unwrap();
        let got = store.get_question("q1").unwrap().unwrap();
        assert_eq!(got.correct_answer, "B");
    }

    #[test]
    fn list_filters_by_year_and_sorts() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db2").to_str().unwrap()).unwrap();

        store.upsert_question(&sample_question("q2", "2023", 2)).unwrap();
        store.upsert_question(&sample_question("q1", "2023", 1)).unwrap();
        store.upsert_question(&sample_question("q3", "2022", 9)).unwrap();

        let listed = store.list_questions(Some("2023"), 10, 0).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].question_number, 1);
        assert_eq!(store.count_questions(None).unwrap(), 3);
    }
}
