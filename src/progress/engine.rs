use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::FetchLimits;
use crate::constants::{FOCUS_BASE_XP, FOCUS_XP_PER_CORRECT, XP_PER_CORRECT_ANSWER};
use crate::progress::choice::{self, Choice};
use crate::progress::{level, mastery, streak};
use crate::response::AppError;
use crate::store::operations::attempts::AttemptLog;
use crate::store::operations::focus_logs::FocusLog;
use crate::store::operations::mastery::MasteryRecord;
use crate::store::operations::profiles::Profile;
use crate::store::Store;

/// 答题编排器：把规范化、判分、掌握状态转移、连胜与经验结算
/// 串成一次逻辑上原子的提交。
///
/// 同一用户的提交通过用户级锁串行化，配合存储层的 CAS 循环，
/// 快速连点不会丢失 attempt_count 或连对计数的更新。
pub struct ProgressEngine {
    store: Arc<Store>,
    limits: FetchLimits,
    user_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

#[derive(Debug, Clone)]
pub struct AnswerSubmission {
    pub question_id: String,
    pub raw_answer: String,
    pub pomodoro_session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub is_correct: bool,
    pub correct_answer: Choice,
    pub xp_gained: i64,
    pub level_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_xp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_days: Option<u32>,
    pub current_streak: u32,
}

#[derive(Debug, Clone)]
pub struct FocusSubmission {
    pub duration_secs: u32,
    pub questions_completed: Option<u64>,
    pub correct_count: Option<u64>,
    pub pomodoro_session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusOutcome {
    pub xp_gained: i64,
    pub questions_completed: u64,
    pub correct_count: u64,
    pub level_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_xp: Option<i64>,
}

impl ProgressEngine {
    pub fn new(store: Arc<Store>, limits: FetchLimits) -> Self {
        Self {
            store,
            limits,
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn acquire_user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;

        // Periodically prune entries that are no longer held by anyone.
        // Arc::strong_count == 1 means only the HashMap holds a reference,
        // so the lock is idle and can be safely removed.
        if locks.len() > 1000 {
            locks.retain(|_, v| Arc::strong_count(v) > 1);
        }

        locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn submit_answer(
        &self,
        user_id: &str,
        submission: AnswerSubmission,
    ) -> Result<SubmissionOutcome, AppError> {
        let user_lock = self.acquire_user_lock(user_id).await;
        let _guard = user_lock.lock().await;

        let question = self
            .store
            .get_question(&submission.question_id)?
            .ok_or_else(|| AppError::not_found("Question not found"))?;

        let correct_answer = choice::normalize(&question.correct_answer);
        let answer = choice::normalize(&submission.raw_answer);
        let is_correct = answer == correct_answer;

        let now = Utc::now();

        // 审计轨迹先落盘；这里失败则整个提交失败
        self.store.create_attempt(&AttemptLog {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            question_id: submission.question_id.clone(),
            answer,
            is_correct,
            pomodoro_session_id: submission.pomodoro_session_id.clone(),
            created_at: now,
        })?;

        self.store
            .update_mastery_record(user_id, &submission.question_id, |existing| {
                mastery::apply_attempt(
                    existing,
                    user_id,
                    &submission.question_id,
                    answer,
                    is_correct,
                    now,
                )
            })?;

        let xp_gained = if is_correct { XP_PER_CORRECT_ANSWER } else { 0 };
        let today = now.date_naive();

        let old_profile = self
            .store
            .get_profile(user_id)?
            .unwrap_or_else(|| Profile::new(user_id, now));
        let old_level = old_profile.level;

        let profile_update = self.store.update_profile(user_id, |existing| {
            let mut profile = existing.unwrap_or_else(|| Profile::new(user_id, now));
            profile.xp += xp_gained;
            profile.level = level::level_for(profile.xp);
            profile.current_streak = streak::next_global_streak(profile.current_streak, is_correct);
            profile.day_streak =
                streak::next_day_streak(profile.day_streak, profile.last_activity_date, today);
            profile.last_activity_date = Some(today);
            profile.updated_at = now;
            profile
        });

        let outcome = match profile_update {
            Ok(profile) => SubmissionOutcome {
                is_correct,
                correct_answer,
                xp_gained,
                level_up: profile.level > old_level,
                new_level: Some(profile.level),
                new_xp: Some(profile.xp),
                streak_days: Some(profile.day_streak),
                current_streak: profile.current_streak,
            },
            Err(e) => {
                // 经验/等级结算是辅助数据，丢一次不影响判分结果
                tracing::warn!(user_id, error = %e, "Profile update failed, reporting answer without XP detail");
                SubmissionOutcome {
                    is_correct,
                    correct_answer,
                    xp_gained,
                    level_up: false,
                    new_level: None,
                    new_xp: None,
                    streak_days: None,
                    current_streak: streak::next_global_streak(
                        old_profile.current_streak,
                        is_correct,
                    ),
                }
            }
        };

        Ok(outcome)
    }

    /// 手动“标记已掌握”旁路，见 mastery::force_mastered。
    /// 要求该（用户，题目）已有掌握记录。
    pub async fn mark_mastered(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> Result<MasteryRecord, AppError> {
        let user_lock = self.acquire_user_lock(user_id).await;
        let _guard = user_lock.lock().await;

        let snapshot = self
            .store
            .get_mastery_record(user_id, question_id)?
            .ok_or_else(|| AppError::not_found("No progress recorded for this question"))?;

        let record = self
            .store
            .update_mastery_record(user_id, question_id, |existing| {
                // 掌握记录从不删除，CAS 重试时 existing 始终存在
                mastery::force_mastered(existing.unwrap_or_else(|| snapshot.clone()))
            })?;

        Ok(record)
    }

    /// 记录一次已完成的专注会话并结算奖励经验。
    /// 提供了番茄钟会话 id 时，以作答历史为准重算完成数与答对数。
    pub async fn log_focus_session(
        &self,
        user_id: &str,
        submission: FocusSubmission,
    ) -> Result<FocusOutcome, AppError> {
        let user_lock = self.acquire_user_lock(user_id).await;
        let _guard = user_lock.lock().await;

        let mut questions_completed = submission.questions_completed.unwrap_or(0);
        let mut correct_count = submission.correct_count.unwrap_or(0);

        if let Some(ref session_id) = submission.pomodoro_session_id {
            match self.store.count_session_attempts(
                user_id,
                session_id,
                self.limits.max_session_attempt_scan,
            ) {
                Ok(stats) => {
                    questions_completed = stats.total;
                    correct_count = stats.correct;
                }
                Err(e) => {
                    tracing::warn!(user_id, session_id = %session_id, error = %e, "Failed to count session attempts");
                }
            }
        }

        let xp_gained = FOCUS_BASE_XP + correct_count as i64 * FOCUS_XP_PER_CORRECT;
        let now = Utc::now();

        self.store.create_focus_log(&FocusLog {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            duration_secs: submission.duration_secs,
            questions_completed,
            correct_count,
            created_at: now,
        })?;

        let old_level = self
            .store
            .get_profile(user_id)?
            .map(|p| p.level)
            .unwrap_or(1);

        let profile_update = self.store.update_profile(user_id, |existing| {
            let mut profile = existing.unwrap_or_else(|| Profile::new(user_id, now));
            profile.xp += xp_gained;
            profile.level = level::level_for(profile.xp);
            profile.updated_at = now;
            profile
        });

        let outcome = match profile_update {
            Ok(profile) => FocusOutcome {
                xp_gained,
                questions_completed,
                correct_count,
                level_up: profile.level > old_level,
                new_level: Some(profile.level),
                new_xp: Some(profile.xp),
            },
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Profile update failed for focus log");
                FocusOutcome {
                    xp_gained,
                    questions_completed,
                    correct_count,
                    level_up: false,
                    new_level: None,
                    new_xp: None,
                }
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use crate::store::operations::mastery::MasteryStatus;
    use crate::store::operations::questions::Question;

    use super::*;

    fn engine_with_store() -> (ProgressEngine, Arc<Store>, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let store = Arc::new(Store::open(dir.path().join("db").to_str().unwrap()).unwrap());
        let engine = ProgressEngine::new(store.clone(), FetchLimits::default());
        (engine, store, dir)
    }

    fn seed_question(store: &Store, id: &str, correct: &str) {
        store
            .upsert_question(&Question {
                id: id.to_string(),
                year: "2023".to_string(),
                session: "AM".to_string(),
                category: "network".to_string(),
                question_number: 1,
                content: "q".to_string(),
                option_a: "a".to_string(),
                option_b: "b".to_string(),
                option_c: "c".to_string(),
                option_d: "d".to_string(),
                correct_answer: correct.to_string(),
                explanation: String::new(),
                difficulty: "normal".to_string(),
                created_at: Utc::now(),
            })
            .unwrap();
    }

    fn submission(question_id: &str, answer: &str) -> AnswerSubmission {
        AnswerSubmission {
            question_id: question_id.to_string(),
            raw_answer: answer.to_string(),
            pomodoro_session_id: None,
        }
    }

    #[tokio::test]
    async fn unknown_question_is_not_found() {
        let (engine, _store, _dir) = engine_with_store();
        let err = engine
            .submit_answer("u1", submission("missing", "A"))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn correct_answer_awards_xp_and_streaks() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "B");

        let outcome = engine.submit_answer("u1", submission("q1", "B")).await.unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.xp_gained, 10);
        assert_eq!(outcome.new_xp, Some(10));
        assert_eq!(outcome.new_level, Some(1));
        assert!(!outcome.level_up);
        assert_eq!(outcome.current_streak, 1);
        assert_eq!(outcome.streak_days, Some(1));

        let record = store.get_mastery_record("u1", "q1").unwrap().unwrap();
        assert_eq!(record.status, MasteryStatus::Normal);
        assert_eq!(record.attempt_count, 1);

        let attempts = store.get_user_attempts("u1", 10).unwrap();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].is_correct);
    }

    #[tokio::test]
    async fn katakana_answer_is_normalized() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "イ");

        let outcome = engine.submit_answer("u1", submission("q1", "B")).await.unwrap();
        assert!(outcome.is_correct);
        assert_eq!(outcome.correct_answer, Choice::B);
    }

    #[tokio::test]
    async fn level_up_at_xp_threshold() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "A");

        store
            .update_profile("u1", |existing| {
                let mut p = existing.unwrap_or_else(|| Profile::new("u1", Utc::now()));
                p.xp = 490;
                p.level = level::level_for(p.xp);
                p
            })
            .unwrap();

        let outcome = engine.submit_answer("u1", submission("q1", "A")).await.unwrap();
        assert_eq!(outcome.xp_gained, 10);
        assert_eq!(outcome.new_xp, Some(500));
        assert_eq!(outcome.new_level, Some(2));
        assert!(outcome.level_up);
    }

    #[tokio::test]
    async fn incorrect_answer_resets_streak_and_demotes_mastered() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "A");
        seed_question(&store, "q2", "A");

        // q1 进入错题本后连对三次 → 已掌握
        engine.submit_answer("u1", submission("q1", "B")).await.unwrap();
        for _ in 0..3 {
            engine.submit_answer("u1", submission("q1", "A")).await.unwrap();
        }
        let record = store.get_mastery_record("u1", "q1").unwrap().unwrap();
        assert_eq!(record.status, MasteryStatus::Mastered);

        // 另一道题答对，全局连胜继续
        let streak_outcome = engine.submit_answer("u1", submission("q2", "A")).await.unwrap();
        assert_eq!(streak_outcome.current_streak, 4);

        // 已掌握的题答错：回到错题本，全局连胜清零，不得经验
        let outcome = engine.submit_answer("u1", submission("q1", "C")).await.unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.xp_gained, 0);
        assert!(!outcome.level_up);
        assert_eq!(outcome.current_streak, 0);

        let record = store.get_mastery_record("u1", "q1").unwrap().unwrap();
        assert_eq!(record.status, MasteryStatus::NeedsReview);
        assert_eq!(record.consecutive_correct, 0);
    }

    #[tokio::test]
    async fn same_day_submissions_keep_day_streak() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "A");

        let first = engine.submit_answer("u1", submission("q1", "A")).await.unwrap();
        let second = engine.submit_answer("u1", submission("q1", "A")).await.unwrap();
        assert_eq!(first.streak_days, Some(1));
        assert_eq!(second.streak_days, Some(1));
    }

    #[tokio::test]
    async fn day_streak_continues_from_yesterday() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "A");

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        store
            .update_profile("u1", |existing| {
                let mut p = existing.unwrap_or_else(|| Profile::new("u1", Utc::now()));
                p.day_streak = 3;
                p.last_activity_date = Some(yesterday);
                p
            })
            .unwrap();

        let outcome = engine.submit_answer("u1", submission("q1", "A")).await.unwrap();
        assert_eq!(outcome.streak_days, Some(4));
    }

    #[tokio::test]
    async fn mark_mastered_requires_existing_record() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "A");

        let err = engine.mark_mastered("u1", "q1").await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);

        engine.submit_answer("u1", submission("q1", "B")).await.unwrap();
        let record = engine.mark_mastered("u1", "q1").await.unwrap();
        assert_eq!(record.status, MasteryStatus::Mastered);
        assert_eq!(record.consecutive_correct, 0);
    }

    #[tokio::test]
    async fn focus_session_recounts_from_attempt_log() {
        let (engine, store, _dir) = engine_with_store();
        seed_question(&store, "q1", "A");

        for answer in ["A", "A", "B"] {
            engine
                .submit_answer(
                    "u1",
                    AnswerSubmission {
                        question_id: "q1".to_string(),
                        raw_answer: answer.to_string(),
                        pomodoro_session_id: Some("s-1".to_string()),
                    },
                )
                .await
                .unwrap();
        }

        let outcome = engine
            .log_focus_session(
                "u1",
                FocusSubmission {
                    duration_secs: 1500,
                    questions_completed: None,
                    correct_count: None,
                    pomodoro_session_id: Some("s-1".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.questions_completed, 3);
        assert_eq!(outcome.correct_count, 2);
        // 25 基础 + 2 × 5
        assert_eq!(outcome.xp_gained, 35);
        assert_eq!(outcome.new_xp, Some(20 + 35));
    }
}
