use chrono::{DateTime, Utc};

use crate::constants::MASTERY_STREAK_THRESHOLD;
use crate::progress::choice::Choice;
use crate::store::operations::mastery::{MasteryRecord, MasteryStatus};

/// 对一条掌握记录应用一次作答，返回新记录。
///
/// 状态转移按优先级求值：
/// 1. 无记录 + 答对   → Normal，连对 1
/// 2. 无记录 + 答错   → NeedsReview，连对 0
/// 3. 有记录 + 答错   → NeedsReview（无条件，包括已掌握的题），连对清零
/// 4. 有记录 + 答对且连对达到阈值且此前在 NeedsReview → Mastered
/// 5. 有记录 + 答对（其余情况）→ 状态不变，连对 +1
///
/// 任何一次作答都会：attempt_count +1、记录本次答案与对错、刷新 last_attempt_at。
pub fn apply_attempt(
    existing: Option<MasteryRecord>,
    user_id: &str,
    question_id: &str,
    answer: Choice,
    is_correct: bool,
    now: DateTime<Utc>,
) -> MasteryRecord {
    match existing {
        None => MasteryRecord {
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            last_answer: answer,
            last_correct: is_correct,
            attempt_count: 1,
            consecutive_correct: if is_correct { 1 } else { 0 },
            status: if is_correct {
                MasteryStatus::Normal
            } else {
                MasteryStatus::NeedsReview
            },
            last_attempt_at: now,
            created_at: now,
        },
        Some(mut record) => {
            record.attempt_count += 1;
            record.last_answer = answer;
            record.last_correct = is_correct;
            record.last_attempt_at = now;

            if is_correct {
                let next_streak = record.consecutive_correct + 1;
                if next_streak >= MASTERY_STREAK_THRESHOLD
                    && record.status == MasteryStatus::NeedsReview
                {
                    record.status = MasteryStatus::Mastered;
                }
                record.consecutive_correct = next_streak;
            } else {
                // 已掌握的题答错一次即回到错题本，掌握状态不具粘性
                record.consecutive_correct = 0;
                record.status = MasteryStatus::NeedsReview;
            }

            record
        }
    }
}

/// 手动“标记已掌握”旁路：不走连对要求，不动任何计数器。
pub fn force_mastered(mut record: MasteryRecord) -> MasteryRecord {
    record.status = MasteryStatus::Mastered;
    record
}
