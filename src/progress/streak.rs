use chrono::NaiveDate;

/// 全局连胜计数：答对 +1，答错清零。跨题目统计，与单题的连对计数无关。
pub fn next_global_streak(current: u32, is_correct: bool) -> u32 {
    if is_correct {
        current + 1
    } else {
        0
    }
}

/// 连续学习天数。
///
/// 同一天重复提交不变；恰好比上次活跃日晚一天则 +1；
/// 其余情况（首次活跃、间隔超过一天）重置为 1。
pub fn next_day_streak(current: u32, last_activity: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last_activity {
        Some(last) if last == today => current.max(1),
        Some(last) if last.succ_opt() == Some(today) => current + 1,
        _ => 1,
    }
}
