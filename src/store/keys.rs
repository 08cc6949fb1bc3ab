pub fn user_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn user_email_index_key(email: &str) -> String {
    format!("email:{}", email.to_lowercase())
}

pub fn session_key(token_hash: &str) -> String {
    token_hash.to_string()
}

pub fn session_user_index_key(user_id: &str, token_hash: &str) -> String {
    format!("user:{}:{}", user_id, token_hash)
}

pub fn question_key(question_id: &str) -> String {
    question_id.to_string()
}

pub fn mastery_key(user_id: &str, question_id: &str) -> String {
    format!("{}:{}", user_id, question_id)
}

pub fn mastery_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}

// 时间倒序键：前缀扫描按最新在前返回
pub fn attempt_key(user_id: &str, timestamp_ms: i64, attempt_id: &str) -> String {
    let ts = timestamp_ms.max(0) as u64;
    let reverse_ts = u64::MAX - ts;
    format!("{}:{:020}:{}", user_id, reverse_ts, attempt_id)
}

pub fn attempt_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}

pub fn profile_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn bookmark_key(user_id: &str, question_id: &str) -> String {
    format!("{}:{}", user_id, question_id)
}

pub fn bookmark_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}

pub fn focus_log_key(user_id: &str, timestamp_ms: i64, log_id: &str) -> String {
    let ts = timestamp_ms.max(0) as u64;
    let reverse_ts = u64::MAX - ts;
    format!("{}:{:020}:{}", user_id, reverse_ts, log_id)
}

pub fn focus_log_prefix(user_id: &str) -> String {
    format!("{}:", user_id)
}
