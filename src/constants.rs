/// CAS（Compare-And-Swap）操作最大重试次数
pub const MAX_CAS_RETRIES: u32 = 20;

/// 每道题答对获得的经验值
pub const XP_PER_CORRECT_ANSWER: i64 = 10;

/// 升一级所需经验值
pub const XP_PER_LEVEL: i64 = 500;

/// 错题连续答对此次数后升级为已掌握
pub const MASTERY_STREAK_THRESHOLD: u32 = 3;

/// 完成一次专注（番茄钟）会话的基础经验值
pub const FOCUS_BASE_XP: i64 = 25;

/// 专注会话内每道答对题的额外经验值
pub const FOCUS_XP_PER_CORRECT: i64 = 5;

/// 列表接口默认分页大小
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// 列表接口最大分页大小
pub const MAX_PAGE_SIZE: u64 = 100;
