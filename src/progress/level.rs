use crate::constants::XP_PER_LEVEL;

/// 经验值对应的等级。每 500 XP 升一级，1 级为下限。
pub fn level_for(xp: i64) -> u32 {
    if xp <= 0 {
        return 1;
    }
    (xp / XP_PER_LEVEL) as u32 + 1
}

/// 升到下一级所需的累计经验值门槛。
pub fn xp_for_next_level(level: u32) -> i64 {
    level as i64 * XP_PER_LEVEL
}

/// 当前等级内的进度百分比，夹在 [0, 100]。
pub fn progress_percent(xp: i64, level: u32) -> f64 {
    let level_floor = (level.saturating_sub(1)) as i64 * XP_PER_LEVEL;
    let into_level = xp - level_floor;
    let fraction = into_level as f64 / XP_PER_LEVEL as f64 * 100.0;
    fraction.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_steps_every_500() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(499), 1);
        assert_eq!(level_for(500), 2);
        assert_eq!(level_for(999), 2);
        assert_eq!(level_for(1000), 3);
    }

    #[test]
    fn negative_xp_is_level_one() {
        assert_eq!(level_for(-50), 1);
    }

    #[test]
    fn level_is_monotonic() {
        let mut last = 0;
        for xp in (0..5_000).step_by(25) {
            let level = level_for(xp);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn next_level_threshold() {
        assert_eq!(xp_for_next_level(1), 500);
        assert_eq!(xp_for_next_level(3), 1500);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_percent(0, 1), 0.0);
        assert_eq!(progress_percent(250, 1), 50.0);
        assert_eq!(progress_percent(-10, 1), 0.0);
        assert_eq!(progress_percent(10_000, 1), 100.0);
    }

    #[test]
    fn progress_resets_each_level() {
        assert_eq!(progress_percent(500, 2), 0.0);
        assert_eq!(progress_percent(750, 2), 50.0);
    }
}
