//! Level/XP table and the skill points derived from level.

/// Cumulative XP needed to reach levels 1 through 20.
pub const LEVEL_THRESHOLDS: [i64; 20] = [
    0, 100, 300, 600, 1000, 1500, 2100, 2800, 3600, 4500, 5500, 6600, 7800, 9100, 10500,
    12000, 13600, 15300, 17100, 19000,
];

/// XP per level past the end of the table.
pub const XP_PER_LEVEL_BEYOND_TABLE: i64 = 2500;

/// Hard cap on level, whatever the XP.
pub const MAX_LEVEL: u32 = 50;

const TABLE_TOP_LEVEL: u32 = LEVEL_THRESHOLDS.len() as u32;
const TABLE_TOP_XP: i64 = LEVEL_THRESHOLDS[LEVEL_THRESHOLDS.len() - 1];

/// Level reached with `xp` cumulative experience.
pub fn level_from_xp(xp: i64) -> u32 {
    if xp <= 0 {
        return 1;
    }
    if xp >= TABLE_TOP_XP {
        let beyond = (xp - TABLE_TOP_XP) / XP_PER_LEVEL_BEYOND_TABLE;
        let level = i64::from(TABLE_TOP_LEVEL).saturating_add(beyond);
        return level.min(i64::from(MAX_LEVEL)) as u32;
    }
    LEVEL_THRESHOLDS.iter().filter(|&&t| t <= xp).count() as u32
}

/// Minimum cumulative XP of `level`. Level 0 is treated as level 1.
pub fn xp_floor_for_level(level: u32) -> i64 {
    let level = level.max(1);
    if level <= TABLE_TOP_LEVEL {
        LEVEL_THRESHOLDS[(level - 1) as usize]
    } else {
        TABLE_TOP_XP + i64::from(level - TABLE_TOP_LEVEL) * XP_PER_LEVEL_BEYOND_TABLE
    }
}

/// Fraction of the way from `level`'s floor to the next level's floor, in `[0, 1]`.
pub fn progress_to_next_level(xp: i64, level: u32) -> f64 {
    let floor = xp_floor_for_level(level);
    let next = xp_floor_for_level(level.saturating_add(1));
    let span = next - floor;
    if span <= 0 {
        return 0.0;
    }
    ((xp - floor) as f64 / span as f64).clamp(0.0, 1.0)
}

/// Total skill points earned by reaching `level`.
///
/// One point per level past the first, plus two more per level past ten.
pub fn skill_points_for_level(level: u32) -> i64 {
    let level = i64::from(level.max(1));
    (level - 1) + ((level - 10) * 2).max(0)
}

/// XP still missing before the next level. Zero at the cap.
pub fn xp_to_next_level(xp: i64, level: u32) -> i64 {
    if level >= MAX_LEVEL {
        return 0;
    }
    (xp_floor_for_level(level + 1) - xp).max(0)
}
