use crate::constants::{CUMULATIVE_XP_REQUIREMENTS, XP_PER_LEVEL_BEYOND_TABLE};

use super::types::LevelProgress;

/// Cumulative XP needed to reach `level`. Level 1 is 0.
/// Past the table the curve continues linearly.
pub fn xp_for_level(level: u32) -> u64 {
    let table = CUMULATIVE_XP_REQUIREMENTS;
    if level == 0 {
        return 0;
    }
    let idx = (level - 1) as usize;
    if idx < table.len() {
        return table[idx];
    }
    let last = table[table.len() - 1];
    let beyond = (idx - (table.len() - 1)) as u64;
    last + beyond * XP_PER_LEVEL_BEYOND_TABLE
}

/// Highest level whose threshold is within `total_xp`. Never 0.
pub fn level_for_xp(total_xp: u64) -> u32 {
    let table = CUMULATIVE_XP_REQUIREMENTS;
    let last = table[table.len() - 1];
    if total_xp >= last {
        let beyond = (total_xp - last) / XP_PER_LEVEL_BEYOND_TABLE;
        return table.len() as u32 + beyond as u32;
    }
    // Scan from the top so the first threshold <= xp wins.
    for (idx, threshold) in table.iter().enumerate().rev() {
        if total_xp >= *threshold {
            return idx as u32 + 1;
        }
    }
    1
}

/// Position within the current level, for the client's progress bar.
pub fn progress_within_level(total_xp: u64) -> LevelProgress {
    let level = level_for_xp(total_xp);
    let floor = xp_for_level(level);
    let ceiling = xp_for_level(level + 1);
    let current_in_level = total_xp.saturating_sub(floor);
    let required_in_level = ceiling.saturating_sub(floor).max(1);
    let percent = ((current_in_level * 100) / required_in_level).min(100) as u8;
    LevelProgress {
        level,
        current_in_level,
        required_in_level,
        percent,
    }
}
