/// 每个单词成功发音的基础经验值
pub const XP_PER_WORD: u64 = 10;

/// 首次尝试即成功的额外奖励经验值
pub const PERFECT_ROUND_BONUS: u64 = 20;

/// 失败惩罚经验值（默认 0，总经验不会被扣成负数）
pub const MISS_PENALTY: u64 = 0;

/// 等级累计经验阈值表（下标 = 等级 - 1）
pub const CUMULATIVE_XP_REQUIREMENTS: &[u64] = &[0, 40, 150, 350, 650, 1050];

/// 阈值表之外每级所需的线性增量
pub const XP_PER_LEVEL_BEYOND_TABLE: u64 = 500;

/// 连胜里程碑间隔（每 N 次连续成功弹一次庆祝）
pub const STREAK_MILESTONE_INTERVAL: u32 = 3;

/// 语速初始值
pub const INITIAL_SPEECH_RATE: f64 = 1.0;

/// 每次失败后的语速衰减系数
pub const SPEECH_RATE_STEP: f64 = 0.9;

/// 语速下限
pub const MIN_SPEECH_RATE: f64 = 0.7;

/// 第 N 次未成功尝试后展示提示
pub const HINT_AFTER_ATTEMPTS: u32 = 2;

/// 伙伴专属台词的抽取概率
pub const BUDDY_LINE_CHANCE: f64 = 0.3;

/// 默认伙伴
pub const DEFAULT_BUDDY: &str = "wolf";

/// attempts 列表默认分页大小
pub const DEFAULT_PAGE_SIZE_ATTEMPTS: u64 = 50;

/// 列表接口最大分页大小
pub const MAX_PAGE_SIZE: u64 = 100;

/// 家长面板统计的最近记录条数
pub const STATS_RECENT_SESSIONS: usize = 20;

/// 家长面板每日活跃统计的天数
pub const STATS_ACTIVITY_DAYS: i64 = 7;

/// 转写文本最大长度（字符）
pub const MAX_TRANSCRIPT_CHARS: usize = 500;
