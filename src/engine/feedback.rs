use rand::Rng;

use super::config::EngineConfig;
use super::types::Outcome;

/// Praise pool for any successful attempt.
const SUCCESS_LINES: &[&str] = &[
    "You nailed it!",
    "Amazing work!",
    "You're a superstar!",
    "Boom! Perfect!",
    "That was awesome!",
    "Keep shining!",
    "High five! You got it!",
    "You're crushing these sounds!",
    "Pure genius!",
    "You're a sound wizard!",
    "I'm so proud of you!",
    "That was music to my ears!",
    "You're a natural!",
    "Spot on! Well done!",
    "You've got this down pat!",
    "Spectacular speech!",
];

/// Encouragement drawn before every miss cue.
const RETRY_LINES: &[&str] = &[
    "So close! Let's give it another go!",
    "I almost heard it! One more time?",
    "You're nearly there! Keep trying!",
    "Don't give up, you're doing great!",
    "Almost perfect! Let's try once more!",
    "I love how you're trying! Let's do it again!",
];

const LEVEL_UP_LINES: &[&str] = &[
    "Level Up! You're on fire!",
    "WOW! Super Star unlocked!",
    "New Level! Keep going!",
    "You're leveling up like a champ!",
    "Incredible! You reached a new level!",
    "You're getting so much stronger at talking!",
    "Is it a bird? Is it a plane? No, it's a Level Up!",
    "You're rising to the top!",
    "Master status achieved! New level unlocked!",
    "Look at you go! Level up!",
];

/// Mascot-flavored praise, drawn with a small configured chance.
const BUDDY_LINES: &[(&str, &[&str])] = &[
    (
        "wolf",
        &[
            "Howl-tastic job!",
            "You're a pack leader!",
            "Awoooo! Perfect!",
        ],
    ),
    (
        "robot",
        &[
            "Processing... result: PERFECT!",
            "You're speaking my language!",
            "Binary success! Beep-boop!",
        ],
    ),
    (
        "cat",
        &[
            "Purr-fect pronunciation!",
            "Meow-velous job!",
            "You're the cat's pajamas!",
        ],
    ),
    (
        "puppy",
        &[
            "Woof! You did it!",
            "Pause-itively amazing!",
            "Tail-waggingly good!",
        ],
    ),
    (
        "panda",
        &[
            "Panda-tastic!",
            "You're un-bear-ably good!",
            "So sweet and clear!",
        ],
    ),
];

/// Everything the feedback table needs to pick a bucket. Bucket choice
/// is a pure function of this context; only the draw within the bucket
/// consumes randomness.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackContext<'a> {
    pub outcome: Outcome,
    pub attempt_number: u32,
    pub leveled_up: bool,
    pub buddy: &'a str,
    pub word: &'a str,
    pub sound: &'a str,
    pub tip: &'a str,
    pub example: &'a str,
}

fn draw<'a, R: Rng>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

fn buddy_pool(buddy: &str) -> Option<&'static [&'static str]> {
    BUDDY_LINES
        .iter()
        .find(|(id, _)| *id == buddy)
        .map(|(_, pool)| *pool)
}

pub fn success_line<R: Rng>(buddy: &str, cfg: &EngineConfig, rng: &mut R) -> String {
    if let Some(pool) = buddy_pool(buddy) {
        if rng.gen::<f64>() < cfg.buddy_line_chance {
            return draw(pool, rng).to_string();
        }
    }
    draw(SUCCESS_LINES, rng).to_string()
}

pub fn level_up_line<R: Rng>(rng: &mut R) -> &'static str {
    draw(LEVEL_UP_LINES, rng)
}

/// Names the detected sound and pushes for the whole word.
pub fn near_miss_line(sound: &str, word: &str) -> String {
    format!("So close! I heard the {sound} sound! Try the whole word '{word}'!")
}

/// Miss coaching escalates with the attempt: the tip first, then a
/// slowed-down modeling cue, then the worked example.
fn miss_cue(attempt_number: u32, word: &str, tip: &str, example: &str) -> String {
    match attempt_number {
        0 | 1 => tip.to_string(),
        2 => format!("Let's try it super slowly: '{word}'. Listen first, then say it with me!"),
        _ => example.to_string(),
    }
}

pub fn miss_line<R: Rng>(
    attempt_number: u32,
    word: &str,
    tip: &str,
    example: &str,
    rng: &mut R,
) -> String {
    let opener = draw(RETRY_LINES, rng);
    let cue = miss_cue(attempt_number, word, tip, example);
    format!("{opener} {cue}")
}

/// One line per scored attempt. On a level-up the level-up phrase is
/// prepended to the success phrase, in that fixed order.
pub fn attempt_feedback<R: Rng>(ctx: &FeedbackContext, cfg: &EngineConfig, rng: &mut R) -> String {
    match ctx.outcome {
        Outcome::Success => {
            let praise = success_line(ctx.buddy, cfg, rng);
            if ctx.leveled_up {
                format!("{} {}", level_up_line(rng), praise)
            } else {
                praise
            }
        }
        Outcome::NearMiss => near_miss_line(ctx.sound, ctx.word),
        Outcome::Miss => miss_line(ctx.attempt_number, ctx.word, ctx.tip, ctx.example, rng),
    }
}
