use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Coaching difficulty label. Data only; XP does not scale with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One practice unit: a target word and the phoneme it drills.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: u32,
    pub word: &'static str,
    pub sound: &'static str,
    pub emoji: &'static str,
    pub difficulty: Difficulty,
    pub tip: &'static str,
    pub example: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub level: u32,
    pub emoji: &'static str,
    pub unlock_xp: u64,
    pub mission_ids: &'static [u32],
    pub coming_soon: bool,
}

const fn m(
    id: u32,
    word: &'static str,
    sound: &'static str,
    emoji: &'static str,
    difficulty: Difficulty,
    tip: &'static str,
    example: &'static str,
) -> Mission {
    Mission {
        id,
        word,
        sound,
        emoji,
        difficulty,
        tip,
        example,
    }
}

#[rustfmt::skip]
static MISSIONS: &[Mission] = &[
    m(1, "Sun", "S", "☀️", Difficulty::Easy, "Put your tongue behind your top teeth and blow air softly!", "Ssssun - like a snake hissing!"),
    m(2, "Cake", "C", "🍰", Difficulty::Easy, "Touch the back of your tongue to the roof of your mouth!", "K-k-cake - like a clock ticking!"),
    m(6, "Apple", "P", "🍎", Difficulty::Easy, "Press your lips together, then pop them open!", "A-ppp-le - pop those lips!"),
    m(8, "Fish", "F", "🐟", Difficulty::Easy, "Gently bite your bottom lip and blow air!", "Fff-ish - lip under teeth, blow!"),
    m(3, "Lion", "L", "🦁", Difficulty::Medium, "Press your tongue tip right behind your top front teeth!", "Lll-ion - let your tongue tap up!"),
    m(4, "Robot", "R", "🤖", Difficulty::Medium, "Curl your tongue back slightly without touching anything!", "Rrr-obot - like a quiet growl!"),
    m(5, "Water", "W", "💧", Difficulty::Medium, "Round your lips like you're about to blow a candle!", "Www-ater - round lips, then open!"),
    m(7, "Thunder", "TH", "⚡", Difficulty::Hard, "Put your tongue between your teeth just a little bit!", "Th-th-thunder - tongue peeks out!"),
    m(9, "Zebra", "Z", "🦓", Difficulty::Medium, "Make a bee sound! Zzzzz!", "Zzz-ebra - feel the buzz in your teeth!"),
    m(12, "Shark", "SH", "🦈", Difficulty::Medium, "Round your lips and say 'shhh'!", "Shhh-ark - like telling someone to be quiet!"),
    m(13, "Star", "ST", "⭐", Difficulty::Medium, "Start with S then quickly add T - Sss-tar!", "St-st-star - snake hiss then tongue tap!"),
    m(14, "Frog", "FR", "🐸", Difficulty::Medium, "Bite your lip for F then growl the R!", "Fff-rrr-og - lip bite then growl!"),
    m(15, "Snail", "SN", "🐌", Difficulty::Medium, "Hiss the S then hum the N through your nose!", "Sss-nnn-ail - hiss then hum!"),
    m(16, "Clap", "CL", "👏", Difficulty::Hard, "Quick K sound then tongue up for L!", "Cl-cl-clap - back tongue then front!"),
    m(17, "Butterfly", "B", "🦋", Difficulty::Medium, "Pop your lips for B, then let the word flow!", "But-ter-fly - three beats!"),
    m(18, "Dinosaur", "D", "🦕", Difficulty::Medium, "Tap your tongue behind your top teeth for D!", "Di-no-saur - tongue tap then roar!"),
    m(19, "Elephant", "L", "🐘", Difficulty::Hard, "E-le-phant has three parts - focus on the L in the middle!", "El-e-phant - tongue up for that L!"),
    m(20, "Helicopter", "H", "🚁", Difficulty::Hard, "Breathe out softly for H, then say each part!", "Hel-i-cop-ter - four beats, blow air first!"),
    m(10, "Monkey", "M", "🐒", Difficulty::Easy, "Keep your lips closed and hum!", "Mmm-onkey - like you're eating something yummy!"),
    m(11, "Goat", "G", "🐐", Difficulty::Easy, "Make a sound in the back of your throat!", "G-g-goat - like gulping water!"),
    m(21, "Thank you", "TH", "🙏", Difficulty::Hard, "Put your tongue between your teeth just a little bit!", "Th-ank you - tongue peeks out then smile!"),
    m(22, "Please help", "PL", "🆘", Difficulty::Hard, "Pop your P then quickly lift tongue for L!", "Pl-ease help - pop then lift!"),
];

static CHAPTERS: &[Chapter] = &[
    Chapter {
        id: "chapter-1",
        title: "Sound Explorer",
        description: "Master the basics! Learn simple sounds like S, C, and P.",
        level: 1,
        emoji: "🌟",
        unlock_xp: 0,
        mission_ids: &[1, 2, 6, 8],
        coming_soon: false,
    },
    Chapter {
        id: "chapter-2",
        title: "Brave Voyager",
        description: "Level up with medium sounds like L, R, and W!",
        level: 2,
        emoji: "🚀",
        unlock_xp: 100,
        mission_ids: &[3, 4, 5],
        coming_soon: false,
    },
    Chapter {
        id: "chapter-3",
        title: "Sound Master",
        description: "Conquer tough sounds! Practice the tricky TH sound.",
        level: 3,
        emoji: "⚡",
        unlock_xp: 250,
        mission_ids: &[7, 9, 12],
        coming_soon: false,
    },
    Chapter {
        id: "chapter-4",
        title: "Combo Champion",
        description: "Mix it up! Practice blended sounds and tricky combos.",
        level: 4,
        emoji: "🎯",
        unlock_xp: 400,
        mission_ids: &[13, 14, 15, 16],
        coming_soon: false,
    },
    Chapter {
        id: "chapter-5",
        title: "Word Wizard",
        description: "Multi-syllable words! Say longer, more complex words.",
        level: 5,
        emoji: "🧙",
        unlock_xp: 600,
        mission_ids: &[17, 18, 19, 20],
        coming_soon: false,
    },
    Chapter {
        id: "chapter-6",
        title: "Sentence Sage",
        description: "Full sentences! Practice clear, flowing speech.",
        level: 6,
        emoji: "📚",
        unlock_xp: 850,
        mission_ids: &[10, 11, 21, 22],
        coming_soon: false,
    },
    Chapter {
        id: "chapter-7",
        title: "Conversation King",
        description: "Real conversations! Talk back and forth with Wolfie.",
        level: 7,
        emoji: "👑",
        unlock_xp: 1150,
        mission_ids: &[],
        coming_soon: true,
    },
    Chapter {
        id: "chapter-8",
        title: "Story Teller",
        description: "Tell stories! Share full narratives with expression.",
        level: 8,
        emoji: "📖",
        unlock_xp: 1500,
        mission_ids: &[],
        coming_soon: true,
    },
    Chapter {
        id: "chapter-9",
        title: "Grand Orator",
        description: "The ultimate challenge! Master all sounds and fluency.",
        level: 9,
        emoji: "🏆",
        unlock_xp: 2000,
        mission_ids: &[],
        coming_soon: true,
    },
];

static DISTINCT_SOUNDS: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| MISSIONS.iter().map(|m| m.sound).collect());

pub fn missions() -> &'static [Mission] {
    MISSIONS
}

pub fn chapters() -> &'static [Chapter] {
    CHAPTERS
}

pub fn mission(id: u32) -> Option<&'static Mission> {
    MISSIONS.iter().find(|m| m.id == id)
}

pub fn chapter(id: &str) -> Option<&'static Chapter> {
    CHAPTERS.iter().find(|c| c.id == id)
}

pub fn chapter_of(mission_id: u32) -> Option<&'static Chapter> {
    CHAPTERS
        .iter()
        .find(|c| c.mission_ids.contains(&mission_id))
}

pub fn distinct_sound_count() -> usize {
    DISTINCT_SOUNDS.len()
}

pub fn is_chapter_unlocked(chapter: &Chapter, total_xp: u64) -> bool {
    !chapter.coming_soon && total_xp >= chapter.unlock_xp
}

pub fn is_mission_unlocked(mission_id: u32, total_xp: u64) -> bool {
    chapter_of(mission_id)
        .map(|c| is_chapter_unlocked(c, total_xp))
        .unwrap_or(false)
}

/// The furthest unlocked playable chapter, falling back to the first.
pub fn current_chapter(total_xp: u64) -> &'static Chapter {
    CHAPTERS
        .iter()
        .filter(|c| is_chapter_unlocked(c, total_xp))
        .last()
        .unwrap_or(&CHAPTERS[0])
}

pub fn next_chapter(total_xp: u64) -> Option<&'static Chapter> {
    let current = current_chapter(total_xp);
    let idx = CHAPTERS.iter().position(|c| c.id == current.id)?;
    CHAPTERS.get(idx + 1)
}

/// Startup sanity checks over the static tables. Content mistakes
/// should stop the process before it serves anything.
pub fn validate_catalog() -> Result<(), String> {
    let mut mission_ids = BTreeSet::new();
    for mission in MISSIONS {
        if mission.word.trim().is_empty() {
            return Err(format!("mission {} has an empty word", mission.id));
        }
        if mission.sound.trim().is_empty() {
            return Err(format!("mission {} has an empty sound", mission.id));
        }
        if !mission_ids.insert(mission.id) {
            return Err(format!("duplicate mission id {}", mission.id));
        }
    }

    let mut chapter_ids = BTreeSet::new();
    let mut claimed = BTreeSet::new();
    let mut prev_unlock: Option<u64> = None;
    for chapter in CHAPTERS {
        if !chapter_ids.insert(chapter.id) {
            return Err(format!("duplicate chapter id {}", chapter.id));
        }
        if let Some(prev) = prev_unlock {
            if chapter.unlock_xp <= prev {
                return Err(format!(
                    "chapter {} unlockXp {} is not increasing",
                    chapter.id, chapter.unlock_xp
                ));
            }
        }
        prev_unlock = Some(chapter.unlock_xp);
        if chapter.coming_soon && !chapter.mission_ids.is_empty() {
            return Err(format!("coming-soon chapter {} lists missions", chapter.id));
        }
        for id in chapter.mission_ids {
            if !mission_ids.contains(id) {
                return Err(format!(
                    "chapter {} references unknown mission {id}",
                    chapter.id
                ));
            }
            if !claimed.insert(*id) {
                return Err(format!("mission {id} appears in two chapters"));
            }
        }
    }

    for mission in MISSIONS {
        if !claimed.contains(&mission.id) {
            return Err(format!("mission {} belongs to no chapter", mission.id));
        }
    }

    Ok(())
}
