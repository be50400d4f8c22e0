use super::types::{Evaluation, Outcome};

/// Accepted stand-ins for specific target words. Static lookup,
/// not a phonetic matcher; extend by adding rows.
const HOMOPHONES: &[(&str, &[&str])] = &[
    ("sun", &["son"]),
    ("hair", &["hare"]),
    ("bear", &["bare"]),
    ("night", &["knight"]),
];

/// Lowercase, strip sentence punctuation, trim. Interior whitespace is
/// left alone; tokenization deals with runs.
pub fn normalize(transcript: &str) -> String {
    transcript
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '!' | '?' | ';' | ':'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn contains_token_run(haystack: &[&str], needle: &[&str]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// The uniform success predicate, applied to the word and each
/// homophone variant alike: exact equality, whole-word containment of
/// the variant in the transcript, or the transcript being a fragment
/// of the variant (clipped recognizer output).
fn matches_variant(transcript: &str, transcript_tokens: &[&str], variant: &str) -> bool {
    if transcript == variant {
        return true;
    }
    let variant_tokens = tokens(variant);
    if contains_token_run(transcript_tokens, &variant_tokens) {
        return true;
    }
    variant.contains(transcript)
}

/// Target word plus its homophone allowances, all normalized.
pub fn variants_for(word: &str) -> Vec<String> {
    let normalized = normalize(word);
    let mut variants = vec![normalized.clone()];
    for (target, accepted) in HOMOPHONES {
        if *target == normalized {
            variants.extend(accepted.iter().map(|v| (*v).to_string()));
        }
    }
    variants
}

/// Classify one utterance against the mission target. Pure; an empty
/// or garbled transcript is evidence of non-success, never an error.
pub fn evaluate(transcript: &str, word: &str, sound: &str) -> Evaluation {
    let normalized = normalize(transcript);
    if normalized.is_empty() {
        return Evaluation {
            outcome: Outcome::Miss,
            matched_variant: None,
            heard_target_sound: false,
        };
    }

    let heard_target_sound = normalized.contains(&sound.to_lowercase());
    let transcript_tokens = tokens(&normalized);

    for variant in variants_for(word) {
        if matches_variant(&normalized, &transcript_tokens, &variant) {
            return Evaluation {
                outcome: Outcome::Success,
                matched_variant: Some(variant),
                heard_target_sound,
            };
        }
    }

    let outcome = if heard_target_sound {
        Outcome::NearMiss
    } else {
        Outcome::Miss
    };
    Evaluation {
        outcome,
        matched_variant: None,
        heard_target_sound,
    }
}
