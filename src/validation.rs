/// 公共验证函数模块
/// 提供孩子昵称、伙伴、语音转写文本等输入验证，供练习和进度路由共用。
use crate::constants::MAX_TRANSCRIPT_CHARS;

/// 验证孩子昵称：2-50 字符，只允许字母、数字、下划线、连字符和空格。
/// 冒号是存储键的分隔符，必须拒绝。
pub fn validate_kid_name(kid_name: &str) -> Result<(), &'static str> {
    let char_count = kid_name.chars().count();
    if char_count < 2 || char_count > 50 {
        return Err("Kid name must be between 2 and 50 characters");
    }
    if !kid_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
    {
        return Err("Kid name can only contain letters, digits, underscores, hyphens and spaces");
    }
    Ok(())
}

/// 验证伙伴名称：1-30 字符，仅小写字母
pub fn validate_buddy(buddy: &str) -> Result<(), &'static str> {
    if buddy.is_empty() || buddy.chars().count() > 30 {
        return Err("Buddy name must be between 1 and 30 characters");
    }
    if !buddy.chars().all(|c| c.is_ascii_lowercase()) {
        return Err("Buddy name can only contain lowercase letters");
    }
    Ok(())
}

/// 验证语音转写文本：最长 500 字符。空文本合法，按 Miss 计分。
pub fn validate_transcript(transcript: &str) -> Result<(), &'static str> {
    if transcript.chars().count() > MAX_TRANSCRIPT_CHARS {
        return Err("Transcript is too long");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_kid_name_accepted() {
        assert!(validate_kid_name("mia").is_ok());
        assert!(validate_kid_name("Little Explorer").is_ok());
        assert!(validate_kid_name("kid_7").is_ok());
    }

    #[test]
    fn short_kid_name_rejected() {
        assert!(validate_kid_name("a").is_err());
    }

    #[test]
    fn unicode_kid_name_character_count_is_used() {
        assert!(validate_kid_name("小明").is_ok());
        let long = "你".repeat(51);
        assert!(validate_kid_name(&long).is_err());
    }

    #[test]
    fn colon_in_kid_name_rejected() {
        assert!(validate_kid_name("mia:x").is_err());
    }

    #[test]
    fn special_chars_in_kid_name_rejected() {
        assert!(validate_kid_name("mia@home").is_err());
    }

    #[test]
    fn valid_buddy_accepted() {
        assert!(validate_buddy("wolf").is_ok());
        assert!(validate_buddy("dragon").is_ok());
    }

    #[test]
    fn empty_buddy_rejected() {
        assert!(validate_buddy("").is_err());
    }

    #[test]
    fn uppercase_buddy_rejected() {
        assert!(validate_buddy("Wolf").is_err());
    }

    #[test]
    fn empty_transcript_is_valid() {
        assert!(validate_transcript("").is_ok());
    }

    #[test]
    fn overlong_transcript_rejected() {
        let transcript = "a".repeat(MAX_TRANSCRIPT_CHARS + 1);
        assert!(validate_transcript(&transcript).is_err());
    }

    #[test]
    fn transcript_at_limit_accepted() {
        let transcript = "a".repeat(MAX_TRANSCRIPT_CHARS);
        assert!(validate_transcript(&transcript).is_ok());
    }
}
