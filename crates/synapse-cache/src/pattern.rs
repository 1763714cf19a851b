use regex::Regex;

/// Key glob supporting `*` (any run, including empty) and `?` (exactly one
/// character). Every other character matches itself.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    /// Translates the glob into an anchored regex.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let mut translated = String::with_capacity(pattern.len() + 8);
        translated.push_str("(?s)^");
        let mut literal = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '*' => translated.push_str(".*"),
                '?' => translated.push('.'),
                other => translated.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        translated.push('$');
        Ok(Self {
            regex: Regex::new(&translated)?,
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob_match(pattern: &str, key: &str) -> bool {
        GlobPattern::new(pattern).unwrap().matches(key)
    }

    #[test]
    fn star_matches_everything() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "scenario:abc"));
    }

    #[test]
    fn prefix_pattern() {
        assert!(glob_match("scenario:*", "scenario:9f2c1e0a"));
        assert!(glob_match("scenario:*", "scenario:"));
        assert!(!glob_match("scenario:*", "tags:scenario:9f2c1e0a"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(glob_match("key?", "key1"));
        assert!(!glob_match("key?", "key"));
        assert!(!glob_match("key?", "key12"));
    }

    #[test]
    fn star_in_the_middle() {
        assert!(glob_match("a*b*c", "aXbYbZc"));
        assert!(!glob_match("a*b*c", "aXbYbZ"));
        assert!(glob_match("*:traffic:*", "signal:traffic:ab12"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(glob_match("prediction:1", "prediction:1"));
        assert!(!glob_match("prediction:1", "prediction:10"));
        assert!(glob_match("a.b+(c)", "a.b+(c)"));
        assert!(!glob_match("a.b", "aXb"));
        assert!(glob_match("[x]*", "[x]:1"));
    }
}
