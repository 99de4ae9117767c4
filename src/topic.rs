//! `/`-separated topic patterns.
//!
//! * `+` matches exactly one segment.
//! * `*` matches one or more segments up to the next literal segment of the
//!   pattern, or everything that is left when it comes last.

const SEPARATOR: char = '/';
const SINGLE: &str = "+";
const MULTI: &str = "*";

/// Whether `topic` matches `pattern`.
///
/// # Examples
///
/// ```
/// use sql_rules::topic::matches;
///
/// assert!(matches("sensors/kitchen/temp", "sensors/+/temp"));
/// assert!(matches("a/b/c/d/e/f", "a/+/c/*/f"));
/// assert!(!matches("a/b/c/d/e/f", "a/+/c/*/g"));
/// ```
pub fn matches(topic: &str, pattern: &str) -> bool {
    let topic: Vec<&str> = topic.split(SEPARATOR).collect();
    let pattern: Vec<&str> = pattern.split(SEPARATOR).collect();
    let (mut i, mut j) = (0, 0);

    while i < topic.len() && j < pattern.len() {
        match pattern[j] {
            SINGLE => {
                i += 1;
                j += 1;
            }
            MULTI => {
                let Some(next) = pattern.get(j + 1) else {
                    return true;
                };
                if topic[i] == *next {
                    j += 2;
                }
                i += 1;
            }
            literal if literal == topic[i] => {
                i += 1;
                j += 1;
            }
            _ => return false,
        }
    }

    i == topic.len() && j == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        assert!(matches("aaa/bbb", "aaa/bbb"));
        assert!(!matches("aaa/bbb", "aaa/ccc"));
        assert!(!matches("aaa/bbb", "aaa"));
        assert!(!matches("aaa", "aaa/bbb"));
    }

    #[test]
    fn test_trailing_multi() {
        assert!(matches("aaa/bbb/ccc", "aaa/*"));
        assert!(matches("aaa/bbb", "*"));
    }

    #[test]
    fn test_single_needs_a_segment() {
        assert!(!matches("aaa", "aaa/+"));
        assert!(matches("aaa/", "aaa/+"));
    }
}
