//! Split a completion into the rewritten SQL and the surrounding commentary.
//!
//! Heuristic, not a grammar: only the first fence tagged `sql` is treated as code. Later fences
//! lose their markers but stay in the comment.

const FENCE: &str = "```";
const SQL_TAG: &str = "sql";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationResult {
    pub optimized_sql: String,
    pub comment: String,
}

pub fn parse_completion(completion: &str) -> OptimizationResult {
    let Some((open_start, body_start)) = find_sql_fence(completion) else {
        return OptimizationResult {
            optimized_sql: completion.to_string(),
            comment: String::new(),
        };
    };

    let rest = &completion[body_start..];
    let (code, after) = match rest.find(FENCE) {
        Some(close) => (&rest[..close], &rest[close + FENCE.len()..]),
        None => (rest, ""),
    };

    let mut comment = String::with_capacity(open_start + after.len());
    comment.push_str(&completion[..open_start]);
    comment.push_str(after);

    OptimizationResult {
        optimized_sql: code.trim().to_string(),
        comment: strip_fence_markers(&comment).trim().to_string(),
    }
}

/// Byte offsets of the first ```` ```sql ```` opener and of the first byte after its tag.
///
/// The tag is matched case-insensitively and must be followed by whitespace or end of text, so
/// ```` ```sqlite ```` is not an opener.
fn find_sql_fence(text: &str) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(pos) = text[from..].find(FENCE) {
        let open = from + pos;
        let tag_start = open + FENCE.len();
        let tag_end = tag_start + SQL_TAG.len();
        let is_opener = text
            .get(tag_start..tag_end)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(SQL_TAG))
            && text[tag_end..].chars().next().is_none_or(char::is_whitespace);
        if is_opener {
            return Some((open, tag_end));
        }
        from = tag_start;
    }
    None
}

fn strip_fence_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if rest
            .get(..SQL_TAG.len())
            .is_some_and(|tag| tag.eq_ignore_ascii_case(SQL_TAG))
            && rest[SQL_TAG.len()..]
                .chars()
                .next()
                .is_none_or(char::is_whitespace)
        {
            rest = &rest[SQL_TAG.len()..];
        }
    }
    out.push_str(rest);
    out
}
