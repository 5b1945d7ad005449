use crate::error::{CoreError, CoreResult};

pub(crate) const MAX_MESSAGE_CHARS: usize = 2000;
pub(crate) const MAX_POST_CHARS: usize = 1000;
pub(crate) const MAX_COMMENT_CHARS: usize = 500;

/// Trim surrounding whitespace and enforce `1..=max` characters.
pub(crate) fn clean(field: &str, raw: &str, max: usize) -> CoreResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CoreError::Validation(format!("{} must not be empty", field)));
    }
    let len = text.chars().count();
    if len > max {
        return Err(CoreError::Validation(format!(
            "{} is {} characters long, the limit is {}",
            field, len, max
        )));
    }
    Ok(text.to_string())
}
