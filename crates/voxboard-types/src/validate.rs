use thiserror::Error;

pub const MAX_BOARD_NAME: usize = 255;
pub const MAX_TITLE: usize = 255;
pub const MAX_COMMENT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("board name cannot be empty")]
    EmptyBoardName,
    #[error("board name cannot exceed 255 characters")]
    BoardNameTooLong,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("title cannot exceed 255 characters")]
    TitleTooLong,
    #[error("description cannot be empty")]
    EmptyDescription,
    #[error("invalid category id {0}")]
    InvalidCategory(i64),
    #[error("comment cannot be empty")]
    EmptyComment,
    #[error("comment cannot exceed 1000 characters")]
    CommentTooLong,
    #[error("email cannot be empty")]
    EmptyEmail,
}

/// Returns the trimmed name on success.
pub fn board_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyBoardName);
    }
    if name.chars().count() > MAX_BOARD_NAME {
        return Err(ValidationError::BoardNameTooLong);
    }
    Ok(name)
}

/// Returns the trimmed (title, description) pair.
pub fn feedback<'a>(
    title: &'a str,
    description: &'a str,
    category_id: i64,
) -> Result<(&'a str, &'a str), ValidationError> {
    let title = title.trim();
    let description = description.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TITLE {
        return Err(ValidationError::TitleTooLong);
    }
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if category_id <= 0 {
        return Err(ValidationError::InvalidCategory(category_id));
    }
    Ok((title, description))
}

/// Comments and replies share the same limits.
pub fn comment(content: &str) -> Result<&str, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    if content.chars().count() > MAX_COMMENT {
        return Err(ValidationError::CommentTooLong);
    }
    Ok(content)
}

pub fn email(email: &str) -> Result<&str, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    Ok(email)
}
