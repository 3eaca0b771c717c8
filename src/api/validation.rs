use super::ApiError;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }

    if trimmed.len() > 64 {
        return Err(ApiError::validation(
            "Username must be 64 characters or less",
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, digits, hyphens, underscores, and dots",
        ));
    }

    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    if trimmed.len() > 254 || !trimmed.contains('@') {
        return Err(ApiError::validation("Email address is not valid"));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }

    if password.len() > 128 {
        return Err(ApiError::validation(
            "Password must be 128 characters or less",
        ));
    }

    Ok(password)
}

pub fn validate_project_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Project name cannot be empty"));
    }

    if trimmed.len() > 100 {
        return Err(ApiError::validation(
            "Project name must be 100 characters or less",
        ));
    }

    Ok(trimmed)
}

pub fn validate_secret_key(key: &str) -> Result<&str, ApiError> {
    if key.is_empty() {
        return Err(ApiError::validation("Secret key cannot be empty"));
    }

    if key.len() > 128 {
        return Err(ApiError::validation(
            "Secret key must be 128 characters or less",
        ));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ApiError::validation(
            "Secret key can only contain letters, digits, underscores, hyphens, and dots",
        ));
    }

    Ok(key)
}

pub fn validate_token_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Token name cannot be empty"));
    }

    if trimmed.len() > 100 {
        return Err(ApiError::validation(
            "Token name must be 100 characters or less",
        ));
    }

    Ok(trimmed)
}
