use crate::utils::error::{DeployError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> DeployError {
    DeployError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// Paths handed to the service manager and sudo must not depend on the caller's cwd.
pub fn validate_absolute_path(field_name: &str, path: &Path) -> Result<()> {
    let display = path.to_string_lossy();
    validate_path(field_name, &display)?;

    if !path.is_absolute() {
        return Err(invalid(field_name, &display, "Path must be absolute"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("notify.url", "https://discord.com/api/webhooks/1/abc").is_ok());
        assert!(validate_url("notify.url", "http://localhost:8080/hook").is_ok());
        assert!(validate_url("notify.url", "").is_err());
        assert!(validate_url("notify.url", "not a url").is_err());
        assert!(validate_url("notify.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_absolute_path() {
        assert!(validate_absolute_path("target.project_dir", Path::new("/opt/otternel")).is_ok());
        assert!(validate_absolute_path("target.project_dir", Path::new("opt/otternel")).is_err());
        assert!(validate_absolute_path("target.project_dir", Path::new("")).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("target.service", "otternel").is_ok());
        assert!(validate_non_empty_string("target.service", "   ").is_err());
    }
}
