use crate::utils::error::{PhotoMapError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn tile_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z]+)\}").expect("static regex"))
}

/// Validates an XYZ tile template such as `https://{s}.tile.example.org/{z}/{x}/{y}{r}.png`.
///
/// Placeholders are substituted with sample values before parsing, so only the
/// surrounding URL has to be well formed.
pub fn validate_tile_url(field_name: &str, template: &str) -> Result<()> {
    if template.trim().is_empty() {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    let sample = tile_placeholder().replace_all(template, |caps: &regex::Captures| {
        match &caps[1] {
            "s" => "a",
            "r" => "",
            _ => "0",
        }
        .to_string()
    });

    match Url::parse(&sample) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(PhotoMapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: template.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Extensions are matched against `Path::extension` with a leading dot, e.g. `.jpg`.
pub fn validate_extension_list(field_name: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "At least one extension is required".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for ext in extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(PhotoMapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: ext.clone(),
                reason: "Extensions must start with '.' and name a suffix, e.g. '.jpg'"
                    .to_string(),
            });
        }
        if !seen.insert(ext.to_lowercase()) {
            tracing::debug!("Duplicate extension '{}' in {}", ext, field_name);
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // Written so that NaN fails.
    if !(value >= min && value <= max) {
        return Err(PhotoMapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
