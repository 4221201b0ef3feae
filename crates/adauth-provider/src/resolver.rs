//! Option template rendering
//!
//! Templates use `{name}` placeholders filled from the attempt's [`Params`]. `{{` and
//! `}}` produce literal braces. Format specifications, conversions and positional
//! fields are rejected.

use crate::params::Params;
use adauth_core::types::ProviderOptions;
use adauth_core::{Error, Result};

/// Failure to render a single template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    UnknownPlaceholder(String),
    Malformed(&'static str),
}

impl TemplateError {
    /// Attach the option the template came from
    pub fn for_option(self, option: &str) -> Error {
        match self {
            TemplateError::UnknownPlaceholder(placeholder) => Error::UnknownPlaceholder {
                option: option.to_string(),
                placeholder,
            },
            TemplateError::Malformed(reason) => Error::MalformedTemplate {
                option: option.to_string(),
                reason: reason.to_string(),
            },
        }
    }
}

/// Render the template stored under `key`.
///
/// A missing key is a configuration error ([`Error::MissingOption`]).
pub fn resolve(options: &ProviderOptions, key: &str, params: &Params) -> Result<String> {
    let template = options.require(key)?;
    render(template, params).map_err(|e| e.for_option(key))
}

/// Render a template against the parameter set
pub fn render(template: &str, params: &Params) -> std::result::Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => {
                            return Err(TemplateError::Malformed("unexpected '{' in field name"))
                        }
                        Some(c) => field.push(c),
                        None => {
                            return Err(TemplateError::Malformed(
                                "expected '}' before end of string",
                            ))
                        }
                    }
                }
                out.push_str(lookup(&field, params)?);
            }
            '}' => {
                return Err(TemplateError::Malformed(
                    "single '}' encountered in format string",
                ))
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn lookup<'a>(field: &str, params: &'a Params) -> std::result::Result<&'a str, TemplateError> {
    if field.is_empty() || field.chars().all(|c| c.is_ascii_digit()) {
        return Err(TemplateError::Malformed(
            "positional fields are not supported",
        ));
    }
    if field.contains(|c: char| c == ':' || c == '!') {
        return Err(TemplateError::Malformed(
            "format specifications are not supported",
        ));
    }

    params
        .get(field)
        .ok_or_else(|| TemplateError::UnknownPlaceholder(field.to_string()))
}
