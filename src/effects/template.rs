//! Expansion of the RFC 6570 link templates Horizon hands out, e.g.
//! `/ledgers/42/effects{?cursor,limit,order}`. Only the simple (`{var}`),
//! form-query (`{?var}`) and continuation (`{&var}`) forms occur there.

use crate::constants::{EFFECTS_TEMPLATE_CURSOR, EFFECTS_TEMPLATE_LIMIT, EFFECTS_TEMPLATE_ORDER};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unterminated expression in {0:?}")]
    Unterminated(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParams(HashMap<String, String>);

impl TemplateParams {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Cursor empty, ascending order, bounded page size
impl Default for TemplateParams {
    fn default() -> Self {
        Self::new()
            .with("cursor", EFFECTS_TEMPLATE_CURSOR)
            .with("order", EFFECTS_TEMPLATE_ORDER)
            .with("limit", EFFECTS_TEMPLATE_LIMIT)
    }
}

pub fn expand(template: &str, params: &TemplateParams) -> Result<Url, TemplateError> {
    let mut base = String::with_capacity(template.len());
    let mut query = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        base.push_str(&rest[..start]);
        let end = rest[start..]
            .find('}')
            .map(|end| start + end)
            .ok_or_else(|| TemplateError::Unterminated(template.to_string()))?;
        let expression = &rest[start + 1..end];

        match expression.chars().next() {
            Some('?') | Some('&') => {
                for name in expression[1..].split(',') {
                    if let Some(value) = params.get(name.trim()) {
                        query.push((name.trim(), value));
                    }
                }
            }
            _ => {
                for name in expression.split(',') {
                    if let Some(value) = params.get(name.trim()) {
                        base.push_str(value);
                    }
                }
            }
        }
        rest = &rest[end + 1..];
    }
    base.push_str(rest);

    let mut url = Url::parse(&base)?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query {
            pairs.append_pair(name, value);
        }
    }
    Ok(url)
}
