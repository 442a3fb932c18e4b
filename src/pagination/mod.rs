//! Windowing of result sets into pages.
//!
//! Stores either push `skip`/`limit` down to the backing engine and return only the
//! window (plus the true total), or return the whole filtered collection. The store
//! says which one it did: [`PageView::new`] slices a whole collection at `skip`,
//! [`PageView::windowed`] takes content that already starts at `skip`. Both bound
//! the content to what is left of `total`.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Joke;

/// Page size used when the request does not name one.
pub const DEFAULT_LIMIT: usize = 20;

/// Raw pagination query parameters. `seed` is the wire name of the page size.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub seed: Option<String>,
}

impl PageQuery {
    /// Validate and default the parameters.
    pub fn parse(&self) -> Result<PageParams, AppError> {
        let skip = parse_param("skip", self.skip.as_deref(), 0)?;
        let limit = parse_param("limit", self.seed.as_deref(), DEFAULT_LIMIT)?;
        Ok(PageParams { skip, limit })
    }
}

fn parse_param(name: &str, raw: Option<&str>, default: usize) -> Result<usize, AppError> {
    // Blank counts as absent; anything else must be a bare integer.
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            tracing::debug!("{} is not specified, using default value {}", name, default);
            return Ok(default);
        }
    };

    let value: i64 = raw
        .parse()
        .map_err(|_| AppError::InvalidParameter(format!("{} is not a valid integer", name)))?;
    if value < 0 {
        return Err(AppError::InvalidParameter(format!("{} must not be negative", name)));
    }
    usize::try_from(value)
        .map_err(|_| AppError::InvalidParameter(format!("{} is too large", name)))
}

/// Validated offset and page size of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub skip: usize,
    pub limit: usize,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One windowed slice of a result set.
///
/// `next` and `prev` are raw offsets: `next` may point past the end and `prev` may
/// be negative. Presentation code clamps them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub skip: usize,
    pub limit: usize,
    pub total: usize,
    pub content: Vec<Joke>,
    pub current_page: usize,
    pub max_page: usize,
    pub next: usize,
    pub prev: i64,
}

impl PageView {
    /// The canonical empty page.
    pub fn empty(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit,
            total: 0,
            content: Vec::new(),
            current_page: 0,
            max_page: 0,
            next: 0,
            prev: 0,
        }
    }

    /// Build the page for `params` out of a whole (filtered or sorted) collection.
    pub fn new(params: PageParams, total: usize, content: Vec<Joke>) -> Self {
        Self::build(params, total, content, params.skip)
    }

    /// Build the page for `params` out of content the store already windowed, so
    /// its first item is the one at `skip`.
    pub fn windowed(params: PageParams, total: usize, content: Vec<Joke>) -> Self {
        Self::build(params, total, content, 0)
    }

    fn build(params: PageParams, total: usize, content: Vec<Joke>, offset: usize) -> Self {
        let PageParams { skip, limit } = params;
        if limit == 0 || skip >= total {
            return Self::empty(skip, limit);
        }

        let remaining = limit.min(total - skip);
        let content: Vec<Joke> = content.into_iter().skip(offset).take(remaining).collect();

        let max_page = if total % limit != 0 {
            total / limit + 1
        } else {
            total / limit
        };

        Self {
            skip,
            limit,
            total,
            content,
            current_page: skip / limit + 1,
            max_page,
            next: skip.saturating_add(limit),
            prev: offset_diff(skip, limit),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn offset_diff(skip: usize, limit: usize) -> i64 {
    let skip = i64::try_from(skip).unwrap_or(i64::MAX);
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    skip.saturating_sub(limit)
}
