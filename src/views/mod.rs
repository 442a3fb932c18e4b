//! HTML views.
//!
//! Every page is an askama template struct. Templates are rendered into a complete
//! `String` before a response is built, so a failing template never produces a
//! half-written body.

use askama::Template;
use axum::response::Html;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::errors::AppError;
use crate::models::Joke;
use crate::pagination::PageView;

/// Render `template` into an HTML body.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// Navigation links for one page of results.
///
/// Unlike [`PageView`], the offsets here are clamped: there is no previous link on
/// the first page and no next link past the last item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub current: usize,
    pub max: usize,
    pub total: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pager {
    /// Build links to `base` carrying `extra` query pairs ahead of `skip` and `seed`.
    pub fn new(page: &PageView, base: &str, extra: &[(&str, &str)]) -> Self {
        let href = |skip: usize| {
            let mut query = String::new();
            for (key, value) in extra {
                query.push_str(key);
                query.push('=');
                query.extend(utf8_percent_encode(value, NON_ALPHANUMERIC));
                query.push('&');
            }
            format!("{}?{}skip={}&seed={}", base, query, skip, page.limit)
        };

        let prev_href = (page.skip > 0 && !page.is_empty())
            .then(|| href(usize::try_from(page.prev.max(0)).unwrap_or(0)));
        let next_href = (!page.is_empty() && page.next < page.total).then(|| href(page.next));

        Self {
            current: page.current_page,
            max: page.max_page,
            total: page.total,
            prev_href,
            next_href,
        }
    }
}

/// List page shared by `/jokes`, `/jokes/random` and `/jokes/funniest`.
#[derive(Template)]
#[template(path = "jokes.html")]
pub struct JokesPage {
    pub heading: &'static str,
    pub page: PageView,
    pub pager: Pager,
}

impl JokesPage {
    pub fn new(heading: &'static str, base: &str, page: PageView) -> Self {
        let pager = Pager::new(&page, base, &[]);
        Self {
            heading,
            page,
            pager,
        }
    }
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchPage {
    pub text: String,
    /// False for the bare search form.
    pub searched: bool,
    pub page: PageView,
    pub pager: Pager,
}

impl SearchPage {
    pub fn form() -> Self {
        let page = PageView::empty(0, 0);
        let pager = Pager::new(&page, "/jokes/search", &[]);
        Self {
            text: String::new(),
            searched: false,
            page,
            pager,
        }
    }

    pub fn results(text: &str, page: PageView) -> Self {
        let pager = Pager::new(&page, "/jokes/search", &[("text", text)]);
        Self {
            text: text.to_string(),
            searched: true,
            page,
            pager,
        }
    }
}

#[derive(Template)]
#[template(path = "joke.html")]
pub struct JokePage {
    pub joke: Joke,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub code: u16,
    pub reason: &'static str,
    pub detail: Option<String>,
}
