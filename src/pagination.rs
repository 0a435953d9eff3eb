//! Cursor-driven page iteration.

use crate::error::Result;

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` on the last page.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    Start,
    Cursor(String),
    Exhausted,
}

/// Iterator over the pages produced by `fetch`.
///
/// `fetch` receives `None` for the first page and the previous page's cursor
/// afterwards. Iteration stops after a page without a cursor or after the
/// first error, which is yielded once.
pub struct Pager<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    fetch: F,
    state: State,
}

impl<T, F> Pager<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            state: State::Start,
        }
    }

    /// Fetches every remaining page and concatenates their items in order.
    ///
    /// Any error discards the items gathered so far.
    pub fn collect_all(self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for page in self {
            out.extend(page?.items);
        }
        Ok(out)
    }
}

impl<T, F> Iterator for Pager<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    type Item = Result<Page<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match &self.state {
            State::Exhausted => return None,
            State::Start => (self.fetch)(None),
            State::Cursor(token) => (self.fetch)(Some(token)),
        };

        match result {
            Ok(page) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    first = matches!(self.state, State::Start),
                    items = page.items.len(),
                    has_more = page.next_cursor.is_some(),
                    "fetched listing page"
                );

                self.state = match &page.next_cursor {
                    Some(token) => State::Cursor(token.clone()),
                    None => State::Exhausted,
                };
                Some(Ok(page))
            }
            Err(err) => {
                self.state = State::Exhausted;
                Some(Err(err))
            }
        }
    }
}
