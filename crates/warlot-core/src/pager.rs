//! Offset/limit page iterator.

use crate::error::Error;
use std::marker::PhantomData;

/// Walks a collection page by page through a caller-supplied fetch.
///
/// `fetch(offset, limit)` is called with strictly increasing offsets, one
/// page at a time. An empty page ends the walk. Retries belong to the fetch
/// itself; a failed fetch leaves the cursor where it was, so calling
/// [`Pager::next_page`] again asks for the same page.
pub struct Pager<R, F> {
    fetch: F,
    limit: u32,
    offset: u64,
    done: bool,
    _row: PhantomData<fn() -> R>,
}

impl<R, F> std::fmt::Debug for Pager<R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<R, F> Pager<R, F>
where
    F: FnMut(u64, u32) -> Result<Vec<R>, Error>,
{
    pub fn new(limit: u32, fetch: F) -> Self {
        Self::starting_at(0, limit, fetch)
    }

    pub fn starting_at(offset: u64, limit: u32, fetch: F) -> Self {
        Self {
            fetch,
            limit,
            offset,
            done: false,
            _row: PhantomData,
        }
    }

    /// Next non-empty page, or `None` once the collection is exhausted.
    pub fn next_page(&mut self) -> Result<Option<Vec<R>>, Error> {
        if self.done {
            return Ok(None);
        }
        let rows = (self.fetch)(self.offset, self.limit)?;
        if rows.is_empty() {
            self.done = true;
            return Ok(None);
        }
        self.offset += rows.len() as u64;
        Ok(Some(rows))
    }

    /// Offset the next fetch will use.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl<R, F> Iterator for Pager<R, F>
where
    F: FnMut(u64, u32) -> Result<Vec<R>, Error>,
{
    type Item = Result<Vec<R>, Error>;

    /// Yields each page; after an error the iterator stops.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_page() {
            Ok(Some(rows)) => Some(Ok(rows)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
