//! Page numbers, page sizes and the slice arithmetic between them.

use core::fmt;
use core::num::NonZeroU32;
use core::ops::Range;

use thiserror::Error;

/// A 1-based page number.
///
/// No upper bound is enforced; asking for a page past the end of the data is
/// a valid request that simply selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

impl PageNumber {
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Returns `None` for page 0.
    #[must_use]
    pub const fn new(page: u32) -> Option<Self> {
        match NonZeroU32::new(page) {
            Some(page) => Some(Self(page)),
            None => None,
        }
    }

    /// Normalize a raw `?page=` query value.
    ///
    /// Absent, malformed, zero and negative values all mean the first page.
    /// Values beyond `u32::MAX` saturate.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        let Some(parsed) = raw.and_then(|s| s.trim().parse::<i64>().ok()) else {
            return Self::FIRST;
        };
        if parsed < 1 {
            return Self::FIRST;
        }
        let clamped = u32::try_from(parsed).unwrap_or(u32::MAX);
        Self::new(clamped).unwrap_or(Self::FIRST)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page size of zero was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page size must be greater than zero")]
pub struct PageSizeError;

/// Number of items per page. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// # Errors
    ///
    /// Returns [`PageSizeError`] when `size` is zero.
    pub const fn new(size: u32) -> Result<Self, PageSizeError> {
        match NonZeroU32::new(size) {
            Some(size) => Ok(Self(size)),
            None => Err(PageSizeError),
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Index range of `page` within a collection of `total` items.
    ///
    /// The range is `[(page-1)*size, page*size)` clamped to `total`, so it is
    /// empty exactly when the page starts at or beyond the end.
    #[must_use]
    pub fn window(self, page: PageNumber, total: usize) -> Range<usize> {
        let size = self.get() as usize;
        let start = (page.get() as usize - 1).saturating_mul(size).min(total);
        let end = start.saturating_add(size).min(total);
        start..end
    }
}

impl TryFrom<u32> for PageSize {
    type Error = PageSizeError;

    fn try_from(size: u32) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
