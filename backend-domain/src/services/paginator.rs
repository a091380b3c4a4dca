// Keyset pagination over rows ordered newest first
//
// Rows are ordered by (sort value desc, tiebreaker desc). A cursor names
// the boundary row as "<sort value>:<tiebreaker>". Each fetch asks for one
// row more than the page size to learn whether more rows exist.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::entities::CursorPage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("after and before cannot be combined")]
    ConflictingCursors,
    #[error("page size must be positive")]
    EmptyPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub sort_value: i64,
    pub tiebreaker: String,
}

impl Cursor {
    pub fn new(sort_value: i64, tiebreaker: impl Into<String>) -> Self {
        Self {
            sort_value,
            tiebreaker: tiebreaker.into(),
        }
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_value
            .cmp(&other.sort_value)
            .then_with(|| self.tiebreaker.cmp(&other.tiebreaker))
    }
}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sort_value, self.tiebreaker)
    }
}

impl FromStr for Cursor {
    type Err = PageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || PageError::InvalidCursor(raw.to_string());
        let (sort_value, tiebreaker) = raw.trim().split_once(':').ok_or_else(invalid)?;
        let sort_value = sort_value.parse::<i64>().map_err(|_| invalid())?;
        if tiebreaker.is_empty() {
            return Err(invalid());
        }
        Ok(Cursor::new(sort_value, tiebreaker))
    }
}

/// Anything that can report its own position in the ordering.
pub trait Paginated {
    fn cursor(&self) -> Cursor;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    /// Rows strictly older than the boundary, newest first.
    Older,
    /// Rows strictly newer than the boundary, oldest first.
    Newer,
}

/// What the store must return for one page: at most `limit` rows past
/// `boundary` in `direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekPlan {
    pub direction: SeekDirection,
    pub boundary: Option<Cursor>,
    pub limit: usize,
}

impl SeekPlan {
    /// Whether `cursor` lies past the boundary in the plan's direction.
    pub fn admits(&self, cursor: &Cursor) -> bool {
        match (&self.boundary, self.direction) {
            (None, _) => true,
            (Some(boundary), SeekDirection::Older) => cursor < boundary,
            (Some(boundary), SeekDirection::Newer) => cursor > boundary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: usize,
    pub after: Option<Cursor>,
    pub before: Option<Cursor>,
}

impl PageRequest {
    pub fn new(
        page_size: usize,
        after: Option<Cursor>,
        before: Option<Cursor>,
    ) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::EmptyPage);
        }
        if after.is_some() && before.is_some() {
            return Err(PageError::ConflictingCursors);
        }
        Ok(Self {
            page_size,
            after,
            before,
        })
    }

    pub fn seek_plan(&self) -> SeekPlan {
        match &self.before {
            Some(before) => SeekPlan {
                direction: SeekDirection::Newer,
                boundary: Some(before.clone()),
                limit: self.page_size + 1,
            },
            None => SeekPlan {
                direction: SeekDirection::Older,
                boundary: self.after.clone(),
                limit: self.page_size + 1,
            },
        }
    }

    fn has_cursor(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }
}

/// Reference seek over an in-memory row set, in the order a store returns
/// rows for `plan`.
pub fn seek<T: Paginated + Clone>(rows: &[T], plan: &SeekPlan) -> Vec<T> {
    let mut matched: Vec<T> = rows
        .iter()
        .filter(|row| plan.admits(&row.cursor()))
        .cloned()
        .collect();
    match plan.direction {
        SeekDirection::Older => matched.sort_by_key(|row| std::cmp::Reverse(row.cursor())),
        SeekDirection::Newer => matched.sort_by_key(|row| row.cursor()),
    }
    matched.truncate(plan.limit);
    matched
}

/// Turns the rows fetched for `request` into a page, newest first.
///
/// A next cursor is set when older rows remain. A previous cursor is set
/// only when the request carried a cursor, so the first page never has one.
pub fn assemble_page<T: Paginated>(request: &PageRequest, mut rows: Vec<T>) -> CursorPage<T> {
    let has_more = rows.len() > request.page_size;
    rows.truncate(request.page_size);

    let (next_cursor, previous_cursor) = match request.seek_plan().direction {
        SeekDirection::Older => {
            let next = if has_more {
                rows.last().map(|row| row.cursor().to_string())
            } else {
                None
            };
            let previous = if request.has_cursor() {
                rows.first().map(|row| row.cursor().to_string())
            } else {
                None
            };
            (next, previous)
        }
        SeekDirection::Newer => {
            rows.reverse();
            let next = rows.last().map(|row| row.cursor().to_string());
            let previous = if has_more {
                rows.first().map(|row| row.cursor().to_string())
            } else {
                None
            };
            (next, previous)
        }
    };

    CursorPage {
        items: rows,
        next_cursor,
        previous_cursor,
    }
}
