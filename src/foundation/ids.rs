use std::{fmt, str::FromStr};

use crate::foundation::error::{InputField, RelayError, RelayResult};

/// Longest accepted work id. Every 19-digit number fits in `u64`.
const MAX_WORK_ID_DIGITS: usize = 19;

/// Numeric identifier of one pixiv work, kept as the exact digit string the caller sent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkId(String);

impl WorkId {
    /// Parse a work id. Surrounding whitespace is ignored; anything but ASCII digits is rejected.
    pub fn parse(raw: &str) -> RelayResult<Self> {
        let digits = raw.trim();
        if digits.is_empty() {
            return Err(RelayError::invalid_input(InputField::Work, "work id is empty"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RelayError::invalid_input(
                InputField::Work,
                format!("work id '{digits}' must be numeric"),
            ));
        }
        if digits.len() > MAX_WORK_ID_DIGITS {
            return Err(RelayError::invalid_input(
                InputField::Work,
                format!("work id '{digits}' is too long"),
            ));
        }
        Ok(Self(digits.to_owned()))
    }

    /// Borrow the digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Artwork page URL, sent as `Referer` on every upstream request for this work.
    pub fn referer(&self) -> String {
        format!("https://www.pixiv.net/artworks/{}", self.0)
    }
}

impl FromStr for WorkId {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zero-based index selecting one still image of a multi-page work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageIndex(pub usize);

impl PageIndex {
    /// Parse an optional query value. Missing or blank means page 0.
    ///
    /// Negative and non-integer values are client errors; the upper bound is only known once
    /// pages are resolved, see [`PageIndex::select`].
    pub fn parse(raw: Option<&str>) -> RelayResult<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self(0));
        };
        let value: i64 = raw.parse().map_err(|_| {
            RelayError::invalid_input(InputField::Page, format!("page '{raw}' is not an integer"))
        })?;
        if value < 0 {
            return Err(RelayError::invalid_input(
                InputField::Page,
                format!("page {value} must not be negative"),
            ));
        }
        usize::try_from(value).map(Self).map_err(|_| {
            RelayError::invalid_input(InputField::Page, format!("page {value} is too large"))
        })
    }

    /// Raw index.
    pub fn get(self) -> usize {
        self.0
    }

    /// Pick this page out of a resolved list.
    pub fn select<T>(self, pages: &[T]) -> RelayResult<&T> {
        pages.get(self.0).ok_or(RelayError::PageOutOfRange {
            page: self.0,
            len: pages.len(),
        })
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/ids.rs"]
mod tests;
