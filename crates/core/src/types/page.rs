//! Skip/limit pagination.
//!
//! Query strings are parsed leniently: a value that does not start with a
//! positive integer falls back to the default instead of failing the request,
//! and trailing garbage after the digits is ignored (`"2abc"` reads as 2).

use serde::Serialize;

/// Default and maximum page sizes for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequestDefaults {
    pub limit: u64,
    pub max_limit: u64,
}

impl PageRequestDefaults {
    /// Public pet listing.
    pub const PETS: Self = Self {
        limit: 6,
        max_limit: 50,
    };

    /// Admin listings.
    pub const ADMIN: Self = Self {
        limit: 20,
        max_limit: 50,
    };
}

/// Largest skip a store query can carry (a signed 64-bit integer).
const MAX_SKIP: u64 = i64::MAX.unsigned_abs();

/// A resolved page request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Build a page request from raw query values.
    #[must_use]
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        defaults: PageRequestDefaults,
    ) -> Self {
        let page = page.and_then(leading_positive_int).unwrap_or(1);
        let limit = limit
            .and_then(leading_positive_int)
            .unwrap_or(defaults.limit)
            .min(defaults.max_limit);
        Self { page, limit }
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of matching documents to skip, at most `i64::MAX` so the
    /// store can always encode it.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        let skip = (self.page - 1).saturating_mul(self.limit);
        if skip > MAX_SKIP { MAX_SKIP } else { skip }
    }

    /// The next page number, only when `returned` filled this page.
    #[must_use]
    pub fn next_page(&self, returned: usize) -> Option<u64> {
        (u64::try_from(returned).ok() == Some(self.limit)).then_some(self.page.saturating_add(1))
    }
}

/// Parse the leading decimal digits of `raw`; `None` when there are none or
/// the value is zero.
fn leading_positive_int(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(raw.len(), |(i, _)| i);
    raw.get(..end)?
        .parse::<u64>()
        .ok()
        .filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pets(page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageRequest::from_query(page, limit, PageRequestDefaults::PETS)
    }

    #[test]
    fn test_defaults() {
        let req = pets(None, None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 6);
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn test_second_page_skips_one_full_page() {
        let req = pets(Some("2"), Some("6"));
        assert_eq!(req.skip(), 6);
        assert_eq!(req.limit(), 6);
    }

    #[test]
    fn test_lenient_parsing() {
        assert_eq!(pets(Some("abc"), None).page(), 1);
        assert_eq!(pets(Some("0"), None).page(), 1);
        assert_eq!(pets(Some("-3"), None).page(), 1);
        assert_eq!(pets(Some("3xyz"), None).page(), 3);
        assert_eq!(pets(None, Some("")).limit(), 6);
        assert_eq!(pets(None, Some("0")).limit(), 6);
    }

    #[test]
    fn test_limit_is_capped() {
        assert_eq!(pets(None, Some("1000")).limit(), 50);
        let admin = PageRequest::from_query(None, Some("1000"), PageRequestDefaults::ADMIN);
        assert_eq!(admin.limit(), 50);
    }

    #[test]
    fn test_next_page_only_on_full_page() {
        let req = pets(Some("2"), Some("6"));
        assert_eq!(req.next_page(6), Some(3));
        assert_eq!(req.next_page(5), None);
        assert_eq!(req.next_page(0), None);
    }

    #[test]
    fn test_huge_page_skip_fits_signed_64_bits() {
        let req = pets(Some("18446744073709551615"), Some("50"));
        assert_eq!(req.skip(), i64::MAX.unsigned_abs());

        let req = pets(Some("999999999999999999"), Some("50"));
        assert!(i64::try_from(req.skip()).is_ok());

        let req = pets(Some("1000"), Some("50"));
        assert_eq!(req.skip(), 49_950);
    }
}
