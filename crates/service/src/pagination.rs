//! Pagination requests and the uniform list envelope.
//!
//! Two modes share one request type:
//! - offset: `skip` rows, then `take`
//! - cursor: start right after the row whose id is `cursor` (`skip` is 1)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::CREATED_AT;

/// Upper bound for `take`.
pub const MAX_TAKE: u64 = 100;
pub const DEFAULT_TAKE: u64 = 20;
/// Upper bound for `skip`; PostgreSQL's OFFSET is a signed bigint.
pub const MAX_SKIP: u64 = i64::MAX as u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: &str) -> Self { Self { field: field.to_string(), direction: Direction::Asc } }
    pub fn desc(field: &str) -> Self { Self { field: field.to_string(), direction: Direction::Desc } }
}

impl Default for OrderBy {
    fn default() -> Self { Self::desc(CREATED_AT) }
}

/// Page request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
    /// items per page
    #[serde(default = "default_take")]
    pub take: u64,
    /// rows to skip; ignored in cursor mode
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub order_by: OrderBy,
    /// id of the last row already seen
    #[serde(default)]
    pub cursor: Option<Uuid>,
}

fn default_take() -> u64 { DEFAULT_TAKE }

impl Default for PaginationRequest {
    fn default() -> Self { Self { take: DEFAULT_TAKE, skip: 0, order_by: OrderBy::default(), cursor: None } }
}

impl PaginationRequest {
    pub fn offset(take: u64, skip: u64, order_by: OrderBy) -> Self {
        Self { take, skip, order_by, cursor: None }
    }

    pub fn after(cursor: Uuid, take: u64, order_by: OrderBy) -> Self {
        Self { take, skip: 1, order_by, cursor: Some(cursor) }
    }

    pub fn is_cursor(&self) -> bool { self.cursor.is_some() }

    /// Rows a store drops after the start of its window. The keyset bound
    /// already excludes the cursor row, which is what `skip = 1` stands for.
    pub fn store_offset(&self) -> u64 {
        if self.is_cursor() { self.skip.saturating_sub(1) } else { self.skip }
    }

    /// Clamp `take` into `1..=MAX_TAKE`, `skip` into `0..=MAX_SKIP`, and skip
    /// exactly the cursor row in cursor mode.
    pub fn normalize(&self) -> Self {
        let skip = if self.cursor.is_some() { 1 } else { self.skip.min(MAX_SKIP) };
        Self { take: self.take.clamp(1, MAX_TAKE), skip, order_by: self.order_by.clone(), cursor: self.cursor }
    }
}

/// List envelope returned by every `find_all`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaginationResponse<T> {
    pub items: Vec<T>,
    /// Rows matching the predicate, regardless of the page window.
    pub row_count: u64,
    pub take: u64,
    pub skip: u64,
    pub total_pages: u64,
    /// 1-based page index; `None` in cursor mode.
    pub current_page: Option<u64>,
    pub has_next_page: bool,
    /// Id to pass as `cursor` for the following page, set when the page is full.
    pub next_cursor: Option<Uuid>,
}

/// Anything with a stable identity usable as a cursor.
pub trait Identified {
    fn id(&self) -> Uuid;
}

/// Wrap one page of `items` with metadata derived from `request` and `row_count`.
///
/// `request` should already be normalized.
///
/// In cursor mode `row_count` says nothing about where the window sits, so
/// `has_next_page` is a heuristic: a full page is assumed to have a
/// successor. When exactly `take` rows remain it reports `true` and the
/// following request comes back empty.
pub fn paginate<T: Identified>(request: &PaginationRequest, row_count: u64, items: Vec<T>) -> PaginationResponse<T> {
    let take = request.take.max(1);
    let returned = items.len() as u64;
    let full_page = returned == take;
    let next_cursor = if full_page { items.last().map(Identified::id) } else { None };

    let (current_page, has_next_page) = if request.is_cursor() {
        (None, full_page)
    } else {
        (Some((request.skip / take).saturating_add(1)), request.skip.saturating_add(returned) < row_count)
    };

    PaginationResponse {
        items,
        row_count,
        take,
        skip: request.skip,
        total_pages: row_count.div_ceil(take),
        current_page,
        has_next_page,
        next_cursor,
    }
}

impl<T> PaginationResponse<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginationResponse<U> {
        PaginationResponse {
            items: self.items.into_iter().map(f).collect(),
            row_count: self.row_count,
            take: self.take,
            skip: self.skip,
            total_pages: self.total_pages,
            current_page: self.current_page,
            has_next_page: self.has_next_page,
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(Uuid);

    impl Identified for Item {
        fn id(&self) -> Uuid { self.0 }
    }

    fn items(n: usize) -> Vec<Item> { (0..n).map(|_| Item(Uuid::new_v4())).collect() }

    #[test]
    fn normalize_clamps_take() {
        let r = PaginationRequest::offset(0, 3, OrderBy::default()).normalize();
        assert_eq!(r.take, 1);
        assert_eq!(r.skip, 3);
        let r = PaginationRequest::offset(1000, 0, OrderBy::default()).normalize();
        assert_eq!(r.take, MAX_TAKE);
    }

    #[test]
    fn normalize_forces_skip_one_in_cursor_mode() {
        let mut r = PaginationRequest::after(Uuid::new_v4(), 10, OrderBy::asc("code"));
        r.skip = 40;
        assert_eq!(r.normalize().skip, 1);
    }

    #[test]
    fn default_values_are_sane() {
        let d = PaginationRequest::default();
        assert_eq!(d.take, DEFAULT_TAKE);
        assert_eq!(d.skip, 0);
        assert_eq!(d.order_by, OrderBy::desc(CREATED_AT));
        assert!(d.cursor.is_none());
    }

    #[test]
    fn offset_metadata() {
        let req = PaginationRequest::offset(2, 2, OrderBy::asc("code"));
        let page = items(2);
        let last = page[1].id();
        let res = paginate(&req, 5, page);
        assert_eq!(res.total_pages, 3);
        assert_eq!(res.current_page, Some(2));
        assert!(res.has_next_page);
        assert_eq!(res.next_cursor, Some(last));
    }

    #[test]
    fn last_partial_page_has_no_successor() {
        let req = PaginationRequest::offset(2, 4, OrderBy::asc("code"));
        let res = paginate(&req, 5, items(1));
        assert_eq!(res.current_page, Some(3));
        assert!(!res.has_next_page);
        assert!(res.next_cursor.is_none());
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let res = paginate(&PaginationRequest::default(), 0, Vec::<Item>::new());
        assert_eq!(res.total_pages, 0);
        assert_eq!(res.current_page, Some(1));
        assert!(!res.has_next_page);
    }

    #[test]
    fn cursor_mode_has_no_page_index() {
        let req = PaginationRequest::after(Uuid::new_v4(), 3, OrderBy::asc("code")).normalize();
        let res = paginate(&req, 10, items(3));
        assert_eq!(res.current_page, None);
        assert!(res.has_next_page);
        assert_eq!(res.skip, 1);
    }

    #[test]
    fn huge_skip_saturates() {
        let res = paginate(&PaginationRequest::offset(1, u64::MAX, OrderBy::asc("code")), 3, Vec::<Item>::new());
        assert_eq!(res.current_page, Some(u64::MAX));
        assert!(!res.has_next_page);

        let req = PaginationRequest::offset(1, u64::MAX, OrderBy::asc("code")).normalize();
        assert_eq!(req.skip, MAX_SKIP);
        let res = paginate(&req, 3, Vec::<Item>::new());
        assert_eq!(res.current_page, Some(MAX_SKIP + 1));
        assert!(!res.has_next_page);
    }

    #[test]
    fn cursor_row_is_not_counted_twice() {
        let req = PaginationRequest::after(Uuid::new_v4(), 3, OrderBy::asc("code")).normalize();
        assert_eq!(req.store_offset(), 0);
        assert_eq!(PaginationRequest::offset(3, 6, OrderBy::asc("code")).store_offset(), 6);
    }
}
