//! Page slicing and group-scoped serialization of record collections.

use bilemo_core::{PageNumber, PageSize, VisibilityGroup};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::Record;

/// Errors produced while building a page.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The requested page holds no items.
    #[error("no items are available on page {0}")]
    EmptyPage(PageNumber),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The serialized items of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SerializedPage(Vec<Value>);

impl SerializedPage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.0
    }
}

/// Slices collections into pages of the configured size.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_size: PageSize,
}

impl Paginator {
    #[must_use]
    pub const fn new(page_size: PageSize) -> Self {
        Self { page_size }
    }

    /// The default page size for paged listings.
    #[must_use]
    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Interpret a raw `page` query value. Absent, malformed or < 1 → 1.
    #[must_use]
    pub fn normalize_page(raw: Option<&str>) -> PageNumber {
        PageNumber::normalize(raw)
    }

    /// Slice `items` to `page` and serialize the slice.
    ///
    /// Without a `page_size` the whole sequence is returned. `group`, when
    /// given, limits each item to that group's fields.
    ///
    /// # Errors
    ///
    /// - [`PaginationError::EmptyPage`] if the slice is empty.
    /// - [`PaginationError::Serialization`] if an item fails to serialize.
    pub fn paginate<R: Record>(
        items: &[R],
        page: PageNumber,
        page_size: Option<PageSize>,
        group: Option<VisibilityGroup>,
    ) -> Result<SerializedPage, PaginationError> {
        let slice = match page_size {
            Some(size) => items.get(size.window(page, items.len())).unwrap_or(&[]),
            None => items,
        };

        if slice.is_empty() {
            return Err(PaginationError::EmptyPage(page));
        }

        slice
            .iter()
            .map(|item| item.to_json(group))
            .collect::<Result<Vec<_>, _>>()
            .map(SerializedPage)
            .map_err(PaginationError::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bilemo_core::{CustomerName, PhoneId, UserId};

    use super::*;
    use crate::models::{Phone, PhoneDetails, User, UserProfile};

    fn phones(n: i32) -> Vec<Phone> {
        (1..=n)
            .map(|i| Phone {
                id: PhoneId::new(i),
                details: PhoneDetails {
                    name: format!("Phone {i}"),
                    color: "Black".to_owned(),
                    price: 100 + i,
                    description: "A phone".to_owned(),
                },
            })
            .collect()
    }

    fn page(n: u32) -> PageNumber {
        PageNumber::new(n).unwrap()
    }

    fn size(n: u32) -> Option<PageSize> {
        Some(PageSize::new(n).unwrap())
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(Paginator::normalize_page(None).get(), 1);
        assert_eq!(Paginator::normalize_page(Some("0")).get(), 1);
        assert_eq!(Paginator::normalize_page(Some("-3")).get(), 1);
        assert_eq!(Paginator::normalize_page(Some("abc")).get(), 1);
        assert_eq!(Paginator::normalize_page(Some("7")).get(), 7);
    }

    #[test]
    fn test_twenty_five_phones_by_ten() {
        let items = phones(25);

        let first = Paginator::paginate(&items, page(1), size(10), None).unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.items()[0]["id"], 1);

        let third = Paginator::paginate(&items, page(3), size(10), None).unwrap();
        assert_eq!(third.len(), 5);
        assert_eq!(third.items()[0]["id"], 21);

        let fourth = Paginator::paginate(&items, page(4), size(10), None);
        assert!(matches!(fourth, Err(PaginationError::EmptyPage(p)) if p.get() == 4));
    }

    #[test]
    fn test_page_length_formula() {
        for n in [0usize, 1, 9, 10, 11, 25] {
            let items = phones(i32::try_from(n).unwrap());
            for p in 1u32..=5 {
                for s in [1u32, 3, 10] {
                    let offset = (p as usize - 1) * s as usize;
                    let expected = n.saturating_sub(offset).min(s as usize);
                    match Paginator::paginate(&items, page(p), size(s), None) {
                        Ok(result) => assert_eq!(result.len(), expected),
                        Err(PaginationError::EmptyPage(_)) => assert_eq!(expected, 0),
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_unpaged_returns_everything() {
        let items = phones(25);
        let all = Paginator::paginate(&items, page(3), None, None).unwrap();
        assert_eq!(all.len(), 25);
    }

    #[test]
    fn test_unpaged_empty_collection_is_not_found() {
        let items: Vec<Phone> = Vec::new();
        assert!(Paginator::paginate(&items, PageNumber::FIRST, None, None).is_err());
    }

    #[test]
    fn test_group_limits_fields() {
        let users = vec![User {
            id: UserId::new(3),
            profile: UserProfile {
                username: "jdupont".to_owned(),
                name: "Jean".to_owned(),
                surname: "Dupont".to_owned(),
                email: "jean@orange.fr".to_owned(),
            },
            customer: CustomerName::from("alice"),
        }];

        let grouped =
            Paginator::paginate(&users, PageNumber::FIRST, size(10), Some(VisibilityGroup::ListUsers))
                .unwrap();
        assert!(grouped.items()[0].get("customer").is_none());

        let full = Paginator::paginate(&users, PageNumber::FIRST, size(10), None).unwrap();
        assert_eq!(full.items()[0]["customer"], "alice");
    }
}
