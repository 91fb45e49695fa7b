//! Typed row ids.
//!
//! Every table uses an `i32` serial key. Wrapping each one in its own type
//! means a stock item id can never be passed where a shopping entry id is
//! expected, even though both come out of the same `{id}` path segment.

macro_rules! define_ids {
    ($($(#[$doc:meta])* $name:ident;)+) => {$(
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize,
        )]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type))]
        #[cfg_attr(feature = "postgres", sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }
    )+};
}

define_ids! {
    /// An account.
    UserId;
    /// A house (inventory scope).
    HouseId;
    /// A user's membership row in one house.
    MembershipId;
    StockItemId;
    ShoppingEntryId;
    /// An activity timeline record.
    ActivityId;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_keep_their_value() {
        assert_eq!(HouseId::new(42).as_i32(), 42);
        assert_eq!(StockItemId::new(7).to_string(), "7");
    }

    #[test]
    fn test_ids_travel_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&ShoppingEntryId::new(3)).unwrap(), "3");
        let id: MembershipId = serde_json::from_str("12").unwrap();
        assert_eq!(id, MembershipId::new(12));
    }

    #[test]
    fn test_ids_order_by_value() {
        let mut ids = vec![ActivityId::new(3), ActivityId::new(1), ActivityId::new(2)];
        ids.sort();
        assert_eq!(ids, [ActivityId::new(1), ActivityId::new(2), ActivityId::new(3)]);
    }
}
