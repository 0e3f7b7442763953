//! Integer primary keys, one newtype per table.

/// Define an `i32` primary-key newtype.
///
/// The type is `Copy`, ordered, serializes as a bare number, parses from a
/// path segment and (with the `postgres` feature) binds as `INTEGER`.
///
/// ```rust
/// # use menucochon_core::define_id;
/// define_id!(RecipeId);
/// define_id!(OrderId);
///
/// let recipe = RecipeId::new(1);
/// assert_eq!("1".parse::<RecipeId>(), Ok(recipe));
/// // let _: OrderId = recipe; // mismatched types
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
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
            ::serde::Deserialize
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
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(RecipeId);
define_id!(CategoryId);
define_id!(PostId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(LexiconTermId);
define_id!(VideoId);
define_id!(AdminUserId);
define_id!(SubscriberId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_conversions() {
        let id = RecipeId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(i32::from(id), 42);
        assert_eq!(RecipeId::from(42), id);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_from_path_segment() {
        assert_eq!(" 17 ".parse::<OrderId>(), Ok(OrderId::new(17)));
        assert!("abc".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&ProductId::new(7)).unwrap_or_default();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_id_ordering() {
        let mut ids = vec![PostId::new(3), PostId::new(1), PostId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![PostId::new(1), PostId::new(2), PostId::new(3)]);
    }
}
