use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an id from a raw value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// External identity of a storefront user.
    ///
    /// Carries the opaque numeric id assigned by the chat platform,
    /// not a database serial.
    UserId
}

entity_id! {
    /// Identifier of a top-level catalog category.
    CategoryId
}

entity_id! {
    /// Identifier of a subcategory within a category.
    SubCategoryId
}

entity_id! {
    /// Identifier of a product in the catalog.
    ProductId
}

entity_id! {
    /// Identifier of a placed order.
    OrderId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_preserves_value() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ids_of_different_entities_are_distinct_types() {
        // Compile-time property; the assertions below just exercise Display.
        let user = UserId::new(7);
        let order = OrderId::new(7);
        assert_eq!(user.to_string(), order.to_string());
    }

    #[test]
    fn id_serialization_is_transparent() {
        let id = UserId::new(123456789);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "123456789");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
