//! Shopify global IDs for type-safe resource references.
//!
//! Use the `define_gid!` macro to create wrappers that prevent accidentally
//! passing a collection id where a product id is expected.

/// Errors that can occur when parsing a Shopify global ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GidError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The input is a GID for a different resource type.
    #[error("expected a {expected} id, got {actual}")]
    WrongResource {
        /// Resource type the caller asked for.
        expected: &'static str,
        /// The rejected input.
        actual: String,
    },
    /// The numeric part is missing or not a number.
    #[error("invalid {resource} id: {input}")]
    Invalid {
        /// Resource type the caller asked for.
        resource: &'static str,
        /// The rejected input.
        input: String,
    },
}

/// Macro to define a Shopify GID wrapper.
///
/// Creates a newtype around `String` holding a normalized
/// `gid://shopify/<Resource>/<number>` value with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `parse()` accepting either a full GID or a bare numeric id
/// - `numeric_part()` for building file names
///
/// # Example
///
/// ```rust
/// # use shopify_catalog_core::define_gid;
/// define_gid!(VariantGid, "ProductVariant");
///
/// let id = VariantGid::parse("42").unwrap();
/// assert_eq!(id.as_str(), "gid://shopify/ProductVariant/42");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident, $resource:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Shopify resource type encoded in the GID.
            pub const RESOURCE: &'static str = $resource;

            /// Parse a GID or a bare numeric id.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is empty, names another resource
            /// type, or has a non-numeric id part.
            pub fn parse(input: &str) -> ::core::result::Result<Self, $crate::GidError> {
                let input = input.trim();
                if input.is_empty() {
                    return Err($crate::GidError::Empty);
                }

                let prefix = concat!("gid://shopify/", $resource, "/");
                let numeric = if let Some(rest) = input.strip_prefix(prefix) {
                    rest
                } else if input.starts_with("gid://") {
                    return Err($crate::GidError::WrongResource {
                        expected: $resource,
                        actual: input.to_string(),
                    });
                } else {
                    input
                };

                if numeric.is_empty() || !numeric.chars().all(|c| c.is_ascii_digit()) {
                    return Err($crate::GidError::Invalid {
                        resource: $resource,
                        input: input.to_string(),
                    });
                }

                Ok(Self(format!("{prefix}{numeric}")))
            }

            /// The full `gid://shopify/...` string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The trailing numeric id.
            #[must_use]
            pub fn numeric_part(&self) -> &str {
                self.0.rsplit('/').next().unwrap_or(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::GidError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_gid!(ProductGid, "Product");
define_gid!(CollectionGid, "Collection");
