//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// Variants are rendered in `SCREAMING_SNAKE_CASE` unless another case is
/// requested with the `#[case = "..."]` attribute, which accepts any value
/// supported by both [`strum`] and [`serde`].
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     #[case = "snake_case"]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
/// ```
///
/// [`serde`]: https://docs.rs/serde
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $crate::define_kind! {
            #[doc = $doc]
            #[case = "SCREAMING_SNAKE_CASE"]
            enum $name {
                $(
                    #[doc = $variant_doc]
                    $variant = $value,
                )*
            }
        }
    };

    (
        #[doc = $doc:literal]
        #[case = $case:tt]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        $crate::__serde_kind! {
            $case
            #[derive(
                Clone,
                Copy,
                Debug,
                $crate::private::strum::Display,
                $crate::private::strum::EnumString,
                Eq,
                Hash,
                PartialEq,
            )]
            #[doc = $doc]
            #[repr(u8)]
            #[strum(
                crate = "::common::private::strum",
                serialize_all = $case,
            )]
            pub enum $name {
                $(
                     #[doc = $variant_doc]
                     $variant = $value,
                )*
            }
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }
    };
}

/// Derives [`serde`] traits for a kind enum, if the `serde` feature of this
/// crate is enabled.
///
/// [`serde`]: https://docs.rs/serde
#[cfg(feature = "serde")]
#[doc(hidden)]
#[macro_export]
macro_rules! __serde_kind {
    ($case:tt $item:item) => {
        #[derive(
            $crate::private::serde::Deserialize,
            $crate::private::serde::Serialize,
        )]
        #[serde(crate = "::common::private::serde", rename_all = $case)]
        $item
    };
}

/// Passes a kind enum through, as the `serde` feature of this crate is
/// disabled.
#[cfg(not(feature = "serde"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __serde_kind {
    ($case:tt $item:item) => {
        $item
    };
}
