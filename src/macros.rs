//! Macros to reduce boilerplate in the codebase

/// Generate Display and case-insensitive FromStr implementations for a
/// fieldless enum.
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     Resource,
///     AdminError::UnknownResource,
///     {
///         Bots => "bots",
///         Posts => "posts",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_variant:path,
        { $($variant:ident => $str:expr),+ $(,)? }
    ) => {
        impl $enum_name {
            /// Every accepted name, in declaration order
            pub const NAMES: &'static [&'static str] = &[$($str),+];
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::AdminError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok($enum_name::$variant),)+
                    _ => Err($error_variant(s.to_string())),
                }
            }
        }
    };
}
