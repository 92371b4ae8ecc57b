//! Display/FromStr conversions for wire-level string enums
//!
//! Several backend fields (user role, listing status, token store backend) are
//! lowercase strings on the wire. The macro below gives each of those enums
//! one mapping that drives both `Display` and case-insensitive `FromStr`.
//!
//! # Example
//!
//! ```rust
//! use ajok_domain::impl_wire_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Public,
//!     Hidden,
//! }
//!
//! impl_wire_str_conversions!(Visibility {
//!     Public => "public",
//!     Hidden => "hidden",
//! });
//!
//! assert_eq!(Visibility::Hidden.to_string(), "hidden");
//! assert_eq!("PUBLIC".parse::<Visibility>(), Ok(Visibility::Public));
//! ```

/// Implements `Display` and `FromStr` for an enum from a variant → string map.
///
/// Parsing is case-insensitive; the error names the enum and the rejected
/// input.
#[macro_export]
macro_rules! impl_wire_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
