//! Currency Definitions and Hardcoded Fallback Rates
//!
//! This crate declares the closed set of currencies the rate cache works with
//! and the static fallback table used when neither the live rate API nor the
//! persisted rate records are available.
//!
//! Currencies are defined declaratively using a macro that generates the
//! `CurrencyCode` enum, its metadata accessors, and the fallback rate of every
//! currency against the base currency (AED).
//!
//! # Adding a New Currency
//! Simply add a line to the `define_currencies!` macro invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     SAR => ("SAR", "﷼", "Saudi Riyal", 0.98),
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{CurrencyCode, FallbackTable};
//!
//! // 1 USD is worth 3.67 AED in the fallback table
//! assert_eq!(FallbackTable::direct(CurrencyCode::USD, CurrencyCode::AED), Some(3.67));
//!
//! // Cross pairs are not stored
//! assert_eq!(FallbackTable::resolve(CurrencyCode::USD, CurrencyCode::EUR), None);
//! ```

/// Error returned when parsing an unsupported currency code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrency(pub String);

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines all currencies, CurrencyCode enum, and fallback rates
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define currencies with auto-generated enum and metadata.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     CurrencyName => ("CODE", "SYMBOL", "Display name", fallback_rate_to_base),
/// }
/// ```
///
/// `fallback_rate_to_base` is how many units of the base currency one unit of
/// this currency buys. The base currency itself must declare `1.0`.
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $display:literal, $to_base:expr)
        ),* $(,)?
    ) => {
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            /// Hardcoded units of the base currency per unit of `self`.
            pub fn fallback_rate_to_base(&self) -> f64 {
                match self {
                    $(CurrencyCode::$name => $to_base),*
                }
            }

            pub fn is_base(&self) -> bool {
                *self == BASE_CURRENCY
            }

            /// All supported currencies, in declaration order.
            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = UnknownCurrency;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(UnknownCurrency(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    AED => ("AED", "د.إ", "UAE Dirham", 1.0),
    USD => ("USD", "$", "US Dollar", 3.67),
    EUR => ("EUR", "€", "Euro", 4.0),
    GBP => ("GBP", "£", "British Pound", 4.6),
}

/// The reference currency every API and fallback rate is expressed against.
pub const BASE_CURRENCY: CurrencyCode = CurrencyCode::AED;

// ─────────────────────────────────────────────────────────────────────────────
// Fallback Table
// ─────────────────────────────────────────────────────────────────────────────

/// Static rates of last resort.
///
/// Stores every pair involving the base currency, in both directions. The
/// `base -> X` direction is the reciprocal of the declared `X -> base` rate, so
/// a round trip through the table multiplies back to one. Cross pairs are
/// never stored.
pub struct FallbackTable;

impl FallbackTable {
    /// Every stored directed pair with its rate.
    pub fn entries() -> Vec<(CurrencyCode, CurrencyCode, f64)> {
        CurrencyCode::all()
            .iter()
            .filter(|c| !c.is_base())
            .flat_map(|&c| {
                let to_base = c.fallback_rate_to_base();
                [(c, BASE_CURRENCY, to_base), (BASE_CURRENCY, c, 1.0 / to_base)]
            })
            .collect()
    }

    /// Rate for a pair exactly as stored, if present.
    pub fn direct(from: CurrencyCode, to: CurrencyCode) -> Option<f64> {
        if from == to {
            return None;
        }
        if to.is_base() {
            Some(from.fallback_rate_to_base())
        } else if from.is_base() {
            Some(1.0 / to.fallback_rate_to_base())
        } else {
            None
        }
    }

    /// Stored pair, else the reciprocal of the stored reverse pair.
    ///
    /// Identity and cross pairs return `None`; callers compose cross pairs
    /// through the base with whatever rates they prefer for each leg.
    pub fn resolve(from: CurrencyCode, to: CurrencyCode) -> Option<f64> {
        Self::direct(from, to).or_else(|| {
            Self::direct(to, from)
                .filter(|r| *r > 0.0)
                .map(|r| 1.0 / r)
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
