//! # Identity Codes
//!
//! Formatting side of the sequence allocator. Reading the latest existing
//! code is the caller's job; this module only derives prefixes and the next
//! number.
//!
//! ## Code Shapes
//! ```text
//! ┌──────────────┬─────────────────────────┬────────────────────────────┐
//! │ Scope        │ Prefix                  │ Example                    │
//! ├──────────────┼─────────────────────────┼────────────────────────────┤
//! │ TradingUnit  │ UD-{ABBR}-              │ UD-UDM-001                 │
//! │ Kitchen      │ DAPUR-{ABBR}-           │ DAPUR-DSS-004              │
//! │ Transaction  │ TRX-{YYYYMMDD}-         │ TRX-20250115-012           │
//! └──────────────┴─────────────────────────┴────────────────────────────┘
//! ```
//!
//! ## Abbreviation Rules
//! 1. Uppercase first letter of each whitespace-separated word, keep 3
//! 2. If fewer than 3, append the uppercased last word and keep 3
//! 3. If the name has no letters or digits at all, use the scope default
//!
//! "Usaha Dagang Maju" → `UDM`, "Dapur Sari" → `DSS`, "Sari" → `SSA`.
//!
//! ## Sequence Rules
//! The latest code (lexicographically maximal with the prefix) is parsed for
//! the number after the prefix. Unparsable means 0. The next code is that
//! number plus one, zero-padded to [`SEQUENCE_WIDTH`] digits. Numbers past
//! 999 simply grow wider.

use chrono::NaiveDate;

use crate::{DEFAULT_KITCHEN_ABBR, DEFAULT_TRADING_UNIT_ABBR, SEQUENCE_WIDTH};

const ABBR_LEN: usize = 3;

/// What a code is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeScope {
    TradingUnit { abbreviation: String },
    Kitchen { abbreviation: String },
    Transaction { date: NaiveDate },
}

impl CodeScope {
    /// Scope for a trading unit named `name`.
    pub fn trading_unit(name: &str) -> Self {
        CodeScope::TradingUnit {
            abbreviation: abbreviate(name, DEFAULT_TRADING_UNIT_ABBR),
        }
    }

    /// Scope for a kitchen named `name`.
    pub fn kitchen(name: &str) -> Self {
        CodeScope::Kitchen {
            abbreviation: abbreviate(name, DEFAULT_KITCHEN_ABBR),
        }
    }

    /// Scope for transactions dated `date`.
    pub fn transaction(date: NaiveDate) -> Self {
        CodeScope::Transaction { date }
    }

    /// The literal prefix every code in this scope starts with.
    pub fn prefix(&self) -> String {
        match self {
            CodeScope::TradingUnit { abbreviation } => format!("UD-{abbreviation}-"),
            CodeScope::Kitchen { abbreviation } => format!("DAPUR-{abbreviation}-"),
            CodeScope::Transaction { date } => format!("TRX-{}-", date.format("%Y%m%d")),
        }
    }

    /// Next code after `latest`, or the first code when `latest` is `None`.
    ///
    /// ## Example
    /// ```rust
    /// use ud_core::code::CodeScope;
    ///
    /// let scope = CodeScope::trading_unit("Usaha Dagang Maju");
    /// assert_eq!(scope.next_code(None), "UD-UDM-001");
    /// assert_eq!(scope.next_code(Some("UD-UDM-001")), "UD-UDM-002");
    /// ```
    pub fn next_code(&self, latest: Option<&str>) -> String {
        let prefix = self.prefix();
        let last = latest.map(|code| parse_sequence(&prefix, code)).unwrap_or(0);
        format!("{prefix}{:0width$}", last + 1, width = SEQUENCE_WIDTH)
    }
}

/// Derives the 3-letter abbreviation of a name.
pub fn abbreviate(name: &str, fallback: &str) -> String {
    let words: Vec<String> = name
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_uppercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let Some(last) = words.last() else {
        return fallback.to_string();
    };

    let mut abbr: String = words
        .iter()
        .filter_map(|w| w.chars().next())
        .take(ABBR_LEN)
        .collect();

    if abbr.chars().count() < ABBR_LEN {
        abbr.push_str(last);
        abbr = abbr.chars().take(ABBR_LEN).collect();
    }

    abbr
}

/// Reads the number that follows `prefix` in `code`.
///
/// Leading digits only; anything else (including a code that does not carry
/// the prefix) yields 0.
pub fn parse_sequence(prefix: &str, code: &str) -> u64 {
    let Some(rest) = code.strip_prefix(prefix) else {
        return 0;
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviation_from_words() {
        assert_eq!(abbreviate("Usaha Dagang Maju", "UDX"), "UDM");
        assert_eq!(abbreviate("usaha dagang maju jaya", "UDX"), "UDM");
        assert_eq!(abbreviate("  Toko   Baru ", "UDX"), "TBB");
    }

    #[test]
    fn test_short_names_pad_with_last_word() {
        assert_eq!(abbreviate("Sari", "DPR"), "SSA");
        assert_eq!(abbreviate("Dapur Sari", "DPR"), "DSS");
        assert_eq!(abbreviate("A", "DPR"), "AA");
    }

    #[test]
    fn test_fallback_when_no_letters() {
        assert_eq!(abbreviate("", "UDX"), "UDX");
        assert_eq!(abbreviate("  -- ", "DPR"), "DPR");
    }

    #[test]
    fn test_prefixes() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(CodeScope::transaction(date).prefix(), "TRX-20250115-");
        assert_eq!(CodeScope::kitchen("").prefix(), "DAPUR-DPR-");
        assert_eq!(CodeScope::trading_unit("###").prefix(), "UD-UDX-");
    }

    #[test]
    fn test_next_code_sequence() {
        let scope = CodeScope::trading_unit("Usaha Dagang Maju");
        assert_eq!(scope.next_code(None), "UD-UDM-001");
        assert_eq!(scope.next_code(Some("UD-UDM-001")), "UD-UDM-002");
        assert_eq!(scope.next_code(Some("UD-UDM-099")), "UD-UDM-100");
        assert_eq!(scope.next_code(Some("UD-UDM-999")), "UD-UDM-1000");
    }

    #[test]
    fn test_unparsable_latest_restarts_at_one() {
        let scope = CodeScope::kitchen("Dapur Pusat");
        assert_eq!(scope.next_code(Some("DAPUR-DP-x12")), "DAPUR-DPP-001");
        assert_eq!(scope.next_code(Some("DAPUR-DPP-abc")), "DAPUR-DPP-001");
    }
}
