use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Locale conventions for everything the dashboard prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFormat {
    pub currency_prefix: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    /// chrono strftime pattern for table dates.
    pub display_date: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            currency_prefix: "$".to_string(),
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            display_date: "%d/%m/%Y".to_string(),
        }
    }
}

impl DisplayFormat {
    /// Format a currency amount with exactly two fraction digits: $1,234.56
    pub fn money(&self, val: Decimal) -> String {
        let val = round_cents(val);
        let body = self.grouped(val.abs());
        if val.is_sign_negative() && !val.is_zero() {
            format!("-{}{body}", self.currency_prefix)
        } else {
            format!("{}{body}", self.currency_prefix)
        }
    }

    /// Two-decimal grouped number without the currency prefix.
    pub fn amount(&self, val: Decimal) -> String {
        let val = round_cents(val);
        let body = self.grouped(val.abs());
        if val.is_sign_negative() && !val.is_zero() {
            format!("-{body}")
        } else {
            body
        }
    }

    /// Reject a `display_date` chrono cannot render.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if StrftimeItems::new(&self.display_date).any(|i| matches!(i, Item::Error)) {
            return Err(format!("invalid display_date pattern {:?}", self.display_date));
        }
        Ok(())
    }

    /// Table date in `display_date`; ISO if the pattern cannot be rendered.
    pub fn date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        match write!(out, "{}", date.format(&self.display_date)) {
            Ok(()) => out,
            Err(_) => date.format("%Y-%m-%d").to_string(),
        }
    }

    fn grouped(&self, abs: Decimal) -> String {
        let cents = format!("{abs:.2}");
        let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

        let mut with_sep = String::new();
        for (i, c) in int_part.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                with_sep.push_str(&self.thousands_separator.chars().rev().collect::<String>());
            }
            with_sep.push(c);
        }
        let with_sep: String = with_sep.chars().rev().collect();
        format!("{with_sep}{}{dec_part}", self.decimal_separator)
    }
}

fn round_cents(val: Decimal) -> Decimal {
    val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compact axis label: 1.2k, 3.4M.
pub fn compact(val: f64) -> String {
    let abs = val.abs();
    let sign = if val < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{sign}{:.1}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{sign}{:.1}k", abs / 1_000.0)
    } else {
        format!("{sign}{abs:.0}")
    }
}

/// Integer with comma thousands separators: 12,345
pub fn number(val: usize) -> String {
    let s = val.to_string();
    let mut out = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}
