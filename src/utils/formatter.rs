// src/utils/formatter.rs

/// Formats a price for display the way the storefront renders it:
/// euro sign, two decimals, comma separator.
pub fn format_price_eur(price: f64) -> String {
    format!("€{:.2}", price).replace('.', ",")
}
