//! Cart Summary

use std::io;

use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::cart::{CartError, CartItem, CartLedger};

/// Errors that can occur when building or writing a cart summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error calculating the cart subtotal.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Failed to write the summary.
    #[error("failed to write summary: {0}")]
    Io(#[from] io::Error),
}

/// Lines and totals shown at checkout, captured from a cart at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    lines: Vec<CartItem>,
    subtotal: Money<'static, Currency>,
    processing_fee: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl CartSummary {
    /// Summarise the current contents of a cart.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if totalling the cart fails.
    pub fn from_cart(cart: &CartLedger) -> Result<Self, SummaryError> {
        let subtotal = cart.subtotal()?;
        let processing_fee = Money::from_minor(0, cart.currency());
        let total = subtotal.add(processing_fee)?;

        Ok(Self {
            lines: cart.iter().cloned().collect(),
            subtotal,
            processing_fee,
            total,
        })
    }

    /// Line items, in cart order
    pub fn lines(&self) -> &[CartItem] {
        &self.lines
    }

    /// Number of line items
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of line prices
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Processing fee charged on top of the subtotal (currently always zero)
    pub fn processing_fee(&self) -> Money<'static, Currency> {
        self.processing_fee
    }

    /// Amount due
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Render the lines and totals as a table.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Io`] if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        if self.lines.is_empty() {
            writeln!(out, "Your cart is empty.")?;

            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Source", "Material", "Weight", "Price"]);

        for (idx, item) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.name().to_string(),
                item.source().to_string(),
                item.material().to_string(),
                format!("{}g", item.weight_grams().normalize()),
                format!("{}", item.price()),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(4..6), Alignment::right());

        writeln!(out, "\n{table}")?;

        let fee = if self.processing_fee.amount().is_zero() {
            "FREE".to_string()
        } else {
            self.processing_fee.to_string()
        };

        let rows = [
            (format!(" Subtotal ({} items):", self.item_count()), self.subtotal.to_string()),
            (" Processing Fee:".to_string(), fee),
            (" Total:".to_string(), self.total.to_string()),
        ];

        let label_width = rows.iter().map(|(label, _)| visible_width(label)).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| visible_width(value)).max().unwrap_or(0);

        for (label, value) in rows {
            writeln!(out, "{label:<label_width$} {value:>value_width$}")?;
        }

        Ok(())
    }
}

/// Returns the visible (non-ANSI) width of a string in characters.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use crate::{
        cart::{CartItemDraft, ModelSource},
        materials::MaterialKind,
    };

    use super::*;

    fn cart_with(prices: &[i64]) -> Result<CartLedger, CartError> {
        cart_in(prices, USD)
    }

    fn cart_in(prices: &[i64], currency: &'static Currency) -> Result<CartLedger, CartError> {
        let mut cart = CartLedger::new(currency);

        for (idx, minor) in prices.iter().enumerate() {
            cart.add_item(CartItemDraft {
                name: format!("part {idx}"),
                source: ModelSource::DirectUpload,
                source_url: None,
                price: Money::from_minor(*minor, currency),
                material: MaterialKind::Pla,
                weight_grams: Decimal::TEN,
            })?;
        }

        Ok(cart)
    }

    #[test]
    fn total_equals_subtotal_with_free_processing() -> TestResult {
        let cart = cart_with(&[500, 1300, 750])?;

        let summary = CartSummary::from_cart(&cart)?;

        assert_eq!(summary.item_count(), 3);
        assert_eq!(summary.subtotal(), Money::from_minor(2550, USD));
        assert_eq!(summary.processing_fee(), Money::from_minor(0, USD));
        assert_eq!(summary.total(), summary.subtotal());

        Ok(())
    }

    #[test]
    fn write_to_renders_items_and_totals() -> TestResult {
        let cart = cart_with(&[500, 1300])?;
        let summary = CartSummary::from_cart(&cart)?;

        let mut out = Vec::new();
        summary.write_to(&mut out)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("part 0"), "missing first item");
        assert!(rendered.contains("part 1"), "missing second item");
        assert!(rendered.contains("Direct Upload"), "missing source");
        assert!(rendered.contains("FREE"), "missing processing fee");
        assert!(rendered.contains("$18.00"), "missing total");

        Ok(())
    }

    #[test]
    fn write_to_empty_cart() -> TestResult {
        let cart = CartLedger::new(USD);
        let summary = CartSummary::from_cart(&cart)?;

        let mut out = Vec::new();
        summary.write_to(&mut out)?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty.\n");

        Ok(())
    }

    #[test]
    fn totals_align_with_multibyte_currency_symbols() -> TestResult {
        let cart = cart_in(&[150_000, 250], EUR)?;
        let summary = CartSummary::from_cart(&cart)?;

        let mut out = Vec::new();
        summary.write_to(&mut out)?;
        let rendered = String::from_utf8(out)?;

        let widths: Vec<usize> = rendered
            .lines()
            .rev()
            .take(3)
            .map(|line| line.chars().count())
            .collect();

        assert!(rendered.contains('€'), "missing currency symbol");
        assert_eq!(widths.len(), 3);
        assert!(
            widths.windows(2).all(|pair| pair.first() == pair.last()),
            "misaligned totals: {widths:?}\n{rendered}"
        );

        Ok(())
    }

    #[test]
    fn summary_keeps_lines_it_was_built_from() -> TestResult {
        let mut cart = cart_with(&[500, 1300])?;
        let summary = CartSummary::from_cart(&cart)?;

        let first = cart.iter().map(CartItem::key).next();
        if let Some(key) = first {
            cart.remove_item(key);
        }

        assert_eq!(summary.item_count(), 2);
        assert_eq!(summary.lines().first().map(CartItem::name), Some("part 0"));

        let mut out = Vec::new();
        summary.write_to(&mut out)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("part 0"), "missing captured line");
        assert!(rendered.contains("$18.00"), "missing total");

        Ok(())
    }
}
