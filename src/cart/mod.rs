//! Cart
//!
//! Ordered line items for a single session. Keys are generational, so a key
//! handed out by a ledger is never reissued to a different item.

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::SlotMap;
use thiserror::Error;
use tracing::info;

mod items;
pub mod summary;

pub use items::{CartItem, CartItemDraft, CartItemKey, ModelSource};

/// Errors related to cart mutation or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The item name was empty or whitespace.
    #[error("item name must not be empty")]
    EmptyName,

    /// The item price was below zero.
    #[error("item price must not be negative, got {0}")]
    NegativePrice(Decimal),

    /// The item's currency differs from the cart currency (item currency, cart currency).
    #[error("item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Cart Ledger
#[derive(Debug, Clone)]
pub struct CartLedger {
    items: SlotMap<CartItemKey, CartItem>,
    order: Vec<CartItemKey>,
    currency: &'static Currency,
}

impl CartLedger {
    /// Create an empty cart priced in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: SlotMap::with_key(),
            order: Vec::new(),
            currency,
        }
    }

    /// Add an item to the end of the cart, returning the stored item.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyName`]: the draft has a blank name.
    /// - [`CartError::NegativePrice`]: the draft price is below zero.
    /// - [`CartError::CurrencyMismatch`]: the draft is priced in another currency.
    pub fn add_item(&mut self, draft: CartItemDraft) -> Result<CartItem, CartError> {
        validate_draft(&draft, self.currency)?;

        let mut item = CartItem::from_draft(CartItemKey::default(), draft);

        let key = self.items.insert_with_key(|key| {
            item.set_key(key);
            item.clone()
        });

        self.order.push(key);

        info!(
            name = item.name(),
            source = %item.source(),
            price = %item.price(),
            "added cart item"
        );

        Ok(item)
    }

    /// Remove an item, returning whether anything was removed.
    pub fn remove_item(&mut self, key: CartItemKey) -> bool {
        let Some(item) = self.items.remove(key) else {
            return false;
        };

        self.order.retain(|existing| *existing != key);

        info!(name = item.name(), "removed cart item");

        true
    }

    /// Get an item from the cart.
    pub fn get_item(&self, key: CartItemKey) -> Option<&CartItem> {
        self.items.get(key)
    }

    /// Iterate over the items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.order.iter().filter_map(|key| self.items.get(*key))
    }

    /// Sum of all line prices.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Money`] if money arithmetic fails.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, CartError> {
        let total = self
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, item| {
                acc.add(*item.price())
            })?;

        Ok(total)
    }

    /// Get the number of items in the cart.
    pub fn item_count(&self) -> usize {
        self.order.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

fn validate_draft(draft: &CartItemDraft, currency: &'static Currency) -> Result<(), CartError> {
    if draft.name.trim().is_empty() {
        return Err(CartError::EmptyName);
    }

    let item_currency = draft.price.currency();

    if item_currency != currency {
        return Err(CartError::CurrencyMismatch(
            item_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ));
    }

    if *draft.price.amount() < Decimal::ZERO {
        return Err(CartError::NegativePrice(*draft.price.amount()));
    }

    Ok(())
}
