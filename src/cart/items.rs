//! Cart Items

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::{materials::MaterialKind, pricing::PrintQuote};

new_key_type! {
    /// Cart Item Key
    pub struct CartItemKey;
}

/// Where a line item's model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSource {
    /// File uploaded and configured by the user.
    DirectUpload,

    /// Imported from a `MakerWorld` listing.
    MakerWorld,

    /// Imported from a Thingiverse listing (also the fallback for unknown hosts).
    Thingiverse,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelSource::DirectUpload => "Direct Upload",
            ModelSource::MakerWorld => "MakerWorld",
            ModelSource::Thingiverse => "Thingiverse",
        })
    }
}

/// Line item payload before it has been assigned a key.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemDraft {
    /// Display name
    pub name: String,

    /// Origin of the model
    pub source: ModelSource,

    /// Listing URL, for imported models
    pub source_url: Option<String>,

    /// Line price
    pub price: Money<'static, Currency>,

    /// Print material
    pub material: MaterialKind,

    /// Estimated mass in grams
    pub weight_grams: Decimal,
}

impl CartItemDraft {
    /// Draft for an uploaded file priced from its confirmed quote.
    pub fn upload(name: impl Into<String>, quote: &PrintQuote) -> Self {
        Self {
            name: name.into(),
            source: ModelSource::DirectUpload,
            source_url: None,
            price: quote.total(),
            material: quote.material(),
            weight_grams: quote.weight_grams(),
        }
    }
}

/// A line item held by a [`CartLedger`](super::CartLedger).
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    key: CartItemKey,
    name: String,
    source: ModelSource,
    source_url: Option<String>,
    price: Money<'static, Currency>,
    material: MaterialKind,
    weight_grams: Decimal,
}

impl CartItem {
    pub(super) fn from_draft(key: CartItemKey, draft: CartItemDraft) -> Self {
        let CartItemDraft {
            name,
            source,
            source_url,
            price,
            material,
            weight_grams,
        } = draft;

        Self {
            key,
            name: name.trim().to_string(),
            source,
            source_url,
            price,
            material,
            weight_grams,
        }
    }

    pub(super) fn set_key(&mut self, key: CartItemKey) {
        self.key = key;
    }

    /// Returns the key identifying the item within its ledger
    pub fn key(&self) -> CartItemKey {
        self.key
    }

    /// Returns the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the origin of the model
    pub fn source(&self) -> ModelSource {
        self.source
    }

    /// Returns the listing URL, if the model was imported
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Returns the line price
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.price
    }

    /// Returns the print material
    pub fn material(&self) -> MaterialKind {
        self.material
    }

    /// Returns the estimated mass in grams
    pub fn weight_grams(&self) -> Decimal {
        self.weight_grams
    }
}
