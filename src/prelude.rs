//! Printworks prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CartError, CartItem, CartItemDraft, CartItemKey, CartLedger, ModelSource,
        summary::{CartSummary, SummaryError},
    },
    config::{ConfigError, StoreConfig},
    fixtures::{CartFixture, FixtureError},
    identity::{
        Credentials, Identity, IdentityError, IdentityProvider, IdentityReceiver, OAuthProvider,
        SignUp, SignUpOutcome, identity_channel,
    },
    imports::{classify_source, import_draft, model_name},
    materials::MaterialKind,
    pricing::{MaterialRates, PricingEngine, PricingError, PrintQuote},
    session::{AdminOverview, Session, SessionError},
};
