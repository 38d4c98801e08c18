//! Session
//!
//! Per-user storefront state: the pricing engine, the cart and the latest
//! identity snapshot. A session starts empty and is torn down (cart cleared)
//! when the signed-in identity signs out or is replaced.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{
        CartError, CartItem, CartItemDraft, CartItemKey, CartLedger,
        summary::{CartSummary, SummaryError},
    },
    identity::{
        Credentials, Identity, IdentityError, IdentityProvider, IdentityReceiver, OAuthProvider,
        SignUp, SignUpOutcome,
    },
    imports::import_draft,
    materials::MaterialKind,
    pricing::{PricingEngine, PricingError, PrintQuote},
};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Quote calculation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Cart mutation or totalling failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Credential validation or the identity provider failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Building the cart summary failed.
    #[error(transparent)]
    Summary(#[from] SummaryError),

    /// An import was requested without a URL.
    #[error("import URL must not be empty")]
    EmptyImportUrl,

    /// The import price is negative or in a different currency to the cart.
    #[error("invalid import price: {0}")]
    InvalidImportPrice(String),

    /// The current identity may not access the admin console.
    #[error("access denied: admins only")]
    AccessDenied,
}

/// Figures shown on the admin console.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdminOverview {
    /// Completed sales
    pub total_sales: Money<'static, Currency>,

    /// Print jobs in progress
    pub active_jobs: u32,

    /// Fulfilment partners
    pub partners: u32,
}

/// Storefront session
#[derive(Debug, Clone)]
pub struct Session {
    engine: PricingEngine,
    cart: CartLedger,
    identity: Option<Identity>,
    admin_email: Option<String>,
    import_price: Money<'static, Currency>,
}

impl Session {
    /// Start a session with an empty cart in the engine's currency.
    ///
    /// Imports are priced at the engine's base fee until
    /// [`Session::with_import_price`] says otherwise.
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            cart: CartLedger::new(engine.currency()),
            import_price: engine.base_fee(),
            engine,
            identity: None,
            admin_email: None,
        }
    }

    /// Grant admin console access to the given email address.
    #[must_use]
    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.admin_email = Some(email.into());
        self
    }

    /// Override the price of imported models.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidImportPrice`] if the price is negative,
    /// finer than the currency's minor unit or not in the session currency.
    pub fn with_import_price(
        mut self,
        price: Money<'static, Currency>,
    ) -> Result<Self, SessionError> {
        if price.currency() != self.engine.currency() {
            return Err(SessionError::InvalidImportPrice(format!(
                "expected {}, got {}",
                self.engine.currency().iso_alpha_code,
                price.currency().iso_alpha_code
            )));
        }

        if *price.amount() < Decimal::ZERO {
            return Err(SessionError::InvalidImportPrice(price.to_string()));
        }

        let exponent = price.currency().exponent;

        if price.amount().normalize().scale() > exponent {
            return Err(SessionError::InvalidImportPrice(format!(
                "{} has more than {exponent} decimal places",
                price.amount()
            )));
        }

        self.import_price = price;

        Ok(self)
    }

    /// Pricing engine used for quotes.
    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Current cart contents.
    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    /// Price applied to imported models.
    pub fn import_price(&self) -> Money<'static, Currency> {
        self.import_price
    }

    /// Quote a print configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Pricing`] if the weight is invalid.
    pub fn compute_quote(
        &self,
        material: MaterialKind,
        weight_grams: f64,
    ) -> Result<PrintQuote, SessionError> {
        let quote = self.engine.estimate(material, weight_grams)?;

        debug!(
            %material,
            weight_grams,
            total = %quote.total(),
            "computed print quote"
        );

        Ok(quote)
    }

    /// Add a line item to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cart`] if the draft fails validation.
    pub fn add_to_cart(&mut self, draft: CartItemDraft) -> Result<CartItem, SessionError> {
        Ok(self.cart.add_item(draft)?)
    }

    /// Quote an uploaded file and add it to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is invalid or the file name is blank.
    pub fn add_upload(
        &mut self,
        file_name: &str,
        material: MaterialKind,
        weight_grams: f64,
    ) -> Result<CartItem, SessionError> {
        let quote = self.compute_quote(material, weight_grams)?;

        self.add_to_cart(CartItemDraft::upload(file_name, &quote))
    }

    /// Import an external listing into the cart at the import price.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyImportUrl`] if `url` is blank.
    pub fn import_url(&mut self, url: &str) -> Result<CartItem, SessionError> {
        let url = url.trim();

        if url.is_empty() {
            return Err(SessionError::EmptyImportUrl);
        }

        self.add_to_cart(import_draft(url, self.import_price))
    }

    /// Remove a line item, returning whether it was present.
    pub fn remove_from_cart(&mut self, key: CartItemKey) -> bool {
        self.cart.remove_item(key)
    }

    /// Sum of cart line prices.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cart`] if money arithmetic fails.
    pub fn cart_subtotal(&self) -> Result<Money<'static, Currency>, SessionError> {
        Ok(self.cart.subtotal()?)
    }

    /// Checkout totals for the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Summary`] if totalling fails.
    pub fn summary(&self) -> Result<CartSummary, SessionError> {
        Ok(CartSummary::from_cart(&self.cart)?)
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Latest identity snapshot.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether the signed-in user is the configured admin.
    pub fn is_admin(&self) -> bool {
        match (&self.admin_email, &self.identity) {
            (Some(admin), Some(identity)) => identity.email.as_deref() == Some(admin.as_str()),
            _ => false,
        }
    }

    /// Admin console figures.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AccessDenied`] unless the admin is signed in.
    pub fn admin_overview(&self) -> Result<AdminOverview, SessionError> {
        if !self.is_admin() {
            warn!(
                user = self.identity.as_ref().map(|identity| identity.id.as_str()),
                "admin console access denied"
            );

            return Err(SessionError::AccessDenied);
        }

        Ok(AdminOverview {
            total_sales: Money::from_minor(0, self.engine.currency()),
            active_jobs: 0,
            partners: 1,
        })
    }

    /// Apply an identity snapshot. The latest snapshot always wins.
    pub fn apply_identity(&mut self, snapshot: Option<Identity>) {
        let replaced = match (&self.identity, &snapshot) {
            (Some(current), Some(next)) => current.id != next.id,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if replaced {
            self.cart.clear();
        }

        match &snapshot {
            Some(identity) => info!(user = identity.id.as_str(), "signed in"),
            None if self.identity.is_some() => info!("signed out"),
            None => {}
        }

        self.identity = snapshot;
    }

    /// Apply the newest snapshot from a provider subscription, if it changed
    /// since the last sync. Returns whether a snapshot was applied.
    ///
    /// A closed subscription still yields its final snapshot once.
    pub fn sync_identity(&mut self, receiver: &mut IdentityReceiver) -> bool {
        let changed = receiver
            .has_changed()
            .unwrap_or_else(|_closed| *receiver.borrow() != self.identity);

        if !changed {
            return false;
        }

        let snapshot = receiver.borrow_and_update().clone();

        self.apply_identity(snapshot);

        true
    }

    /// Load the provider's current identity at session start.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider fails.
    pub async fn restore<P>(&mut self, provider: &P) -> Result<(), SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        let identity = provider.current_identity().await?;

        self.apply_identity(identity);

        Ok(())
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider rejects the credentials.
    pub async fn sign_in<P>(
        &mut self,
        provider: &P,
        credentials: &Credentials,
    ) -> Result<Identity, SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        let identity = provider.sign_in_with_password(credentials).await?;

        self.apply_identity(Some(identity.clone()));

        Ok(identity)
    }

    /// Register a new account, signing in if the provider allows it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider rejects the request.
    pub async fn sign_up<P>(
        &mut self,
        provider: &P,
        sign_up: &SignUp,
    ) -> Result<SignUpOutcome, SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        let outcome = provider.sign_up(sign_up.credentials()).await?;

        if let SignUpOutcome::SignedIn(identity) = &outcome {
            self.apply_identity(Some(identity.clone()));
        }

        Ok(outcome)
    }

    /// Start an external OAuth sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider cannot start the flow.
    pub async fn sign_in_with_oauth<P>(
        &self,
        provider: &P,
        oauth: OAuthProvider,
    ) -> Result<(), SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        provider.sign_in_with_oauth(oauth).await?;

        Ok(())
    }

    /// Sign out and tear down the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Identity`] if the provider fails; the local
    /// session is left untouched in that case.
    pub async fn sign_out<P>(&mut self, provider: &P) -> Result<(), SessionError>
    where
        P: IdentityProvider + ?Sized,
    {
        provider.sign_out().await?;

        self.apply_identity(None);

        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PricingEngine::default())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{cart::ModelSource, identity::identity_channel};

    use super::*;

    fn admin() -> Identity {
        Identity::new("admin-id", Some("owner@example.com".to_string()))
    }

    fn customer() -> Identity {
        Identity::new("customer-id", Some("customer@example.com".to_string()))
    }

    #[test]
    fn upload_is_quoted_and_added() -> TestResult {
        let mut session = Session::default();

        let item = session.add_upload("benchy.stl", MaterialKind::Abs, 100.0)?;

        assert_eq!(item.source(), ModelSource::DirectUpload);
        assert_eq!(item.price(), &Money::from_minor(1300, USD));
        assert_eq!(session.cart().item_count(), 1);

        Ok(())
    }

    #[test]
    fn import_uses_base_fee_by_default() -> TestResult {
        let mut session = Session::default();

        let item = session.import_url(" https://makerworld.com/en/models/42-fidget-cube ")?;

        assert_eq!(item.source(), ModelSource::MakerWorld);
        assert_eq!(item.name(), "fidget cube");
        assert_eq!(item.price(), &Money::from_minor(500, USD));
        assert_eq!(
            item.source_url(),
            Some("https://makerworld.com/en/models/42-fidget-cube")
        );

        Ok(())
    }

    #[test]
    fn blank_import_is_rejected() {
        let mut session = Session::default();

        assert!(matches!(
            session.import_url("   "),
            Err(SessionError::EmptyImportUrl)
        ));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn import_price_must_match_currency() {
        let result = Session::default().with_import_price(Money::from_minor(500, GBP));

        assert!(matches!(result, Err(SessionError::InvalidImportPrice(_))));
    }

    #[test]
    fn import_price_must_fit_minor_unit() -> TestResult {
        let result =
            Session::default().with_import_price(Money::from_decimal(Decimal::new(7255, 3), USD));

        assert!(matches!(result, Err(SessionError::InvalidImportPrice(_))));

        let session =
            Session::default().with_import_price(Money::from_decimal(Decimal::new(7250, 3), USD))?;

        assert_eq!(session.import_price(), Money::from_minor(725, USD));

        Ok(())
    }

    #[test]
    fn custom_import_price() -> TestResult {
        let mut session = Session::default().with_import_price(Money::from_minor(750, USD))?;

        let item = session.import_url("https://www.thingiverse.com/thing/9-clip")?;

        assert_eq!(item.price(), &Money::from_minor(750, USD));

        Ok(())
    }

    #[test]
    fn subtotal_tracks_cart() -> TestResult {
        let mut session = Session::default();

        session.add_upload("a.stl", MaterialKind::Pla, 0.0)?;
        let petg = session.add_upload("b.stl", MaterialKind::Petg, 100.0)?;

        assert_eq!(session.cart_subtotal()?, Money::from_minor(1800, USD));

        assert!(session.remove_from_cart(petg.key()));
        assert!(!session.remove_from_cart(petg.key()));
        assert_eq!(session.cart_subtotal()?, Money::from_minor(500, USD));

        Ok(())
    }

    #[test]
    fn admin_overview_requires_admin() -> TestResult {
        let mut session = Session::default().with_admin_email("owner@example.com");

        assert!(matches!(
            session.admin_overview(),
            Err(SessionError::AccessDenied)
        ));

        session.apply_identity(Some(customer()));
        assert!(matches!(
            session.admin_overview(),
            Err(SessionError::AccessDenied)
        ));

        session.apply_identity(Some(admin()));
        let overview = session.admin_overview()?;

        assert_eq!(overview.total_sales, Money::from_minor(0, USD));
        assert_eq!(overview.active_jobs, 0);
        assert_eq!(overview.partners, 1);

        Ok(())
    }

    #[test]
    fn no_admin_configured_denies_everyone() {
        let mut session = Session::default();

        session.apply_identity(Some(admin()));

        assert!(!session.is_admin());
    }

    #[test]
    fn sign_out_clears_cart() -> TestResult {
        let mut session = Session::default();

        session.apply_identity(Some(customer()));
        session.add_upload("a.stl", MaterialKind::Pla, 10.0)?;

        session.apply_identity(None);

        assert!(!session.is_authenticated());
        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn signing_in_keeps_anonymous_cart() -> TestResult {
        let mut session = Session::default();

        session.add_upload("a.stl", MaterialKind::Pla, 10.0)?;
        session.apply_identity(Some(customer()));

        assert_eq!(session.cart().item_count(), 1);

        Ok(())
    }

    #[test]
    fn switching_user_clears_cart() -> TestResult {
        let mut session = Session::default();

        session.apply_identity(Some(customer()));
        session.add_upload("a.stl", MaterialKind::Pla, 10.0)?;
        session.apply_identity(Some(admin()));

        assert!(session.cart().is_empty());

        Ok(())
    }

    #[test]
    fn sync_identity_applies_latest_snapshot_only() -> TestResult {
        let mut session = Session::default();
        let (tx, mut rx) = identity_channel(None);

        assert!(!session.sync_identity(&mut rx));

        tx.send(Some(customer()))?;
        tx.send(Some(admin()))?;

        assert!(session.sync_identity(&mut rx));
        assert_eq!(session.identity(), Some(&admin()));
        assert!(!session.sync_identity(&mut rx));

        Ok(())
    }

    #[test]
    fn sync_identity_applies_final_snapshot_after_close() -> TestResult {
        let mut session = Session::default();
        let (tx, mut rx) = identity_channel(Some(customer()));

        session.apply_identity(Some(customer()));
        session.add_upload("a.stl", MaterialKind::Pla, 10.0)?;

        tx.send(None)?;
        drop(tx);

        assert!(session.sync_identity(&mut rx));
        assert!(!session.is_authenticated());
        assert!(session.cart().is_empty());
        assert!(!session.sync_identity(&mut rx));

        Ok(())
    }
}
