//! Integration tests for session identity handling against a mocked provider.

use mockall::predicate::eq;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use printworks::{identity::MockIdentityProvider, prelude::*};

fn maker() -> Identity {
    Identity::new("user-1", Some("maker@example.com".to_string()))
}

fn owner() -> Identity {
    Identity::new("user-2", Some("owner@example.com".to_string()))
}

fn session_with_cart() -> Result<Session, SessionError> {
    let mut session = Session::default().with_admin_email("owner@example.com");

    session.add_upload("benchy.stl", MaterialKind::Pla, 100.0)?;
    session.import_url("https://www.thingiverse.com/thing/123-cool-bracket")?;

    Ok(session)
}

#[tokio::test]
async fn sign_in_keeps_anonymous_cart() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .withf(|credentials| credentials.email() == "maker@example.com")
        .times(1)
        .returning(|_| Ok(maker()));

    let mut session = session_with_cart()?;
    let credentials = Credentials::new(" maker@example.com ", "hunter22")?;

    let identity = session.sign_in(&provider, &credentials).await?;

    assert_eq!(identity, maker());
    assert!(session.is_authenticated());
    assert!(!session.is_admin());
    assert_eq!(session.cart().item_count(), 2);
    assert_eq!(session.cart_subtotal()?, Money::from_minor(1500, USD));

    Ok(())
}

#[tokio::test]
async fn rejected_sign_in_leaves_session_alone() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_password()
        .returning(|_| Err(IdentityError::Provider("invalid login credentials".to_string())));

    let mut session = session_with_cart()?;
    let credentials = Credentials::new("maker@example.com", "wrong")?;

    let result = session.sign_in(&provider, &credentials).await;

    assert!(matches!(
        result,
        Err(SessionError::Identity(IdentityError::Provider(_)))
    ));
    assert!(!session.is_authenticated());
    assert_eq!(session.cart().item_count(), 2);

    Ok(())
}

#[tokio::test]
async fn sign_out_tears_down_cart() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_out().times(1).returning(|| Ok(()));

    let mut session = session_with_cart()?;
    session.apply_identity(Some(maker()));

    session.sign_out(&provider).await?;

    assert!(!session.is_authenticated());
    assert!(session.cart().is_empty());
    assert_eq!(session.cart_subtotal()?, Money::from_minor(0, USD));

    Ok(())
}

#[tokio::test]
async fn failed_sign_out_keeps_session() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_out()
        .returning(|| Err(IdentityError::Provider("offline".to_string())));

    let mut session = session_with_cart()?;
    session.apply_identity(Some(maker()));

    assert!(session.sign_out(&provider).await.is_err());
    assert!(session.is_authenticated());
    assert_eq!(session.cart().item_count(), 2);

    Ok(())
}

#[tokio::test]
async fn sign_up_may_require_confirmation() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .times(1)
        .returning(|_| Ok(SignUpOutcome::ConfirmationRequired));

    let mut session = Session::default();
    let form = SignUp::new("new@example.com", "s3cret!", "s3cret!")?;

    let outcome = session.sign_up(&provider, &form).await?;

    assert_eq!(outcome, SignUpOutcome::ConfirmationRequired);
    assert!(!session.is_authenticated());

    Ok(())
}

#[tokio::test]
async fn sign_up_can_sign_in_immediately() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .returning(|_| Ok(SignUpOutcome::SignedIn(maker())));

    let mut session = Session::default();
    let form = SignUp::new("maker@example.com", "s3cret!", "s3cret!")?;

    session.sign_up(&provider, &form).await?;

    assert_eq!(session.identity(), Some(&maker()));

    Ok(())
}

#[test]
fn mismatched_confirmation_never_reaches_provider() {
    assert_eq!(
        SignUp::new("maker@example.com", "s3cret!", "s3cret?"),
        Err(IdentityError::PasswordMismatch)
    );
}

#[tokio::test]
async fn restore_applies_provider_session() -> TestResult {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_current_identity()
        .times(1)
        .returning(|| Ok(Some(owner())));

    let mut session = Session::default().with_admin_email("owner@example.com");

    session.restore(&provider).await?;

    assert!(session.is_admin());

    let overview = session.admin_overview()?;

    assert_eq!(overview.total_sales, Money::from_minor(0, USD));
    assert_eq!(overview.active_jobs, 0);
    assert_eq!(overview.partners, 1);

    Ok(())
}

#[tokio::test]
async fn oauth_identity_arrives_through_subscription() -> TestResult {
    let (tx, rx) = identity_channel(None);

    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in_with_oauth()
        .with(eq(OAuthProvider::Google))
        .times(1)
        .returning(|_| Ok(()));
    provider.expect_subscribe().return_const(rx);

    let mut session = session_with_cart()?;
    let mut receiver = provider.subscribe();

    session.sign_in_with_oauth(&provider, OAuthProvider::Google).await?;

    assert!(!session.sync_identity(&mut receiver));

    tx.send(Some(maker()))?;
    tx.send(Some(owner()))?;

    assert!(session.sync_identity(&mut receiver));
    assert_eq!(session.identity(), Some(&owner()));
    assert!(session.is_admin());
    assert_eq!(session.cart().item_count(), 2);
    assert!(!session.sync_identity(&mut receiver));

    Ok(())
}

#[test]
fn non_admin_is_denied_overview() -> TestResult {
    let mut session = session_with_cart()?;
    session.apply_identity(Some(maker()));

    assert!(matches!(
        session.admin_overview(),
        Err(SessionError::AccessDenied)
    ));

    session.apply_identity(Some(owner()));

    assert!(session.admin_overview().is_ok());
    assert!(session.cart().is_empty());

    Ok(())
}
