//! Checkout flow.
//!
//! Sequences the checkout page through its three outcomes:
//!
//! 1. **Guards** - an unauthenticated visitor is sent to the login page
//!    (carrying a return path), a visitor with an empty cart is sent back
//!    to the cart page. Neither is an error.
//! 2. **Profile resolution** - the customer profile is fetched, or created
//!    from session metadata on first checkout, and merged into the form
//!    defaults. Profile failures degrade to default form values plus a
//!    destructive notice; they never fail the request.
//! 3. **Submission** - the posted form is validated and the order draft is
//!    handed to the [`OrderGateway`]. Success is terminal (confirmation
//!    view); failure re-renders the form with the submitted values intact.
//!
//! Collaborators are injected as traits so the flow is testable without a
//! database or a live orders API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tangelo_core::{Email, OrderRef};

use crate::db::RepositoryError;
use crate::db::customers::CreateOutcome;
use crate::models::{Cart, CurrentUser, Customer, NewCustomer, Notice};
use crate::services::orders::{ContactDetails, OrderDraft, OrderGateway, OrderLine};

/// Path of the checkout page, used as the login return target.
pub const CHECKOUT_PATH: &str = "/checkout";

/// Capability for reading and creating customer profiles.
pub trait ProfileStore {
    /// Find the profile owned by a user, if any.
    async fn find_by_user(
        &self,
        user_id: tangelo_core::UserId,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Create a profile, tolerating a concurrent create for the same user.
    async fn create_profile(&self, new: &NewCustomer) -> Result<CreateOutcome, RepositoryError>;
}

/// Checkout form state.
///
/// Created with defaults, overwritten once by profile resolution, then by
/// user input on submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub delivery_date: Option<NaiveDate>,
}

impl FormData {
    /// Merge a customer profile into fresh form defaults.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            full_name: customer.full_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            notes: String::new(),
            delivery_date: None,
        }
    }
}

/// What the checkout page should render.
#[derive(Debug)]
pub enum CheckoutView {
    /// Guard tripped: navigate away.
    Redirect(String),
    /// Render the checkout form.
    Form {
        form: FormData,
        notice: Option<Notice>,
    },
}

/// Result of a profile resolution.
#[derive(Debug)]
pub enum ResolvedProfile {
    /// A profile already existed; no insert fired.
    Existing(Customer),
    /// A profile was created for this user's first checkout.
    Created(Customer),
}

/// Outcome of an order submission.
#[derive(Debug)]
pub enum Submission {
    /// The order was placed; terminal.
    Confirmed(OrderRef),
    /// Validation or submission failed; re-render the form.
    Rejected {
        form: FormData,
        notice: Notice,
    },
}

/// Redirect guards shared by the checkout page and the order POST.
///
/// Returns the redirect target when a guard trips, `None` to proceed.
/// Guards never error; an anonymous visitor or an empty cart is normal
/// control flow.
#[must_use]
pub fn guard(user: Option<&CurrentUser>, cart: &Cart) -> Option<String> {
    if user.is_none() {
        let return_to = urlencoding::encode(CHECKOUT_PATH);
        return Some(format!("/auth/login?return_to={return_to}"));
    }

    if cart.is_empty() {
        return Some("/cart".to_owned());
    }

    None
}

/// Run the guards and profile resolution for the checkout page.
pub async fn prepare<P: ProfileStore>(
    profiles: &P,
    user: Option<&CurrentUser>,
    cart: &Cart,
) -> CheckoutView {
    // Guards run first; a redirect short-circuits everything else.
    if let Some(target) = guard(user, cart) {
        return CheckoutView::Redirect(target);
    }

    // Guard passed, so a user is present.
    let Some(user) = user else {
        return CheckoutView::Redirect("/auth/login".to_owned());
    };

    match resolve_profile(profiles, user).await {
        Ok(ResolvedProfile::Existing(customer)) => CheckoutView::Form {
            form: FormData::from_customer(&customer),
            notice: None,
        },
        Ok(ResolvedProfile::Created(customer)) => CheckoutView::Form {
            form: FormData::from_customer(&customer),
            notice: Some(Notice::info(
                "Profile Created",
                "We saved your contact details for future orders.",
            )),
        },
        Err(e) => {
            tracing::error!(user_id = %user.id, "failed to resolve customer profile: {e}");
            CheckoutView::Form {
                form: FormData::default(),
                notice: Some(Notice::destructive(
                    "Could Not Load Your Details",
                    "We couldn't load your saved information. You can still fill in the form below.",
                )),
            }
        }
    }
}

/// Fetch the customer profile for a user, creating one on first checkout.
///
/// # Errors
///
/// Returns `RepositoryError` if the read or the create fails.
pub async fn resolve_profile<P: ProfileStore>(
    profiles: &P,
    user: &CurrentUser,
) -> Result<ResolvedProfile, RepositoryError> {
    if let Some(existing) = profiles.find_by_user(user.id).await? {
        return Ok(ResolvedProfile::Existing(existing));
    }

    // Seed the new profile from session metadata.
    let seeded = NewCustomer {
        user_id: user.id,
        full_name: user.full_name.clone().unwrap_or_default(),
        email: user.email.to_string(),
        phone: String::new(),
    };

    match profiles.create_profile(&seeded).await? {
        CreateOutcome::Created(customer) => Ok(ResolvedProfile::Created(customer)),
        CreateOutcome::AlreadyExists(customer) => Ok(ResolvedProfile::Existing(customer)),
    }
}

/// Validate and submit the checkout form.
///
/// On confirmation the cart is emptied; a rejected submission leaves it
/// untouched so the form can be corrected and resubmitted.
pub async fn submit<G: OrderGateway>(
    gateway: &G,
    user: &CurrentUser,
    cart: &mut Cart,
    form: FormData,
    tax_rate: Decimal,
) -> Submission {
    if let Err(reason) = validate(&form) {
        return Submission::Rejected {
            notice: Notice::destructive("Check Your Details", reason),
            form,
        };
    }

    let draft = build_draft(user, cart, &form, tax_rate);

    match gateway.submit(&draft).await {
        Ok(order_ref) => {
            cart.clear();
            Submission::Confirmed(order_ref)
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, "order submission failed: {e}");
            Submission::Rejected {
                form,
                notice: Notice::destructive(
                    "Order Failed",
                    "We couldn't place your order. Please try again.",
                ),
            }
        }
    }
}

/// Tax charged on a subtotal, rounded to cents.
#[must_use]
pub fn tax_amount(subtotal: Decimal, tax_rate: Decimal) -> Decimal {
    (subtotal * tax_rate).round_dp(2)
}

fn validate(form: &FormData) -> Result<(), String> {
    if form.full_name.trim().is_empty() {
        return Err("Full name is required.".to_owned());
    }
    if let Err(e) = Email::parse(form.email.trim()) {
        return Err(format!("Invalid email address: {e}."));
    }
    Ok(())
}

fn build_draft(user: &CurrentUser, cart: &Cart, form: &FormData, tax_rate: Decimal) -> OrderDraft {
    let subtotal = cart.subtotal();
    let tax = tax_amount(subtotal, tax_rate);

    OrderDraft {
        user_id: user.id,
        contact: ContactDetails {
            full_name: form.full_name.trim().to_owned(),
            email: form.email.trim().to_owned(),
            phone: form.phone.trim().to_owned(),
        },
        notes: form.notes.clone(),
        delivery_date: form.delivery_date,
        items: cart
            .items
            .iter()
            .map(|item| OrderLine {
                sku: item.sku.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect(),
        subtotal,
        tax_amount: tax,
        total: subtotal + tax,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use tangelo_core::{CustomerId, UserId};

    use super::*;
    use crate::services::orders::OrderError;

    fn test_user(full_name: Option<&str>) -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            email: Email::parse("ada@example.com").unwrap(),
            full_name: full_name.map(str::to_owned),
        }
    }

    fn stored_customer() -> Customer {
        Customer {
            id: CustomerId::new(10),
            user_id: UserId::new(1),
            full_name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart_with_item() -> Cart {
        let mut cart = Cart::empty();
        cart.add(
            "TEA-001".into(),
            "Green Tea".into(),
            "4.50".parse().unwrap(),
            2,
        );
        cart
    }

    fn valid_form() -> FormData {
        FormData {
            full_name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            notes: String::new(),
            delivery_date: None,
        }
    }

    /// In-memory [`ProfileStore`] with call counting.
    struct FakeProfiles {
        existing: Option<Customer>,
        fail: bool,
        creates: AtomicUsize,
    }

    impl FakeProfiles {
        fn with_existing(customer: Customer) -> Self {
            Self {
                existing: Some(customer),
                fail: false,
                creates: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                existing: None,
                fail: false,
                creates: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                existing: None,
                fail: true,
                creates: AtomicUsize::new(0),
            }
        }

        fn create_count(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }
    }

    impl ProfileStore for FakeProfiles {
        async fn find_by_user(
            &self,
            _user_id: UserId,
        ) -> Result<Option<Customer>, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            Ok(self.existing.clone())
        }

        async fn create_profile(
            &self,
            new: &NewCustomer,
        ) -> Result<CreateOutcome, RepositoryError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(CreateOutcome::Created(Customer {
                id: CustomerId::new(99),
                user_id: new.user_id,
                full_name: new.full_name.clone(),
                email: new.email.clone(),
                phone: new.phone.clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        }
    }

    /// [`OrderGateway`] that records the submitted draft.
    struct FakeGateway {
        order_ref: Option<&'static str>,
        submitted: Mutex<Option<OrderDraft>>,
    }

    impl FakeGateway {
        fn succeeding(order_ref: &'static str) -> Self {
            Self {
                order_ref: Some(order_ref),
                submitted: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                order_ref: None,
                submitted: Mutex::new(None),
            }
        }
    }

    impl OrderGateway for FakeGateway {
        async fn submit(&self, draft: &OrderDraft) -> Result<OrderRef, OrderError> {
            *self.submitted.lock().unwrap() = Some(draft.clone());
            self.order_ref
                .map(OrderRef::new)
                .ok_or(OrderError::Status(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    // -------------------------------------------------------------------
    // Guards
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn anonymous_visitor_is_sent_to_login_with_return_path() {
        let profiles = FakeProfiles::empty();
        let view = prepare(&profiles, None, &cart_with_item()).await;

        match view {
            CheckoutView::Redirect(path) => {
                assert_eq!(path, "/auth/login?return_to=%2Fcheckout");
            }
            CheckoutView::Form { .. } => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn anonymous_visitor_redirects_even_with_empty_cart() {
        let profiles = FakeProfiles::empty();
        let view = prepare(&profiles, None, &Cart::empty()).await;

        match view {
            CheckoutView::Redirect(path) => assert!(path.starts_with("/auth/login")),
            CheckoutView::Form { .. } => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn empty_cart_redirects_to_cart_page() {
        let profiles = FakeProfiles::with_existing(stored_customer());
        let user = test_user(Some("Ada Lovelace"));
        let view = prepare(&profiles, Some(&user), &Cart::empty()).await;

        match view {
            CheckoutView::Redirect(path) => assert_eq!(path, "/cart"),
            CheckoutView::Form { .. } => panic!("expected redirect"),
        }
    }

    // -------------------------------------------------------------------
    // Profile resolution
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn first_checkout_creates_profile_exactly_once() {
        let profiles = FakeProfiles::empty();
        let user = test_user(Some("Ada Lovelace"));
        let view = prepare(&profiles, Some(&user), &cart_with_item()).await;

        assert_eq!(profiles.create_count(), 1);
        match view {
            CheckoutView::Form { form, notice } => {
                assert_eq!(form.full_name, "Ada Lovelace");
                assert_eq!(form.email, "ada@example.com");
                assert_eq!(form.phone, "");
                let notice = notice.expect("created profile shows a notice");
                assert!(!notice.is_destructive());
            }
            CheckoutView::Redirect(_) => panic!("expected form"),
        }
    }

    #[tokio::test]
    async fn missing_display_name_seeds_blank_full_name() {
        let profiles = FakeProfiles::empty();
        let user = test_user(None);
        let resolved = resolve_profile(&profiles, &user).await.unwrap();

        match resolved {
            ResolvedProfile::Created(customer) => assert_eq!(customer.full_name, ""),
            ResolvedProfile::Existing(_) => panic!("expected created profile"),
        }
    }

    #[tokio::test]
    async fn existing_profile_skips_create_and_fills_form() {
        let profiles = FakeProfiles::with_existing(stored_customer());
        let user = test_user(Some("Ada Lovelace"));
        let view = prepare(&profiles, Some(&user), &cart_with_item()).await;

        assert_eq!(profiles.create_count(), 0);
        match view {
            CheckoutView::Form { form, notice } => {
                assert_eq!(form, FormData::from_customer(&stored_customer()));
                assert!(notice.is_none());
            }
            CheckoutView::Redirect(_) => panic!("expected form"),
        }
    }

    #[tokio::test]
    async fn raced_create_resolves_to_existing_profile() {
        struct RacedProfiles;

        impl ProfileStore for RacedProfiles {
            async fn find_by_user(
                &self,
                _user_id: UserId,
            ) -> Result<Option<Customer>, RepositoryError> {
                Ok(None)
            }

            async fn create_profile(
                &self,
                _new: &NewCustomer,
            ) -> Result<CreateOutcome, RepositoryError> {
                Ok(CreateOutcome::AlreadyExists(stored_customer()))
            }
        }

        let user = test_user(Some("Ada Lovelace"));
        let resolved = resolve_profile(&RacedProfiles, &user).await.unwrap();
        assert!(matches!(resolved, ResolvedProfile::Existing(_)));
    }

    #[tokio::test]
    async fn profile_failure_degrades_to_defaults_with_destructive_notice() {
        let profiles = FakeProfiles::failing();
        let user = test_user(Some("Ada Lovelace"));
        let view = prepare(&profiles, Some(&user), &cart_with_item()).await;

        assert_eq!(profiles.create_count(), 0);
        match view {
            CheckoutView::Form { form, notice } => {
                assert_eq!(form, FormData::default());
                assert!(notice.expect("failure shows a notice").is_destructive());
            }
            CheckoutView::Redirect(_) => panic!("expected form"),
        }
    }

    // -------------------------------------------------------------------
    // Submission
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn successful_submission_confirms_and_clears_the_cart() {
        let gateway = FakeGateway::succeeding("ord_123");
        let user = test_user(Some("Ada Lovelace"));
        let mut cart = cart_with_item();
        let outcome = submit(&gateway, &user, &mut cart, valid_form(), "0.10".parse().unwrap())
            .await;

        match outcome {
            Submission::Confirmed(order_ref) => assert_eq!(order_ref.as_str(), "ord_123"),
            Submission::Rejected { .. } => panic!("expected confirmation"),
        }
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn draft_carries_cart_totals_and_tax() {
        let gateway = FakeGateway::succeeding("ord_123");
        let user = test_user(Some("Ada Lovelace"));
        let mut cart = cart_with_item();
        let _ = submit(&gateway, &user, &mut cart, valid_form(), "0.10".parse().unwrap()).await;

        let draft = gateway.submitted.lock().unwrap().clone().unwrap();
        assert_eq!(draft.subtotal, "9.00".parse::<Decimal>().unwrap());
        assert_eq!(draft.tax_amount, "0.90".parse::<Decimal>().unwrap());
        assert_eq!(draft.total, "9.90".parse::<Decimal>().unwrap());
        assert_eq!(draft.items.len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_rejects_and_keeps_form_values() {
        let gateway = FakeGateway::failing();
        let user = test_user(Some("Ada Lovelace"));
        let mut cart = cart_with_item();
        let outcome = submit(&gateway, &user, &mut cart, valid_form(), "0.10".parse().unwrap())
            .await;

        match outcome {
            Submission::Rejected { form, notice } => {
                assert_eq!(form, valid_form());
                assert!(notice.is_destructive());
            }
            Submission::Confirmed(_) => panic!("expected rejection"),
        }
        // The cart survives a failed submission for the retry.
        assert!(!cart.is_empty());
    }

    #[tokio::test]
    async fn blank_full_name_is_rejected_before_submission() {
        let gateway = FakeGateway::succeeding("ord_123");
        let user = test_user(Some("Ada Lovelace"));
        let mut form = valid_form();
        form.full_name = "   ".to_owned();

        let mut cart = cart_with_item();
        let outcome = submit(&gateway, &user, &mut cart, form, Decimal::ZERO).await;

        assert!(gateway.submitted.lock().unwrap().is_none());
        assert!(matches!(outcome, Submission::Rejected { .. }));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_before_submission() {
        let gateway = FakeGateway::succeeding("ord_123");
        let user = test_user(Some("Ada Lovelace"));
        let mut form = valid_form();
        form.email = "not-an-email".to_owned();

        let mut cart = cart_with_item();
        let outcome = submit(&gateway, &user, &mut cart, form, Decimal::ZERO).await;

        assert!(gateway.submitted.lock().unwrap().is_none());
        assert!(matches!(outcome, Submission::Rejected { .. }));
    }

    #[test]
    fn tax_rounds_to_cents() {
        let tax = tax_amount("9.99".parse().unwrap(), "0.10".parse().unwrap());
        assert_eq!(tax, "1.00".parse::<Decimal>().unwrap());
    }
}
