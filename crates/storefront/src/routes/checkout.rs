//! Checkout route handlers.
//!
//! `GET /checkout` runs the redirect guards, resolves the customer profile
//! into form defaults, and renders the checkout form. `POST /checkout`
//! submits the order; on success the cart is cleared and the confirmation
//! view renders with the order reference.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::customers::CustomerRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Cart, Notice};
use crate::routes::cart::{CartView, format_price, load_cart, save_cart};
use crate::services::checkout::{self, CheckoutView, FormData, Submission};
use crate::state::AppState;

/// Checkout form page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutFormTemplate {
    pub form: FormData,
    pub notice: Option<Notice>,
    pub cart: CartView,
    pub subtotal: String,
    pub tax_amount: String,
    pub total: String,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_ref: String,
}

/// Checkout form submission data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub delivery_date: Option<NaiveDate>,
}

impl From<CheckoutForm> for FormData {
    fn from(form: CheckoutForm) -> Self {
        Self {
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            notes: form.notes,
            delivery_date: form.delivery_date,
        }
    }
}

/// Deserialize an HTML date input, treating the empty string as `None`.
fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Render the checkout form with order summary totals.
fn form_response(
    state: &AppState,
    cart: &Cart,
    form: FormData,
    notice: Option<Notice>,
) -> Response {
    let subtotal = cart.subtotal();
    let tax = checkout::tax_amount(subtotal, state.config().tax_rate);

    CheckoutFormTemplate {
        form,
        notice,
        cart: CartView::from(cart),
        subtotal: format_price(subtotal),
        tax_amount: format_price(tax),
        total: format_price(subtotal + tax),
    }
    .into_response()
}

/// Display the checkout page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response, AppError> {
    let cart = load_cart(&session).await?;
    let profiles = CustomerRepository::new(state.pool());

    Ok(match checkout::prepare(&profiles, user.as_ref(), &cart).await {
        CheckoutView::Redirect(target) => Redirect::to(&target).into_response(),
        CheckoutView::Form { form, notice } => form_response(&state, &cart, form, notice),
    })
}

/// Submit the checkout form and place the order.
#[instrument(skip(state, session, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, AppError> {
    let mut cart = load_cart(&session).await?;

    // The guards apply to the POST as well: a stale tab can submit after
    // logout or after the cart was emptied elsewhere.
    if let Some(target) = checkout::guard(user.as_ref(), &cart) {
        return Ok(Redirect::to(&target).into_response());
    }
    let Some(user) = user else {
        return Ok(Redirect::to("/auth/login").into_response());
    };

    let outcome = checkout::submit(
        state.orders(),
        &user,
        &mut cart,
        FormData::from(form),
        state.config().tax_rate,
    )
    .await;

    Ok(match outcome {
        Submission::Confirmed(order_ref) => {
            // `submit` emptied the cart on confirmation; persist that. The
            // order is already placed, so show the confirmation even if the
            // session write fails and let the next cart read surface it.
            if let Err(e) = save_cart(&session, &cart).await {
                tracing::error!("Failed to clear cart after order: {e}");
            }

            ConfirmationTemplate {
                order_ref: order_ref.into_inner(),
            }
            .into_response()
        }
        Submission::Rejected { form, notice } => {
            form_response(&state, &cart, form, Some(notice))
        }
    })
}
