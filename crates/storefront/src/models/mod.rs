//! Domain models for storefront.

pub mod cart;
pub mod customer;
pub mod notice;
pub mod session;

pub use cart::{Cart, CartItem};
pub use customer::{Customer, NewCustomer};
pub use notice::{Notice, NoticeVariant};
pub use session::{CurrentUser, keys as session_keys};
