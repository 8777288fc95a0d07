//! Persistent stores, one per component, all backed by the shared pool.
//!
//! Every check-then-mutate path is expressed either as a single conditional
//! UPDATE or as a transaction whose UPDATEs repeat the guard in the WHERE
//! clause, so concurrent requests cannot oversell stock or overdraw wallets.

mod account;
mod catalog;
mod review;
mod sales;

pub use account::{AccountStore, NewCustomer, UpdateCustomer};
pub use catalog::{CatalogStore, GoodSummary, NewGood, UpdateGood};
pub use review::{CustomerReview, NewReview, ReviewDetails, ReviewStore};
pub use sales::{PurchaseRecord, SaleReceipt, SaleStore};
