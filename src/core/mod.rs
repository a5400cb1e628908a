pub mod app;
pub mod auth;
pub mod cart;
pub mod city;
pub mod guard;

pub use crate::domain::model::{
    AuthSnapshot, CartLineItem, CartSummary, CartTotals, CatalogService, City, Role, Session,
};
pub use crate::domain::ports::{CatalogSource, KeyValueStore, Router, SessionResolver};
pub use crate::utils::error::Result;
