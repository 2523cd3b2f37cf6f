//! Bookkeeping backend for financial transactions: REST CRUD over
//! transactions and categories, a status-gated record lifecycle, rich
//! list filtering, and PDF/Excel report export.

pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
