pub mod category;
pub mod filters;
pub mod transaction;

pub use category::{Category, CategoryRequest};
pub use filters::TransactionFilter;
pub use transaction::{
    PersonType, Transaction, TransactionRequest, TransactionStatus, TransactionType,
};
