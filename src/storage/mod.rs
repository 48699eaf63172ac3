pub mod pocketbase;
pub mod records;

pub use pocketbase::{CatalogError, ListQuery, PocketBaseClient};
pub use records::{Equivalence, EquivalenceExpand, Product, Record};
