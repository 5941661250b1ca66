//! # Repository Module
//!
//! Database repository implementations for Kasir POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.transactions().checkout(&items)                            │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── checkout(&self, items)  ──► product::lookup / decrement_stock     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── list(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, inventory primitives
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`TransactionRepository`](transaction::TransactionRepository) - Checkout and history

pub mod category;
pub mod product;
pub mod transaction;
