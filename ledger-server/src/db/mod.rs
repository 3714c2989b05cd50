//! Database layer: repository interfaces and the in-memory implementations

pub mod memory;
pub mod repository;

pub use memory::{InMemoryCustomerRepository, InMemoryDailyStatRepository, InMemoryOrderRepository};
pub use repository::{
    CustomerRepository, DailyStatRepository, OrderRepository, RepoError, RepoResult,
};
