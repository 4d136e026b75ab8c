pub mod connection;
pub mod mongo;
pub mod store;

pub use mongo::MongoStore;
pub use store::Store;
