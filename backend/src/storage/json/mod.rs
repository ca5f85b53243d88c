//! JSON-file document store: one file per collection, atomic replacement on
//! every write, a single lock serializing conflicting writers.

pub mod connection;
pub mod member_repository;
pub mod suggestion_repository;

pub use connection::JsonConnection;
pub use member_repository::MemberRepository;
pub use suggestion_repository::SuggestionRepository;
