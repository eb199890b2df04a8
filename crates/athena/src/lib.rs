pub mod client;
pub mod config;
pub mod credentials;
pub mod decode;
pub mod engine;
pub mod error;
pub mod location;
pub mod status;
pub mod store;
pub mod table;

pub use client::AthenaClient;
pub use config::AthenaConfig;
pub use credentials::{Credentials, SecretString};
pub use decode::{decode_csv, DecodedCsv};
pub use engine::{AthenaEngine, QueryEngine, Submission};
pub use error::AthenaError;
pub use location::ResultLocation;
pub use status::{ExecutionStatus, QueryStatus};
pub use store::{ResultStore, S3ResultStore};
pub use table::{QueryMetadata, ResultTable, TableColumn};
