//! # Survey client
//!
//! Off-chain side of the confidential satisfaction survey:
//!
//! - [`SubmissionClient`] validates a rating, encrypts it together with a
//!   constant `1` for the survey contract and submits both in one
//!   transaction.
//! - [`AggregateReader`] fetches the encrypted `(total, count)` handles for
//!   Global and one department and reveals them for an authorized viewer
//!   behind a single decryption authorization.
//!
//! Both are generic over the [`gateway`] traits. [`LocalLedgerGateway`]
//! implements them against an in-process Soroban environment.
//!
//! The crate emits `tracing` events; installing a subscriber is up to the
//! embedding binary.

pub mod config;
pub mod error;
pub mod gateway;
pub mod local;
pub mod reader;
pub mod submission;

pub use config::{ClientConfig, Department};
pub use error::ClientError;
pub use gateway::{
    DecryptAuthorization, DecryptionGateway, InputEncryptor, ScopeHandles, SubmissionReceipt,
    SurveyLedger,
};
pub use local::LocalLedgerGateway;
pub use reader::{AggregateReader, AggregateView, ScopeReading, SurveyResults};
pub use submission::SubmissionClient;
