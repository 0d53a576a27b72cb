//! Proxy module for parsing and checking uploaded proxy lists
//!
//! This module provides functionality for:
//! - Parsing proxies from `HOST:PORT` and `HOST,PORT,COUNTRY,ISP` lines
//! - Validating uploads and enforcing candidate limits
//! - Asking a remote liveness API about each proxy
//! - Checking whole lists in paced, concurrent batches with throttled progress
//! - Rendering active and dead proxies into separate files

pub mod checker;
pub mod clock;
pub mod input;
pub mod models;
pub mod parser;
pub mod report;
pub mod verifier;

pub use checker::{CheckApi, CheckError, CheckerConfig, HttpCheckApi, ProxyChecker, DEFAULT_API_URL};
pub use clock::{Clock, TokioClock};
pub use input::{load_candidates, validate_upload, InputError};
pub use models::{CheckResponse, Proxy, ProxyCheckResult, ProxyStatus};
pub use parser::ProxyParser;
pub use report::{VerificationReport, ACTIVE_FILE_NAME, DEAD_FILE_NAME};
pub use verifier::{BatchVerifier, NoProgress, ProgressSink, ProgressUpdate, VerifierConfig};
