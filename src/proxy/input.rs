//! Validation of uploaded proxy lists before a run starts

use crate::proxy::models::Proxy;
use crate::proxy::parser::ProxyParser;
use thiserror::Error;

/// Default maximum number of proxies accepted per upload
pub const DEFAULT_MAX_PROXIES: usize = 500;

/// Default maximum upload size in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024;

/// Rejections reported straight back to the requester
///
/// The `Display` text is the reply sent to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("❌ Please send a plain text file (.txt)")]
    NotPlainText,
    #[error("❌ File too large. Maximum size is {}KB", .max / 1024)]
    FileTooLarge { size: u64, max: u64 },
    #[error("No valid proxies found in the file. Please check the format.")]
    NoValidProxies,
    #[error("Too many proxies ({count}). Maximum allowed is {max}.")]
    TooManyProxies { count: usize, max: usize },
}

/// Check upload metadata before downloading anything
///
/// A file is accepted as text when either its MIME type mentions
/// `text/plain` or its name ends in `.txt`.
pub fn validate_upload(
    file_name: Option<&str>,
    mime_type: Option<&str>,
    size: u64,
    max_size: u64,
) -> Result<(), InputError> {
    let is_text = mime_type.is_some_and(|m| m.contains("text/plain"))
        || file_name.is_some_and(|n| n.ends_with(".txt"));
    if !is_text {
        return Err(InputError::NotPlainText);
    }
    if size > max_size {
        return Err(InputError::FileTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Parse uploaded text and enforce the candidate limits
pub fn load_candidates(content: &str, max_proxies: usize) -> Result<Vec<Proxy>, InputError> {
    let proxies = ProxyParser::parse_string(content);
    if proxies.is_empty() {
        return Err(InputError::NoValidProxies);
    }
    if proxies.len() > max_proxies {
        return Err(InputError::TooManyProxies {
            count: proxies.len(),
            max: max_proxies,
        });
    }
    Ok(proxies)
}
