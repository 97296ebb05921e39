//! Completion callbacks
//!
//! For callers that want a `(error, data)` style notification in addition to
//! the returned result.

use std::future::Future;

use crate::error::FutarError;

/// Await `future`, hand its outcome to `callback` once, and return it
///
/// ```rust,ignore
/// use futar_client::{FutarApi, callback};
///
/// let alerts = callback::complete(client.alert_search(Default::default()), |outcome| {
///     if let Err(e) = outcome {
///         tracing::warn!(error = %e, "alert lookup failed");
///     }
/// })
/// .await?;
/// ```
pub async fn complete<T, F, C>(future: F, callback: C) -> Result<T, FutarError>
where
    F: Future<Output = Result<T, FutarError>>,
    C: FnOnce(Result<&T, &FutarError>),
{
    let result = future.await;
    callback(result.as_ref());
    result
}
