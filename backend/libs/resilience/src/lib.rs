/// Resilience helpers shared by the pipeline services
///
/// Currently limited to deadlines: every call into storage or an external tool is
/// bounded so a hung dependency turns into an ordinary, reportable failure.
///
/// ```rust,no_run
/// use resilience::with_timeout_result;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let result = with_timeout_result("store video", Duration::from_secs(120), async {
///         Ok::<_, std::io::Error>(())
///     })
///     .await;
/// }
/// ```
pub mod timeout;

pub use timeout::{with_timeout, with_timeout_result, Elapsed, TimeoutError};
