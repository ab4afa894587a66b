// # Fetcher Trait
//
// Defines the interface for retrieving the watched document.
//
// ## Implementations
//
// - HTTP(S): `pagewatch-fetch-http` crate
//
// ## Usage
//
// ```rust,ignore
// use pagewatch_core::Fetcher;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let fetcher = /* Fetcher implementation */;
//
//     let content = fetcher.fetch("https://example.com/status").await?;
//     println!("{} bytes", content.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for document fetcher implementations
///
/// # Responsibilities
///
/// - Retrieve the raw textual content of one target per call
/// - Bound each call with a timeout so a hung server cannot stall the monitor
/// - Report any failure (transport, status, decoding) as an `Err`
///
/// # Not Responsible For
///
/// - Retrying: the next scheduled cycle is the retry
/// - Extracting, fingerprinting, or comparing content (owned by `Monitor`)
/// - Scheduling or spawning tasks
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the current content of `target`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The document body
    /// - `Err(Error)`: If the document could not be retrieved
    async fn fetch(&self, target: &str) -> Result<String, crate::Error>;

    /// Get the fetcher name (for logging/debugging)
    fn fetcher_name(&self) -> &'static str;
}
