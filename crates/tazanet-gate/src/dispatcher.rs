//! Search dispatch seam

use tazanet_core::{Error, Result};
use tracing::info;
use url::Url;

/// Opens an allowed search for the user
pub trait SearchDispatcher: Send + Sync {
    fn open(&self, url: &Url) -> Result<()>;
}

/// Opens the search in the system's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDispatcher;

impl SearchDispatcher for BrowserDispatcher {
    fn open(&self, url: &Url) -> Result<()> {
        webbrowser::open(url.as_str())
            .map_err(|e| Error::internal(format!("failed to open browser: {}", e)))?;
        info!(url = %url, "Search opened");
        Ok(())
    }
}

/// Dispatcher that only logs the URL, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

impl SearchDispatcher for LogDispatcher {
    fn open(&self, url: &Url) -> Result<()> {
        info!(url = %url, "Search dispatched");
        Ok(())
    }
}
