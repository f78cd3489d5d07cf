//! Voice output seam

use tracing::info;

/// Speaks short status lines to the user.
///
/// Implementations must not block the caller for the length of the speech.
pub trait Announcer: Send + Sync {
    fn announce(&self, text: &str);
}

/// Announcer that writes to the log instead of a speaker
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnnouncer;

impl Announcer for TracingAnnouncer {
    fn announce(&self, text: &str) {
        info!(target: "tazanet::voice", text, "Announcement");
    }
}
