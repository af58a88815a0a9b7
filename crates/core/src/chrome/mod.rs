//! Chrome backend: executable discovery, process launch with remote
//! debugging, and a CDP-backed [`BrowserSession`](crate::browser::BrowserSession).

mod finder;
mod launcher;
mod probe;
mod session;

pub use finder::find_chrome_executable;
pub use launcher::{ChromeLauncher, ChromeProcess, launch_chrome};
pub use probe::fetch_cdp_endpoint;
pub use session::CdpSession;
