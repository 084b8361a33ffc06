//! Runtime management for socket tasks.
//!
//! Socket sessions spawn their connection and timer tasks on the ambient
//! tokio runtime when one is running. Applications that drive a session from
//! synchronous code get a small shared runtime instead, created on first use.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Initialize the shared runtime.
///
/// # Panics
///
/// Panics if the operating system refuses to create the runtime threads.
pub fn init() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("catline-net")
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime")
    })
}

/// Handle of the runtime socket tasks run on.
///
/// Prefers the runtime the caller is already inside of.
pub fn handle() -> Handle {
    Handle::try_current().unwrap_or_else(|_| init().handle().clone())
}

/// Spawn a future on the current runtime, or the shared one outside of any runtime.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    handle().spawn(future)
}
