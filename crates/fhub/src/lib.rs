//! Facade crate for `FileHub` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement
//! business logic.
//!
//! ## Usage
//! - Add `fhub` with the `server` feature flag.
//! - Call [`init`] to register feature slices, then merge [`server::router`]
//!   routers into the application.

pub use fhub_domain as domain;
pub use fhub_kernel as kernel;
pub use fhub_vfs as vfs;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use fhub_kernel::server::router::system_router;

        pub use fhub_browse::router as browse_router;
        pub use fhub_share::router as share_router;
        pub use fhub_transfer::router as transfer_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "server")]
    pub use fhub_browse as browse;
    #[cfg(feature = "server")]
    pub use fhub_share as share;
    #[cfg(feature = "server")]
    pub use fhub_transfer as transfer;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "server")]
        "server",
        #[cfg(feature = "server")]
        "browse",
        #[cfg(feature = "server")]
        "transfer",
        #[cfg(feature = "server")]
        "share",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features for server mode.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[cfg(feature = "server")]
pub fn init() -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Directory and file management
    slices.push(features::browse::init()?);

    // Resumable uploads
    slices.push(features::transfer::init()?);

    // Share links
    slices.push(features::share::init()?);

    Ok(slices)
}
