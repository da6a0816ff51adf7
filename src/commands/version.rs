//! Command: print version information.

/// Version string embedded by the build script.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTMOUNT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the dotmount version to stdout.
pub fn run() {
    println!("dotmount {}", version());
}
