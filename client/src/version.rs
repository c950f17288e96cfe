/// The listing client version.
///
/// In development builds, this defaults to the workspace Cargo package version. Release builds
/// can inject the tag version via the `LISTING_VERSION` environment variable so a release can be
/// cut by tagging without editing `Cargo.toml`.
pub const LISTING_VERSION: &str = match option_env!("LISTING_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
