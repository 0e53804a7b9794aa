// XXX: Keep this documented MSRV in sync with the `rust-version` in
// `Cargo.toml`.

/*!

# Minimum Supported Rust Version

The minimum supported Rust version (MSRV) is currently **1.80.0**.

The MSRV will never be increased in a patch release, but may be increased in a
minor release. We will aim to avoid doing so without good reason.

 */
