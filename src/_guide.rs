/*!

Tutorials, overviews, and etc... for the `diffstress` crate.

All the documentation that isn't API reference.

# Table of Contents

* [Token Expressions][token_syntax]
* [Instrumented Builds and Their Fallbacks][instrumentation]
* [Cargo Features][cargo_features]
* [Minimum Supported Rust Version][msrv]

 */

pub mod cargo_features;
pub mod instrumentation;
pub mod msrv;
pub mod token_syntax;
