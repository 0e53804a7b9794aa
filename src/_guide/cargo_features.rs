/*!

# Cargo Features

* **`cli`** (enabled by default): Build the `diffstress` binary, with
  [`clap`](https://docs.rs/clap) for argument parsing and
  [`env_logger`](https://docs.rs/env_logger) printing the library's
  [`log`](https://docs.rs/log) records. Library users can turn it off with
  `default-features = false`.

 */
