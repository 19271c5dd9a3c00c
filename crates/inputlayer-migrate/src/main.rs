//! inputlayer-migrate CLI
//!
//! Standalone binary for managing InputLayer migrations. `migrate`,
//! `revert`, and `showmigrations` work directly against a server;
//! `makemigrations` needs the application's models, so applications
//! embed the CLI via `cli::run_with_models` instead.

fn main() {
    std::process::exit(inputlayer_migrate::cli::run_with_models(None));
}
