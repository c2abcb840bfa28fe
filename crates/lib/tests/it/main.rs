/*! Integration tests for formweave.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - path: Tests for path arithmetic
 * - scope: Tests for ScopedForm and FieldContext over a MemoryStore
 * - list: Tests for keyed list controllers and listeners
 * - resolve: Tests for dependency-graph resolution
 * - schema: Tests for schema compilation
 * - render: Tests for binding view trees to a store
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("formweave=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod path;
mod render;
mod schema;
mod scope;
