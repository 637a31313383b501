use std::{future::Future, sync::Once};

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a subscriber writing through the test harness, once per test binary. `RUST_LOG`
/// overrides the default `debug` filter.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Drive `future` to completion on a fresh runtime. Used inside law equality closures, which
/// are synchronous.
pub fn block_on<F: Future>(future: F) -> F::Output {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(future)
}
