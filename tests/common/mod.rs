//! Common test utilities and helpers


/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::{debug, info};

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            // Another test harness may already have installed a subscriber
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("rust_momentum=debug,main=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }

    /// Log test data
    pub fn log_test_data<T: std::fmt::Debug>(label: &str, data: &T) {
        debug!("📊 {}: {:?}", label, data);
    }
}
