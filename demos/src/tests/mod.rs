mod approach;
mod sync;
mod test_runner;

pub use test_runner::run;

/// Converts millimetres to the position unit of the positioner.
pub type Scale = fn(f64) -> anc350::prelude::Position;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
