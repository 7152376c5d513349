use std::sync::Arc;

/// Logging verbosity threaded through the pipeline; translates directly
/// to a `log` level rather than a bespoke message sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Error,
            Verbosity::Normal => log::LevelFilter::Info,
            Verbosity::Verbose => log::LevelFilter::Debug,
            Verbosity::Debug => log::LevelFilter::Trace,
        }
    }
}

/// Execution context threaded through every pipeline stage: a thread-pool
/// handle and the verbosity level, so library code never reaches for
/// global mutable state.
///
/// Binaries embedding this core install their own `log` subscriber
/// (`env_logger` or equivalent); `Context` only emits log records through
/// the facade and owns the rayon thread pool the parallel regions run on.
pub struct Context {
    pub verbosity: Verbosity,
    pool: Arc<rayon::ThreadPool>,
}

impl Context {
    /// Builds a context with a thread pool sized to `threads` (`0` means
    /// auto-detect the processor count, rayon's own default).
    pub fn new(verbosity: Verbosity, threads: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("thread pool construction with a validated thread count cannot fail");
        Context {
            verbosity,
            pool: Arc::new(pool),
        }
    }

    /// Runs `f` inside this context's thread pool, so any `rayon`
    /// parallel iterator `f` spawns is scheduled on it rather than the
    /// global default pool.
    pub fn install<R>(&self, f: impl FnOnce() -> R) -> R {
        self.pool.install(f)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Verbosity::Normal, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_install_runs_closure() {
        let ctx = Context::new(Verbosity::Normal, 2);
        let result = ctx.install(|| 2 + 2);
        assert_eq!(result, 4);
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Debug);
    }
}
