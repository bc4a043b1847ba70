//! Worksheet settings.

use std::sync::Arc;

use reckon_eval::{EngineConfig, EngineConfigBuilder};
use reckon_parse::MutatorHeuristic;

/// Stack size of the background execution thread.
pub const DEFAULT_WORKER_STACK: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct SheetConfig {
    engine: EngineConfig,
    background: bool,
    worker_stack: usize,
}

impl SheetConfig {
    pub fn builder() -> SheetConfigBuilder {
        SheetConfigBuilder::default()
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Run calculations on a worker thread.
    pub fn background(&self) -> bool {
        self.background
    }

    pub fn worker_stack(&self) -> usize {
        self.worker_stack
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig::builder().build()
    }
}

/// Consuming builder for [`SheetConfig`].
#[derive(Debug, Default)]
pub struct SheetConfigBuilder {
    engine: EngineConfigBuilder,
    background: bool,
    worker_stack: Option<usize>,
}

impl SheetConfigBuilder {
    /// Method-name prefixes treated as non-mutating.
    #[must_use]
    pub fn getter_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine = self.engine.getter_prefixes(prefixes);
        self
    }

    #[must_use]
    pub fn heuristic(mut self, heuristic: Arc<dyn MutatorHeuristic>) -> Self {
        self.engine = self.engine.heuristic(heuristic);
        self
    }

    #[must_use]
    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.engine = self.engine.recursion_limit(limit);
        self
    }

    #[must_use]
    pub fn background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn worker_stack(mut self, bytes: usize) -> Self {
        self.worker_stack = Some(bytes);
        self
    }

    pub fn build(self) -> SheetConfig {
        SheetConfig {
            engine: self.engine.build(),
            background: self.background,
            worker_stack: self.worker_stack.unwrap_or(DEFAULT_WORKER_STACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_eval::DEFAULT_RECURSION_LIMIT;

    #[test]
    fn defaults() {
        let config = SheetConfig::default();
        assert!(!config.background());
        assert_eq!(config.engine().recursion_limit(), DEFAULT_RECURSION_LIMIT);
        assert!(!config.engine().heuristic().is_mutator("get_x"));
        assert!(config.engine().heuristic().is_mutator("append"));
    }

    #[test]
    fn overrides() {
        let config = SheetConfig::builder()
            .getter_prefixes(["peek"])
            .recursion_limit(50)
            .background(true)
            .build();
        assert!(config.background());
        assert_eq!(config.engine().recursion_limit(), 50);
        assert!(!config.engine().heuristic().is_mutator("peek_top"));
        assert!(config.engine().heuristic().is_mutator("get_x"));
    }
}
