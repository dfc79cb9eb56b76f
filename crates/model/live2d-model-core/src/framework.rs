//! Explicit framework lifecycle.
//!
//! One context per host. Models are only constructed against a context that has been
//! started up and initialized; nothing here is process-global.

use log::LevelFilter;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartupOptions {
    /// Applied with [`log::set_max_level`] at start-up.
    pub logging_level: LevelFilter,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            logging_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameworkContext {
    started: bool,
    initialized: bool,
    options: Option<StartupOptions>,
}

impl FrameworkContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the framework. A second call is a no-op that reports the current state.
    pub fn start_up(&mut self, options: Option<StartupOptions>) -> bool {
        if self.started {
            log::info!("framework start-up already done");
            return true;
        }
        if let Some(opts) = &options {
            log::set_max_level(opts.logging_level);
        }
        self.options = options;
        self.started = true;
        log::info!("framework start-up complete");
        true
    }

    pub fn initialize(&mut self) {
        if !self.started {
            log::warn!("framework initialize called before start-up");
            return;
        }
        if self.initialized {
            log::warn!("framework initialize skipped, already initialized");
            return;
        }
        self.initialized = true;
        log::info!("framework initialize complete");
    }

    /// Release initialized resources; `initialize` may be called again afterwards.
    pub fn dispose(&mut self) {
        if !self.started {
            log::warn!("framework dispose called before start-up");
            return;
        }
        if !self.initialized {
            log::warn!("framework dispose skipped, not initialized");
            return;
        }
        self.initialized = false;
        log::info!("framework dispose complete");
    }

    /// Forget everything, including start-up.
    pub fn clean_up(&mut self) {
        self.started = false;
        self.initialized = false;
        self.options = None;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn options(&self) -> Option<&StartupOptions> {
        self.options.as_ref()
    }

    /// Convenience for hosts: start up and initialize in one go.
    pub fn ready() -> Self {
        let mut ctx = Self::new();
        ctx.start_up(None);
        ctx.initialize();
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_requires_start_up() {
        let mut ctx = FrameworkContext::new();
        ctx.initialize();
        assert!(!ctx.is_initialized());
        assert!(ctx.start_up(None));
        ctx.initialize();
        assert!(ctx.is_started() && ctx.is_initialized());
    }

    #[test]
    fn dispose_then_reinitialize() {
        let mut ctx = FrameworkContext::ready();
        ctx.dispose();
        assert!(!ctx.is_initialized());
        assert!(ctx.is_started());
        ctx.dispose();
        ctx.initialize();
        assert!(ctx.is_initialized());
    }

    #[test]
    fn contexts_are_independent() {
        let a = FrameworkContext::ready();
        let mut b = FrameworkContext::ready();
        b.clean_up();
        assert!(a.is_initialized());
        assert!(!b.is_started() && !b.is_initialized());
        assert!(b.options().is_none());
    }
}
