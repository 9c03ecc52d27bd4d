//! Environment and filesystem access used during runfiles discovery.

use std::path::Path;

/// The small slice of the operating system that runfiles discovery reads.
pub trait Host {
    /// Returns the value of an environment variable. Unset and empty
    /// variables both read as `None`.
    fn var(&self, name: &str) -> Option<String>;

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Reads the current process environment and the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl Host for SystemHost {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::Host;

    /// Host with a fixed environment; filesystem checks hit the real disk.
    #[derive(Debug, Default)]
    pub struct FakeHost {
        vars: HashMap<String, String>,
    }

    impl FakeHost {
        pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
            self.vars.insert(name.to_string(), value.into());
            self
        }
    }

    impl Host for FakeHost {
        fn var(&self, name: &str) -> Option<String> {
            self.vars.get(name).filter(|v| !v.is_empty()).cloned()
        }
    }
}
