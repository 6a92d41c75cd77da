//! Configuration access port.
//!
//! Sections read by gasbook: `[data]`, `[persistence]`, `[report]` and
//! `[weekly]`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `None` when the key is absent; `Some(Err)` when present but not a
    /// recognisable boolean.
    fn get_bool(&self, section: &str, key: &str) -> Option<Result<bool, String>>;

    fn get_bool_or(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get_bool(section, key) {
            Some(Ok(v)) => v,
            _ => default,
        }
    }
}
