use std::collections::BTreeMap;
use std::ffi::{CString, NulError};

/// Variables handed to every launched program. Seeded from the shell's
/// own environment and changed only by `setenv`/`unsetenv`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        let vars = std::env::vars_os()
            .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
            .collect();
        Environment { vars }
    }

    pub fn empty() -> Self {
        Environment::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn unset(&mut self, key: &str) {
        self.vars.remove(key);
    }

    pub fn home(&self) -> Option<&str> {
        self.get("HOME").filter(|h| !h.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `KEY=VALUE` strings for `execve`.
    pub fn to_envp(&self) -> Result<Vec<CString>, NulError> {
        self.vars
            .iter()
            .map(|(k, v)| CString::new(format!("{}={}", k, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_includes_os_env() {
        let env = Environment::new();
        // At least one OS env var should exist
        assert!(!env.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut env = Environment::empty();
        env.set("FOO", "bar");
        assert_eq!(env.get("FOO"), Some("bar"));
        env.set("FOO", "");
        assert_eq!(env.get("FOO"), Some(""));
    }

    #[test]
    fn test_unset() {
        let mut env = Environment::empty();
        env.set("FOO", "bar");
        env.unset("FOO");
        env.unset("NEVER_SET");
        assert_eq!(env.get("FOO"), None);
        assert_eq!(env.len(), 0);
    }

    #[test]
    fn test_home() {
        let mut env = Environment::empty();
        assert_eq!(env.home(), None);
        env.set("HOME", "");
        assert_eq!(env.home(), None);
        env.set("HOME", "/home/ish");
        assert_eq!(env.home(), Some("/home/ish"));
    }

    #[test]
    fn test_to_envp() {
        let mut env = Environment::empty();
        env.set("B", "2");
        env.set("A", "x=y");
        let envp = env.to_envp().unwrap();
        let strs: Vec<_> = envp.iter().map(|c| c.to_str().unwrap()).collect();
        assert_eq!(strs, vec!["A=x=y", "B=2"]);
    }
}
