use std::collections::HashMap;
use std::env;

use anyhow::Result;
use config::{ConfigError, Source, Value};

const PREFIX_PATTERN: &str = "CF_";

pub trait QueryEnvironment {
    fn empty(&self) -> Result<bool>;
}

/// Pulls whitelisted `CF_`-prefixed variables out of the process environment
/// as a `config::Source`, so credentials from the environment merge over the
/// on-disk config with the same key names the config file uses.
#[derive(Clone, Debug)]
pub struct Environment {
    whitelist: Vec<&'static str>,
}

impl Environment {
    pub fn with_whitelist(whitelist: Vec<&'static str>) -> Self {
        Environment { whitelist }
    }
}

impl QueryEnvironment for Environment {
    fn empty(&self) -> Result<bool> {
        let env = self.collect()?;

        Ok(env.is_empty())
    }
}

impl Source for Environment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<HashMap<String, Value>, ConfigError> {
        let mut m = HashMap::new();
        let uri: String = "env".into();

        for key in &self.whitelist {
            if let Ok(value) = env::var(key) {
                // remove the `CF_` prefix before adding to collection
                let key = key.strip_prefix(PREFIX_PATTERN).unwrap_or(key);
                m.insert(key.to_lowercase(), Value::new(Some(&uri), value));
            }
        }

        Ok(m)
    }
}

#[derive(Clone, Debug, Default)]
#[cfg(test)]
pub struct MockEnvironment {
    vars: Vec<(&'static str, &'static str)>,
}

#[cfg(test)]
impl MockEnvironment {
    pub fn set(&mut self, key: &'static str, value: &'static str) -> &Self {
        self.vars.push((key, value));

        self
    }
}

#[cfg(test)]
impl QueryEnvironment for MockEnvironment {
    fn empty(&self) -> Result<bool> {
        Ok(self.vars.is_empty())
    }
}

#[cfg(test)]
impl Source for MockEnvironment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<HashMap<String, Value>, ConfigError> {
        let mut m = HashMap::new();
        let uri: String = "env".into();

        for (key, value) in &self.vars {
            let key = key.strip_prefix(PREFIX_PATTERN).unwrap_or(key);
            m.insert(key.to_lowercase(), Value::new(Some(&uri), *value));
        }

        Ok(m)
    }
}
