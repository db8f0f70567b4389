//! Connection URIs for storage endpoints

use std::fmt;

/// Parts of a storage URI; empty parts are left out when rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    pub scheme: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl Uri {
    /// URI of a plain filesystem path
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Builder: set the scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}://", self.scheme)?;
        }
        f.write_str(&self.user)?;
        if !self.password.is_empty() {
            write!(f, ":{}", self.password)?;
        }
        // A host is only rendered as part of an authority with a user
        if !self.host.is_empty() && !self.user.is_empty() {
            write!(f, "@{}", self.host)?;
        }
        if !self.port.is_empty() {
            write!(f, ":{}", self.port)?;
        }

        if self.path.starts_with('/') && !self.scheme.is_empty() {
            // Absolute paths after a scheme keep the escaped leading slash: sqlite:////home
            write!(f, "/{}", self.path)?;
        } else if !self.path.is_empty() && !self.port.is_empty() {
            write!(f, "/{}", self.path)?;
        } else {
            f.write_str(&self.path)?;
        }

        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}
