// src/proxy/mod.rs

use std::{fmt, fs, io, path::Path};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("reading proxy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("proxy line {line}: expected host:port:username:password, found {fields} field(s)")]
    Malformed { line: usize, fields: usize },
    #[error("proxy line {line}: {host}:{port} does not form a valid proxy URL")]
    InvalidAddress {
        line: usize,
        host: String,
        port: String,
    },
}

/// One forward-proxy endpoint with basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: String,
    pub username: String,
    url: Url,
}

impl ProxyEndpoint {
    /// Parse a single `host:port:username:password` line. `line` is 1-based and only
    /// used for error reporting.
    pub fn parse_line(raw: &str, line: usize) -> Result<Self, ProxyError> {
        let fields: Vec<&str> = raw.trim().split(':').collect();
        let &[host, port, username, password] = fields.as_slice() else {
            return Err(ProxyError::Malformed {
                line,
                fields: fields.len(),
            });
        };

        let invalid = || ProxyError::InvalidAddress {
            line,
            host: host.to_string(),
            port: port.to_string(),
        };
        let mut url = Url::parse(&format!("http://{host}:{port}")).map_err(|_| invalid())?;
        url.set_username(username).map_err(|_| invalid())?;
        url.set_password(Some(password)).map_err(|_| invalid())?;

        Ok(Self {
            host: host.to_string(),
            port: port.to_string(),
            username: username.to_string(),
            url,
        })
    }

    /// `http://<user>:<password>@<host>:<port>`, credentials percent-encoded.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Debug for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Read-only list of proxies handed out round-robin by index.
#[derive(Debug, Clone, Default)]
pub struct ProxyManager {
    proxies: Vec<ProxyEndpoint>,
}

impl ProxyManager {
    pub fn new(proxies: Vec<ProxyEndpoint>) -> Self {
        Self { proxies }
    }

    /// Load proxies from a line-delimited file. A missing file yields an empty manager;
    /// any malformed non-blank line fails the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProxyError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no proxy file; fetching directly");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ProxyError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let proxies = contents
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| ProxyEndpoint::parse_line(l, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = proxies.len(), path = %path.display(), "loaded proxies");
        Ok(Self { proxies })
    }

    /// `proxies[index % len]`, or `None` when no proxies are loaded.
    pub fn get(&self, index: usize) -> Option<&ProxyEndpoint> {
        if self.proxies.is_empty() {
            return None;
        }
        self.proxies.get(index % self.proxies.len())
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
