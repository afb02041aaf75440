//! Server configuration.
//!
//! Two on-disk forms are accepted. The section form is the native one:
//!
//! ```text
//! # comment
//! [port]
//! port = [8080]
//!
//! [file]
//! path = [/srv/www/index.html]
//! strict_ranges = [false]
//! ```
//!
//! Files ending in `.yaml` or `.yml` are deserialized straight into [`Config`].

use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_FILE: &str = "index.html";
const DEFAULT_HEADER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("File {} can not be found.", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration file: line {line_no} `{line}` is not of the form key = [value, ...]")]
    InvalidLine { line_no: usize, line: String },

    #[error("Invalid configuration file. It must contain:\n[port]\nport = [port_number]")]
    MissingPort,

    #[error("Invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub file: FileConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    pub port: u16,
    /// Seconds a client may take to deliver its request headers.
    #[serde(default = "default_header_timeout")]
    pub header_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// The single file served for `/`.
    #[serde(default = "default_file")]
    pub path: PathBuf,
    /// Answer unsatisfiable ranges with 416 instead of the 404 page.
    #[serde(default)]
    pub strict_ranges: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: default_file(),
            strict_ranges: false,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V6(Ipv6Addr::UNSPECIFIED)
}

fn default_header_timeout() -> u64 {
    DEFAULT_HEADER_TIMEOUT_SECS
}

fn default_file() -> PathBuf {
    PathBuf::from(DEFAULT_FILE)
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn header_timeout(&self) -> Duration {
        Duration::from_secs(self.header_timeout)
    }
}

/// Entries of one `[section]`, in file order.
pub type Section = Vec<(String, Vec<String>)>;

/// Parsed section file, keyed by section name without brackets.
#[derive(Debug, Default)]
pub struct Sections {
    sections: BTreeMap<String, Section>,
}

impl Sections {
    /// Parses the section form.
    ///
    /// A `[name]` line opens a section that runs until the next empty line;
    /// every line inside it must look like `key = [v1, v2]`. Comment lines
    /// are skipped anywhere and stray lines outside a section are ignored.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut sections: BTreeMap<String, Section> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end();

            if line.starts_with('#') {
                continue;
            }

            if line.is_empty() {
                current = None;
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .split(']')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let Some(name) = &current else {
                continue;
            };

            let entry = parse_entry(line).ok_or_else(|| ConfigError::InvalidLine {
                line_no: idx + 1,
                line: line.to_string(),
            })?;

            sections.entry(name.clone()).or_default().push(entry);
        }

        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// First list value of `key` in `[section]`. The first matching entry wins.
    pub fn first_value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// `key = [a, b, c]` into `("key", ["a", "b", "c"])`.
fn parse_entry(line: &str) -> Option<(String, Vec<String>)> {
    let (key, rest) = line.split_once('=')?;
    let key = key.trim();

    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let inner = rest.trim().strip_prefix('[')?;
    let (inner, _) = inner.split_once(']')?;

    let values = inner
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    Some((key.to_string(), values))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl Config {
    /// Loads the configuration file named on the command line.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&text)?)
        } else {
            Self::from_sections(&Sections::parse(&text)?)
        }
    }

    pub fn from_sections(sections: &Sections) -> Result<Self, ConfigError> {
        let port = sections
            .first_value("port", "port")
            .ok_or(ConfigError::MissingPort)?;
        let port = parse_value("port", port)?;

        let host = match sections.first_value("server", "host") {
            Some(host) => parse_value("host", host)?,
            None => default_host(),
        };

        let header_timeout = match sections.first_value("server", "header_timeout") {
            Some(secs) => parse_value("header_timeout", secs)?,
            None => DEFAULT_HEADER_TIMEOUT_SECS,
        };

        let path = sections
            .first_value("file", "path")
            .map_or_else(default_file, PathBuf::from);

        let strict_ranges = match sections.first_value("file", "strict_ranges") {
            Some(flag) => parse_value("strict_ranges", flag)?,
            None => false,
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                header_timeout,
            },
            file: FileConfig {
                path,
                strict_ranges,
            },
        })
    }
}
