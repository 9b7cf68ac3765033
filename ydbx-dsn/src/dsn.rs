//! Connection string resolver.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use tracing::{debug, trace};
use url::Url;

use crate::bind::Bind;
use crate::config::{Config, ConfigOption};
use crate::connector::{Connector, ConnectorOption, QueryMode};
use crate::error::{DsnError, DsnResult};

/// Environment variable read by [`parse_from_env`].
pub const ENV_CONNECTION_STRING: &str = "YDB_CONNECTION_STRING";

const PARAM_QUERY_MODE: &str = "query_mode";
const PARAM_BIND: &str = "go_auto_bind";
const PARAM_TABLE_PATH_PREFIX: &str = "go_auto_bind.table_path_prefix";

/// The two option lists a connection string resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    options: Vec<ConfigOption>,
    connector_options: Vec<ConnectorOption>,
}

impl Dsn {
    /// Connection configuration options, in the order they were parsed.
    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// Connector options, in the textual order of their query parameters.
    pub fn connector_options(&self) -> &[ConnectorOption] {
        &self.connector_options
    }

    /// Apply the configuration options to a default [`Config`].
    pub fn config(&self) -> Config {
        Config::new(self.options.iter().cloned())
    }

    /// Apply the connector options to a default [`Connector`].
    pub fn connector(&self) -> Connector {
        Connector::new(self.connector_options.iter().cloned())
    }

    /// Split into the two option lists.
    pub fn into_parts(self) -> (Vec<ConfigOption>, Vec<ConnectorOption>) {
        (self.options, self.connector_options)
    }
}

impl std::str::FromStr for Dsn {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse a connection string of the form
/// `grpc[s]://host:port/database[?key=value&...]`.
///
/// ```rust
/// use ydbx_dsn::{Bind, ConnectorOption, QueryMode};
///
/// let dsn = ydbx_dsn::parse(
///     "grpcs://localhost:2135/local?query_mode=scripting&go_auto_bind=numeric",
/// )
/// .unwrap();
///
/// let config = dsn.config();
/// assert!(config.secure());
/// assert_eq!(config.endpoint(), "localhost:2135");
/// assert_eq!(config.database(), "/local");
///
/// assert_eq!(
///     dsn.connector_options(),
///     &[
///         ConnectorOption::DefaultQueryMode(QueryMode::Scripting),
///         ConnectorOption::Bind(Bind::numeric()),
///     ]
/// );
/// ```
pub fn parse(dsn: &str) -> DsnResult<Dsn> {
    debug!(dsn_len = dsn.len(), "dsn::parse()");

    let uri = Url::parse(dsn)?;

    let secure = match uri.scheme() {
        "grpc" => false,
        "grpcs" => true,
        other => return Err(DsnError::UnsupportedScheme(other.to_string())),
    };

    let host = uri
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| DsnError::MissingHost("expected scheme://host:port/database".into()))?;
    let endpoint = match uri.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let database = raw_database(dsn).into_owned();
    let connector_options = parse_connector_options(&uri)?;

    debug!(
        secure,
        endpoint = %endpoint,
        database = %database,
        connector_options = connector_options.len(),
        "DSN parsed"
    );

    let options = vec![
        ConfigOption::Secure(secure),
        ConfigOption::Endpoint(endpoint),
        ConfigOption::Database(database),
    ];

    Ok(Dsn {
        options,
        connector_options,
    })
}

/// Parse the connection string held in environment variable `var`.
pub fn parse_env(var: &str) -> DsnResult<Dsn> {
    let dsn = std::env::var(var).map_err(|_| DsnError::EnvNotFound(var.to_string()))?;
    parse(&dsn)
}

/// Parse the connection string held in `YDB_CONNECTION_STRING`.
pub fn parse_from_env() -> DsnResult<Dsn> {
    parse_env(ENV_CONNECTION_STRING)
}

/// The database path as written in `dsn`, percent-decoded.
///
/// `Url` normalizes dot segments and re-encodes the path, so the path is cut
/// from the input itself: everything between the authority and the query or
/// fragment.
fn raw_database(dsn: &str) -> Cow<'_, str> {
    let input = dsn.trim_matches(|c: char| c <= ' ');
    let after_scheme = input.split_once("://").map_or("", |(_, rest)| rest);
    let path_start = after_scheme
        .find(['/', '?', '#'])
        .unwrap_or(after_scheme.len());
    let path = &after_scheme[path_start..];
    let path_end = path.find(['?', '#']).unwrap_or(path.len());
    percent_decode_str(&path[..path_end]).decode_utf8_lossy()
}

fn parse_connector_options(uri: &Url) -> DsnResult<Vec<ConnectorOption>> {
    let mut connector_options = Vec::new();

    // Bind keys fold into one option, placed where the first of them appeared.
    let mut bind_slot: Option<usize> = None;
    let mut bind: Option<Bind> = None;
    let mut prefix: Option<Cow<'_, str>> = None;

    for (key, value) in uri.query_pairs() {
        if value.is_empty() {
            trace!(key = %key, "ignoring empty DSN parameter");
            continue;
        }
        match key.as_ref() {
            PARAM_QUERY_MODE => {
                let mode = QueryMode::from_name(&value)
                    .ok_or_else(|| DsnError::UnknownQueryMode(value.to_string()))?;
                connector_options.push(ConnectorOption::DefaultQueryMode(mode));
            }
            PARAM_BIND => {
                bind = Some(
                    Bind::from_name(&value)
                        .ok_or_else(|| DsnError::UnknownBindMode(value.to_string()))?,
                );
                bind_slot.get_or_insert(connector_options.len());
            }
            PARAM_TABLE_PATH_PREFIX => {
                prefix = Some(value);
                bind_slot.get_or_insert(connector_options.len());
            }
            _ => trace!(key = %key, "ignoring unknown DSN parameter"),
        }
    }

    let bind = match (bind, prefix) {
        (Some(bind), Some(prefix)) => Some(bind.with_table_path_prefix(prefix)),
        (Some(bind), None) => Some(bind),
        (None, Some(prefix)) => Some(Bind::table_path_prefix_only(prefix)),
        (None, None) => None,
    };

    if let (Some(slot), Some(bind)) = (bind_slot, bind) {
        connector_options.insert(slot, ConnectorOption::Bind(bind));
    }

    Ok(connector_options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base_options(secure: bool, database: &str) -> Vec<ConfigOption> {
        vec![
            ConfigOption::Secure(secure),
            ConfigOption::Endpoint("localhost:2135".into()),
            ConfigOption::Database(database.into()),
        ]
    }

    #[test]
    fn test_parse_plain() {
        let dsn = parse("grpc://localhost:2135/local").unwrap();
        assert_eq!(dsn.options(), base_options(false, "/local").as_slice());
        assert!(dsn.connector_options().is_empty());
    }

    #[test]
    fn test_parse_secure_nested_database() {
        let dsn = parse("grpcs://localhost:2135/local/db").unwrap();
        let config = dsn.config();
        assert!(config.secure());
        assert_eq!(config.endpoint(), "localhost:2135");
        assert_eq!(config.database(), "/local/db");
    }

    #[test]
    fn test_parse_query_mode() {
        let dsn = parse("grpc://localhost:2135/local?query_mode=scripting").unwrap();
        assert_eq!(
            dsn.connector_options(),
            &[ConnectorOption::DefaultQueryMode(QueryMode::Scripting)]
        );
    }

    #[test]
    fn test_parse_bind_with_prefix() {
        for (name, expected) in [
            ("numeric", Bind::numeric()),
            ("positional", Bind::positional()),
            ("declare", Bind::declare()),
        ] {
            let dsn = parse(&format!(
                "grpc://localhost:2135/local?query_mode=scripting&go_auto_bind={name}&go_auto_bind.table_path_prefix=path/to/tables"
            ))
            .unwrap();
            assert_eq!(
                dsn.connector_options(),
                &[
                    ConnectorOption::DefaultQueryMode(QueryMode::Scripting),
                    ConnectorOption::Bind(expected.with_table_path_prefix("path/to/tables")),
                ]
            );
        }
    }

    #[test]
    fn test_parse_prefix_without_bind() {
        let dsn = parse(
            "grpc://localhost:2135/local?query_mode=scripting&go_auto_bind.table_path_prefix=path/to/tables",
        )
        .unwrap();
        assert_eq!(
            dsn.connector_options(),
            &[
                ConnectorOption::DefaultQueryMode(QueryMode::Scripting),
                ConnectorOption::Bind(Bind::table_path_prefix_only("path/to/tables")),
            ]
        );
    }

    #[test]
    fn test_parse_bind_without_prefix() {
        let dsn = parse("grpc://localhost:2135/local?go_auto_bind=positional").unwrap();
        assert_eq!(
            dsn.connector_options(),
            &[ConnectorOption::Bind(Bind::positional())]
        );
    }

    #[test]
    fn test_bind_keeps_position_of_first_bind_key() {
        let dsn = parse(
            "grpc://localhost:2135/local?go_auto_bind.table_path_prefix=t&query_mode=scan&go_auto_bind=declare",
        )
        .unwrap();
        assert_eq!(
            dsn.connector_options(),
            &[
                ConnectorOption::Bind(Bind::declare().with_table_path_prefix("t")),
                ConnectorOption::DefaultQueryMode(QueryMode::Scan),
            ]
        );
    }

    #[test]
    fn test_repeated_query_mode_last_wins() {
        let dsn = parse("grpc://localhost:2135/local?query_mode=scan&query_mode=scripting").unwrap();
        assert_eq!(dsn.connector_options().len(), 2);
        assert_eq!(dsn.connector().default_query_mode(), QueryMode::Scripting);
    }

    #[test]
    fn test_unknown_params_ignored() {
        let dsn = parse("grpc://localhost:2135/local?token=abc&balancer=random").unwrap();
        assert!(dsn.connector_options().is_empty());
    }

    #[test]
    fn test_percent_decoded_prefix() {
        let dsn = parse("grpc://localhost:2135/local?go_auto_bind.table_path_prefix=a%2Fb").unwrap();
        assert_eq!(
            dsn.connector().bind().and_then(Bind::table_path_prefix),
            Some("a/b")
        );
    }

    #[test]
    fn test_parse_deterministic() {
        let input = "grpc://localhost:2135/local?go_auto_bind=numeric&query_mode=scripting&go_auto_bind.table_path_prefix=p";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }

    #[test]
    fn test_from_str() {
        let dsn: Dsn = "grpc://localhost:2135/local".parse().unwrap();
        assert_eq!(dsn.config().database(), "/local");
    }

    #[test]
    fn test_database_path_kept_verbatim() {
        for (input, database) in [
            ("grpc://localhost:2135/a/../b", "/a/../b"),
            ("grpc://localhost:2135/local/./db", "/local/./db"),
            ("grpc://localhost:2135/my%20db", "/my db"),
            ("grpc://localhost:2135/my db?query_mode=scan", "/my db"),
            ("grpc://localhost:2135/local/", "/local/"),
            ("grpc://localhost:2135", ""),
            ("grpc://localhost:2135?query_mode=scan", ""),
            ("grpc://localhost:2135/local#frag", "/local"),
            ("  grpc://localhost:2135/local  ", "/local"),
        ] {
            let dsn = parse(input).unwrap();
            assert_eq!(dsn.config().database(), database, "input: {input:?}");
        }
    }

    #[test]
    fn test_empty_values_ignored() {
        let dsn = parse(
            "grpc://localhost:2135/local?query_mode=&go_auto_bind=&go_auto_bind.table_path_prefix=",
        )
        .unwrap();
        assert!(dsn.connector_options().is_empty());

        let dsn = parse("grpc://localhost:2135/local?go_auto_bind=declare&go_auto_bind.table_path_prefix=")
            .unwrap();
        assert_eq!(
            dsn.connector_options(),
            &[ConnectorOption::Bind(Bind::declare())]
        );
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = parse("http://localhost:2135/local").unwrap_err();
        assert_eq!(err, DsnError::UnsupportedScheme("http".into()));
    }

    #[test]
    fn test_unknown_query_mode() {
        let err = parse("grpc://localhost:2135/local?query_mode=bogus").unwrap_err();
        assert_eq!(err.component(), "query_mode");
    }

    #[test]
    fn test_unknown_bind() {
        let err = parse("grpc://localhost:2135/local?go_auto_bind=named").unwrap_err();
        assert_eq!(err, DsnError::UnknownBindMode("named".into()));
    }

    #[test]
    fn test_malformed_url() {
        assert_eq!(parse("not a url").unwrap_err().component(), "url");
        assert_eq!(parse("grpc://localhost:99999/local").unwrap_err().component(), "url");
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(parse("grpc:/local").unwrap_err().component(), "host");
    }

    #[test]
    fn test_parse_env_missing() {
        let err = parse_env("YDBX_DSN_TEST_UNSET_VARIABLE").unwrap_err();
        assert_eq!(err, DsnError::EnvNotFound("YDBX_DSN_TEST_UNSET_VARIABLE".into()));
    }

    #[test]
    fn test_parse_env() {
        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("YDBX_DSN_TEST_PARSE_ENV", "grpcs://db.example:2136/prod");
        }
        let dsn = parse_env("YDBX_DSN_TEST_PARSE_ENV").unwrap();
        assert_eq!(dsn.config().endpoint(), "db.example:2136");
    }
}
