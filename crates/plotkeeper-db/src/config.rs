//! Connection settings for the plot registry database.
//!
//! A `DbConfig` wraps one PostgreSQL URL of the form
//! `postgres[ql]://[user[:password]@]host[:port]/database[?params]`.
//! Helpers derive sibling URLs on the same server (the `postgres`
//! maintenance database, per-test databases) without losing `?params`
//! such as `sslmode`.

/// Database the server always has; `CREATE DATABASE` is issued from here.
pub const MAINTENANCE_DATABASE: &str = "postgres";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_url: String,
}

/// A URL cut into the part before the database path, the database name and
/// the query string.
struct UrlParts<'a> {
    server: &'a str,
    database: &'a str,
    params: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (base, params) = match url.split_once('?') {
            Some((base, params)) => (base, Some(params)),
            None => (url, None),
        };
        let authority = base.find("://").map_or(0, |i| i + 3);
        match base[authority..].find('/') {
            Some(i) => Self {
                server: &base[..authority + i],
                database: &base[authority + i + 1..],
                params,
            },
            None => Self {
                server: base,
                database: "",
                params,
            },
        }
    }
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/plotkeeper";

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Name of the target database, `None` when the URL has no path.
    pub fn database_name(&self) -> Option<&str> {
        Some(UrlParts::split(&self.database_url).database).filter(|name| !name.is_empty())
    }

    /// Same server, user and params, different database.
    pub fn for_database(&self, name: &str) -> DbConfig {
        let parts = UrlParts::split(&self.database_url);
        let mut url = format!("{}/{name}", parts.server);
        if let Some(params) = parts.params {
            url.push('?');
            url.push_str(params);
        }
        DbConfig::new(url)
    }

    /// Connection to [`MAINTENANCE_DATABASE`] on the same server.
    pub fn maintenance(&self) -> DbConfig {
        self.for_database(MAINTENANCE_DATABASE)
    }

    /// The URL with any password replaced by `***`, for logs and error
    /// messages.
    pub fn redacted_url(&self) -> String {
        let parts = UrlParts::split(&self.database_url);
        let authority = parts.server.find("://").map_or(0, |i| i + 3);
        let (scheme, rest) = parts.server.split_at(authority);
        let server = match rest.rsplit_once('@') {
            Some((userinfo, host)) => match userinfo.split_once(':') {
                Some((user, _password)) => format!("{scheme}{user}:***@{host}"),
                None => parts.server.to_owned(),
            },
            None => parts.server.to_owned(),
        };
        let mut url = format!("{server}/{}", parts.database);
        if let Some(params) = parts.params {
            url.push('?');
            url.push_str(params);
        }
        url
    }
}
