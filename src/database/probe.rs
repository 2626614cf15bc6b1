//! TCP connectivity probe for a database connection string.

use async_trait::async_trait;
use tokio::net::{lookup_host, TcpStream};
use url::Url;

use crate::database::{Database, DatabaseError};

/// Checks that the database named by a connection string accepts TCP
/// connections.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    uri: String,
}

/// Parsed connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "postgres" | "postgresql" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "mongodb" => Some(27017),
        "redis" | "rediss" => Some(6379),
        _ => None,
    }
}

impl ConnectivityProbe {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    /// Resolve the host and port the probe would connect to.
    pub fn target(&self) -> Result<Target, DatabaseError> {
        let url = Url::parse(self.uri.trim())
            .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(DatabaseError::MissingHost)?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();

        let port = url
            .port()
            .or_else(|| default_port(url.scheme()))
            .ok_or_else(|| DatabaseError::UnknownPort(url.scheme().to_string()))?;

        Ok(Target { host, port })
    }
}

#[async_trait]
impl Database for ConnectivityProbe {
    async fn init(&self) -> Result<(), DatabaseError> {
        let target = self.target()?;
        let address = format!("{}:{}", target.host, target.port);

        let addrs: Vec<_> = lookup_host((target.host.as_str(), target.port))
            .await
            .map_err(|source| DatabaseError::Resolve {
                host: target.host.clone(),
                source,
            })?
            .collect();

        let mut last_err = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "host resolved to no addresses",
        );

        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(_stream) => {
                    tracing::info!(address = %address, resolved = %addr, "Database reachable");
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(resolved = %addr, error = %e, "Database connect attempt failed");
                    last_err = e;
                }
            }
        }

        Err(DatabaseError::Unreachable {
            address,
            source: last_err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn target_uses_explicit_port() {
        let probe = ConnectivityProbe::new("postgres://user:pw@db.internal:6543/app");
        assert_eq!(
            probe.target().unwrap(),
            Target { host: "db.internal".into(), port: 6543 }
        );
    }

    #[test]
    fn target_falls_back_to_scheme_default() {
        let probe = ConnectivityProbe::new("mongodb://cluster.example.com/app");
        assert_eq!(probe.target().unwrap().port, 27017);
    }

    #[test]
    fn target_rejects_garbage() {
        let probe = ConnectivityProbe::new("definitely not a uri");
        assert!(matches!(probe.target(), Err(DatabaseError::InvalidUri(_))));

        let probe = ConnectivityProbe::new("");
        assert!(matches!(probe.target(), Err(DatabaseError::InvalidUri(_))));
    }

    #[test]
    fn target_requires_known_port() {
        let probe = ConnectivityProbe::new("cockroach://db.internal/app");
        assert!(matches!(probe.target(), Err(DatabaseError::UnknownPort(s)) if s == "cockroach"));
    }

    #[tokio::test]
    async fn init_succeeds_against_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = ConnectivityProbe::new(format!("postgres://127.0.0.1:{}/app", port));
        probe.init().await.unwrap();
    }

    #[tokio::test]
    async fn init_fails_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = ConnectivityProbe::new(format!("redis://127.0.0.1:{}", port));
        let err = probe.init().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Unreachable { .. }));
    }
}
