//! Refuse to upgrade databases under a running server.
//!
//! The check connects to the control channel of the ccnet daemon. If the
//! connection succeeds the server is up. This is a point-in-time check and
//! not a lock: a server started right after the check still races with the
//! upgrade.

use crate::error::{UpgradeError, UpgradeResult};
use dbu_core::{ConfigReader, CoreResult, EnvironmentContext};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const CLIENT_SECTION: &str = "Client";
const DEFAULT_SOCKET_NAME: &str = "ccnet.sock";

/// Where the running server accepts control connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEndpoint {
    UnixSocket(PathBuf),
    Tcp(SocketAddr),
}

impl ControlEndpoint {
    /// Resolve the endpoint from `ccnet.conf`.
    ///
    /// `[Client] UNIX_SOCKET` wins, then `[Client] PORT` on the loopback
    /// interface, then `ccnet.sock` in the ccnet directory.
    pub fn resolve(env: &EnvironmentContext) -> CoreResult<Self> {
        let default = ControlEndpoint::UnixSocket(env.ccnet_dir.join(DEFAULT_SOCKET_NAME));
        let path = env.ccnet_control_config();
        if !path.exists() {
            return Ok(default);
        }

        let config = ConfigReader::open(&path)?;
        if let Some(socket) = config
            .get(CLIENT_SECTION, "UNIX_SOCKET")
            .filter(|s| !s.is_empty())
        {
            return Ok(ControlEndpoint::UnixSocket(env.ccnet_dir.join(socket)));
        }
        if config.get(CLIENT_SECTION, "PORT").is_some() {
            let port: u16 = config.read_parsed(CLIENT_SECTION, "PORT", 0)?;
            return Ok(ControlEndpoint::Tcp(SocketAddr::from((
                Ipv4Addr::LOCALHOST,
                port,
            ))));
        }
        Ok(default)
    }

    /// Whether something accepts connections at this endpoint
    pub async fn is_reachable(&self) -> bool {
        match self {
            ControlEndpoint::UnixSocket(path) => unix_socket_reachable(path).await,
            ControlEndpoint::Tcp(addr) => tokio::net::TcpStream::connect(addr).await.is_ok(),
        }
    }
}

#[cfg(unix)]
async fn unix_socket_reachable(path: &std::path::Path) -> bool {
    tokio::net::UnixStream::connect(path).await.is_ok()
}

#[cfg(not(unix))]
async fn unix_socket_reachable(path: &std::path::Path) -> bool {
    log::warn!(
        "Cannot check unix socket {} on this platform; assuming the server is stopped",
        path.display()
    );
    false
}

impl fmt::Display for ControlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlEndpoint::UnixSocket(path) => write!(f, "unix socket {}", path.display()),
            ControlEndpoint::Tcp(addr) => write!(f, "tcp {addr}"),
        }
    }
}

/// Pre-flight check run before any database is touched
pub struct LivenessGuard<'a> {
    env: &'a EnvironmentContext,
}

impl<'a> LivenessGuard<'a> {
    pub fn new(env: &'a EnvironmentContext) -> Self {
        Self { env }
    }

    /// Fail with [`UpgradeError::ServerRunning`] if the server answers.
    pub async fn ensure_not_running(&self) -> UpgradeResult<()> {
        let endpoint = ControlEndpoint::resolve(self.env)?;
        log::debug!("Probing server control channel at {endpoint}");
        if endpoint.is_reachable().await {
            return Err(UpgradeError::ServerRunning {
                endpoint: endpoint.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "liveness_test.rs"]
mod tests;
