use crate::{resolve, server, McsErr, ServerStatus};
use std::{net::SocketAddr, time::Duration};

/// Main struct used for configuring the check.
#[derive(Debug, Clone)]
pub struct Conf {
    /// Server address as typed by the user, `host` or `host:port`.
    pub host: String,
    /// See [SocketConf].
    pub socket_conf: SocketConf,
}

/// Additional socket configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketConf {
    /// Bounds the connect and every read and write of a single attempt.
    pub timeout: Duration,
}

impl SocketConf {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
}

impl Default for SocketConf {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl Conf {
    /// Create a check configuration with the default socket configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mcstatus::{Conf, SocketConf};
    /// #
    /// let conf = Conf::create(" www.example.com ");
    /// #
    /// # assert_eq!(conf.host, "www.example.com");
    /// # assert_eq!(conf.socket_conf, SocketConf::default());
    /// ```
    pub fn create(host: &str) -> Self {
        Self {
            host: host.trim().into(),
            socket_conf: SocketConf::default(),
        }
    }

    /// Create a check configuration using a custom socket configuration.
    ///
    /// # Example
    ///
    /// ```
    /// # use mcstatus::{Conf, SocketConf};
    /// # use std::time::Duration;
    /// #
    /// let conf = Conf::create_with_socket_conf(
    ///     "www.example.com:25566",
    ///     SocketConf {
    ///         timeout: Duration::from_secs(1),
    ///     },
    /// );
    /// #
    /// # assert_eq!(conf.socket_conf.timeout, Duration::from_secs(1));
    /// ```
    pub fn create_with_socket_conf(host: &str, socket_conf: SocketConf) -> Self {
        Self {
            host: host.trim().into(),
            socket_conf,
        }
    }

    /// Resolve the configured host, see [resolve::resolve].
    ///
    /// # Example
    ///
    /// ```
    /// # use mcstatus::{Conf, McsErr};
    /// #
    /// # fn main() -> Result<(), McsErr> {
    ///     let addr = Conf::create("127.0.0.1:25566").resolve()?;
    /// #
    /// #   assert_eq!(addr.port(), 25566);
    /// #   Ok(())
    /// # }
    /// ```
    pub fn resolve(&self) -> Result<SocketAddr, McsErr> {
        resolve::resolve(&self.host)
    }

    /// Get the server status, trying the modern protocol first and the legacy one after.
    ///
    /// Returns the status together with the time the server took to answer.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mcstatus::{Conf, McsErr};
    ///
    /// fn main() -> Result<(), McsErr> {
    ///     let (status, ping) = Conf::create("www.example.com").get_status()?;
    ///
    ///     println!("{} in {}ms", status, ping.as_millis());
    ///     Ok(())
    /// }
    /// ```
    pub fn get_status(&self) -> Result<(ServerStatus, Duration), McsErr> {
        server::check_status(&self.resolve()?, &self.socket_conf)
    }

    /// Get the server status with the modern protocol only, 1.7 and above.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mcstatus::{Conf, McsErr};
    ///
    /// fn main() -> Result<(), McsErr> {
    ///     let (status, _) = Conf::create("www.example.com").get_modern_status()?;
    ///
    ///     println!("{}", String::from_utf8_lossy(&status.serialize_modern()?));
    ///     Ok(())
    /// }
    /// ```
    pub fn get_modern_status(&self) -> Result<(ServerStatus, Duration), McsErr> {
        let addr = self.resolve()?;

        server::get_modern_status(
            &addr,
            &addr.ip().to_string(),
            addr.port(),
            &self.socket_conf,
        )
    }

    /// Get the server status with the legacy protocol only, 1.6 and older.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use mcstatus::{Conf, McsErr};
    ///
    /// fn main() -> Result<(), McsErr> {
    ///     let (status, _) = Conf::create("www.example.com").get_legacy_status()?;
    ///
    ///     println!("{}", status.display_description());
    ///     Ok(())
    /// }
    /// ```
    pub fn get_legacy_status(&self) -> Result<(ServerStatus, Duration), McsErr> {
        let addr = self.resolve()?;

        server::get_legacy_status(
            &addr,
            &addr.ip().to_string(),
            addr.port(),
            &self.socket_conf,
        )
    }
}
