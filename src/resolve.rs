use crate::McsErr;
use hickory_resolver::Resolver;
use std::net::{SocketAddr, ToSocketAddrs};
use tracing::debug;

/// Port used when neither the input nor a SRV record names one.
pub const DEFAULT_PORT: u16 = 25565;
const SRV_SERVICE: &str = "_minecraft._tcp.";

/// Service discovery for `_minecraft._tcp` records.
pub trait SrvDiscover {
    /// Target host and port of the first record found for `host`, if any.
    fn lookup_srv(&self, host: &str) -> Option<(String, u16)>;
}

/// [SrvDiscover] backed by the system DNS configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsSrv;

impl SrvDiscover for DnsSrv {
    fn lookup_srv(&self, host: &str) -> Option<(String, u16)> {
        let resolver = match Resolver::from_system_conf() {
            Ok(resolver) => resolver,
            Err(err) => {
                debug!(error = %err, "can not load system resolver configuration");
                return None;
            }
        };
        let name = format!("{}{}", SRV_SERVICE, host);

        match resolver.srv_lookup(name.as_str()) {
            // Records are taken in the order the server sent them,
            // priority and weight are not considered.
            Ok(lookup) => lookup.iter().next().map(|srv| {
                (
                    srv.target().to_utf8().trim_end_matches('.').to_string(),
                    srv.port(),
                )
            }),
            Err(err) => {
                debug!(%name, error = %err, "no SRV record");
                None
            }
        }
    }
}

/// Resolve `host` or `host:port` into an IPv4 socket address, looking up
/// SRV records through DNS.
pub fn resolve(input: &str) -> Result<SocketAddr, McsErr> {
    resolve_with(input, &DnsSrv)
}

/// Same as [resolve], with a custom [SrvDiscover].
///
/// An explicit port skips service discovery. Without one, the first SRV
/// record wins, and the default port 25565 is the last resort.
pub fn resolve_with<D: SrvDiscover + ?Sized>(
    input: &str,
    discover: &D,
) -> Result<SocketAddr, McsErr> {
    if input.contains(':') {
        debug!(%input, "resolving with explicit port");
        return lookup_ipv4(input, input, None);
    }

    if let Some((target, port)) = discover.lookup_srv(input) {
        debug!(%input, %target, port, "resolving through SRV record");
        return lookup_ipv4(input, &target, Some(port));
    }

    debug!(%input, port = DEFAULT_PORT, "resolving with default port");
    lookup_ipv4(input, input, Some(DEFAULT_PORT))
}

fn lookup_ipv4(input: &str, host: &str, port: Option<u16>) -> Result<SocketAddr, McsErr> {
    let to_resolve_err = |source: std::io::Error| McsErr::ResolveErr {
        target: input.into(),
        source,
    };
    let mut addrs = match port {
        Some(port) => (host, port).to_socket_addrs(),
        None => host.to_socket_addrs(),
    }
    .map_err(to_resolve_err)?;

    addrs.find(SocketAddr::is_ipv4).ok_or_else(|| {
        to_resolve_err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no IPv4 address found for {}", host),
        ))
    })
}
