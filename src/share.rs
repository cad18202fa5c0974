use crate::{McsErr, SocketConf};
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::{SocketAddr, TcpStream};

/// In-band formatting codes such as `§a` or `§L`.
static COLOR_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new("(?i)§[a-z0-9]").expect("color code pattern is valid"));

/// Open a TCP connection bounded by the configured timeout.
///
/// The same timeout bounds the connect, every write and every read.
pub fn create_tcp_socket(
    addr: &SocketAddr,
    socket_conf: &SocketConf,
) -> Result<TcpStream, McsErr> {
    let socket = TcpStream::connect_timeout(addr, socket_conf.timeout)?;

    socket.set_read_timeout(Some(socket_conf.timeout))?;
    socket.set_write_timeout(Some(socket_conf.timeout))?;

    Ok(socket)
}

/// Relax the deadlines once an exchange is complete.
pub fn clear_deadline(socket: &TcpStream) -> Result<(), McsErr> {
    socket.set_read_timeout(None)?;
    socket.set_write_timeout(None)?;

    Ok(())
}

/// Remove every color-formatting code from `text`.
pub fn strip_color_codes(text: &str) -> String {
    COLOR_CODE.replace_all(text, "").into_owned()
}
