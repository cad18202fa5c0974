mod legacy_server;
mod modern_server;

use crate::{status::ServerStatus, McsErr, SocketConf};
pub use legacy_server::*;
pub use modern_server::*;
use std::{net::SocketAddr, time::Duration};
use tracing::{debug, instrument};

/// Check the server status, first with the modern protocol, then the legacy one.
///
/// A failing modern attempt is only logged. When the legacy attempt fails as
/// well, its error is the one returned.
#[instrument(level = "debug", skip(socket_conf))]
pub fn check_status(
    addr: &SocketAddr,
    socket_conf: &SocketConf,
) -> Result<(ServerStatus, Duration), McsErr> {
    let host = addr.ip().to_string();
    let port = addr.port();

    match get_modern_status(addr, &host, port, socket_conf) {
        Ok(result) => return Ok(result),
        Err(err) => debug!(error = %err, "modern status failed, trying legacy"),
    }

    get_legacy_status(addr, &host, port, socket_conf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::varint::{decode_varint, read_packet, read_utf8_str};
    use std::{
        io::{Read, Write},
        net::{TcpListener, TcpStream},
        thread::{self, JoinHandle},
    };

    type Handler = Box<dyn FnOnce(TcpStream) + Send>;

    /// Serve one connection per handler, in order.
    fn spawn_server(handlers: Vec<Handler>) -> (SocketAddr, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            for handler in handlers {
                let (socket, _) = listener.accept().unwrap();
                handler(socket);
            }
        });

        (addr, handle)
    }

    fn modern_status() -> ServerStatus {
        ServerStatus {
            is_modern: true,
            protocol_version: 47,
            game_version: "1.8.9".into(),
            max_slots: 20,
            online_players: 3,
            players_sample: vec!["Notch".into()],
            description: "§aModern".into(),
            ..Default::default()
        }
    }

    fn legacy_status() -> ServerStatus {
        ServerStatus {
            protocol_version: 74,
            game_version: "1.6.2".into(),
            max_slots: 10,
            online_players: 1,
            description: "Legacy".into(),
            ..Default::default()
        }
    }

    fn drop_connection() -> Handler {
        Box::new(|socket: TcpStream| drop(socket))
    }

    fn answer_legacy(response: Vec<u8>) -> Handler {
        Box::new(move |mut socket: TcpStream| {
            let port = socket.local_addr().unwrap().port();
            let expected = build_legacy_ping_packet("127.0.0.1", port).unwrap();
            let mut request = vec![0u8; expected.len()];

            socket.read_exact(&mut request).unwrap();
            assert_eq!(request, expected);
            socket.write_all(&response).unwrap();
        })
    }

    #[test]
    fn modern_server_answers() {
        let handler: Handler = Box::new(|mut socket: TcpStream| {
            let (id, handshake) = read_packet(&mut socket).unwrap();
            let mut handshake = handshake.as_slice();
            let mut port = [0u8; 2];

            assert_eq!(id, 0x00);
            assert_eq!(decode_varint(&mut handshake).unwrap().1, LAST_MODERN_PROTOCOL);
            assert_eq!(read_utf8_str(&mut handshake).unwrap(), "127.0.0.1");
            handshake.read_exact(&mut port).unwrap();
            assert_eq!(u16::from_be_bytes(port), socket.local_addr().unwrap().port());
            assert_eq!(decode_varint(&mut handshake).unwrap().1, 1);

            assert_eq!(read_packet(&mut socket).unwrap(), (0x00, vec![]));
            socket
                .write_all(&modern_status().encode_modern_response().unwrap())
                .unwrap();
        });
        let (addr, handle) = spawn_server(vec![handler]);

        let (status, _) = check_status(&addr, &SocketConf::default()).unwrap();
        handle.join().unwrap();

        assert!(status.is_modern);
        assert_eq!(status.game_version, "1.8.9");
        assert_eq!(status.players_sample, vec!["Notch".to_string()]);
        assert_eq!(status.description, "§aModern");
        assert!(status.raw_payload.is_some());
    }

    #[test]
    fn falls_back_when_modern_connection_drops() {
        let response = legacy_status().encode_legacy_response(74).unwrap();
        let (addr, handle) = spawn_server(vec![drop_connection(), answer_legacy(response)]);

        let (status, _) = check_status(&addr, &SocketConf::default()).unwrap();
        handle.join().unwrap();

        assert_eq!(status, legacy_status());
    }

    #[test]
    fn falls_back_on_bad_modern_packet() {
        let response = legacy_status().encode_legacy_response(39).unwrap();
        // Well framed, but not a status response.
        let bad_modern: Handler = Box::new(|mut socket: TcpStream| {
            read_packet(&mut socket).unwrap();
            read_packet(&mut socket).unwrap();
            socket.write_all(&[0x02, 0x01, 0x00]).unwrap();
        });
        let (addr, handle) = spawn_server(vec![bad_modern, answer_legacy(response)]);

        let (status, _) = check_status(&addr, &SocketConf::default()).unwrap();
        handle.join().unwrap();

        assert!(!status.is_modern);
        assert_eq!(status.game_version, ANCIENT_GAME_VERSION);
        assert_eq!(status.online_players, 1);
    }

    #[test]
    fn falls_back_when_modern_server_stalls() {
        let response = legacy_status().encode_legacy_response(74).unwrap();
        // Takes the request but never answers, until the client hangs up.
        let stall: Handler = Box::new(|mut socket: TcpStream| {
            read_packet(&mut socket).unwrap();
            read_packet(&mut socket).unwrap();
            let _ = socket.read(&mut [0u8; 1]);
        });
        let (addr, handle) = spawn_server(vec![stall, answer_legacy(response)]);
        let socket_conf = SocketConf {
            timeout: Duration::from_millis(200),
        };

        let (status, _) = check_status(&addr, &socket_conf).unwrap();
        handle.join().unwrap();

        assert_eq!(status, legacy_status());
    }

    #[test]
    fn legacy_error_is_reported() {
        let (addr, handle) = spawn_server(vec![drop_connection(), answer_legacy(vec![0x00])]);

        let err = check_status(&addr, &SocketConf::default()).unwrap_err();
        handle.join().unwrap();

        match err {
            McsErr::FrameErr(message) => assert!(message.contains("0xFF")),
            other => panic!("expected the legacy error, got: {}", other),
        }
    }
}
