use crate::{
    share::{clear_deadline, create_tcp_socket, strip_color_codes},
    status::ServerStatus,
    McsErr, SocketConf,
};
use std::{
    io::{Read, Write},
    net::SocketAddr,
    time::{Duration, Instant},
};
use tracing::debug;

const PING_MAGIC: [u8; 3] = [0xFE, 0x01, 0xFA];
const PING_CHANNEL: &str = "MC|PingHost";
const KICK_PACKET_ID: u8 = 0xFF;
/// Protocol version sent in the ping request (1.6.2).
pub const LAST_LEGACY_PROTOCOL: u8 = 74;
/// Servers before 1.4 report neither protocol nor version, these are the last ones without.
pub const ANCIENT_PROTOCOL_VERSION: i32 = 39;
pub const ANCIENT_GAME_VERSION: &str = "1.3.1";
/// Longest kick message accepted, in UTF-16 code units.
pub const MAX_LEGACY_STR_LEN: i16 = 512;

/// Encode `str` as a UTF-16BE string prefixed with its length in code units.
pub fn encode_utf16be_str(str: &str) -> Result<Vec<u8>, McsErr> {
    let units = str.encode_utf16().collect::<Vec<_>>();
    let len = i16::try_from(units.len()).map_err(|_| {
        McsErr::DataErr(format!(
            "String too long for a legacy packet: {} code units",
            units.len()
        ))
    })?;
    let mut bufs = Vec::with_capacity(2 + units.len() * 2);

    bufs.extend_from_slice(&len.to_be_bytes());

    for unit in units {
        bufs.push((unit >> 8) as u8);
        bufs.push((unit & 0xFF) as u8);
    }

    Ok(bufs)
}

/// Read a UTF-16BE string prefixed with its length in code units.
pub fn read_utf16be_str<R: Read>(reader: &mut R, max_len: i16) -> Result<String, McsErr> {
    let mut len_bufs = [0u8; 2];

    reader.read_exact(&mut len_bufs)?;

    let len = i16::from_be_bytes(len_bufs);

    if len > max_len {
        return Err(McsErr::FrameErr(format!(
            "String longer than max length: {} > {}",
            len, max_len
        )));
    }

    if len < 0 {
        return Err(McsErr::FrameErr(format!(
            "String length smaller than 0: {}",
            len
        )));
    }

    let mut bufs = vec![0u8; len as usize * 2];

    reader.read_exact(&mut bufs)?;

    let mut units = Vec::with_capacity(len as usize);

    for pair in bufs.chunks_exact(2) {
        units.push(((pair[0] as u16) << 8) | pair[1] as u16);
    }

    Ok(String::from_utf16_lossy(&units))
}

/// Build the 1.6 style [ping](https://wiki.vg/Server_List_Ping#1.6) request.
pub fn build_legacy_ping_packet(host: &str, port: u16) -> Result<Vec<u8>, McsErr> {
    let mut packet = PING_MAGIC.to_vec();
    let mut host_bufs = encode_utf16be_str(host)?;

    packet.append(&mut encode_utf16be_str(PING_CHANNEL)?);
    // Length of the rest: host string with its prefix, protocol version byte and port.
    let rest_len = i16::try_from(host_bufs.len() + 5)
        .map_err(|_| McsErr::DataErr(format!("Host too long for a legacy packet: {}", host)))?;

    packet.extend_from_slice(&rest_len.to_be_bytes());
    packet.push(LAST_LEGACY_PROTOCOL);
    packet.append(&mut host_bufs);
    packet.extend_from_slice(&(port as i32).to_be_bytes());

    Ok(packet)
}

fn parse_count(field: &str, name: &str) -> Result<i32, McsErr> {
    field.parse::<i32>().map_err(|err| {
        McsErr::DataErr(format!("Error converting {} {:?}: {}", name, field, err))
    })
}

impl ServerStatus {
    /// Parse the kick message of a legacy server.
    ///
    /// Servers from 1.4 on answer `§1\0protocol\0version\0motd\0online\0max`,
    /// older ones `motd§online§max`.
    ///
    /// ```
    /// # use mcstatus::ServerStatus;
    /// let status = ServerStatus::from_legacy_message("A Server§5§20")?;
    ///
    /// assert_eq!(status.game_version, "1.3.1");
    /// assert_eq!(status.online_players, 5);
    /// # Ok::<(), mcstatus::McsErr>(())
    /// ```
    pub fn from_legacy_message(message: &str) -> Result<Self, McsErr> {
        if message.starts_with("§1") {
            let params = message.split('\0').collect::<Vec<_>>();

            if params.len() != 6 {
                return Err(McsErr::DataErr(format!(
                    "Bad legacy param count {}, expected 6",
                    params.len()
                )));
            }

            return Ok(ServerStatus {
                protocol_version: parse_count(params[1], "protocol version")?,
                game_version: params[2].into(),
                description: params[3].into(),
                online_players: parse_count(params[4], "player count")?,
                max_slots: parse_count(params[5], "slot count")?,
                ..Default::default()
            });
        }

        let params = message.split('§').collect::<Vec<_>>();

        if params.len() != 3 {
            return Err(McsErr::DataErr(format!(
                "Bad legacy param count {}, expected 3",
                params.len()
            )));
        }

        Ok(ServerStatus {
            protocol_version: ANCIENT_PROTOCOL_VERSION,
            game_version: ANCIENT_GAME_VERSION.into(),
            description: params[0].into(),
            online_players: parse_count(params[1], "player count")?,
            max_slots: parse_count(params[2], "slot count")?,
            ..Default::default()
        })
    }

    /// Kick message a legacy server speaking `protocol` would send.
    pub fn to_legacy_message(&self, protocol: i32) -> String {
        if protocol > ANCIENT_PROTOCOL_VERSION {
            format!(
                "§1\0{}\0{}\0{}\0{}\0{}",
                self.protocol_version,
                self.game_version,
                self.description,
                self.online_players,
                self.max_slots
            )
        } else {
            // `§` is the field separator here, codes would break the message.
            format!(
                "{}§{}§{}",
                strip_color_codes(&self.description),
                self.online_players,
                self.max_slots
            )
        }
    }

    /// Kick packet as a legacy server speaking `protocol` would send it.
    pub fn encode_legacy_response(&self, protocol: i32) -> Result<Vec<u8>, McsErr> {
        let mut packet = vec![KICK_PACKET_ID];

        packet.append(&mut encode_utf16be_str(&self.to_legacy_message(protocol))?);

        Ok(packet)
    }
}

/// Read and parse a legacy kick packet.
pub fn read_legacy_response<R: Read>(reader: &mut R) -> Result<ServerStatus, McsErr> {
    let mut packet_id = [0u8; 1];

    reader.read_exact(&mut packet_id)?;

    if packet_id[0] != KICK_PACKET_ID {
        return Err(McsErr::FrameErr(format!(
            "Bad legacy response packet id, it should be 0xFF, but got: 0x{:02X}",
            packet_id[0]
        )));
    }

    let message = read_utf16be_str(reader, MAX_LEGACY_STR_LEN)?;

    ServerStatus::from_legacy_message(&message)
}

/// Get info from a legacy server, 1.6 and older.
pub fn get_legacy_status(
    addr: &SocketAddr,
    host: &str,
    port: u16,
    socket_conf: &SocketConf,
) -> Result<(ServerStatus, Duration), McsErr> {
    let packet = build_legacy_ping_packet(host, port)?;
    let mut socket = create_tcp_socket(addr, socket_conf)?;

    socket.write_all(&packet)?;

    let started = Instant::now();
    let status = read_legacy_response(&mut socket)?;
    let ping = started.elapsed();

    clear_deadline(&socket)?;
    debug!(%addr, ?ping, "legacy status received");

    Ok((status, ping))
}
