use crate::{
    share::{clear_deadline, create_tcp_socket},
    status::{RawPayload, ServerStatus},
    varint::{
        encode_packet, encode_utf8_str, encode_varint, read_packet, read_utf8_str, write_packet,
    },
    McsErr, SocketConf,
};
use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    io::Write,
    net::SocketAddr,
    time::{Duration, Instant},
};
use tracing::debug;

/// Protocol version sent in the handshake.
pub const LAST_MODERN_PROTOCOL: i32 = 4;
const STATUS_PACKET_ID: i32 = 0x00;
const NEXT_STATE_STATUS: i32 = 1;
const FAVICON_PREFIX: &str = "data:image/png;base64,";
/// Every sampled player gets this id when a status is rebuilt from its fields.
pub const PLACEHOLDER_PLAYER_ID: &str = "d0223ac4-a35d-43dc-96de-5fecdb8feecd";
/// Standard alphabet with padding, tolerating non-zero trailing bits as servers send them.
const FAVICON_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// `null` members decode like missing ones.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status response document.
///
/// ```text
/// {
///     "version": { "name": "1.8.9", "protocol": 47 },
///     "players": { "max": 100, "online": 5, "sample": [{ "name": "Notch", "id": "..." }] },
///     "description": { "text": "Hello world" },
///     "favicon": "data:image/png;base64,<data>"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug)]
struct StatusResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    version: Version,
    #[serde(default, deserialize_with = "null_as_default")]
    players: Players,
    description: Description,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    favicon: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
struct Version {
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    protocol: i32,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
struct Players {
    #[serde(deserialize_with = "null_as_default")]
    max: i32,
    #[serde(deserialize_with = "null_as_default")]
    online: i32,
    #[serde(
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    sample: Vec<Player>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(default)]
struct Player {
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    id: String,
}

/// Either a bare string or a chat component carrying a `text` member.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
enum Description {
    Plain(String),
    Component { text: String },
}

impl Description {
    fn into_text(self) -> String {
        match self {
            Description::Plain(text) | Description::Component { text } => text,
        }
    }
}

impl ServerStatus {
    /// Decode a status from the JSON document of a modern status response.
    ///
    /// The given bytes are kept as the status' [RawPayload].
    ///
    /// ```
    /// # use mcstatus::ServerStatus;
    /// let json = br#"{"version":{"name":"1.8","protocol":47},"players":{"max":20,"online":3},"description":"A Minecraft Server"}"#;
    /// let status = ServerStatus::from_modern_json(json)?;
    ///
    /// assert!(status.is_modern);
    /// assert_eq!(status.protocol_version, 47);
    /// assert_eq!(status.online_players, 3);
    /// # Ok::<(), mcstatus::McsErr>(())
    /// ```
    pub fn from_modern_json(json: &[u8]) -> Result<Self, McsErr> {
        let response = serde_json::from_slice::<StatusResponse>(json)
            .map_err(|err| McsErr::DataErr(format!("Error parsing status data: {}", err)))?;

        // Other favicon formats are ignored, only a bad png body is an error.
        let favicon = match response.favicon.strip_prefix(FAVICON_PREFIX) {
            Some(body) => {
                // Older servers wrap the body in lines.
                let body = body.replace(['\r', '\n'], "");

                Some(FAVICON_ENGINE.decode(body).map_err(|err| {
                    McsErr::DataErr(format!("Invalid favicon base64: {}", err))
                })?)
            }
            None => None,
        };

        Ok(ServerStatus {
            is_modern: true,
            protocol_version: response.version.protocol,
            game_version: response.version.name,
            max_slots: response.players.max,
            online_players: response.players.online,
            players_sample: response
                .players
                .sample
                .into_iter()
                .map(|player| player.name)
                .collect(),
            description: response.description.into_text(),
            favicon,
            raw_payload: Some(RawPayload::from(json.to_vec())),
        })
    }

    /// Decode the payload of a status response packet, `str(json)`.
    pub fn from_modern_payload(payload: &[u8]) -> Result<Self, McsErr> {
        let mut reader = payload;
        let json = read_utf8_str(&mut reader)?;

        Self::from_modern_json(json.as_bytes())
    }

    /// Serialize into the modern JSON document.
    ///
    /// A status decoded from a modern response is echoed byte for byte.
    pub fn serialize_modern(&self) -> Result<Vec<u8>, McsErr> {
        if let Some(raw_payload) = &self.raw_payload {
            return Ok(raw_payload.as_bytes().to_vec());
        }

        let response = StatusResponse {
            version: Version {
                name: self.game_version.clone(),
                protocol: if self.is_modern {
                    self.protocol_version
                } else {
                    0
                },
            },
            players: Players {
                max: self.max_slots,
                online: self.online_players,
                sample: self
                    .players_sample
                    .iter()
                    .map(|name| Player {
                        name: name.clone(),
                        id: PLACEHOLDER_PLAYER_ID.into(),
                    })
                    .collect(),
            },
            description: Description::Plain(self.description.clone()),
            favicon: match &self.favicon {
                Some(favicon) if !favicon.is_empty() => {
                    format!("{}{}", FAVICON_PREFIX, FAVICON_ENGINE.encode(favicon))
                }
                _ => String::new(),
            },
        };

        Ok(serde_json::to_vec(&response)?)
    }

    /// Full status response packet as a server would send it.
    pub fn encode_modern_response(&self) -> Result<Vec<u8>, McsErr> {
        let json = self.serialize_modern()?;
        let json = std::str::from_utf8(&json)
            .map_err(|err| McsErr::DataErr(format!("Status data is not UTF-8: {}", err)))?;

        Ok(encode_packet(STATUS_PACKET_ID, &encode_utf8_str(json)))
    }
}

/// Build handshake packet buffer.
pub fn build_handshake_packet(host: &str, port: u16) -> Vec<u8> {
    let mut packet_data = Vec::<u8>::new();

    // See protocol version [numbers](https://wiki.vg/Protocol_version_numbers).
    packet_data.append(&mut encode_varint(LAST_MODERN_PROTOCOL));
    packet_data.append(&mut encode_utf8_str(host));
    packet_data.extend_from_slice(&port.to_be_bytes());
    packet_data.append(&mut encode_varint(NEXT_STATE_STATUS));

    encode_packet(STATUS_PACKET_ID, &packet_data)
}

/// Get info from a modern server with the
/// [Server List Ping](https://wiki.vg/Server_List_Ping#Current_.281.7.2B.29) protocol.
///
/// The returned duration only covers the wait for the status response.
pub fn get_modern_status(
    addr: &SocketAddr,
    host: &str,
    port: u16,
    socket_conf: &SocketConf,
) -> Result<(ServerStatus, Duration), McsErr> {
    let mut socket = create_tcp_socket(addr, socket_conf)?;

    socket.set_nodelay(true)?;
    socket.write_all(&build_handshake_packet(host, port))?;
    // Status request, nothing is awaited in between.
    write_packet(&mut socket, STATUS_PACKET_ID, &[])?;

    let started = Instant::now();
    let (id, payload) = read_packet(&mut socket)?;
    let ping = started.elapsed();

    if id != STATUS_PACKET_ID {
        return Err(McsErr::FrameErr(format!(
            "Invalid status packet id: 0x{:02X}",
            id
        )));
    }

    let status = ServerStatus::from_modern_payload(&payload)?;

    clear_deadline(&socket)?;
    debug!(%addr, ?ping, "modern status received");

    Ok((status, ping))
}
