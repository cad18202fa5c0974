use crate::share::strip_color_codes;

/// Exact bytes of a modern JSON status response.
///
/// Serializing a status that carries one echoes these bytes unchanged
/// instead of rebuilding the document from the normalized fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(Vec<u8>);

impl RawPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for RawPayload {
    fn from(bufs: Vec<u8>) -> Self {
        Self(bufs)
    }
}

/// Server status normalized from either protocol.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerStatus {
    /// Whether the modern (JSON) protocol produced this status.
    pub is_modern: bool,
    /// Protocol version number. Servers older than 1.4 do not send one, 39 is assumed.
    pub protocol_version: i32,
    /// Human readable version, e.g. `1.8.9`.
    pub game_version: String,
    /// Max players, as reported.
    pub max_slots: i32,
    /// Online players, as reported.
    pub online_players: i32,
    /// Names of some online players. Always empty for legacy servers.
    pub players_sample: Vec<String>,
    /// Server description, similar to MOTD. May contain color codes.
    pub description: String,
    /// Server icon, raw PNG bytes.
    pub favicon: Option<Vec<u8>>,
    /// Response document as received, see [RawPayload].
    pub raw_payload: Option<RawPayload>,
}

impl ServerStatus {
    /// Description with every color-formatting code removed.
    pub fn display_description(&self) -> String {
        strip_color_codes(&self.description)
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description = self.display_description().chars().take(20).collect::<String>();

        write!(
            f,
            "ServerStatus({} / {} ({}) \"{}\")",
            self.online_players, self.max_slots, self.game_version, description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_short_and_plain() {
        let status = ServerStatus {
            game_version: "1.8".into(),
            max_slots: 20,
            online_players: 3,
            description: "§6A very long Minecraft server description".into(),
            ..Default::default()
        };

        assert_eq!(
            status.to_string(),
            "ServerStatus(3 / 20 (1.8) \"A very long Minecraf\")"
        );
        // Display never touches the stored description.
        assert!(status.description.starts_with("§6"));
    }

    #[test]
    fn raw_payload_keeps_bytes() {
        let raw = RawPayload::from(b"{\"a\":1}".to_vec());

        assert_eq!(raw.as_bytes(), b"{\"a\":1}");
        assert_eq!(raw.into_inner(), b"{\"a\":1}".to_vec());
    }
}
