/// Mcs error uniform error definition.
#[derive(Debug, thiserror::Error)]
pub enum McsErr {
    /// Address lookup of the given target failed.
    #[error("error resolving {target}: {source}")]
    ResolveErr {
        target: String,
        #[source]
        source: std::io::Error,
    },
    /// Handling errors that occur during sockets, including timeouts and short reads.
    #[error("{0}")]
    IoErr(#[from] std::io::Error),
    /// Packet framing is broken: bad lengths, oversized packets, unexpected packet ids.
    #[error("{0}")]
    FrameErr(String),
    /// Unintended errors occur when decoding the packet contents.
    #[error("{0}")]
    DataErr(String),
}

impl From<serde_json::Error> for McsErr {
    fn from(err: serde_json::Error) -> Self {
        McsErr::DataErr(err.to_string())
    }
}
