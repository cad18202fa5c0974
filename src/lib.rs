//! Minecraft server status checks.
//!
//! A check first speaks the modern [Server List Ping](https://wiki.vg/Server_List_Ping)
//! protocol and falls back to the legacy 1.6 ping when that fails. Both answers
//! are normalized into one [ServerStatus].
//!
//! ```no_run
//! use mcstatus::{Conf, McsErr};
//!
//! fn main() -> Result<(), McsErr> {
//!     let (status, ping) = Conf::create("www.example.com").get_status()?;
//!
//!     println!("{} ({}ms)", status, ping.as_millis());
//!     Ok(())
//! }
//! ```

mod conf;
mod error;
pub mod resolve;
pub mod server;
mod share;
mod status;
pub mod varint;

pub use conf::*;
pub use error::McsErr;
pub use resolve::{resolve, DEFAULT_PORT};
pub use server::check_status;
pub use share::strip_color_codes;
pub use status::*;
