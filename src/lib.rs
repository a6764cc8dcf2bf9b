//! # snmpt
//!
//! Async SNMP v1/v2c client engine for querying network equipment: GET, SET,
//! WALK and BULK-WALK over UDP, with BER codec, request/response correlation
//! and timeout/retransmission handling.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmpt::{Session, SessionConfig, oid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), snmpt::Error> {
//!     let session = Session::connect("192.168.1.1", SessionConfig::default()).await?;
//!
//!     let sys_descr = session.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await?;
//!     println!("{}", sys_descr);
//!
//!     let system = session.walk(&oid!(1, 3, 6, 1, 2, 1, 1)).await?;
//!     for vb in &system {
//!         println!("{}", vb);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! One session serves many sequential requests to the same agent; it is not
//! safe for concurrent use from multiple tasks (one outstanding request at a
//! time). Run independent sessions concurrently instead.

pub mod ber;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod session;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

// Re-exports for convenience
pub use error::{DecodeErrorKind, Error, ErrorStatus, OidErrorKind, Result};
pub use oid::Oid;
pub use session::{Session, SessionConfig};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
