//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! Only the X.690 subset SNMP v1/v2c messages actually use is implemented:
//! definite-length TLV primitives plus constructed SEQUENCE and PDU forms.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
