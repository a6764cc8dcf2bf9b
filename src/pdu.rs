//! SNMP Protocol Data Units (PDUs).
//!
//! One `Pdu` struct models all five operations this engine speaks. For
//! GetBulkRequest the error-status/error-index slots carry non-repeaters and
//! max-repetitions instead, per the v2c extension.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    GetRequest = 0xA0,
    GetNextRequest = 0xA1,
    Response = 0xA2,
    SetRequest = 0xA3,
    GetBulkRequest = 0xA5,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0xA0 => Some(Self::GetRequest),
            0xA1 => Some(Self::GetNextRequest),
            0xA2 => Some(Self::Response),
            0xA3 => Some(Self::SetRequest),
            0xA5 => Some(Self::GetBulkRequest),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::GetBulkRequest => write!(f, "GetBulkRequest"),
        }
    }
}

/// SNMP PDU.
#[derive(Debug, Clone)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: i32,
    /// Error status (non-repeaters for GetBulkRequest)
    pub error_status: i32,
    /// Error index, 1-based (max-repetitions for GetBulkRequest)
    pub error_index: i32,
    /// Variable bindings, order significant
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Create a GET request PDU.
    pub fn get_request(request_id: i32, oid: Oid) -> Self {
        Self {
            pdu_type: PduType::GetRequest,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: vec![VarBind::null(oid)],
        }
    }

    /// Create a GETNEXT request PDU.
    pub fn get_next_request(request_id: i32, oid: Oid) -> Self {
        Self {
            pdu_type: PduType::GetNextRequest,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: vec![VarBind::null(oid)],
        }
    }

    /// Create a SET request PDU.
    pub fn set_request(request_id: i32, oid: Oid, value: Value) -> Self {
        Self {
            pdu_type: PduType::SetRequest,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: vec![VarBind::new(oid, value)],
        }
    }

    /// Create a GETBULK request PDU (v2c only).
    ///
    /// Non-repeaters and max-repetitions ride in the error-status and
    /// error-index slots.
    pub fn get_bulk(
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        oid: Oid,
    ) -> Self {
        Self {
            pdu_type: PduType::GetBulkRequest,
            request_id,
            error_status: non_repeaters,
            error_index: max_repetitions,
            varbinds: vec![VarBind::null(oid)],
        }
    }

    /// Create a Response PDU.
    pub fn response(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds,
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(i64::from(self.error_index));
            buf.push_integer(i64::from(self.error_status));
            buf.push_integer(i64::from(self.request_id));
        });
    }

    /// Decode from BER.
    ///
    /// Rejects tags outside the five PDU types this client speaks; the PDU
    /// body must be fully consumed by its fields or decoding fails.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag_offset = decoder.offset();
        let tag = decoder.read_tag()?;
        let pdu_type = PduType::from_tag(tag)
            .ok_or_else(|| Error::decode(tag_offset, DecodeErrorKind::UnknownPduType(tag)))?;

        let len = decoder.read_length()?;
        let content = decoder.read_bytes(len)?;
        let mut pdu_decoder = Decoder::new(content);

        let request_id = pdu_decoder.read_int32()?;
        let error_status = pdu_decoder.read_int32()?;
        let error_index = pdu_decoder.read_int32()?;
        let varbinds = decode_varbind_list(&mut pdu_decoder)?;
        pdu_decoder.expect_end()?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// Get the error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_i32(self.error_status)
    }
}
