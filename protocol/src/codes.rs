//! Message codes carried in front of every payload.

use std::fmt;

/// Protocol message kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum MessageCode {
    Handshake = 0x01,
    ProposeBlock = 0x02,
    ProposeProof = 0x03,
    Vote = 0x04,
    NewTx = 0x05,
    GetHead = 0x06,
    Head = 0x07,
    GetBlockByHash = 0x08,
    Block = 0x09,
    GetBlocksRange = 0x0a,
    BlocksRange = 0x0b,
}

impl MessageCode {
    pub fn as_u64(self) -> u64 {
        self as u64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::ProposeBlock => "propose_block",
            Self::ProposeProof => "propose_proof",
            Self::Vote => "vote",
            Self::NewTx => "new_tx",
            Self::GetHead => "get_head",
            Self::Head => "head",
            Self::GetBlockByHash => "get_block_by_hash",
            Self::Block => "block",
            Self::GetBlocksRange => "get_blocks_range",
            Self::BlocksRange => "blocks_range",
        }
    }
}

impl From<MessageCode> for u64 {
    fn from(code: MessageCode) -> Self {
        code.as_u64()
    }
}

impl TryFrom<u64> for MessageCode {
    type Error = u64;

    /// Unknown codes are handed back unchanged.
    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Ok(match raw {
            0x01 => Self::Handshake,
            0x02 => Self::ProposeBlock,
            0x03 => Self::ProposeProof,
            0x04 => Self::Vote,
            0x05 => Self::NewTx,
            0x06 => Self::GetHead,
            0x07 => Self::Head,
            0x08 => Self::GetBlockByHash,
            0x09 => Self::Block,
            0x0a => Self::GetBlocksRange,
            0x0b => Self::BlocksRange,
            other => return Err(other),
        })
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
