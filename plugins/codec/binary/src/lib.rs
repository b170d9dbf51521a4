//! Binary stream codec: configurable byte order for the value stream form,
//! plus length-prefixed framing so several encoded values can share a
//! byte stream.

use relval_api::{ByteOrder, SerializeInput, SerializeOutput, ValueError};

// ═══════════════════════════════════════════════════════════════
//  Stream sink / source
// ═══════════════════════════════════════════════════════════════

/// Growable output in a chosen byte order.
#[derive(Debug, Clone, Default)]
pub struct BinaryOutput {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl BinaryOutput {
    pub fn new(order: ByteOrder) -> Self {
        Self { buf: Vec::new(), order }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl SerializeOutput for BinaryOutput {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }
}

/// Borrowed input in a chosen byte order.
#[derive(Debug, Clone)]
pub struct BinaryInput<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> BinaryInput<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl SerializeInput for BinaryInput<'_> {
    fn read_bytes(&mut self, n: usize) -> Result<&[u8], ValueError> {
        let left = self.buf.len() - self.pos;
        if n > left {
            return Err(ValueError::serialization(format!(
                "unexpected end of input: need {n} bytes, {left} left"
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn byte_order(&self) -> ByteOrder {
        self.order
    }
}

// ═══════════════════════════════════════════════════════════════
//  LengthPrefixedFraming
// ═══════════════════════════════════════════════════════════════

pub struct LengthPrefixedFraming {
    length_bytes: usize,
    byte_order: ByteOrder,
    max_payload: usize,
}

impl LengthPrefixedFraming {
    pub fn new(length_bytes: usize, byte_order: ByteOrder, max_payload: usize) -> Result<Self, ValueError> {
        if !matches!(length_bytes, 1 | 2 | 4) {
            return Err(ValueError::serialization(format!(
                "length_bytes must be 1, 2, or 4, got {length_bytes}"
            )));
        }
        Ok(Self { length_bytes, byte_order, max_payload })
    }

    /// Split one frame off the head of `buf`.
    ///
    /// Returns the payload and the bytes consumed, or `None` when `buf`
    /// doesn't hold a whole frame yet.
    pub fn decode<'b>(&self, buf: &'b [u8]) -> Result<Option<(&'b [u8], usize)>, ValueError> {
        let n = self.length_bytes;
        if buf.len() < n {
            return Ok(None);
        }

        let len = match (n, self.byte_order) {
            (1, _) => buf[0] as usize,
            (2, ByteOrder::Big) => u16::from_be_bytes([buf[0], buf[1]]) as usize,
            (2, ByteOrder::Little) => u16::from_le_bytes([buf[0], buf[1]]) as usize,
            (_, ByteOrder::Big) => u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize,
            (_, ByteOrder::Little) => u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize,
        };

        if self.max_payload > 0 && len > self.max_payload {
            tracing::debug!(len, max = self.max_payload, "frame rejected");
            return Err(ValueError::size_limit(format!(
                "payload too large: {len} bytes (max {})",
                self.max_payload
            )));
        }

        let total = n + len;
        if buf.len() < total {
            return Ok(None);
        }
        Ok(Some((&buf[n..total], total)))
    }

    pub fn encode(&self, data: &[u8], buf: &mut Vec<u8>) -> Result<(), ValueError> {
        let len = data.len();
        let limit = match self.length_bytes {
            1 => u8::MAX as usize,
            2 => u16::MAX as usize,
            _ => u32::MAX as usize,
        };
        if len > limit || (self.max_payload > 0 && len > self.max_payload) {
            tracing::debug!(len, length_bytes = self.length_bytes, "frame rejected");
            return Err(ValueError::size_limit(format!(
                "payload too large for {}-byte header: {len}",
                self.length_bytes
            )));
        }

        match (self.length_bytes, self.byte_order) {
            (1, _) => buf.push(len as u8),
            (2, ByteOrder::Big) => buf.extend_from_slice(&(len as u16).to_be_bytes()),
            (2, ByteOrder::Little) => buf.extend_from_slice(&(len as u16).to_le_bytes()),
            (_, ByteOrder::Big) => buf.extend_from_slice(&(len as u32).to_be_bytes()),
            (_, ByteOrder::Little) => buf.extend_from_slice(&(len as u32).to_le_bytes()),
        }
        buf.extend_from_slice(data);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  BinaryCodec
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct BinaryCodecConfig {
    /// Byte order of stream integers and frame headers: "big" or "little".
    pub byte_order: ByteOrder,

    /// Frame header size in bytes: 1, 2 or 4.
    pub length_bytes: usize,

    /// Largest accepted frame payload (0 = no limit).
    pub max_payload: usize,
}

impl Default for BinaryCodecConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            length_bytes: 4,
            max_payload: 0,
        }
    }
}

/// Frames stream-encoded values.
pub struct BinaryCodec {
    byte_order: ByteOrder,
    framing: LengthPrefixedFraming,
}

impl BinaryCodec {
    pub fn new(config: BinaryCodecConfig) -> Result<Self, ValueError> {
        let framing =
            LengthPrefixedFraming::new(config.length_bytes, config.byte_order, config.max_payload)?;
        Ok(Self { byte_order: config.byte_order, framing })
    }

    /// `"{}"` means defaults.
    pub fn from_config_json(config_json: &str) -> Result<Self, ValueError> {
        let config: BinaryCodecConfig = if config_json == "{}" {
            BinaryCodecConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| ValueError::from(e).with_context("codec"))?
        };
        Self::new(config)
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Empty output in this codec's byte order.
    pub fn output(&self) -> BinaryOutput {
        BinaryOutput::new(self.byte_order)
    }

    /// Append `out` to `buf` as one frame.
    pub fn frame(&self, out: &BinaryOutput, buf: &mut Vec<u8>) -> Result<(), ValueError> {
        self.framing.encode(out.as_bytes(), buf)
    }

    /// Input over the next complete frame in `buf`, and the bytes it spans.
    pub fn next_frame<'b>(&self, buf: &'b [u8]) -> Result<Option<(BinaryInput<'b>, usize)>, ValueError> {
        Ok(self
            .framing
            .decode(buf)?
            .map(|(payload, used)| (BinaryInput::new(payload, self.byte_order), used)))
    }
}
