use crate::error::ValueError;

/// Byte order of multi-byte integers in a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Network order.
    #[default]
    #[serde(alias = "be")]
    Big,
    #[serde(alias = "le")]
    Little,
}

macro_rules! encode {
    ($order:expr, $v:expr) => {
        match $order {
            ByteOrder::Big => $v.to_be_bytes(),
            ByteOrder::Little => $v.to_le_bytes(),
        }
    };
}

macro_rules! decode {
    ($ty:ty, $order:expr, $bytes:expr) => {
        match $order {
            ByteOrder::Big => <$ty>::from_be_bytes($bytes),
            ByteOrder::Little => <$ty>::from_le_bytes($bytes),
        }
    };
}

/// Sequential byte sink for the stream form of values.
///
/// Implementations provide `write_bytes`; the typed helpers encode in
/// `byte_order()`.
pub trait SerializeOutput {
    fn write_bytes(&mut self, bytes: &[u8]);

    fn byte_order(&self) -> ByteOrder {
        ByteOrder::Big
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_i8(&mut self, v: i8) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_i16(&mut self, v: i16) {
        let bytes = encode!(self.byte_order(), v);
        self.write_bytes(&bytes);
    }

    fn write_i32(&mut self, v: i32) {
        let bytes = encode!(self.byte_order(), v);
        self.write_bytes(&bytes);
    }

    fn write_u32(&mut self, v: u32) {
        let bytes = encode!(self.byte_order(), v);
        self.write_bytes(&bytes);
    }

    fn write_i64(&mut self, v: i64) {
        let bytes = encode!(self.byte_order(), v);
        self.write_bytes(&bytes);
    }

    fn write_u64(&mut self, v: u64) {
        let bytes = encode!(self.byte_order(), v);
        self.write_bytes(&bytes);
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }
}

/// Sequential byte source for the stream form of values.
pub trait SerializeInput {
    /// Consume exactly `n` bytes.
    fn read_bytes(&mut self, n: usize) -> Result<&[u8], ValueError>;

    /// Bytes left to read.
    fn remaining(&self) -> usize;

    fn byte_order(&self) -> ByteOrder {
        ByteOrder::Big
    }

    fn read_u8(&mut self) -> Result<u8, ValueError> {
        Ok(take::<1, _>(self)?[0])
    }

    fn read_i8(&mut self) -> Result<i8, ValueError> {
        Ok(i8::from_le_bytes(take::<1, _>(self)?))
    }

    fn read_i16(&mut self) -> Result<i16, ValueError> {
        let bytes = take::<2, _>(self)?;
        Ok(decode!(i16, self.byte_order(), bytes))
    }

    fn read_i32(&mut self) -> Result<i32, ValueError> {
        let bytes = take::<4, _>(self)?;
        Ok(decode!(i32, self.byte_order(), bytes))
    }

    fn read_u32(&mut self) -> Result<u32, ValueError> {
        let bytes = take::<4, _>(self)?;
        Ok(decode!(u32, self.byte_order(), bytes))
    }

    fn read_i64(&mut self) -> Result<i64, ValueError> {
        let bytes = take::<8, _>(self)?;
        Ok(decode!(i64, self.byte_order(), bytes))
    }

    fn read_u64(&mut self) -> Result<u64, ValueError> {
        let bytes = take::<8, _>(self)?;
        Ok(decode!(u64, self.byte_order(), bytes))
    }

    fn read_f64(&mut self) -> Result<f64, ValueError> {
        Ok(f64::from_bits(self.read_u64()?))
    }
}

fn take<const N: usize, I: SerializeInput + ?Sized>(input: &mut I) -> Result<[u8; N], ValueError> {
    let bytes = input.read_bytes(N)?;
    bytes
        .try_into()
        .map_err(|_| ValueError::serialization(format!("expected {N} bytes, got {}", bytes.len())))
}

/// Big-endian output into a growable buffer.
impl SerializeOutput for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Big-endian input over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl SerializeInput for ByteReader<'_> {
    fn read_bytes(&mut self, n: usize) -> Result<&[u8], ValueError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                ValueError::serialization(format!(
                    "unexpected end of stream: need {n} bytes, {} left",
                    self.buf.len() - self.pos
                ))
            })?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
