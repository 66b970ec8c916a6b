//! Reading and writing one-dimensional floating-point arrays in the NumPy `.npy` format.
//!
//! Only what is needed for sample sequences is supported: a 1-D array of 32 or 64 bit floats
//! in either byte order. Arrays are always written as version 1.0, little-endian `f8`.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
/// The preamble plus header is padded to a multiple of this.
const HEADER_ALIGNMENT: usize = 64;

#[derive(Debug)]
pub enum NpyError {
    Io(std::io::Error),
    NotNpy,
    UnsupportedVersion(u8, u8),
    MalformedHeader(String),
    UnsupportedDtype(String),
    FortranOrder,
    NotOneDimensional(String),
}

impl std::fmt::Display for NpyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NpyError::Io(err) => write!(f, "IO error: {}", err),
            NpyError::NotNpy => write!(f, "Not an npy file"),
            NpyError::UnsupportedVersion(major, minor) => {
                write!(f, "Unsupported npy version {}.{}", major, minor)
            }
            NpyError::MalformedHeader(header) => write!(f, "Malformed npy header: {}", header),
            NpyError::UnsupportedDtype(descr) => write!(f, "Unsupported dtype {}", descr),
            NpyError::FortranOrder => write!(f, "Fortran ordered arrays are not supported"),
            NpyError::NotOneDimensional(shape) => {
                write!(f, "Expected a one-dimensional array, got shape {}", shape)
            }
        }
    }
}

impl std::error::Error for NpyError {}

impl From<std::io::Error> for NpyError {
    fn from(val: std::io::Error) -> Self {
        NpyError::Io(val)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dtype {
    F4 { big_endian: bool },
    F8 { big_endian: bool },
}

impl Dtype {
    fn parse(descr: &str) -> Result<Self, NpyError> {
        match descr {
            "<f8" => Ok(Dtype::F8 { big_endian: false }),
            ">f8" => Ok(Dtype::F8 { big_endian: true }),
            "<f4" => Ok(Dtype::F4 { big_endian: false }),
            ">f4" => Ok(Dtype::F4 { big_endian: true }),
            other => Err(NpyError::UnsupportedDtype(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    dtype: Dtype,
    len: usize,
}

/// Returns the text after `'key':` in a header dict, trimmed of leading whitespace.
fn header_value<'a>(header: &'a str, key: &str) -> Result<&'a str, NpyError> {
    let pattern = format!("'{}':", key);
    header
        .find(&pattern)
        .map(|at| header[at + pattern.len()..].trim_start())
        .ok_or_else(|| NpyError::MalformedHeader(header.to_string()))
}

fn parse_header(header: &str) -> Result<Header, NpyError> {
    let malformed = || NpyError::MalformedHeader(header.to_string());

    let descr = header_value(header, "descr")?;
    let descr = descr
        .strip_prefix('\'')
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(malformed)?;
    let dtype = Dtype::parse(descr)?;

    let fortran_order = header_value(header, "fortran_order")?;
    if fortran_order.starts_with("True") {
        return Err(NpyError::FortranOrder);
    } else if !fortran_order.starts_with("False") {
        return Err(malformed());
    }

    let shape = header_value(header, "shape")?;
    let shape = shape
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(malformed)?;
    let dimensions = shape
        .split(',')
        .map(str::trim)
        .filter(|dimension| !dimension.is_empty())
        .map(|dimension| dimension.parse::<usize>().map_err(|_| malformed()))
        .collect::<Result<Vec<_>, _>>()?;
    let len = match dimensions.as_slice() {
        [len] => *len,
        _ => return Err(NpyError::NotOneDimensional(format!("({})", shape))),
    };

    Ok(Header { dtype, len })
}

fn read_header<R: Read>(reader: &mut R) -> Result<Header, NpyError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(NpyError::NotNpy);
    }

    let major = reader.read_u8()?;
    let minor = reader.read_u8()?;
    let header_len = match major {
        1 => reader.read_u16::<LittleEndian>()? as usize,
        2 | 3 => reader.read_u32::<LittleEndian>()? as usize,
        _ => return Err(NpyError::UnsupportedVersion(major, minor)),
    };

    let mut header = vec![0u8; header_len];
    reader.read_exact(&mut header)?;
    let header = String::from_utf8(header)
        .map_err(|err| NpyError::MalformedHeader(format!("{:?}", err.as_bytes())))?;

    parse_header(&header)
}

fn read_values<R: Read, B: ByteOrder>(
    reader: &mut R,
    dtype: Dtype,
    len: usize,
) -> Result<Vec<f64>, NpyError> {
    let width = match dtype {
        Dtype::F4 { .. } => 4,
        Dtype::F8 { .. } => 8,
    };
    let byte_len = len
        .checked_mul(width)
        .and_then(|bytes| u64::try_from(bytes).ok())
        .ok_or_else(|| {
            NpyError::MalformedHeader(format!("{} elements do not fit in memory", len))
        })?;

    // The header length is untrusted, so the buffer only grows with the bytes actually read.
    let mut payload = Vec::new();
    reader.take(byte_len).read_to_end(&mut payload)?;
    if payload.len() as u64 != byte_len {
        return Err(NpyError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "payload holds {} of {} expected bytes",
                payload.len(),
                byte_len
            ),
        )));
    }

    let mut values = vec![0f64; len];
    match dtype {
        Dtype::F8 { .. } => B::read_f64_into(&payload, &mut values),
        Dtype::F4 { .. } => {
            for (value, bytes) in values.iter_mut().zip(payload.chunks_exact(4)) {
                *value = B::read_f32(bytes) as f64;
            }
        }
    }
    Ok(values)
}

/// Reads a one-dimensional float array. 32 bit floats are widened to `f64`.
pub fn read_array<R: Read>(reader: &mut R) -> Result<Vec<f64>, NpyError> {
    let header = read_header(reader)?;
    log::debug!("npy header: {:?}", header);

    match header.dtype {
        Dtype::F4 { big_endian: false } | Dtype::F8 { big_endian: false } => {
            read_values::<_, LittleEndian>(reader, header.dtype, header.len)
        }
        Dtype::F4 { big_endian: true } | Dtype::F8 { big_endian: true } => {
            read_values::<_, BigEndian>(reader, header.dtype, header.len)
        }
    }
}

/// Writes `values` as a version 1.0 `.npy` array of little-endian `f8`.
pub fn write_array<W: Write>(writer: &mut W, values: &[f64]) -> Result<(), NpyError> {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        values.len()
    );
    // magic, two version bytes and the u16 header length come before the header.
    let preamble_len = MAGIC.len() + 2 + 2;
    let unpadded = preamble_len + header.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    writer.write_all(MAGIC)?;
    writer.write_u8(1)?;
    writer.write_u8(0)?;
    writer.write_u16::<LittleEndian>(header.len() as u16)?;
    writer.write_all(header.as_bytes())?;
    for value in values {
        writer.write_f64::<LittleEndian>(*value)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_file(path: &Path) -> Result<Vec<f64>, NpyError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_array(&mut reader)
}

pub fn write_file(path: &Path, values: &[f64]) -> Result<(), NpyError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_array(&mut writer, values)
}
