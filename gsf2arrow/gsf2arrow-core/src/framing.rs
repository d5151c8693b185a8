//! Record and subrecord headers.

use std::io::{self, Read, Seek, SeekFrom};

use bytes::Buf;

use crate::{
    error::{GsfError, Result},
    record_type::RecordType,
    wire::WireReader,
};

/// Length of the fixed top-level record header.
pub const RECORD_HEADER_LEN: u64 = 8;
/// Length of the optional checksum word following a record header.
pub const CHECKSUM_LEN: u64 = 4;
/// Length of a subrecord header.
pub const SUBRECORD_HEADER_LEN: u64 = 4;

const RECORD_TYPE_MASK: u32 = 0x003F_FFFF;
const CHECKSUM_FLAG: u32 = 0x8000_0000;

/// Header of one top-level record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: RecordType,
    /// Byte size of the record data, excluding header and checksum.
    pub data_size: u32,
    /// Stream offset of the header itself.
    pub header_offset: u64,
    /// Stream offset immediately following the header.
    pub payload_offset: u64,
    pub checksum: Option<u32>,
}

impl RecordHeader {
    /// Reads the next record header from `reader`.
    ///
    /// Returns `Ok(None)` on a clean end of stream. A stream that ends inside
    /// the header is reported as [`GsfError::Truncated`]. The reader is left
    /// positioned at [`RecordHeader::data_offset`].
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Option<Self>> {
        let header_offset = reader.stream_position()?;
        let mut raw = [0u8; RECORD_HEADER_LEN as usize];
        let got = read_full(reader, &mut raw)?;
        if got == 0 {
            return Ok(None);
        }
        if got < raw.len() {
            return Err(GsfError::Truncated {
                offset: header_offset,
                expected: RECORD_HEADER_LEN,
                actual: got as u64,
            });
        }

        let mut buf = &raw[..];
        let data_size = buf.get_u32();
        let packed = buf.get_u32();
        let record_type = RecordType::from(packed & RECORD_TYPE_MASK);
        let payload_offset = header_offset + RECORD_HEADER_LEN;

        let checksum = if packed & CHECKSUM_FLAG != 0 {
            let mut word = [0u8; CHECKSUM_LEN as usize];
            let got = read_full(reader, &mut word)?;
            if got < word.len() {
                return Err(GsfError::Truncated {
                    offset: payload_offset,
                    expected: CHECKSUM_LEN,
                    actual: got as u64,
                });
            }
            Some(u32::from_be_bytes(word))
        } else {
            None
        };

        Ok(Some(Self {
            record_type,
            data_size,
            header_offset,
            payload_offset,
            checksum,
        }))
    }

    pub fn checksum_present(&self) -> bool {
        self.checksum.is_some()
    }

    /// Stream offset of the first data byte (after the checksum when present).
    pub fn data_offset(&self) -> u64 {
        self.payload_offset + if self.checksum_present() { CHECKSUM_LEN } else { 0 }
    }

    /// Stream offset of the following record header.
    pub fn next_record_offset(&self) -> u64 {
        self.data_offset() + u64::from(self.data_size)
    }

    /// Reads the record data, failing with [`GsfError::Truncated`] on a short read.
    pub fn read_data<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        reader.seek(SeekFrom::Start(self.data_offset()))?;
        let mut data = vec![0u8; self.data_size as usize];
        let got = read_full(reader, &mut data)?;
        if got < data.len() {
            return Err(GsfError::Truncated {
                offset: self.data_offset(),
                expected: u64::from(self.data_size),
                actual: got as u64,
            });
        }
        Ok(data)
    }

    /// Positions `reader` at the next record header.
    pub fn skip<R: Seek>(&self, reader: &mut R) -> Result<()> {
        reader.seek(SeekFrom::Start(self.next_record_offset()))?;
        Ok(())
    }
}

/// Wrapping byte sum used as the record checksum.
pub fn record_checksum(data: &[u8]) -> u32 {
    data.iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)))
}

/// Header of one subrecord inside a ping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubRecordHeader {
    pub id: u8,
    pub size: u32,
    /// Stream offset of the header.
    pub header_offset: u64,
    /// Stream offset of the payload (`header_offset + 4`).
    pub payload_offset: u64,
}

impl SubRecordHeader {
    /// Parses one subrecord header and checks its payload fits in what remains
    /// of the enclosing record.
    pub fn parse(reader: &mut WireReader<'_>, record_offset: u64) -> Result<Self> {
        let header_offset = reader.offset();
        let word = reader
            .u32("subrecord header")
            .map_err(|e| GsfError::MalformedHeader {
                record_offset,
                detail: e.to_string(),
            })?;
        let size = word & 0x00FF_FFFF;
        if size as usize > reader.remaining() {
            return Err(GsfError::MalformedHeader {
                record_offset,
                detail: format!(
                    "subrecord {} at offset {header_offset} declares {size} bytes, {} remain",
                    word >> 24,
                    reader.remaining()
                ),
            });
        }
        Ok(Self {
            id: (word >> 24) as u8,
            size,
            header_offset,
            payload_offset: header_offset + SUBRECORD_HEADER_LEN,
        })
    }

    /// Splits the payload off `reader` and returns a reader over just those bytes.
    pub fn payload<'a>(&self, reader: &mut WireReader<'a>) -> Result<WireReader<'a>> {
        let bytes = reader
            .bytes(self.size as usize, "subrecord payload")
            .map_err(|e| GsfError::payload(self.header_offset, e))?;
        Ok(WireReader::new(bytes, self.payload_offset))
    }
}

/// Reads all subrecord headers of a ping body, pairing each with its payload.
pub fn split_subrecords<'a>(
    reader: &mut WireReader<'a>,
    record_offset: u64,
) -> Result<Vec<(SubRecordHeader, WireReader<'a>)>> {
    let mut out = Vec::new();
    while reader.remaining() >= SUBRECORD_HEADER_LEN as usize {
        let header = SubRecordHeader::parse(reader, record_offset)?;
        let payload = header.payload(reader)?;
        out.push((header, payload));
    }
    Ok(out)
}

fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
