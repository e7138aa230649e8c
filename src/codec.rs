use crate::{
    Error,
    MetadataRecord,
};

/// This identifies the layout of the metadata files written by this crate.
pub const DISK_FORMAT: u64 = 1;

const FIELD_SIZE: usize = 8;

/// This is the size of every complete metadata file: format, version, term,
/// and vote, each a little-endian 64-bit unsigned integer.
pub const RECORD_SIZE: usize = FIELD_SIZE * 4;

fn put_u64(
    buf: &mut [u8; RECORD_SIZE],
    field: usize,
    value: u64,
) {
    let offset = field * FIELD_SIZE;
    buf[offset..offset + FIELD_SIZE].copy_from_slice(&value.to_le_bytes());
}

fn get_u64(
    buf: &[u8; RECORD_SIZE],
    field: usize,
) -> u64 {
    let offset = field * FIELD_SIZE;
    let mut bytes = [0; FIELD_SIZE];
    bytes.copy_from_slice(&buf[offset..offset + FIELD_SIZE]);
    u64::from_le_bytes(bytes)
}

pub fn encode(record: &MetadataRecord) -> [u8; RECORD_SIZE] {
    let mut buf = [0; RECORD_SIZE];
    put_u64(&mut buf, 0, DISK_FORMAT);
    put_u64(&mut buf, 1, record.version);
    put_u64(&mut buf, 2, record.term);
    put_u64(&mut buf, 3, record.voted_for);
    buf
}

/// Decode the content of a metadata file.
///
/// No sanity checks are made on the decoded values here; in particular a
/// version of zero decodes successfully.
pub fn decode(buf: &[u8; RECORD_SIZE]) -> Result<MetadataRecord, Error> {
    let format = get_u64(buf, 0);
    if format != DISK_FORMAT {
        return Err(Error::Malformed {
            found: format,
        });
    }
    Ok(MetadataRecord {
        version: get_u64(buf, 1),
        term: get_u64(buf, 2),
        voted_for: get_u64(buf, 3),
    })
}
