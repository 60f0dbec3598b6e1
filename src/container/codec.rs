//! Container encoder and lenient decoder

use super::{
    Blob, CONSOLE_ID, Container, ContainerError, HEADER_LEN, MAGIC, MAX_CONTENT_LEN, MAX_ID_LEN,
};

/// Size of one blob record on the wire
#[inline]
fn record_len(id_len: usize, content_len: usize) -> u64 {
    1 + id_len as u64 + 4 + content_len as u64
}

fn check_id(field: &'static str, id: &str) -> Result<(), ContainerError> {
    if id.len() > MAX_ID_LEN {
        return Err(ContainerError::InvalidBlobSize {
            field,
            len: id.len(),
            max: MAX_ID_LEN,
        });
    }
    Ok(())
}

fn check_content(content: &[u8]) -> Result<(), ContainerError> {
    if content.len() > MAX_CONTENT_LEN {
        return Err(ContainerError::InvalidBlobSize {
            field: "blob content",
            len: content.len(),
            max: MAX_CONTENT_LEN,
        });
    }
    Ok(())
}

/// Total encoded length for a console ID and a set of blobs
///
/// Fails if any ID or content is too large, or the container as a whole
/// would not fit the 4-byte length field.
pub fn encoded_len<K, C>(console_id: &str, pairs: &[(K, C)]) -> Result<u32, ContainerError>
where
    K: AsRef<str>,
    C: AsRef<[u8]>,
{
    check_id("console id", console_id)?;
    let mut total = HEADER_LEN as u64 + console_id.len() as u64;
    for (id, content) in pairs {
        let (id, content) = (id.as_ref(), content.as_ref());
        check_id("blob id", id)?;
        check_content(content)?;
        total += record_len(id.len(), content.len());
    }
    u32::try_from(total).map_err(|_| ContainerError::InvalidBlobSize {
        field: "container",
        len: usize::try_from(total).unwrap_or(usize::MAX),
        max: u32::MAX as usize,
    })
}

/// Encode blobs in order under an explicit console ID
pub fn encode_with_console<K, C>(console_id: &str, pairs: &[(K, C)]) -> Result<Vec<u8>, ContainerError>
where
    K: AsRef<str>,
    C: AsRef<[u8]>,
{
    let total = encoded_len(console_id, pairs)?;

    let mut out = Vec::with_capacity(total as usize);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&total.to_le_bytes());
    out.push(console_id.len() as u8);
    out.extend_from_slice(console_id.as_bytes());

    for (id, content) in pairs {
        let (id, content) = (id.as_ref(), content.as_ref());
        out.push(id.len() as u8);
        out.extend_from_slice(id.as_bytes());
        out.extend_from_slice(&(content.len() as u32).to_le_bytes());
        out.extend_from_slice(content);
    }

    debug_assert_eq!(out.len(), total as usize);
    Ok(out)
}

/// Encode a container holding exactly one blob
pub fn encode_single(id: &str, content: &[u8]) -> Result<Vec<u8>, ContainerError> {
    encode_with_console(CONSOLE_ID, &[(id, content)])
}

/// Encode a container holding every pair, in input order
pub fn encode_multi<K, C>(pairs: &[(K, C)]) -> Result<Vec<u8>, ContainerError>
where
    K: AsRef<str>,
    C: AsRef<[u8]>,
{
    encode_with_console(CONSOLE_ID, pairs)
}

/// Bounded reader over the region `[pos, end)`
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if len > self.remaining() {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(bytes)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn u32_le(&mut self) -> Option<u32> {
        self.take(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Decode a container
///
/// Never fails: input without the magic gives an empty, unrecognized container,
/// and an incomplete blob record ends decoding with the blobs read so far.
pub fn decode(data: &[u8]) -> Container {
    if data.len() < HEADER_LEN || !data.starts_with(MAGIC) {
        log::debug!("{}", ContainerError::DecodeMagicMismatch);
        return Container::unrecognized();
    }

    let declared = u32::from_le_bytes([data[13], data[14], data[15], data[16]]) as usize;
    // A short store entry is tolerated; the declared length still bounds the walk
    let end = declared.min(data.len());
    if end < HEADER_LEN {
        return Container::unrecognized();
    }

    let mut reader = Reader {
        data,
        pos: HEADER_LEN,
        end,
    };
    let console_len = data[HEADER_LEN - 1] as usize;
    let Some(console_id) = reader.take(console_len) else {
        return Container::unrecognized();
    };

    let mut container = Container {
        console_id: Some(text(console_id)),
        blobs: Vec::new(),
        truncated: false,
    };

    while reader.remaining() > 0 {
        let start = reader.pos;
        match read_blob(&mut reader) {
            Ok(blob) => container.blobs.push(blob),
            Err(reason) => {
                log::warn!(
                    "{}",
                    ContainerError::DecodeTruncated {
                        offset: start,
                        reason
                    }
                );
                container.truncated = true;
                break;
            }
        }
    }

    container
}

fn read_blob(reader: &mut Reader<'_>) -> Result<Blob, &'static str> {
    let id_len = reader.u8().ok_or("missing blob id length")? as usize;
    let id = reader.take(id_len).ok_or("blob id runs past the end")?;
    let content_len = reader.u32_le().ok_or("blob length field incomplete")? as usize;
    let content = reader
        .take(content_len)
        .ok_or("blob length check failed, content incomplete")?;
    Ok(Blob {
        id: text(id),
        content: content.to_vec(),
    })
}
