//! On-disk binary format for one collection's id/payload map.
//!
//! The `{name}.hnsw.meta` file layout (all integers little-endian):
//! `u64 version, u64 count, u64 next_key`, then `count` records of
//! `{u64 key, u64 id_len, id bytes, u64 values_len, values_len × f32,
//! u64 meta_len, meta_len × (u64 klen, k bytes, u64 vlen, v bytes)}`.
//! The graph topology itself lives in the sibling `{name}.hnsw` file; see
//! [`super::index::HnswIndex::save`]. Both files use a fully native format;
//! neither depends on an external HNSW crate.

use crate::error::{Error, Result};
use crate::index::hnsw::layer::NodeId;
use std::collections::HashMap;
use std::io::{Read, Write};

/// Bumped whenever the on-disk layout changes in an incompatible way.
/// Loading a file written with a different version is refused outright.
pub(crate) const FORMAT_VERSION: u64 = 1;

/// One entry in the meta file: the graph-internal key plus the record it carries.
pub(crate) struct MetaRecord {
    pub(crate) key: NodeId,
    pub(crate) id: String,
    pub(crate) values: Vec<f32>,
    pub(crate) metadata: HashMap<String, String>,
}

fn write_u64<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_all(&v.to_le_bytes()).map_err(Error::Io)
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_u64(w, bytes.len() as u64)?;
    w.write_all(bytes).map_err(Error::Io)
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(Error::Io)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let len = read_u64(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(Error::Io)?;
    Ok(buf)
}

fn read_string<R: Read>(r: &mut R) -> Result<String> {
    let bytes = read_bytes(r)?;
    String::from_utf8(bytes)
        .map_err(|e| Error::IndexCorrupted(format!("invalid utf-8 in meta file: {e}")))
}

/// Serializes `records` plus the graph's `next_key` counter to `w`.
pub(crate) fn write_meta<W: Write>(
    w: &mut W,
    records: &[MetaRecord],
    next_key: u64,
) -> Result<()> {
    write_u64(w, FORMAT_VERSION)?;
    write_u64(w, records.len() as u64)?;
    write_u64(w, next_key)?;

    for record in records {
        write_u64(w, record.key as u64)?;
        write_bytes(w, record.id.as_bytes())?;

        write_u64(w, record.values.len() as u64)?;
        for v in &record.values {
            w.write_all(&v.to_le_bytes()).map_err(Error::Io)?;
        }

        write_u64(w, record.metadata.len() as u64)?;
        for (k, v) in &record.metadata {
            write_bytes(w, k.as_bytes())?;
            write_bytes(w, v.as_bytes())?;
        }
    }

    Ok(())
}

/// Deserializes the meta file, returning `(records, next_key)`.
///
/// Refuses any file whose version prefix does not equal [`FORMAT_VERSION`].
pub(crate) fn read_meta<R: Read>(r: &mut R) -> Result<(Vec<MetaRecord>, u64)> {
    let version = read_u64(r)?;
    if version != FORMAT_VERSION {
        return Err(Error::IndexCorrupted(format!(
            "unsupported meta file version {version}, expected {FORMAT_VERSION}"
        )));
    }

    let count = read_u64(r)?;
    let next_key = read_u64(r)?;

    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let key = read_u64(r)? as NodeId;
        let id = read_string(r)?;

        let values_len = read_u64(r)? as usize;
        let mut values = Vec::with_capacity(values_len);
        for _ in 0..values_len {
            let mut buf = [0u8; 4];
            r.read_exact(&mut buf).map_err(Error::Io)?;
            values.push(f32::from_le_bytes(buf));
        }

        let meta_len = read_u64(r)?;
        let mut metadata = HashMap::with_capacity(meta_len as usize);
        for _ in 0..meta_len {
            let k = read_string(r)?;
            let v = read_string(r)?;
            metadata.insert(k, v);
        }

        records.push(MetaRecord {
            key,
            id,
            values,
            metadata,
        });
    }

    Ok((records, next_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_records() {
        let mut metadata = HashMap::new();
        metadata.insert("lang".to_string(), "en".to_string());

        let records = vec![
            MetaRecord {
                key: 0,
                id: "a".to_string(),
                values: vec![1.0, 2.0, 3.0],
                metadata: metadata.clone(),
            },
            MetaRecord {
                key: 1,
                id: "b".to_string(),
                values: vec![],
                metadata: HashMap::new(),
            },
        ];

        let mut buf = Vec::new();
        write_meta(&mut buf, &records, 2).unwrap();

        let (decoded, next_key) = read_meta(&mut buf.as_slice()).unwrap();
        assert_eq!(next_key, 2);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, "a");
        assert_eq!(decoded[0].values, vec![1.0, 2.0, 3.0]);
        assert_eq!(decoded[0].metadata.get("lang"), Some(&"en".to_string()));
        assert_eq!(decoded[1].id, "b");
    }

    #[test]
    fn refuses_mismatched_version() {
        let mut buf = Vec::new();
        write_u64(&mut buf, 9999).unwrap();
        write_u64(&mut buf, 0).unwrap();
        write_u64(&mut buf, 0).unwrap();

        let err = read_meta(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, Error::IndexCorrupted(_)));
    }
}
