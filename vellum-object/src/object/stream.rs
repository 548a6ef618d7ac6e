//! Stream objects.

use crate::object::dict::Dict;
use crate::object::dict::keys::{FILTER, FLATE_DECODE, LENGTH};
use crate::object::name::Name;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::fmt;
use std::fmt::Debug;

/// A stream of arbitrary data: a dictionary with an attached byte payload.
///
/// The `/Length` entry is kept in sync with the payload by this type and
/// must not be set by hand.
#[derive(Clone, PartialEq)]
pub struct Stream {
    dict: Dict,
    data: Vec<u8>,
}

impl Stream {
    /// Create a new stream with the given payload.
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_dict(Dict::new(), data)
    }

    /// Create a new stream with the given dictionary and payload.
    pub fn with_dict(mut dict: Dict, data: Vec<u8>) -> Self {
        dict.insert(Name::new(LENGTH), data.len() as i64);

        Self { dict, data }
    }

    /// The stream dictionary.
    pub fn dict(&self) -> &Dict {
        &self.dict
    }

    /// The stream dictionary, mutably.
    pub fn dict_mut(&mut self) -> &mut Dict {
        &mut self.dict
    }

    /// The raw (potentially already filtered) payload of the stream.
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Whether a filter has already been applied to the payload.
    pub fn is_filtered(&self) -> bool {
        self.dict.contains_key(FILTER)
    }

    /// Deflate the payload and record the `/FlateDecode` filter.
    ///
    /// A no-op if the stream already carries a filter.
    pub fn compress(&mut self) {
        if self.is_filtered() {
            return;
        }

        self.data = deflate_encode(&self.data);
        self.dict.insert(Name::new(FILTER), Name::new(FLATE_DECODE));
        self.dict.insert(Name::new(LENGTH), self.data.len() as i64);
    }
}

impl Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("dict", &self.dict)
            .field("len", &self.data.len())
            .finish()
    }
}

pub(crate) fn deflate_encode(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    const COMPRESSION_LEVEL: u32 = 6;
    let mut e = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
    e.write_all(data).unwrap();
    e.finish().unwrap()
}

#[cfg(test)]
mod tests {
    use crate::object::Object;
    use crate::object::dict::keys::{FILTER, LENGTH};
    use crate::object::stream::Stream;

    #[test]
    fn length_tracks_payload() {
        let stream = Stream::new(b"BT /F1 12 Tf ET".to_vec());

        assert_eq!(stream.dict().get(LENGTH), Some(&Object::from(15i64)));
    }

    #[test]
    fn compress_sets_filter_once() {
        let mut stream = Stream::new(vec![b'a'; 512]);
        stream.compress();

        assert!(stream.is_filtered());
        assert!(stream.raw_data().len() < 512);

        let compressed = stream.raw_data().to_vec();
        stream.compress();

        // The second call must not double-encode.
        assert_eq!(stream.raw_data(), compressed);
        assert_eq!(
            stream.dict().get(LENGTH),
            Some(&Object::from(compressed.len() as i64)),
        );
        assert!(stream.dict().contains_key(FILTER));
    }
}
