//! A process-wide, content-addressed stock of raw font data.
//!
//! Embedding the same font into many documents (or many times into one)
//! must not duplicate the buffer: registration is keyed by a checksum of
//! the content, so byte-identical buffers resolve to one shared entry no
//! matter where they came from. The stock holds its entries weakly; once
//! the last user drops its handle, the buffer is reclaimed through normal
//! ownership rather than living until process exit.

use rustc_hash::FxHashMap;
use std::fmt;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock, RwLock, Weak};

/// The checksum runs in chunks of this size, deferring the modulo until a
/// chunk is done. 3800 bytes is the largest chunk for which the deferred
/// sums provably fit into a `u32`.
const CHECKSUM_CHUNK_SIZE: usize = 3800;

const CHECKSUM_MODULUS: u32 = 65521;

/// Compute the content checksum used as the stock key.
///
/// An Adler-32 style rolling sum: two running sums reduced modulo 65521,
/// combined as `(s2 << 16) | s1`.
pub fn checksum(data: &[u8]) -> u32 {
    let mut s1: u32 = 1;
    let mut s2: u32 = 0;

    for chunk in data.chunks(CHECKSUM_CHUNK_SIZE) {
        for byte in chunk {
            s1 += u32::from(*byte);
            s2 += s1;
        }

        s1 %= CHECKSUM_MODULUS;
        s2 %= CHECKSUM_MODULUS;
    }

    (s2 << 16) | s1
}

/// One registered font buffer.
///
/// Immutable once registered; everyone holding an [`Arc`] to it shares the
/// same allocation.
pub struct FontData {
    checksum: u32,
    data: Vec<u8>,
}

impl FontData {
    /// The raw bytes of the font.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The content checksum the buffer is registered under.
    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

impl Debug for FontData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontData")
            .field("checksum", &self.checksum)
            .field("len", &self.data.len())
            .finish()
    }
}

/// The shared stock of registered font buffers.
///
/// The one structure in this workspace that is deliberately cross-thread:
/// fonts are registered from wherever documents are built. Reads go through
/// an optimistic read lock; only a genuinely new buffer takes the write
/// lock, where the presence check is repeated before inserting.
pub struct FontStock {
    entries: RwLock<FxHashMap<u32, Weak<FontData>>>,
}

impl FontStock {
    /// The process-wide stock.
    pub fn global() -> &'static Self {
        static STOCK: OnceLock<FontStock> = OnceLock::new();

        STOCK.get_or_init(|| Self {
            entries: RwLock::new(FxHashMap::default()),
        })
    }

    /// Register a font buffer, returning the canonical shared entry.
    ///
    /// Byte-identical input yields the identical entry, also under
    /// concurrent registration from several threads; only the checksum is
    /// ever computed redundantly.
    pub fn register(&self, data: &[u8]) -> Arc<FontData> {
        let checksum = checksum(data);

        if let Some(existing) = self
            .entries
            .read()
            .unwrap()
            .get(&checksum)
            .and_then(Weak::upgrade)
        {
            return existing;
        }

        let mut entries = self.entries.write().unwrap();

        // Another thread may have inserted between the two locks.
        if let Some(existing) = entries.get(&checksum).and_then(Weak::upgrade) {
            return existing;
        }

        // While holding the write lock anyway, drop entries whose last
        // user is gone.
        entries.retain(|_, entry| entry.strong_count() > 0);

        let entry = Arc::new(FontData {
            checksum,
            data: data.to_vec(),
        });
        entries.insert(checksum, Arc::downgrade(&entry));

        entry
    }

    /// The number of currently live entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap()
            .values()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    /// Whether no live entries are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Register a font buffer with the process-wide stock.
pub fn register_font_data(data: &[u8]) -> Arc<FontData> {
    FontStock::global().register(data)
}
