//! Building and saving documents.

use crate::metadata::DocumentInfo;
use crate::trailer::Trailer;
use crate::PdfVersion;
use log::{debug, warn};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;
use std::io;
use std::io::Write;
use thiserror::Error;
use vellum_object::DocumentId;
use vellum_object::object::array::Array;
use vellum_object::object::dict::Dict;
use vellum_object::object::dict::keys::{
    CATALOG, CONTENTS, COUNT, KIDS, MEDIA_BOX, PAGE, PAGES, PARENT, TYPE,
};
use vellum_object::object::indirect::IndirectObject;
use vellum_object::object::name::Name;
use vellum_object::object::r#ref::ObjRef;
use vellum_object::object::stream::Stream;
use vellum_object::object::string::PdfString;
use vellum_object::object::Object;
use vellum_object::write::{PdfWriter, WriteDirect};
use vellum_object::xref::XrefTable;

/// An error raised while saving a document.
#[derive(Debug, Error)]
pub enum SaveError {
    /// Writing to the sink failed.
    #[error("i/o error while writing the document")]
    Io(#[from] io::Error),
}

/// Knobs for one save pass.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Deflate every stream payload that does not carry a filter yet.
    pub compress_streams: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compress_streams: true,
        }
    }
}

/// A PDF document under construction.
///
/// One document is single-writer by design: every mutating operation takes
/// `&mut self`, and a save pass runs start to finish before anything else
/// can touch the table again. Sharing a document across threads requires
/// external synchronization, the same as any other `&mut` structure.
pub struct PdfDocument {
    version: PdfVersion,
    xref: XrefTable,
    trailer: Trailer,
    catalog: ObjRef,
    pages: ObjRef,
    info: DocumentInfo,
}

impl PdfDocument {
    /// Create an empty document with a catalog and an empty page tree.
    pub fn new() -> Self {
        let mut xref = XrefTable::new(DocumentId::new());

        let mut pages_dict = Dict::new();
        pages_dict.insert(Name::new(TYPE), Name::new(PAGES));
        pages_dict.insert(Name::new(KIDS), Array::new());
        pages_dict.insert(Name::new(COUNT), 0i64);
        let pages = xref.add_object(Object::Dict(pages_dict));

        let mut catalog_dict = Dict::new();
        catalog_dict.insert(Name::new(TYPE), Name::new(CATALOG));
        catalog_dict.insert(Name::new(PAGES), pages);
        let catalog = xref.add_object(Object::Dict(catalog_dict));

        Self {
            version: PdfVersion::Pdf17,
            xref,
            trailer: Trailer::new(catalog),
            catalog,
            pages,
            info: DocumentInfo::default(),
        }
    }

    /// The version the document will be saved as.
    pub fn version(&self) -> PdfVersion {
        self.version
    }

    /// Set the version the document will be saved as.
    pub fn set_version(&mut self, version: PdfVersion) {
        self.version = version;
    }

    /// The document metadata.
    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// The document metadata, mutably.
    pub fn info_mut(&mut self) -> &mut DocumentInfo {
        &mut self.info
    }

    /// The cross-reference table.
    pub fn xref(&self) -> &XrefTable {
        &self.xref
    }

    /// The cross-reference table, mutably.
    pub fn xref_mut(&mut self) -> &mut XrefTable {
        &mut self.xref
    }

    /// The document trailer.
    pub fn trailer(&self) -> &Trailer {
        &self.trailer
    }

    /// The reference to the document catalog.
    pub fn catalog(&self) -> ObjRef {
        self.catalog
    }

    /// The reference to the root of the page tree.
    pub fn pages(&self) -> ObjRef {
        self.pages
    }

    /// The number of pages.
    pub fn page_count(&self) -> i64 {
        self.xref
            .resolve(self.pages)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(COUNT))
            .and_then(Object::as_i64)
            .unwrap_or(0)
    }

    /// Append an empty page with the given media box size in points.
    ///
    /// The page holds a `/Parent` back-reference into the page tree, so the
    /// graph is cyclic from here on; the reachability walk is built for
    /// that.
    pub fn add_page(&mut self, width: f64, height: f64) -> ObjRef {
        let mut page = Dict::new();
        page.insert(Name::new(TYPE), Name::new(PAGE));
        page.insert(Name::new(PARENT), self.pages);
        page.insert(
            Name::new(MEDIA_BOX),
            [0.0, 0.0, width, height].into_iter().collect::<Array>(),
        );

        let page_ref = self.xref.add_object(Object::Dict(page));

        let pages = self
            .xref
            .get_mut(self.pages.id())
            .and_then(|e| e.object_mut().as_dict_mut())
            .expect("the page tree root is always registered");

        pages
            .get_mut(KIDS)
            .and_then(Object::as_array_mut)
            .expect("the page tree root always has /Kids")
            .push(page_ref);

        let count = pages
            .get_mut(COUNT)
            .expect("the page tree root always has /Count");
        let n = count.as_i64().unwrap_or(0);
        *count = Object::from(n + 1);

        page_ref
    }

    /// Attach a content stream to a page, replacing any previous one.
    pub fn set_page_contents(&mut self, page: ObjRef, content: Vec<u8>) -> ObjRef {
        let stream_ref = self.xref.add_object(Object::Stream(Stream::new(content)));

        match self
            .xref
            .get_mut(page.id())
            .and_then(|e| e.object_mut().as_dict_mut())
        {
            Some(dict) => dict.insert(Name::new(CONTENTS), stream_ref),
            // The orphaned stream is discarded again by the next save.
            None => warn!("attempt to attach content to unknown page {page}"),
        }

        stream_ref
    }

    /// Serialize the document with default options.
    pub fn save<W: Write>(&mut self, sink: W) -> Result<(), SaveError> {
        self.save_with(sink, &SaveOptions::default())
    }

    /// Serialize the document.
    ///
    /// Runs the full pipeline: fix-ups (information dictionary, file id,
    /// stream compression), compaction of everything unreachable from the
    /// trailer, contiguous renumbering, object serialization with recorded
    /// byte positions, and finally the cross-reference section and trailer.
    pub fn save_with<W: Write>(&mut self, sink: W, options: &SaveOptions) -> Result<(), SaveError> {
        let mut w = PdfWriter::new(sink);

        self.prepare_for_save(options);

        w.write_raw(&self.version.header())?;

        let root = self.trailer.to_object(None);
        let removed = self.xref.compact(&root);

        if removed > 0 {
            debug!("discarded {removed} unreachable objects");
        }

        let map = self.xref.renumber();
        self.trailer.remap(&map);
        self.catalog = ObjRef::new(
            *map.get(&self.catalog.id())
                .expect("the catalog survives compaction"),
        );
        self.pages = ObjRef::new(
            *map.get(&self.pages.id())
                .expect("the page tree root survives compaction"),
        );

        self.xref.write_objects(&mut w)?;

        let start_xref = w.position();
        self.xref.write_xref(&mut w)?;

        w.write_raw(b"trailer\n")?;
        let size = self.xref.len() as i64 + 1;
        self.trailer.to_object(Some(size)).write_direct(&mut w)?;
        w.write_raw(format!("\nstartxref\n{start_xref}\n%%EOF\n").as_bytes())?;
        w.flush()?;

        Ok(())
    }

    fn prepare_for_save(&mut self, options: &SaveOptions) {
        if let Some(dict) = self.info.to_dict() {
            match self.trailer.info() {
                Some(existing) => {
                    if let Some(entry) = self.xref.get_mut(existing.id()) {
                        *entry.object_mut() = Object::Dict(dict);
                    }
                }
                None => {
                    let reference = self.xref.add_object(Object::Dict(dict));
                    self.trailer.set_info(reference);
                }
            }
        }

        if self.trailer.file_id().is_none() {
            let file_id = self.compute_file_id();
            self.trailer.set_file_id(file_id);
        }

        if options.compress_streams {
            for id in self.xref.sorted_ids() {
                if let Some(Object::Stream(stream)) =
                    self.xref.get_mut(id).map(IndirectObject::object_mut)
                {
                    stream.compress();
                }
            }
        }
    }

    /// Derive the `/ID` entry from document content.
    ///
    /// Purely content-derived, so identically built documents serialize to
    /// identical bytes.
    fn compute_file_id(&self) -> PdfString {
        let mut seed = Vec::new();
        seed.extend_from_slice(self.version.as_str().as_bytes());
        seed.extend_from_slice(&(self.xref.len() as u64).to_be_bytes());
        seed.extend_from_slice(&u64::from(self.xref.max_object_number()).to_be_bytes());

        for field in [&self.info.title, &self.info.author, &self.info.producer] {
            if let Some(field) = field {
                seed.extend_from_slice(field);
            }
        }

        let mut first = SipHasher13::new_with_keys(0x7665_6c6c_756d_2e30, 0x6669_6c65_2069_6431);
        first.write(&seed);
        let mut second = SipHasher13::new_with_keys(0x7665_6c6c_756d_2e31, 0x6669_6c65_2069_6432);
        second.write(&seed);

        let mut id = [0u8; 16];
        id[..8].copy_from_slice(&first.finish().to_be_bytes());
        id[8..].copy_from_slice(&second.finish().to_be_bytes());

        PdfString::new(id)
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::document::PdfDocument;
    use vellum_object::object::Object;
    use vellum_object::object::dict::keys::{KIDS, PAGES, TYPE};
    use vellum_object::object::name::Name;

    #[test]
    fn new_document_has_a_catalog_and_page_tree() {
        let doc = PdfDocument::new();

        let catalog = doc.xref().resolve(doc.catalog()).unwrap();
        let dict = catalog.as_dict().unwrap();

        assert_eq!(dict.get(TYPE), Some(&Object::Name(Name::new(b"Catalog"))));
        assert_eq!(
            dict.get(PAGES).and_then(Object::as_ref_obj),
            Some(doc.pages())
        );
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn add_page_links_both_directions() {
        let mut doc = PdfDocument::new();
        let page = doc.add_page(612.0, 792.0);

        assert_eq!(doc.page_count(), 1);

        let pages = doc.xref().resolve(doc.pages()).unwrap().as_dict().unwrap();
        let kids = pages.get(KIDS).and_then(Object::as_array).unwrap();
        assert_eq!(kids.get(0).and_then(Object::as_ref_obj), Some(page));

        let page_dict = doc.xref().resolve(page).unwrap().as_dict().unwrap();
        assert_eq!(
            page_dict.get(b"Parent".as_slice()).and_then(Object::as_ref_obj),
            Some(doc.pages())
        );
    }

    #[test]
    fn contents_attach_to_the_page() {
        let mut doc = PdfDocument::new();
        let page = doc.add_page(612.0, 792.0);
        let stream = doc.set_page_contents(page, b"BT ET".to_vec());

        let page_dict = doc.xref().resolve(page).unwrap().as_dict().unwrap();
        assert_eq!(
            page_dict
                .get(b"Contents".as_slice())
                .and_then(Object::as_ref_obj),
            Some(stream)
        );
    }
}
