//! Document metadata.

use vellum_object::object::date::DateTime;
use vellum_object::object::dict::Dict;
use vellum_object::object::dict::keys::{
    AUTHOR, CREATION_DATE, CREATOR, KEYWORDS, MOD_DATE, PRODUCER, SUBJECT, TITLE,
};
use vellum_object::object::name::Name;
use vellum_object::object::string::PdfString;

/// The metadata of a PDF document, serialized as the document information
/// dictionary.
///
/// All text fields are byte strings; in the vast majority of cases they
/// will be ASCII, but they don't have to be.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    /// The title of the document.
    pub title: Option<Vec<u8>>,
    /// The author of the document.
    pub author: Option<Vec<u8>>,
    /// The subject of the document.
    pub subject: Option<Vec<u8>>,
    /// The keywords of the document.
    pub keywords: Option<Vec<u8>>,
    /// The creator of the document.
    pub creator: Option<Vec<u8>>,
    /// The producer of the document.
    pub producer: Option<Vec<u8>>,
    /// The creation date of the document.
    pub creation_date: Option<DateTime>,
    /// The modification date of the document.
    pub modification_date: Option<DateTime>,
}

impl DocumentInfo {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build the information dictionary, or `None` if no field is set.
    pub(crate) fn to_dict(&self) -> Option<Dict> {
        if self.is_empty() {
            return None;
        }

        let mut dict = Dict::new();

        let mut text = |key: &'static [u8], value: &Option<Vec<u8>>| {
            if let Some(value) = value {
                dict.insert(Name::new(key), PdfString::new(value));
            }
        };

        text(TITLE, &self.title);
        text(AUTHOR, &self.author);
        text(SUBJECT, &self.subject);
        text(KEYWORDS, &self.keywords);
        text(CREATOR, &self.creator);
        text(PRODUCER, &self.producer);

        if let Some(date) = self.creation_date {
            dict.insert(Name::new(CREATION_DATE), date);
        }

        if let Some(date) = self.modification_date {
            dict.insert(Name::new(MOD_DATE), date);
        }

        Some(dict)
    }
}

#[cfg(test)]
mod tests {
    use crate::metadata::DocumentInfo;
    use vellum_object::object::date::DateTime;
    use vellum_object::object::dict::keys::{CREATION_DATE, PRODUCER, TITLE};

    #[test]
    fn empty_info_produces_no_dict() {
        assert!(DocumentInfo::default().to_dict().is_none());
    }

    #[test]
    fn set_fields_appear_in_the_dict() {
        let info = DocumentInfo {
            title: Some(b"Report".to_vec()),
            producer: Some(b"vellum".to_vec()),
            creation_date: Some(DateTime::new(2024, 3, 9)),
            ..DocumentInfo::default()
        };

        let dict = info.to_dict().unwrap();

        assert_eq!(dict.len(), 3);
        assert!(dict.contains_key(TITLE));
        assert!(dict.contains_key(PRODUCER));
        assert!(dict.contains_key(CREATION_DATE));
    }
}
