/// Configuration for a [`NonRepairingWriter`](crate::NonRepairingWriter).
///
/// Built with chained setters, e.g. `WriterSettings::new().check_names(true)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSettings {
    check_structure: bool,
    check_names: bool,
    check_attributes: bool,
    automatic_empty_elements: bool,
    xml_version: String,
    encoding: String,
}

impl Default for WriterSettings {
    fn default() -> Self {
        WriterSettings {
            check_structure: true,
            check_names: false,
            check_attributes: true,
            automatic_empty_elements: true,
            xml_version: "1.0".to_owned(),
            encoding: "UTF-8".to_owned(),
        }
    }
}

impl WriterSettings {
    pub fn new() -> Self {
        WriterSettings::default()
    }

    /// When set, a second root element and non-whitespace text, CDATA or entity
    /// references outside the root element are errors.
    pub fn check_structure(mut self, check_structure: bool) -> Self {
        self.check_structure = check_structure;
        self
    }

    /// When set, element names, attribute names and prefixes are validated as XML names.
    pub fn check_names(mut self, check_names: bool) -> Self {
        self.check_names = check_names;
        self
    }

    /// When set, writing the same attribute twice on one start tag is an error.
    pub fn check_attributes(mut self, check_attributes: bool) -> Self {
        self.check_attributes = check_attributes;
        self
    }

    /// When set, `<a></a>` with nothing in between is written as `<a/>`.
    pub fn automatic_empty_elements(mut self, automatic_empty_elements: bool) -> Self {
        self.automatic_empty_elements = automatic_empty_elements;
        self
    }

    /// Version used by [`write_start_document`](crate::NonRepairingWriter::write_start_document).
    pub fn xml_version(mut self, version: impl Into<String>) -> Self {
        self.xml_version = version.into();
        self
    }

    /// Encoding pseudo-attribute used by
    /// [`write_start_document`](crate::NonRepairingWriter::write_start_document).
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn should_check_structure(&self) -> bool {
        self.check_structure
    }

    pub fn should_check_names(&self) -> bool {
        self.check_names
    }

    pub fn should_check_attributes(&self) -> bool {
        self.check_attributes
    }

    pub fn should_use_automatic_empty_elements(&self) -> bool {
        self.automatic_empty_elements
    }

    pub fn get_xml_version(&self) -> &str {
        &self.xml_version
    }

    pub fn get_encoding(&self) -> &str {
        &self.encoding
    }
}
