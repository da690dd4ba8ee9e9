//! Package (ZIP) handling for DOCX/DOTX files
//!
//! A word-processing package is a ZIP archive of XML parts and media. The
//! archive is held fully unpacked; parts are replaced wholesale and the
//! package is re-zipped on save.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Style definitions part
pub const STYLES_PART: &str = "word/styles.xml";
/// Numbering definitions part
pub const NUMBERING_PART: &str = "word/numbering.xml";
/// Relationships of the main document part
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
/// Content types part
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
/// Core properties part
pub const CORE_PROPS_PART: &str = "docProps/core.xml";

/// An unpacked OOXML package
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    /// All parts, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX/DOTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a part's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Get a part that must exist
    pub fn require(&self, path: &str) -> Result<&[u8]> {
        self.get(path)
            .ok_or_else(|| OoxmlError::MissingFile(path.to_string()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all part names, sorted
    pub fn file_list(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.files.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Serialize the archive into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // [Content_Types].xml first, then the rest sorted for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort_by(|a, b| {
            let key = |p: &str| (p != CONTENT_TYPES_PART, p.to_string());
            key(a).cmp(&key(b))
        });

        for path in paths {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&self.files[path])?;
        }

        zip.finish()?;
        Ok(())
    }
}
