use crate::error::DocxError;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";

/// Every entry of a DOCX archive, in archive order.
#[derive(Clone, Debug)]
pub struct DocxPackage {
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self, DocxError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        Self::from_reader(Cursor::new(bytes))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }

        let package = Self { entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()));
        }
        Ok(package)
    }

    /// Build a package directly from entries (used to assemble documents in memory).
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Result<Self, DocxError> {
        let package = Self { entries };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(DocxError::MissingPart(DOCUMENT_PART.to_string()));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn document_xml(&self) -> Result<&str, DocxError> {
        let bytes = self
            .part(DOCUMENT_PART)
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
        std::str::from_utf8(bytes).map_err(|e| DocxError::Malformed(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))
    }

    /// Copy of the package with one part's content replaced.
    pub fn with_part(&self, name: &str, data: Vec<u8>) -> Self {
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = data,
            None => entries.push((name.to_string(), data)),
        }
        Self { entries }
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Serialize back to a zip archive. Media is stored, everything else deflated.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, data) in &self.entries {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), deflated)?;
                continue;
            }
            let opts = if name.starts_with("word/media/") { stored } else { deflated };
            zip.start_file(name.as_str(), opts)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}
