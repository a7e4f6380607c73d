//! The pager manages file access and on-demand page caching for one open
//! database file. Pages are loaded lazily and cached for the lifetime of
//! the pager; all pages share the file's declared page size.

use crate::dbheader;
use std::io::{Read, Seek, SeekFrom};

#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("The page number {0} is beyond the end of the file.")]
    PageNumberBeyondLimits(PageNum),
    #[error("Error reading file: {0}")]
    Io(String),
    #[error(transparent)]
    Header(#[from] dbheader::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e.to_string())
    }
}

/// Page numbers are 1-based, matching the on-disk numbering convention.
pub type PageNum = usize;

/// Manages reads against one open database file.
pub struct Pager {
    f: std::fs::File,
    page_size: u32,
    num_pages: u32,
    pages: std::collections::HashMap<PageNum, Vec<u8>>,
}

impl Pager {
    /// Opens `path` read-only and parses its file header.
    pub fn open(path: &str) -> Result<Self, Error> {
        let mut f = std::fs::OpenOptions::new()
            .read(true)
            .write(false)
            .create(false)
            .open(path)?;
        let header = dbheader::read_header(&mut f)?;
        log::debug!(
            "opened {} page_size={} num_pages={}",
            path,
            header.page_size,
            header.num_pages
        );
        Ok(Pager {
            f,
            page_size: header.page_size,
            num_pages: header.num_pages,
            pages: std::collections::HashMap::new(),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    fn read_page_from_file(&mut self, pn: PageNum) -> Result<Vec<u8>, Error> {
        let mut v = vec![0_u8; self.page_size as usize];
        self.f
            .seek(SeekFrom::Start((pn - 1) as u64 * self.page_size as u64))?;
        self.f.read_exact(&mut v[..])?;
        Ok(v)
    }

    /// Returns the bytes of page `pn`, reading it from disk on first access.
    pub fn get_page(&mut self, pn: PageNum) -> Result<&Vec<u8>, Error> {
        if pn == 0 {
            return Err(Error::PageNumberBeyondLimits(pn));
        }
        if !self.pages.contains_key(&pn) {
            log::trace!("reading page {} from disk", pn);
            let v = self.read_page_from_file(pn)?;
            self.pages.insert(pn, v);
        }
        Ok(self.pages.get(&pn).unwrap())
    }
}
