//! # extract: the Extraction Adapter
//!
//! Converts uploaded bytes of a declared [`DocumentKind`] into plain text.
//! All failures come back as [`Outcome::Failed`]; nothing here panics or
//! returns `Err` to the caller.
//!
//! - Image: delegated to an [`OcrEngine`].
//! - PDF: text is pulled page by page with `lopdf`. A document that parses but
//!   yields only whitespace is reported separately from a parse failure.
//! - Text: strict UTF-8 decoding, never lossy.
//!
//! Successful text is trimmed before it is returned.

use lopdf::Document as PdfDocument;
use tracing::{debug, error, info, warn};

use crate::contract::OcrEngine;
use crate::document::DocumentKind;
use crate::ocr::TesseractOcr;
use crate::outcome::Outcome;

pub const UNSUPPORTED_TYPE: &str = "Unsupported file type.";
pub const NO_USABLE_PDF_TEXT: &str = "Error: No usable text extracted from PDF.";

pub struct Extractor<O = TesseractOcr> {
    ocr: O,
}

impl Extractor<TesseractOcr> {
    pub fn new() -> Self {
        Self {
            ocr: TesseractOcr::new(),
        }
    }
}

impl Default for Extractor<TesseractOcr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: OcrEngine> Extractor<O> {
    pub fn with_ocr(ocr: O) -> Self {
        Self { ocr }
    }

    /// Extract text from `content` according to `kind`.
    pub fn extract(&self, content: &[u8], kind: &DocumentKind) -> Outcome {
        let raw = match kind {
            DocumentKind::Image => self.extract_image(content),
            DocumentKind::Pdf => extract_pdf(content),
            DocumentKind::Text => extract_txt(content),
            DocumentKind::Unsupported(ext) => {
                warn!(kind = %ext, "[EXTRACT] Unsupported document kind");
                return Outcome::failed(UNSUPPORTED_TYPE);
            }
        };

        match raw {
            Outcome::Text(text) => {
                let text = text.trim().to_string();
                info!(kind = kind.tag(), chars = text.len(), "[EXTRACT] Extraction succeeded");
                Outcome::Text(text)
            }
            failed => {
                error!(kind = kind.tag(), reason = %failed, "[EXTRACT][ERROR] Extraction failed");
                failed
            }
        }
    }

    fn extract_image(&self, content: &[u8]) -> Outcome {
        match self.ocr.recognize(content) {
            Ok(text) => Outcome::Text(text),
            Err(e) => Outcome::failed(format!("Error during OCR: {e}")),
        }
    }
}

fn extract_pdf(content: &[u8]) -> Outcome {
    let doc = match PdfDocument::load_mem(content) {
        Ok(doc) => doc,
        Err(e) => return Outcome::failed(format!("Error extracting text from PDF: {e}")),
    };

    let mut text = String::new();
    // get_pages is keyed by page number, so iteration is in page order.
    for page_number in doc.get_pages().into_keys() {
        match doc.extract_text(&[page_number]) {
            Ok(page_text) if !page_text.is_empty() => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Ok(_) => debug!(page = page_number, "[EXTRACT] PDF page yielded no text"),
            Err(e) => {
                return Outcome::failed(format!("Error extracting text from PDF: {e}"));
            }
        }
    }

    if text.trim().is_empty() {
        return Outcome::failed(NO_USABLE_PDF_TEXT);
    }
    Outcome::Text(text)
}

fn extract_txt(content: &[u8]) -> Outcome {
    match std::str::from_utf8(content) {
        Ok(text) => Outcome::text(text),
        Err(e) => Outcome::failed(format!("Error reading TXT file: {e}")),
    }
}
