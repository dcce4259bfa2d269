use lopdf::Document;
use tracing::{debug, warn};

use common::error::AppError;

/// Pulls plain text out of a PDF. `pdf-extract` is tried first; when it errors
/// or yields nothing, each page is extracted separately with `lopdf` so one
/// broken page does not lose the whole document.
///
/// An empty string means the PDF parsed but carries no extractable text.
pub async fn extract_pdf_text(pdf_bytes: Vec<u8>) -> Result<String, AppError> {
    match try_fast_path(pdf_bytes.clone()).await {
        Ok(Some(text)) => return Ok(text),
        Ok(None) => debug!("pdf-extract produced no text; falling back to per-page extraction"),
        Err(err) => warn!(error = %err, "pdf-extract failed; falling back to per-page extraction"),
    }

    per_page_extraction(pdf_bytes).await
}

async fn try_fast_path(pdf_bytes: Vec<u8>) -> Result<Option<String>, AppError> {
    let extraction = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&pdf_bytes).map(|s| s.trim().to_string())
    })
    .await?
    .map_err(|err| AppError::Processing(format!("Failed to extract text from PDF: {err}")))?;

    if extraction.is_empty() {
        return Ok(None);
    }

    Ok(Some(extraction))
}

async fn per_page_extraction(pdf_bytes: Vec<u8>) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || -> Result<String, AppError> {
        let document = Document::load_mem(&pdf_bytes)
            .map_err(|err| AppError::Processing(format!("Failed to parse PDF: {err}")))?;

        let mut page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        page_numbers.sort_unstable();

        let mut pages = Vec::with_capacity(page_numbers.len());
        for page in page_numbers {
            match document.extract_text(&[page]) {
                Ok(text) => pages.push(text),
                Err(err) => warn!(page, error = %err, "skipping unreadable PDF page"),
            }
        }

        Ok(pages.join("\n"))
    })
    .await??;

    Ok(text.trim().to_string())
}
