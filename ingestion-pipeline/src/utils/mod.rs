pub mod pdf_text_extraction;
