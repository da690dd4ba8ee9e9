//! Shared fixtures for unit tests

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::template::Template;

/// PNG-encoded picture of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let picture = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut buffer = Cursor::new(Vec::new());
    picture.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// Built-in template with `body` as the main document's body
pub fn template_with_document(body: &str) -> Template {
    let mut archive = Template::builtin().unwrap().into_archive();
    archive.set_string(
        DOCUMENT_PART,
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:document>"#,
            body
        ),
    );
    Template::from_archive(archive).unwrap()
}

/// A part of a saved package, as text
pub fn part_of(bytes: &[u8], path: &str) -> String {
    OoxmlArchive::from_reader(Cursor::new(bytes))
        .unwrap()
        .get_string(path)
        .unwrap_or_else(|| panic!("{} missing from package", path))
}
