/// Upload pipeline module
///
/// This module handles:
/// - Holding the picked file in memory (file.rs)
/// - Reading pixel resolution through a temporary URL (resolution.rs)
/// - Pre-upload type/size/resolution checks (validator.rs)
/// - Base64 data URL previews (preview.rs)
/// - The inert upload transport and its lifecycle events (transport.rs)
pub mod file;
pub mod preview;
pub mod resolution;
pub mod transport;
pub mod validator;

/// Encode a black JPEG of the given size
#[cfg(test)]
pub(crate) fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Jpeg)
        .expect("encode jpeg fixture");
    bytes.into_inner()
}
