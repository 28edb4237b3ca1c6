//! File name, extension and MIME helpers for images.

use percent_encoding::percent_decode_str;

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".svg", ".webp",
];

/// MIME type for a file extension (with or without the leading dot).
///
/// Unknown or non-image extensions map to `image/jpeg`.
pub fn mime_for_extension(ext: &str) -> &'static str {
    mime_guess::from_ext(ext.trim_start_matches('.'))
        .first_raw()
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or("image/jpeg")
}

/// MIME type for a path, judged by its extension.
pub fn mime_for_path(path: &str) -> &'static str {
    mime_for_extension(extension(path).unwrap_or_default())
}

/// File extension (with the dot) for an image MIME type; `.jpg` if unknown.
pub fn extension_for_mime(mime: &str) -> &'static str {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "image/tiff" => ".tiff",
        _ => ".jpg",
    }
}

/// Whether the name ends in a known image extension.
pub fn has_image_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Whether the name refers to a WebP image.
pub fn is_webp(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".webp")
}

/// Replace a trailing `.webp` with `.jpg`.
pub fn webp_to_jpg_name(name: &str) -> String {
    if is_webp(name) {
        format!("{}.jpg", &name[..name.len() - ".webp".len()])
    } else {
        name.to_owned()
    }
}

/// Derive an upload file name from an image URL.
///
/// Uses the last path segment (percent-decoded). When it lacks an image
/// extension, one is derived from `content_type`.
pub fn image_name_from_url(url: &str, content_type: Option<&str>) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let segment = path
        .split_once('/')
        .map_or("", |(_, p)| p)
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let mut name = percent_decode_str(segment).decode_utf8_lossy().into_owned();

    if name.is_empty() {
        name = "remote_img".to_owned();
    }
    if !has_image_extension(&name) {
        name.push_str(extension_for_mime(content_type.unwrap_or_default()));
    }
    name
}

fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next()?;
    name.rsplit_once('.').map(|(_, ext)| ext)
}
