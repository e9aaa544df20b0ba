//! Loading input images and writing processed ones

use crate::error::OcrError;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};

/// JPEG quality for processed output
const OUTPUT_JPEG_QUALITY: u8 = 95;

/// Decode an image file. PDFs yield their first embedded page image.
pub fn load(path: &Path) -> Result<DynamicImage, OcrError> {
    if !path.exists() {
        return Err(OcrError::InputNotFound(path.display().to_string()));
    }

    if is_pdf(path)? {
        let doc = Document::load(path).map_err(|e| {
            OcrError::InvalidImage(format!("{}: failed to load PDF: {}", path.display(), e))
        })?;
        return first_pdf_image(&doc)
            .map_err(|e| OcrError::InvalidImage(format!("{}: {}", path.display(), e)));
    }

    image::open(path).map_err(|e| OcrError::InvalidImage(format!("{}: {}", path.display(), e)))
}

/// Decode an in-memory upload
pub fn load_from_memory(data: &[u8]) -> Result<DynamicImage, OcrError> {
    if data.starts_with(b"%PDF-") {
        let doc = Document::load_mem(data)
            .map_err(|e| OcrError::InvalidImage(format!("Failed to load PDF: {}", e)))?;
        return first_pdf_image(&doc).map_err(OcrError::InvalidImage);
    }

    image::load_from_memory(data).map_err(|e| OcrError::InvalidImage(e.to_string()))
}

/// `uploads/scan.png` -> `uploads/processed_scan.jpg`
pub fn processed_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("processed_{}.jpg", stem))
}

/// Write an image as JPEG at the output quality
pub fn save_jpeg(image: &DynamicImage, path: &Path) -> Result<(), OcrError> {
    let file = File::create(path).map_err(|e| {
        OcrError::Internal(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), OUTPUT_JPEG_QUALITY);
    image.write_with_encoder(encoder).map_err(|e| {
        OcrError::Internal(format!(
            "Failed to save processed image to {}: {}",
            path.display(),
            e
        ))
    })
}

/// Check if a file is a PDF by extension or magic bytes
fn is_pdf(path: &Path) -> Result<bool, OcrError> {
    if let Some(ext) = path.extension() {
        if ext.to_string_lossy().eq_ignore_ascii_case("pdf") {
            return Ok(true);
        }
    }

    let mut file = File::open(path).map_err(|e| {
        OcrError::InvalidImage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut magic = [0u8; 5];
    if file.read_exact(&mut magic).is_ok() {
        return Ok(&magic == b"%PDF-");
    }

    Ok(false)
}

/// First image XObject that decodes.
///
/// Pages are walked in order through their (possibly inherited)
/// `/Resources /XObject` entries. Images reachable only some other way, such
/// as inside form XObjects, are tried afterwards in object order.
fn first_pdf_image(doc: &Document) -> Result<DynamicImage, String> {
    let mut tried = BTreeSet::new();

    for page_id in doc.get_pages().into_values() {
        for image_id in page_image_ids(doc, page_id) {
            if tried.insert(image_id) {
                if let Some(img) = try_image_object(doc, image_id) {
                    return Ok(img);
                }
            }
        }
    }

    for &object_id in doc.objects.keys() {
        if !tried.contains(&object_id) {
            if let Some(img) = try_image_object(doc, object_id) {
                return Ok(img);
            }
        }
    }

    Err("PDF contains no decodable page image".to_string())
}

/// XObjects named in a page's resources, in dictionary order
fn page_image_ids(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let Some(resources) = inherited_dict(doc, page_id, b"Resources") else {
        return Vec::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve_dict(doc, obj))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, value)| value.as_reference().ok())
        .collect()
}

/// Look `key` up on a page node, falling back to its `/Parent` chain
fn inherited_dict<'a>(doc: &'a Document, node_id: ObjectId, key: &[u8]) -> Option<&'a Dictionary> {
    let mut current = node_id;
    // Bounded in case of a cyclic page tree
    for _ in 0..32 {
        let node = doc.get_dictionary(current).ok()?;
        if let Ok(value) = node.get(key) {
            return resolve_dict(doc, value);
        }
        current = node.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    let (_, resolved) = doc.dereference(object).ok()?;
    resolved.as_dict().ok()
}

fn try_image_object(doc: &Document, object_id: ObjectId) -> Option<DynamicImage> {
    let stream = doc.get_object(object_id).and_then(Object::as_stream).ok()?;
    let is_image = stream
        .dict
        .get(b"Subtype")
        .and_then(Object::as_name)
        .map(|name| name == b"Image")
        .unwrap_or(false);
    if !is_image {
        return None;
    }

    match image_from_stream(doc, stream) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!("Skipping PDF image object {:?}: {}", object_id, e);
            None
        }
    }
}

fn image_from_stream(doc: &Document, stream: &Stream) -> Result<DynamicImage, String> {
    let filters = filter_names(stream);

    // JPEG streams carry a complete file once any outer filters are undone
    if filters.last().map(Vec::as_slice) == Some(b"DCTDecode".as_slice()) {
        let jpeg = decode_filters(stream, &filters[..filters.len() - 1])?;
        return image::load_from_memory(&jpeg)
            .map_err(|e| format!("Failed to decode JPEG stream: {}", e));
    }

    let dimension = |key: &[u8]| -> Result<u32, String> {
        stream
            .dict
            .get(key)
            .and_then(Object::as_i64)
            .ok()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("Missing image {}", String::from_utf8_lossy(key)))
    };
    let width = dimension(b"Width")?;
    let height = dimension(b"Height")?;

    let bits_per_component = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    if bits_per_component != 8 {
        return Err(format!(
            "Unsupported bits per component: {}",
            bits_per_component
        ));
    }

    let data = decode_filters(stream, &filters)?;
    let pixels = width as usize * height as usize;

    match color_space(doc, stream).as_str() {
        "DeviceGray" => {
            let data = truncate(data, pixels)?;
            image::GrayImage::from_raw(width, height, data)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| "Invalid grayscale image data".to_string())
        }
        "DeviceRGB" | "ICCBased" => {
            let data = truncate(data, pixels * 3)?;
            image::RgbImage::from_raw(width, height, data)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| "Invalid RGB image data".to_string())
        }
        "DeviceCMYK" => {
            let data = truncate(data, pixels * 4)?;
            let rgb: Vec<u8> = data.chunks_exact(4).flat_map(cmyk_to_rgb).collect();
            image::RgbImage::from_raw(width, height, rgb)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| "Invalid CMYK->RGB conversion".to_string())
        }
        other => Err(format!("Unsupported color space: {}", other)),
    }
}

fn truncate(mut data: Vec<u8>, expected: usize) -> Result<Vec<u8>, String> {
    if data.len() < expected {
        return Err(format!(
            "Image data too short: {} bytes, expected {}",
            data.len(),
            expected
        ));
    }
    data.truncate(expected);
    Ok(data)
}

fn cmyk_to_rgb(chunk: &[u8]) -> [u8; 3] {
    let [c, m, y, k] = [chunk[0], chunk[1], chunk[2], chunk[3]].map(|v| v as f32 / 255.0);
    [
        ((1.0 - c) * (1.0 - k) * 255.0) as u8,
        ((1.0 - m) * (1.0 - k) * 255.0) as u8,
        ((1.0 - y) * (1.0 - k) * 255.0) as u8,
    ]
}

/// `/Filter` as a list of names; absent means the content is stored raw
fn filter_names(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|f| f.as_name().ok())
            .map(<[u8]>::to_vec)
            .collect(),
        Ok(other) => other.as_name().map(|n| vec![n.to_vec()]).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

/// Undo `filters` (a leading run of the stream's own filter chain)
fn decode_filters(stream: &Stream, filters: &[Vec<u8>]) -> Result<Vec<u8>, String> {
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }

    let mut partial = stream.clone();
    let names: Vec<Object> = filters.iter().cloned().map(Object::Name).collect();
    partial.dict.set("Filter", Object::Array(names));
    if let Ok(Object::Array(params)) = stream.dict.get(b"DecodeParms") {
        let kept: Vec<Object> = params.iter().take(filters.len()).cloned().collect();
        partial.dict.set("DecodeParms", Object::Array(kept));
    }

    partial
        .decompressed_content()
        .map_err(|e| format!("Failed to decompress image: {}", e))
}

/// Color space name, resolving indirect references and `[/ICCBased ref]` arrays
fn color_space(doc: &Document, stream: &Stream) -> String {
    let Ok(cs_obj) = stream.dict.get(b"ColorSpace") else {
        return "DeviceRGB".to_string();
    };

    let resolved = match cs_obj.as_reference() {
        Ok(reference) => doc.get_object(reference).unwrap_or(cs_obj),
        Err(_) => cs_obj,
    };

    let name = match resolved {
        Object::Array(items) => items.first().and_then(|first| first.as_name().ok()),
        other => other.as_name().ok(),
    };

    name.map(|n| String::from_utf8_lossy(n).into_owned())
        .unwrap_or_else(|| "DeviceRGB".to_string())
}
