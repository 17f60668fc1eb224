//! Tests for classified-image PNG encoding.
//!
//! Decodes the IDAT stream with flate2 to check that palette indices and
//! scanline layout survive encoding.

use flate2::read::ZlibDecoder;
use ndvi_common::{Category, ClassifiedImage, Rgba};
use renderer::{encode_classified, encode_rgba, render_legend, CategoryPalette};
use std::io::Read;

// ============================================================================
// Helper functions
// ============================================================================

/// Split a PNG into (type, data) chunks.
fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = 8;
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let mut kind = [0u8; 4];
        kind.copy_from_slice(&png[pos + 4..pos + 8]);
        out.push((kind, png[pos + 8..pos + 8 + len].to_vec()));
        pos += 12 + len;
    }
    out
}

fn chunk<'a>(all: &'a [([u8; 4], Vec<u8>)], kind: &[u8; 4]) -> Option<&'a Vec<u8>> {
    all.iter().find(|(k, _)| k == kind).map(|(_, d)| d)
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    out
}

/// 3x2 image: transparent, water, barren / sparse, moderate, dense
fn sample_image() -> ClassifiedImage {
    let mut image = ClassifiedImage::new(3, 2);
    for (idx, category) in Category::ALL.iter().enumerate() {
        image.set(idx + 1, Rgba::opaque(category.color()));
    }
    image
}

// ============================================================================
// Indexed encoding
// ============================================================================

#[test]
fn test_classified_uses_indexed_png() {
    let png = encode_classified(&sample_image()).unwrap();
    let all = chunks(&png);

    let ihdr = chunk(&all, b"IHDR").unwrap();
    assert_eq!(&ihdr[0..4], &3u32.to_be_bytes());
    assert_eq!(&ihdr[4..8], &2u32.to_be_bytes());
    assert_eq!(ihdr[9], 3, "color type should be indexed");

    let plte = chunk(&all, b"PLTE").unwrap();
    assert_eq!(plte.len(), 6 * 3);

    let trns = chunk(&all, b"tRNS").unwrap();
    assert_eq!(trns, &vec![0, 255, 255, 255, 255, 255]);
}

#[test]
fn test_classified_scanlines() {
    let png = encode_classified(&sample_image()).unwrap();
    let all = chunks(&png);
    let raw = inflate(chunk(&all, b"IDAT").unwrap());

    // filter byte + 3 indices per row
    assert_eq!(raw, vec![0, 0, 1, 2, 0, 3, 4, 5]);
}

#[test]
fn test_foreign_color_falls_back_to_rgba() {
    let mut image = ClassifiedImage::new(1, 1);
    image.set(
        0,
        Rgba {
            r: 10,
            g: 20,
            b: 30,
            a: 128,
        },
    );

    let png = encode_classified(&image).unwrap();
    let all = chunks(&png);
    assert_eq!(chunk(&all, b"IHDR").unwrap()[9], 6);
    assert!(chunk(&all, b"PLTE").is_none());
    assert_eq!(inflate(chunk(&all, b"IDAT").unwrap()), vec![0, 10, 20, 30, 128]);
}

#[test]
fn test_rgba_roundtrip_bytes() {
    let pixels = [255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 0, 1, 2, 3, 4];
    let png = encode_rgba(&pixels, 2, 2).unwrap();
    let all = chunks(&png);
    let raw = inflate(chunk(&all, b"IDAT").unwrap());
    assert_eq!(raw.len(), 2 * (1 + 8));
    assert_eq!(&raw[1..9], &pixels[0..8]);
    assert_eq!(&raw[10..18], &pixels[8..16]);
    assert_eq!(chunks(&png).last().unwrap().0, *b"IEND");
}

// ============================================================================
// Legend
// ============================================================================

#[test]
fn test_legend_swatches() {
    let png = render_legend(2, 3).unwrap();
    let all = chunks(&png);
    let ihdr = chunk(&all, b"IHDR").unwrap();
    assert_eq!(&ihdr[0..4], &2u32.to_be_bytes());
    assert_eq!(&ihdr[4..8], &15u32.to_be_bytes());

    let raw = inflate(chunk(&all, b"IDAT").unwrap());
    let palette = CategoryPalette::default();
    for (row, scanline) in raw.chunks_exact(3).enumerate() {
        let category = Category::ALL[row / 3];
        let expected = palette.index_of_category(category);
        assert_eq!(scanline, &[0, expected, expected], "row {}", row);
    }
}
