//! Decoders for the self-describing grid containers.
//!
//! Two containers are understood:
//!
//! - **JSON grid**: `{width, height, crs, xmin, ymin, xmax, ymax, samples}`
//!   where `samples` holds numbers or `null` (no data).
//! - **NDVG binary**: `b"NDVG"`, a little-endian `u32` header length, a JSON
//!   header with the same fields as above plus `dtype`, then
//!   `width * height` little-endian samples of that type.
//!
//! Missing extent values decode to NaN and are rejected later, when the
//! extent is reprojected.

use bytes::{Buf, BufMut};
use ndvi_common::{BoundingBox, NdviError, NdviResult, RasterGrid};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::config::ProcessorConfig;

/// Magic bytes opening an NDVG container.
pub const NDVG_MAGIC: &[u8; 4] = b"NDVG";

/// Turns raw container bytes into a [`RasterGrid`].
pub trait RasterDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8], config: &ProcessorConfig) -> NdviResult<RasterGrid>;
}

/// Storage type of NDVG samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    F32,
    F64,
    I16,
    U16,
}

impl SampleType {
    pub fn size(&self) -> usize {
        match self {
            SampleType::F32 => 4,
            SampleType::F64 => 8,
            SampleType::I16 | SampleType::U16 => 2,
        }
    }
}

/// Fields shared by both containers.
#[derive(Debug, Serialize, Deserialize)]
struct GridHeader {
    width: usize,
    height: usize,
    crs: String,
    #[serde(default)]
    xmin: Option<f64>,
    #[serde(default)]
    ymin: Option<f64>,
    #[serde(default)]
    xmax: Option<f64>,
    #[serde(default)]
    ymax: Option<f64>,
}

impl GridHeader {
    fn extent(&self) -> BoundingBox {
        let value = |v: Option<f64>| v.unwrap_or(f64::NAN);
        BoundingBox::new(value(self.xmin), value(self.ymin), value(self.xmax), value(self.ymax))
    }

    /// Sample count, checked against zero dimensions and the configured limit.
    fn sample_count(&self, config: &ProcessorConfig) -> NdviResult<usize> {
        if self.width == 0 || self.height == 0 {
            return Err(NdviError::decode(format!(
                "grid has zero dimension: {}x{}",
                self.width, self.height
            )));
        }
        let count = self.width.checked_mul(self.height).ok_or_else(|| {
            NdviError::decode(format!("grid too large: {}x{}", self.width, self.height))
        })?;
        if count > config.max_samples {
            return Err(NdviError::decode(format!(
                "grid has {} samples, limit is {}",
                count, config.max_samples
            )));
        }
        Ok(count)
    }
}

#[derive(Debug, Deserialize)]
struct JsonGrid {
    #[serde(flatten)]
    grid: GridHeader,
    samples: Vec<Option<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BinaryHeader {
    #[serde(flatten)]
    grid: GridHeader,
    dtype: SampleType,
}

/// JSON grid documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGridDecoder;

impl RasterDecoder for JsonGridDecoder {
    fn decode(&self, bytes: &[u8], config: &ProcessorConfig) -> NdviResult<RasterGrid> {
        let doc: JsonGrid = serde_json::from_slice(bytes)?;
        doc.grid.sample_count(config)?;

        let samples = doc.samples.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
        let header = doc.grid;
        let extent = header.extent();
        RasterGrid::new(header.width, header.height, samples, header.crs, extent)
    }
}

/// NDVG binary containers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryGridDecoder;

fn widen<T: ToPrimitive>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

impl RasterDecoder for BinaryGridDecoder {
    fn decode(&self, bytes: &[u8], config: &ProcessorConfig) -> NdviResult<RasterGrid> {
        let mut buf = bytes;
        if buf.remaining() < 8 || &buf[..4] != NDVG_MAGIC {
            return Err(NdviError::decode("missing NDVG magic"));
        }
        buf.advance(4);

        let header_len = buf.get_u32_le() as usize;
        if header_len > buf.remaining() {
            return Err(NdviError::decode(format!(
                "header length {} exceeds {} remaining bytes",
                header_len,
                buf.remaining()
            )));
        }
        let header: BinaryHeader = serde_json::from_slice(&buf[..header_len])?;
        buf.advance(header_len);

        let count = header.grid.sample_count(config)?;
        let expected = count
            .checked_mul(header.dtype.size())
            .ok_or_else(|| NdviError::decode("sample payload size overflows"))?;
        if buf.remaining() != expected {
            return Err(NdviError::decode(format!(
                "expected {} bytes of {:?} samples, found {}",
                expected,
                header.dtype,
                buf.remaining()
            )));
        }

        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            let value = match header.dtype {
                SampleType::F32 => widen(buf.get_f32_le()),
                SampleType::F64 => buf.get_f64_le(),
                SampleType::I16 => widen(buf.get_i16_le()),
                SampleType::U16 => widen(buf.get_u16_le()),
            };
            samples.push(value);
        }

        let grid = header.grid;
        let extent = grid.extent();
        RasterGrid::new(grid.width, grid.height, samples, grid.crs, extent)
    }
}

/// Picks the container by sniffing the leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecoder;

impl RasterDecoder for AutoDecoder {
    fn decode(&self, bytes: &[u8], config: &ProcessorConfig) -> NdviResult<RasterGrid> {
        if bytes.starts_with(NDVG_MAGIC) {
            return BinaryGridDecoder.decode(bytes, config);
        }
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => JsonGridDecoder.decode(bytes, config),
            _ => Err(NdviError::decode("unrecognized raster container")),
        }
    }
}

/// Serialize a grid as an NDVG container.
///
/// Integer types truncate and saturate; NaN becomes 0 for them.
pub fn encode_ndvg(grid: &RasterGrid, dtype: SampleType) -> NdviResult<Vec<u8>> {
    let extent = grid.extent();
    let finite = |v: f64| if v.is_finite() { Some(v) } else { None };
    let header = BinaryHeader {
        grid: GridHeader {
            width: grid.width(),
            height: grid.height(),
            crs: grid.crs().to_string(),
            xmin: finite(extent.min_x),
            ymin: finite(extent.min_y),
            xmax: finite(extent.max_x),
            ymax: finite(extent.max_y),
        },
        dtype,
    };
    let header_json = serde_json::to_vec(&header)?;

    let mut out = Vec::with_capacity(8 + header_json.len() + grid.len() * dtype.size());
    out.put_slice(NDVG_MAGIC);
    out.put_u32_le(header_json.len() as u32);
    out.put_slice(&header_json);
    for &value in grid.samples() {
        match dtype {
            SampleType::F32 => out.put_f32_le(value as f32),
            SampleType::F64 => out.put_f64_le(value),
            SampleType::I16 => out.put_i16_le(value as i16),
            SampleType::U16 => out.put_u16_le(value as u16),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_common::ErrorKind;

    fn config() -> ProcessorConfig {
        ProcessorConfig::default()
    }

    #[test]
    fn test_json_null_sample_is_nan() {
        let json = br#"{"width":2,"height":1,"crs":"EPSG:4326",
            "xmin":1.0,"ymin":2.0,"xmax":3.0,"ymax":4.0,"samples":[null,0.5]}"#;
        let grid = JsonGridDecoder.decode(json, &config()).unwrap();
        assert!(grid.samples()[0].is_nan());
        assert_eq!(grid.samples()[1], 0.5);
        assert_eq!(grid.extent(), &BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_json_missing_extent_is_nan() {
        let json = br#"{"width":1,"height":1,"crs":"EPSG:4326",
            "xmin":1.0,"ymin":null,"xmax":3.0,"samples":[0.5]}"#;
        let grid = JsonGridDecoder.decode(json, &config()).unwrap();
        assert!(grid.extent().min_y.is_nan());
        assert!(grid.extent().max_y.is_nan());
        assert_eq!(grid.extent().max_x, 3.0);
    }

    #[test]
    fn test_json_header_fields_beside_samples() {
        let json = br#"{"samples":[0.5,0.25],"crs":"EPSG:32611","height":1,
            "width":2,"xmin":300000,"ymin":3790200,"xmax":409800,"ymax":3900000,
            "product":"HLS.S30"}"#;
        let grid = JsonGridDecoder.decode(json, &config()).unwrap();
        assert_eq!((grid.width(), grid.height()), (2, 1));
        assert_eq!(grid.crs(), "EPSG:32611");
        assert_eq!(
            grid.extent(),
            &BoundingBox::new(300000.0, 3790200.0, 409800.0, 3900000.0)
        );
    }

    #[test]
    fn test_json_count_mismatch() {
        let json = br#"{"width":2,"height":2,"crs":"EPSG:4326","samples":[1,2,3]}"#;
        let err = JsonGridDecoder.decode(json, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_json_zero_dimension() {
        let json = br#"{"width":0,"height":2,"crs":"EPSG:4326","samples":[]}"#;
        let err = JsonGridDecoder.decode(json, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_sample_limit() {
        let json = br#"{"width":3,"height":3,"crs":"EPSG:4326","samples":[1,1,1,1,1,1,1,1,1]}"#;
        let limited = ProcessorConfig { max_samples: 8 };
        let err = JsonGridDecoder.decode(json, &limited).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(JsonGridDecoder.decode(json, &config()).is_ok());
    }

    #[test]
    fn test_binary_i16_roundtrip_values() {
        let grid = RasterGrid::new(
            2,
            2,
            vec![-9999.0, 3000.0, 6000.0, -1000.0],
            "EPSG:32611",
            BoundingBox::new(300000.0, 3790200.0, 409800.0, 3900000.0),
        )
        .unwrap();
        let bytes = encode_ndvg(&grid, SampleType::I16).unwrap();
        assert_eq!(&bytes[..4], NDVG_MAGIC);

        let decoded = BinaryGridDecoder.decode(&bytes, &config()).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_binary_truncated_payload() {
        let grid = RasterGrid::new(
            2,
            1,
            vec![0.25, 0.75],
            "EPSG:4326",
            BoundingBox::new(1.0, 2.0, 3.0, 4.0),
        )
        .unwrap();
        let bytes = encode_ndvg(&grid, SampleType::F32).unwrap();
        let err = BinaryGridDecoder
            .decode(&bytes[..bytes.len() - 1], &config())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_binary_bad_header_length() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(NDVG_MAGIC);
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(b"{}");
        let err = BinaryGridDecoder.decode(&bytes, &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_auto_dispatch() {
        let json = b"  \n{\"width\":1,\"height\":1,\"crs\":\"EPSG:4326\",\"samples\":[0.3]}";
        assert_eq!(AutoDecoder.decode(json, &config()).unwrap().len(), 1);

        let grid = RasterGrid::new(1, 1, vec![0.3], "EPSG:4326", BoundingBox::new(1.0, 2.0, 3.0, 4.0))
            .unwrap();
        let bytes = encode_ndvg(&grid, SampleType::F64).unwrap();
        assert_eq!(AutoDecoder.decode(&bytes, &config()).unwrap(), grid);

        let err = AutoDecoder.decode(b"II*\0", &config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
