//! Recording and snapshot output.
//!
//! Recordings are AVI files built frame by frame: each processed display
//! image is JPEG-compressed into a `00dc` chunk inside the `movi` list,
//! and an `idx1` index plus the header frame counts are patched in when
//! the file is closed. The stream header advertises the conventional
//! `XVID` handler tag while the format header carries `MJPG`, which is
//! what players key off for video streams.
//!
//! Snapshots are single PNG files of the processed display image.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::camera::swap_red_blue_in_place;
use crate::ndvi::BgrImage;

/// Recording playback rate in frames per second.
pub const RECORD_FPS: u32 = 20;

/// JPEG quality for recorded frames.
const JPEG_QUALITY: u8 = 90;

/// Errors that can occur while writing recordings or snapshots.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    EncodeError(#[from] image::ImageError),

    #[error("Frame is {got_w}x{got_h} but the recording is {want_w}x{want_h}")]
    DimensionMismatch {
        got_w: usize,
        got_h: usize,
        want_w: usize,
        want_h: usize,
    },

    #[error("No image content to save")]
    EmptyImage,
}

/// Build a `{prefix}_YYYYMMDD_HHMMSS.{extension}` filename from the local clock.
pub fn timestamped_filename(prefix: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        Local::now().format("%Y%m%d_%H%M%S"),
        extension
    )
}

/// Save a BGR image as a PNG file.
pub fn save_snapshot(img: &BgrImage, path: &Path) -> Result<(), RecordError> {
    if img.pixel_count() == 0 {
        return Err(RecordError::EmptyImage);
    }

    let mut rgb = img.data.clone();
    swap_red_blue_in_place(&mut rgb);

    let buf = image::RgbImage::from_raw(img.width as u32, img.height as u32, rgb)
        .ok_or(RecordError::EmptyImage)?;
    buf.save(path)?;
    Ok(())
}

struct IndexEntry {
    /// Chunk offset relative to the `movi` fourcc
    offset: u32,
    /// Unpadded chunk payload size
    size: u32,
}

/// Incremental AVI writer for the processed display stream.
///
/// `create` writes the fixed headers with placeholder sizes, `write_frame`
/// appends one JPEG chunk per call, and `finish` writes the index and
/// patches the placeholders. If the writer is dropped without `finish`,
/// patching is attempted best-effort so the file stays playable.
pub struct AviWriter {
    file: BufWriter<File>,
    width: u32,
    height: u32,
    entries: Vec<IndexEntry>,
    max_chunk: u32,
    /// File position of the `movi` fourcc; idx1 offsets are relative to it
    movi_list_pos: u64,
    riff_size_pos: u64,
    total_frames_pos: u64,
    avih_buf_pos: u64,
    strh_length_pos: u64,
    strh_buf_pos: u64,
    movi_size_pos: u64,
    rgb_scratch: Vec<u8>,
    jpeg_scratch: Vec<u8>,
    finished: bool,
}

impl AviWriter {
    /// Open `path` and write the AVI headers for a `width` x `height` stream.
    pub fn create(path: &Path, width: u32, height: u32) -> Result<Self, RecordError> {
        if width == 0 || height == 0 {
            return Err(RecordError::EmptyImage);
        }

        let mut file = BufWriter::new(File::create(path)?);

        file.write_all(b"RIFF")?;
        let riff_size_pos = file.stream_position()?;
        file.write_all(&0u32.to_le_bytes())?;
        file.write_all(b"AVI ")?;

        // hdrl list: one avih plus one strl (strh + strf)
        file.write_all(b"LIST")?;
        let hdrl_size = 4 + (8 + 56) + (8 + 4 + (8 + 56) + (8 + 40));
        file.write_all(&(hdrl_size as u32).to_le_bytes())?;
        file.write_all(b"hdrl")?;

        // avih: MainAVIHeader
        file.write_all(b"avih")?;
        file.write_all(&56u32.to_le_bytes())?;
        file.write_all(&(1_000_000 / RECORD_FPS).to_le_bytes())?; // dwMicroSecPerFrame
        file.write_all(&0u32.to_le_bytes())?; // dwMaxBytesPerSec
        file.write_all(&0u32.to_le_bytes())?; // dwPaddingGranularity
        file.write_all(&0x10u32.to_le_bytes())?; // dwFlags: AVIF_HASINDEX
        let total_frames_pos = file.stream_position()?;
        file.write_all(&0u32.to_le_bytes())?; // dwTotalFrames (patched)
        file.write_all(&0u32.to_le_bytes())?; // dwInitialFrames
        file.write_all(&1u32.to_le_bytes())?; // dwStreams
        let avih_buf_pos = file.stream_position()?;
        file.write_all(&0u32.to_le_bytes())?; // dwSuggestedBufferSize (patched)
        file.write_all(&width.to_le_bytes())?;
        file.write_all(&height.to_le_bytes())?;
        file.write_all(&[0u8; 16])?; // dwReserved

        // strl list
        file.write_all(b"LIST")?;
        let strl_size = 4 + (8 + 56) + (8 + 40);
        file.write_all(&(strl_size as u32).to_le_bytes())?;
        file.write_all(b"strl")?;

        // strh: AVIStreamHeader
        file.write_all(b"strh")?;
        file.write_all(&56u32.to_le_bytes())?;
        file.write_all(b"vids")?;
        file.write_all(b"XVID")?; // fccHandler
        file.write_all(&0u32.to_le_bytes())?; // dwFlags
        file.write_all(&0u16.to_le_bytes())?; // wPriority
        file.write_all(&0u16.to_le_bytes())?; // wLanguage
        file.write_all(&0u32.to_le_bytes())?; // dwInitialFrames
        file.write_all(&1u32.to_le_bytes())?; // dwScale
        file.write_all(&RECORD_FPS.to_le_bytes())?; // dwRate
        file.write_all(&0u32.to_le_bytes())?; // dwStart
        let strh_length_pos = file.stream_position()?;
        file.write_all(&0u32.to_le_bytes())?; // dwLength (patched)
        let strh_buf_pos = file.stream_position()?;
        file.write_all(&0u32.to_le_bytes())?; // dwSuggestedBufferSize (patched)
        file.write_all(&u32::MAX.to_le_bytes())?; // dwQuality: default
        file.write_all(&0u32.to_le_bytes())?; // dwSampleSize
        file.write_all(&0u16.to_le_bytes())?; // rcFrame.left
        file.write_all(&0u16.to_le_bytes())?; // rcFrame.top
        file.write_all(&(width as u16).to_le_bytes())?; // rcFrame.right
        file.write_all(&(height as u16).to_le_bytes())?; // rcFrame.bottom

        // strf: BITMAPINFOHEADER
        file.write_all(b"strf")?;
        file.write_all(&40u32.to_le_bytes())?;
        file.write_all(&40u32.to_le_bytes())?; // biSize
        file.write_all(&(width as i32).to_le_bytes())?;
        file.write_all(&(height as i32).to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?; // biPlanes
        file.write_all(&24u16.to_le_bytes())?; // biBitCount
        file.write_all(b"MJPG")?; // biCompression
        file.write_all(&(width * height * 3).to_le_bytes())?; // biSizeImage
        file.write_all(&[0u8; 16])?; // pels-per-meter, color counts

        // movi list, filled as frames arrive
        file.write_all(b"LIST")?;
        let movi_size_pos = file.stream_position()?;
        file.write_all(&0u32.to_le_bytes())?; // (patched)
        let movi_list_pos = file.stream_position()?;
        file.write_all(b"movi")?;

        Ok(Self {
            file,
            width,
            height,
            entries: Vec::new(),
            max_chunk: 0,
            movi_list_pos,
            riff_size_pos,
            total_frames_pos,
            avih_buf_pos,
            strh_length_pos,
            strh_buf_pos,
            movi_size_pos,
            rgb_scratch: Vec::new(),
            jpeg_scratch: Vec::new(),
            finished: false,
        })
    }

    /// Compress one BGR image and append it as a `00dc` chunk.
    pub fn write_frame(&mut self, img: &BgrImage) -> Result<(), RecordError> {
        if img.width != self.width as usize || img.height != self.height as usize {
            return Err(RecordError::DimensionMismatch {
                got_w: img.width,
                got_h: img.height,
                want_w: self.width as usize,
                want_h: self.height as usize,
            });
        }

        self.rgb_scratch.clear();
        self.rgb_scratch.extend_from_slice(&img.data);
        swap_red_blue_in_place(&mut self.rgb_scratch);

        self.jpeg_scratch.clear();
        JpegEncoder::new_with_quality(&mut self.jpeg_scratch, JPEG_QUALITY).encode(
            &self.rgb_scratch,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
        )?;

        let offset = (self.file.stream_position()? - self.movi_list_pos) as u32;
        let size = self.jpeg_scratch.len() as u32;

        self.file.write_all(b"00dc")?;
        self.file.write_all(&size.to_le_bytes())?;
        self.file.write_all(&self.jpeg_scratch)?;
        if size % 2 == 1 {
            // RIFF chunks are word-aligned
            self.file.write_all(&[0u8])?;
        }

        self.max_chunk = self.max_chunk.max(size + size % 2);
        self.entries.push(IndexEntry { offset, size });
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> usize {
        self.entries.len()
    }

    /// Write the index, patch header sizes, and flush.
    pub fn finish(mut self) -> Result<(), RecordError> {
        self.finish_inner()
    }

    fn finish_inner(&mut self) -> Result<(), RecordError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let idx1_pos = self.file.stream_position()?;
        self.file.write_all(b"idx1")?;
        self.file
            .write_all(&((self.entries.len() * 16) as u32).to_le_bytes())?;
        for entry in &self.entries {
            self.file.write_all(b"00dc")?;
            self.file.write_all(&0x10u32.to_le_bytes())?; // AVIIF_KEYFRAME
            self.file.write_all(&entry.offset.to_le_bytes())?;
            self.file.write_all(&entry.size.to_le_bytes())?;
        }
        let end_pos = self.file.stream_position()?;

        let frames = self.entries.len() as u32;
        let patches: [(u64, u32); 6] = [
            (self.riff_size_pos, (end_pos - 8) as u32),
            (self.total_frames_pos, frames),
            (self.avih_buf_pos, self.max_chunk),
            (self.strh_length_pos, frames),
            (self.strh_buf_pos, self.max_chunk),
            (self.movi_size_pos, (idx1_pos - self.movi_size_pos - 4) as u32),
        ];
        for (pos, value) in patches {
            self.file.seek(SeekFrom::Start(pos))?;
            self.file.write_all(&value.to_le_bytes())?;
        }

        self.file.flush()?;
        Ok(())
    }
}

impl Drop for AviWriter {
    fn drop(&mut self) {
        let _ = self.finish_inner();
    }
}
