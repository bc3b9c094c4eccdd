/// Background PNG dump of the occupancy raster
///
/// The frame thread copies the low words into a [`RasterSnapshot`] and hands
/// it to a single worker thread over a one-slot channel. If the worker is
/// still encoding the previous snapshot the new one is dropped.
use super::bitmask::HierarchicalBitmask;
use super::constants::{PIXEL_HEIGHT, PIXEL_WIDTH};
use crossbeam_channel::{Sender, TrySendError};
use image::{GrayImage, ImageFormat, Luma};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

const CLEAR: Luma<u8> = Luma([255]);
const OCCUPIED: Luma<u8> = Luma([0]);

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to start raster dump worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to write raster image: {0}")]
    Image(#[from] image::ImageError),

    #[error("raster dump worker has exited")]
    WorkerGone,
}

/// Frame-retired copy of the low occupancy words.
#[derive(Clone)]
pub struct RasterSnapshot {
    words: Box<[u64]>,
}

impl RasterSnapshot {
    pub fn capture(bitmask: &HierarchicalBitmask) -> Self {
        Self {
            words: bitmask.low_words().into(),
        }
    }

    #[inline]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        let address = HierarchicalBitmask::address(x, y);
        self.words[address.word] & (1u64 << address.bit) != 0
    }

    /// White for clear, black for occupied. Raster row 0 is the bottom row
    /// of the image.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(PIXEL_WIDTH as u32, PIXEL_HEIGHT as u32, |col, row| {
            let y = PIXEL_HEIGHT - 1 - row as i32;
            if self.is_occupied(col as i32, y) {
                OCCUPIED
            } else {
                CLEAR
            }
        })
    }

    pub fn write_png(&self, path: &Path) -> Result<(), DumpError> {
        self.to_image().save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// Throttled owner of the dump worker.
pub struct RasterDumper {
    sender: Option<Sender<RasterSnapshot>>,
    worker: Option<JoinHandle<()>>,
    interval: Duration,
    last_dump: Option<Instant>,
}

impl RasterDumper {
    pub fn spawn(path: PathBuf, interval: Duration) -> Result<Self, DumpError> {
        let (sender, receiver) = crossbeam_channel::bounded::<RasterSnapshot>(1);

        let worker = std::thread::Builder::new()
            .name("raster-dump".into())
            .spawn(move || {
                for snapshot in receiver {
                    match snapshot.write_png(&path) {
                        Ok(()) => log::debug!("wrote occlusion raster to {}", path.display()),
                        Err(err) => log::warn!("occlusion raster dump failed: {err}"),
                    }
                }
            })
            .map_err(DumpError::Spawn)?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            interval,
            last_dump: None,
        })
    }

    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_dump
            .map_or(true, |last| now.duration_since(last) >= self.interval)
    }

    /// Snapshot and queue the raster if the interval has elapsed.
    ///
    /// Returns whether a snapshot was queued.
    pub fn submit(&mut self, bitmask: &HierarchicalBitmask) -> Result<bool, DumpError> {
        let now = Instant::now();
        if !self.is_due(now) {
            return Ok(false);
        }
        let Some(sender) = &self.sender else {
            return Err(DumpError::WorkerGone);
        };

        match sender.try_send(RasterSnapshot::capture(bitmask)) {
            Ok(()) => {
                self.last_dump = Some(now);
                Ok(true)
            }
            Err(TrySendError::Full(_)) => Ok(false),
            Err(TrySendError::Disconnected(_)) => Err(DumpError::WorkerGone),
        }
    }
}

impl Drop for RasterDumper {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("raster dump worker panicked");
            }
        }
    }
}
