use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;

use futures::channel::oneshot;
use tiny_skia::Pixmap;

use crate::error::PersistenceError;
use crate::persistence::{RasterSink, SavedLocation};

/// Flattened canvas: straight RGBA, row-major, `width * height * 4` bytes
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl RasterImage {
    pub(crate) fn from_pixmap(pixmap: &Pixmap) -> Self {
        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Self {
            width: pixmap.width(),
            height: pixmap.height(),
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA at (x, y), or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

pub type SaveResult = Result<SavedLocation, PersistenceError>;

/// Completion of a background save.
///
/// Await it, or poll it from a UI loop with [`SaveTask::try_outcome`].
#[derive(Debug)]
pub struct SaveTask {
    receiver: oneshot::Receiver<SaveResult>,
}

impl SaveTask {
    /// Returns the outcome once the worker has finished, without blocking
    pub fn try_outcome(&mut self) -> Option<SaveResult> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(PersistenceError::WorkerLost)),
        }
    }
}

impl Future for SaveTask {
    type Output = SaveResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(PersistenceError::WorkerLost)))
    }
}

/// Hand an already captured raster to a worker thread for encoding and writing.
///
/// `on_done` runs on the worker after the result is sent, e.g. to wake a UI.
pub fn spawn_save<F>(image: RasterImage, sink: Arc<dyn RasterSink>, on_done: F) -> SaveTask
where
    F: FnOnce() + Send + 'static,
{
    let (sender, receiver) = oneshot::channel();

    let spawned = thread::Builder::new()
        .name("doodle-save".to_owned())
        .spawn(move || {
            log::debug!("Saving {}x{} raster", image.width(), image.height());
            let result = sink.persist(&image);
            match &result {
                Ok(location) => log::info!("Saved drawing to {location}"),
                Err(err) => log::error!("Failed to save drawing: {err}"),
            }
            // The receiver may have been dropped; nobody is waiting then.
            let _ = sender.send(result);
            on_done();
        });

    if let Err(err) = spawned {
        // The closure, and with it the sender, is dropped: the task reports WorkerLost.
        log::error!("Failed to start save worker: {err}");
    }

    SaveTask { receiver }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_lookup() {
        let mut pixmap = Pixmap::new(2, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(10, 20, 30, 255));
        let image = RasterImage::from_pixmap(&pixmap);

        assert_eq!(image.as_rgba().len(), 8);
        assert_eq!(image.pixel(1, 0), Some([10, 20, 30, 255]));
        assert_eq!(image.pixel(2, 0), None);
        assert_eq!(image.pixel(0, 1), None);
    }
}
