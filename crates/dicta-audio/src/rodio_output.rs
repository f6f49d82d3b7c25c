//! Real audio output through the system device via rodio.
//!
//! The cpal stream behind `rodio::OutputStream` is not `Send`, so the stream
//! lives on a dedicated OS thread for the lifetime of the output; only the
//! `Sink` handle (which is `Send`) crosses back to the caller. Dropping the
//! output ends the device thread.

use std::io::Cursor;
use std::sync::mpsc;

use rodio::{Decoder, OutputStreamBuilder, Sink};
use tracing::warn;

use dicta_core::error::{DictaError, Result};

use crate::AudioOutput;

/// Audio output backed by the default system device.
pub struct RodioOutput {
    sink: Sink,
    clip: Option<Vec<u8>>,
    // Dropping this sender releases the device thread holding the stream.
    _shutdown: mpsc::Sender<()>,
}

impl RodioOutput {
    /// Open the default output device.
    ///
    /// Fails with [`DictaError::Playback`] when no usable device exists
    /// (headless machines, CI); callers fall back to a mock output.
    pub fn new(volume: f32) -> Result<Self> {
        let (sink_tx, sink_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        std::thread::spawn(move || {
            let stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = sink_tx.send(Err(format!("failed to open audio output: {e}")));
                    return;
                }
            };
            let sink = Sink::connect_new(stream.mixer());
            if sink_tx.send(Ok(sink)).is_err() {
                return;
            }
            // Keep the device stream alive until the handle is dropped.
            let _ = shutdown_rx.recv();
        });

        let sink = sink_rx
            .recv()
            .map_err(|_| DictaError::Playback("audio device thread died".to_string()))?
            .map_err(DictaError::Playback)?;
        sink.pause();
        sink.set_volume(volume);

        Ok(Self {
            sink,
            clip: None,
            _shutdown: shutdown_tx,
        })
    }

    /// Decode the stored clip and queue it on the (paused) sink.
    fn queue_clip(&self) {
        let Some(bytes) = self.clip.as_ref() else {
            return;
        };
        match Decoder::new(Cursor::new(bytes.clone())) {
            Ok(decoder) => self.sink.append(decoder),
            // load() validated the bytes, so this is unexpected.
            Err(e) => warn!(error = %e, "Failed to re-decode audio clip"),
        }
    }
}

impl AudioOutput for RodioOutput {
    fn load(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(DictaError::AudioLoad("empty audio payload".to_string()));
        }
        // Validate before accepting ownership so a corrupt payload leaves the
        // previous state untouched from the caller's point of view.
        Decoder::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| DictaError::AudioLoad(format!("undecodable audio payload: {e}")))?;

        self.sink.clear();
        self.clip = Some(bytes.to_vec());
        self.queue_clip();
        Ok(())
    }

    fn play(&mut self) {
        if self.clip.is_none() {
            return;
        }
        if self.sink.empty() {
            // The previous run reached its natural end; start over.
            self.queue_clip();
        }
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek_to_start(&mut self) {
        if self.clip.is_none() {
            return;
        }
        // clear() also pauses, which is the contract for seek_to_start.
        self.sink.clear();
        self.queue_clip();
    }

    fn is_playing(&self) -> bool {
        !self.sink.is_paused() && !self.sink.empty()
    }

    fn release(&mut self) {
        self.sink.clear();
        self.clip = None;
    }
}
