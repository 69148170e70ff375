//! Microphone tap using CPAL (optional `microphone` feature).
//!
//! The CPAL stream handle is not `Send`, so the stream lives on a dedicated
//! thread that feeds a shared sample window; `read_bins` snapshots the most
//! recent window on demand.

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

use super::tap::{AudioTap, AudioTapSource, FREQUENCY_BINS};

/// Samples retained in the shared window (a few snapshots worth)
const WINDOW_CAPACITY: usize = FREQUENCY_BINS * 8;

/// How long to wait for the capture thread to come up
const STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Live microphone tap
pub struct MicrophoneTap {
    window: Arc<Mutex<VecDeque<i16>>>,
    stop_tx: Option<std_mpsc::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl MicrophoneTap {
    /// Acquire the default input device and start streaming into the window.
    pub fn open() -> Result<Self> {
        let window = Arc::new(Mutex::new(VecDeque::with_capacity(WINDOW_CAPACITY)));
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<String>>();

        let thread_window = Arc::clone(&window);
        let thread = std::thread::spawn(move || {
            let outcome = run_capture(thread_window, stop_rx, ready_tx);
            if let Err(e) = outcome {
                warn!("Microphone capture thread exited with error: {}", e);
            }
        });

        match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(device_name)) => {
                info!("Microphone tap opened on device: {}", device_name);
                Ok(Self {
                    window,
                    stop_tx: Some(stop_tx),
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                drop(stop_tx);
                anyhow::bail!("Microphone capture thread did not start in time")
            }
        }
    }
}

impl AudioTap for MicrophoneTap {
    fn read_bins(&mut self) -> Result<Vec<u8>> {
        let window = self
            .window
            .lock()
            .map_err(|_| anyhow::anyhow!("Microphone sample window poisoned"))?;

        let mut bins = vec![0u8; FREQUENCY_BINS];
        let take = window.len().min(FREQUENCY_BINS);
        for (bin, sample) in bins.iter_mut().zip(window.iter().rev().take(take)) {
            *bin = (sample.unsigned_abs() >> 7).min(255) as u8;
        }

        Ok(bins)
    }
}

impl Drop for MicrophoneTap {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Build the stream, report readiness, then block until stopped.
fn run_capture(
    window: Arc<Mutex<VecDeque<i16>>>,
    stop_rx: std_mpsc::Receiver<()>,
    ready_tx: std_mpsc::Sender<Result<String>>,
) -> Result<()> {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            let _ = ready_tx.send(Err(anyhow::anyhow!("No input device available")));
            return Ok(());
        }
    };
    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

    let supported = match device
        .default_input_config()
        .context("Failed to query input config")
    {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return Ok(());
        }
    };

    let err_fn = |e| warn!("Microphone stream error: {}", e);
    let config: cpal::StreamConfig = supported.clone().into();

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let window = Arc::clone(&window);
            device.build_input_stream(
                &config,
                move |data: &[f32], _| {
                    push_samples(&window, data.iter().map(|s| (s * 32767.0) as i16));
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let window = Arc::clone(&window);
            device.build_input_stream(
                &config,
                move |data: &[i16], _| {
                    push_samples(&window, data.iter().copied());
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::U16 => {
            let window = Arc::clone(&window);
            device.build_input_stream(
                &config,
                move |data: &[u16], _| {
                    push_samples(&window, data.iter().map(|s| (*s as i32 - 32768) as i16));
                },
                err_fn,
                None,
            )
        }
        other => {
            let _ = ready_tx.send(Err(anyhow::anyhow!(
                "Unsupported input sample format: {:?}",
                other
            )));
            return Ok(());
        }
    };

    let stream = match stream.context("Failed to build input stream") {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return Ok(());
        }
    };

    if let Err(e) = stream.play().context("Failed to start input stream") {
        let _ = ready_tx.send(Err(e));
        return Ok(());
    }

    let _ = ready_tx.send(Ok(device_name));

    // Hold the stream open until the tap is dropped
    let _ = stop_rx.recv();
    drop(stream);

    Ok(())
}

fn push_samples(window: &Arc<Mutex<VecDeque<i16>>>, samples: impl Iterator<Item = i16>) {
    if let Ok(mut window) = window.lock() {
        for sample in samples {
            if window.len() >= WINDOW_CAPACITY {
                window.pop_front();
            }
            window.push_back(sample);
        }
    }
}

/// Tap source backed by the default microphone
pub struct MicrophoneTapSource;

impl AudioTapSource for MicrophoneTapSource {
    fn open(&self) -> Result<Box<dyn AudioTap>> {
        Ok(Box::new(MicrophoneTap::open()?))
    }

    fn name(&self) -> &str {
        "microphone"
    }
}
