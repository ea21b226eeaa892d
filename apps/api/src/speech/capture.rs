//! Microphone capture via cpal, handed to a `Transcriber` for speech-to-text.
//!
//! `cpal::Stream` is `!Send` on most platforms, so the stream is opened, read
//! and dropped inside one `spawn_blocking` task.

use std::io::Cursor;
use std::sync::mpsc::{self, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::speech::endpoint::{EndpointConfig, EndpointOutcome, Endpointer};
use crate::speech::{CaptureError, SpeechCapture, Transcriber};

/// Frames queued between the audio callback and the endpointer before drops start.
const FRAME_QUEUE_DEPTH: usize = 256;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One recorded utterance, mono.
#[derive(Debug)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

pub struct MicrophoneCapture {
    endpoint: EndpointConfig,
    transcriber: Arc<dyn Transcriber>,
}

impl MicrophoneCapture {
    pub fn new(endpoint: EndpointConfig, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            endpoint,
            transcriber,
        }
    }
}

#[async_trait]
impl SpeechCapture for MicrophoneCapture {
    async fn listen(&self) -> Result<String, CaptureError> {
        let endpoint = self.endpoint.clone();
        let recording = tokio::task::spawn_blocking(move || record_utterance(&endpoint))
            .await
            .map_err(|e| CaptureError::Device(e.to_string()))??;

        debug!(
            samples = recording.samples.len(),
            sample_rate = recording.sample_rate,
            "Utterance recorded"
        );

        let wav = encode_wav(&recording)?;
        self.transcriber.transcribe(wav).await
    }
}

/// Records from the default input device until the endpointer decides the
/// utterance is over.
fn record_utterance(endpoint: &EndpointConfig) -> Result<Recording, CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| CaptureError::Device("no default input device".to_string()))?;

    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::Device(e.to_string()))?;
    let sample_rate = supported.sample_rate().0;
    let sample_format = supported.sample_format();
    let config = supported.config();

    info!(
        device = device.name().unwrap_or_default().as_str(),
        sample_rate, "Listening for speech"
    );

    let (tx, rx) = mpsc::sync_channel::<Vec<f32>>(FRAME_QUEUE_DEPTH);
    let stream_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, tx, Arc::clone(&stream_error)),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, tx, Arc::clone(&stream_error)),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, tx, Arc::clone(&stream_error)),
        other => {
            return Err(CaptureError::Device(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(|e| CaptureError::Device(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::Device(e.to_string()))?;

    let mut endpointer = Endpointer::new(endpoint, sample_rate);
    // Guards against a device that stops delivering frames altogether.
    let deadline = Instant::now() + endpoint.listen_timeout + endpoint.phrase_limit;

    let outcome = loop {
        if let Some(message) = stream_error.lock().take() {
            return Err(CaptureError::Device(message));
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(frame) => {
                if let Some(outcome) = endpointer.push(&frame) {
                    break outcome;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(CaptureError::Device("input stream closed".to_string()));
            }
        }
        if Instant::now() >= deadline {
            break if endpointer.heard_speech() {
                EndpointOutcome::Phrase
            } else {
                EndpointOutcome::Timeout
            };
        }
    };
    drop(stream);

    match outcome {
        EndpointOutcome::Timeout => Err(CaptureError::NoSpeech {
            waited_secs: endpoint.listen_timeout.as_secs(),
        }),
        EndpointOutcome::Phrase => Ok(Recording {
            samples: endpointer.into_samples(),
            sample_rate,
        }),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tx: SyncSender<Vec<f32>>,
    stream_error: Arc<Mutex<Option<String>>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels);
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // A full queue drops the frame rather than blocking the audio thread.
            let _ = tx.try_send(downmix(data, channels));
        },
        move |err| {
            *stream_error.lock() = Some(err.to_string());
        },
        None,
    )
}

/// Averages interleaved channels into one mono channel.
fn downmix<T>(data: &[T], channels: usize) -> Vec<f32>
where
    T: Sample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    data.chunks(channels)
        .map(|frame| {
            let sum: f32 = frame.iter().map(|s| s.to_sample::<f32>()).sum();
            sum / frame.len() as f32
        })
        .collect()
}

/// Encodes a recording as 16-bit PCM mono WAV.
pub fn encode_wav(recording: &Recording) -> Result<Vec<u8>, CaptureError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: recording.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec)
            .map_err(|e| CaptureError::Device(format!("wav encode failed: {e}")))?;
        for sample in &recording.samples {
            let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| CaptureError::Device(format!("wav encode failed: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| CaptureError::Device(format!("wav encode failed: {e}")))?;
    }
    Ok(bytes)
}
