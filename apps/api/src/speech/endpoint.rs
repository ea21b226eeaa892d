//! Energy-based endpointing for a single utterance.
//!
//! Waits up to `listen_timeout` for speech onset, then records until a
//! trailing pause of `pause_threshold` or until `phrase_limit` is reached.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub listen_timeout: Duration,
    pub pause_threshold: Duration,
    pub phrase_limit: Duration,
    /// RMS level (on a -1.0..1.0 scale) at or above which a frame counts as speech.
    pub energy_threshold: f32,
    /// Audio kept from before onset so the first syllable is not clipped.
    pub preroll: Duration,
}

impl EndpointConfig {
    pub fn with_listen_timeout(listen_timeout: Duration) -> Self {
        Self {
            listen_timeout,
            ..Self::default()
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            listen_timeout: Duration::from_secs(15),
            pause_threshold: Duration::from_millis(800),
            phrase_limit: Duration::from_secs(30),
            energy_threshold: 0.02,
            preroll: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointOutcome {
    /// Speech was heard and has ended (pause or phrase limit).
    Phrase,
    /// No speech started before the listen timeout.
    Timeout,
}

pub struct Endpointer {
    listen_timeout: usize,
    pause_threshold: usize,
    phrase_limit: usize,
    preroll: usize,
    energy_threshold: f32,
    waited: usize,
    silence: usize,
    speaking: bool,
    samples: Vec<f32>,
}

fn to_samples(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize
}

impl Endpointer {
    pub fn new(config: &EndpointConfig, sample_rate: u32) -> Self {
        Self {
            listen_timeout: to_samples(config.listen_timeout, sample_rate),
            pause_threshold: to_samples(config.pause_threshold, sample_rate),
            phrase_limit: to_samples(config.phrase_limit, sample_rate),
            preroll: to_samples(config.preroll, sample_rate),
            energy_threshold: config.energy_threshold,
            waited: 0,
            silence: 0,
            speaking: false,
            samples: Vec::new(),
        }
    }

    /// Feeds one mono frame. Returns `Some` once the utterance is complete.
    pub fn push(&mut self, frame: &[f32]) -> Option<EndpointOutcome> {
        if frame.is_empty() {
            return None;
        }
        let voiced = rms(frame) >= self.energy_threshold;

        if !self.speaking {
            self.samples.extend_from_slice(frame);
            if voiced {
                self.speaking = true;
                return None;
            }
            self.waited += frame.len();
            if self.samples.len() > self.preroll {
                let excess = self.samples.len() - self.preroll;
                self.samples.drain(..excess);
            }
            return (self.waited >= self.listen_timeout).then_some(EndpointOutcome::Timeout);
        }

        self.samples.extend_from_slice(frame);
        if voiced {
            self.silence = 0;
        } else {
            self.silence += frame.len();
        }

        if self.silence >= self.pause_threshold || self.samples.len() >= self.phrase_limit {
            return Some(EndpointOutcome::Phrase);
        }
        None
    }

    pub fn heard_speech(&self) -> bool {
        self.speaking
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}
