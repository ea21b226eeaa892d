use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::speech::{SpeechError, SpeechPlayback};

/// Local text-to-speech through an `espeak`-style command line program.
/// The text is passed as the final argument, after `--` so that text starting
/// with `-` is not read as a flag. The call returns once the program exits,
/// i.e. once playback is done; dropping the call kills the program.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    words_per_minute: u32,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, words_per_minute: u32) -> Self {
        Self {
            program: program.into(),
            words_per_minute,
        }
    }

    fn args<'a>(&self, text: &'a str) -> Vec<std::borrow::Cow<'a, str>> {
        vec![
            rate_flag(&self.program).into(),
            self.words_per_minute.to_string().into(),
            "--".into(),
            text.into(),
        ]
    }
}

/// macOS `say` takes `-r`; espeak and espeak-ng take `-s`.
fn rate_flag(program: &str) -> &'static str {
    let name = std::path::Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program);
    if name == "say" {
        "-r"
    } else {
        "-s"
    }
}

#[async_trait]
impl SpeechPlayback for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!(program = %self.program, text, "Speaking");

        let status = Command::new(&self.program)
            .args(self.args(text).iter().map(|a| a.as_ref()))
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|source| SpeechError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(SpeechError::Playback {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
