//! System TTS engine (spd-say / espeak-ng subprocess)

use super::{InFlight, SpeechEngine, Utterance};
use crate::announce::{EventSender, SessionId};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Which command-line synthesizer is used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemProgram {
    SpdSay,
    EspeakNg,
}

impl SystemProgram {
    pub fn binary(&self) -> &'static str {
        match self {
            SystemProgram::SpdSay => "spd-say",
            SystemProgram::EspeakNg => "espeak-ng",
        }
    }

    /// Command-line arguments for an utterance.
    ///
    /// Rate and pitch are relative to 1.0; volume is 0.0..=1.0.
    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        match self {
            SystemProgram::SpdSay => {
                // spd-say ranges are -100..=100 with 0 as the voice default
                let rate = ((utterance.rate - 1.0) * 100.0).clamp(-100.0, 100.0);
                let volume = (utterance.volume * 200.0 - 100.0).clamp(-100.0, 100.0);
                let pitch = ((utterance.pitch - 1.0) * 100.0).clamp(-100.0, 100.0);
                vec![
                    "--wait".to_string(),
                    "-r".to_string(),
                    format!("{}", rate.round() as i32),
                    "-i".to_string(),
                    format!("{}", volume.round() as i32),
                    "-p".to_string(),
                    format!("{}", pitch.round() as i32),
                    "--".to_string(),
                    utterance.text.clone(),
                ]
            }
            SystemProgram::EspeakNg => {
                // espeak-ng: 175 wpm, amplitude 100 and pitch 50 are the defaults
                let wpm = (utterance.rate * 175.0).clamp(80.0, 450.0);
                let amplitude = (utterance.volume * 100.0).clamp(0.0, 200.0);
                let pitch = (utterance.pitch * 50.0).clamp(0.0, 99.0);
                vec![
                    "-s".to_string(),
                    format!("{}", wpm.round() as i32),
                    "-a".to_string(),
                    format!("{}", amplitude.round() as i32),
                    "-p".to_string(),
                    format!("{}", pitch.round() as i32),
                    "--".to_string(),
                    utterance.text.clone(),
                ]
            }
        }
    }
}

#[derive(Debug)]
pub struct SystemEngine {
    program: SystemProgram,
    path: PathBuf,
    events: EventSender,
    in_flight: InFlight,
}

impl SystemEngine {
    /// Find spd-say or espeak-ng on PATH
    pub fn detect(events: EventSender) -> Option<Self> {
        for program in [SystemProgram::SpdSay, SystemProgram::EspeakNg] {
            if let Some(path) = find_in_path(program.binary()) {
                debug!("System TTS found: {}", path.display());
                return Some(Self::with_program(program, path, events));
            }
        }
        warn!("⚠️ No system TTS command found (tried spd-say, espeak-ng)");
        None
    }

    pub fn with_program(program: SystemProgram, path: PathBuf, events: EventSender) -> Self {
        Self {
            program,
            path,
            events,
            in_flight: InFlight::default(),
        }
    }

    pub fn program(&self) -> SystemProgram {
        self.program
    }
}

impl SpeechEngine for SystemEngine {
    fn submit(&self, handle: SessionId, utterance: Utterance) -> Result<()> {
        debug!("System speaking {}: {}", handle, utterance.text);

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| anyhow::anyhow!("No async runtime for system TTS: {}", e))?;

        let mut child = Command::new(&self.path)
            .args(self.program.args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn {}: {}", self.program.binary(), e))?;

        let events = self.events.clone();
        let binary = self.program.binary();
        // Aborting this task drops the child, which kills it.
        let task = runtime.spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => events.completed(handle),
                Ok(status) => events.errored(handle, format!("{} exited with {}", binary, status)),
                Err(e) => events.errored(handle, e.to_string()),
            }
        });
        self.in_flight.replace(task);
        Ok(())
    }

    fn cancel_all(&self) {
        if self.in_flight.abort() {
            debug!("⏹️ System speech cancelled");
        }
        if self.program == SystemProgram::SpdSay {
            // speech-dispatcher keeps queued messages after the client dies.
            // Blocks until the daemon has dropped them so the next submit is
            // never queued behind or wiped by a late cancel.
            match std::process::Command::new(&self.path)
                .arg("--cancel")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                Ok(status) if status.success() => {}
                Ok(status) => warn!("⚠️ spd-say --cancel exited with {}", status),
                Err(e) => warn!("⚠️ Failed to run spd-say --cancel: {}", e),
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.in_flight.is_busy()
    }

    fn name(&self) -> &str {
        "system"
    }
}

/// Look up an executable on PATH
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
