pub mod chime;

use chime::Chime;

use rodio::{OutputStream, Sink};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use crate::timer::Cue;

enum AudioCommand {
    Play { cue: Cue, gain: f32 },
}

/// Plays the start/complete cues the timer asks for. A dedicated thread
/// owns the non-`Send` output stream; a machine without an audio device
/// degrades to a log line instead of an error the host has to handle.
pub struct CuePlayer {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl CuePlayer {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("cue-player".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {e}"))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {e}"))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(AudioCommand::Play { cue, gain }) = rx.recv() {
                    if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                        log::warn!("audio unavailable, skipping cue: {err}");
                        continue;
                    }
                    if let Some(ref s) = sink {
                        s.set_volume(gain.clamp(0.0, 2.0));
                        match cue {
                            Cue::Start => s.append(Chime::start()),
                            Cue::Complete => s.append(Chime::complete()),
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Queues a cue at the given gain (the settings volume mapped so that 50
    /// on the slider is unity).
    pub fn play(&self, cue: Cue, gain: f32) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Play { cue, gain })
            .map_err(|e| e.to_string())
    }
}

impl Default for CuePlayer {
    fn default() -> Self {
        Self::new()
    }
}
