//! Audio playback backend
//!
//! The output device is owned by a dedicated `audio-playback` thread (the
//! rodio output stream is not `Send`). The thread consumes commands from a
//! crossbeam channel and emits [`PlayerEvent`]s into a channel the controller's
//! event listener reconciles against playback intent. URL loads run as tokio
//! tasks that open a `stream-download` reader and hand it to the thread, so
//! playback starts before the download completes.
//!
//! Every event is tagged with the load generation it belongs to; consumers
//! drop events from superseded loads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use rodio::{Decoder, OutputStream, Sink, Source};
use stream_download::storage::temp::TempStorageProvider;
use stream_download::{Settings, StreamDownload};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

pub type PlayerEventChannel = UnboundedReceiver<PlayerEvent>;

const MONITOR_TICK: Duration = Duration::from_millis(200);

/// Consecutive monitor ticks without position movement before a stall is
/// reported while unpaused.
const STALL_TICKS: u8 = 3;

/// Classified media failure, mirroring the five browser media error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaErrorKind {
    /// The load was cut short (superseded or stopped mid-flight).
    Aborted,
    /// The stream could not be fetched.
    Network,
    /// The stream was fetched but could not be decoded.
    Decode,
    /// The source is not decodable audio at all.
    Unsupported,
    Unknown,
}

#[derive(Debug)]
pub enum PlayerEvent {
    LoadStarted {
        generation: u64,
    },
    /// Source opened and decodable; held paused until commanded to play.
    Ready {
        generation: u64,
        duration: Option<Duration>,
    },
    Playing {
        generation: u64,
    },
    Position {
        generation: u64,
        position: Duration,
    },
    Paused {
        generation: u64,
    },
    /// Playback position stopped advancing while unpaused (buffering).
    Stalled {
        generation: u64,
    },
    /// The sink drained naturally.
    Ended {
        generation: u64,
    },
    Error {
        generation: u64,
        kind: MediaErrorKind,
    },
}

enum AudioCommand {
    Source {
        reader: StreamDownload<TempStorageProvider>,
        generation: u64,
    },
    Play,
    Pause,
    Stop,
    Shutdown,
}

/// Handle to the audio playback thread.
///
/// The event channel is handed out once (to the controller's listener);
/// dropping the backend shuts the thread down and releases the device.
pub struct AudioBackend {
    cmd_tx: Sender<AudioCommand>,
    event_tx: UnboundedSender<PlayerEvent>,
    event_rx: Mutex<Option<PlayerEventChannel>>,
    latest_generation: Arc<AtomicU64>,
}

impl AudioBackend {
    pub async fn new() -> Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded();
        let (event_tx, event_rx) = unbounded_channel();
        let (init_tx, init_rx) = tokio::sync::oneshot::channel();

        let thread_events = event_tx.clone();
        std::thread::Builder::new()
            .name("audio-playback".to_string())
            .spawn(move || run(cmd_rx, thread_events, init_tx))
            .map_err(|e| anyhow!("failed to spawn audio thread: {}", e))?;

        init_rx
            .await
            .map_err(|_| anyhow!("audio thread terminated during init"))?
            .map_err(|e| anyhow!("audio output init failed: {}", e))?;

        tracing::info!("audio backend initialized");
        Ok(Self {
            cmd_tx,
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
            latest_generation: Arc::new(AtomicU64::new(0)),
        })
    }

    pub async fn get_player_event_channel(&self) -> Option<PlayerEventChannel> {
        self.event_rx.lock().await.take()
    }

    /// Begin loading a source URL under the given load generation.
    ///
    /// Emits `LoadStarted` immediately; `Ready` or `Error` follows once the
    /// stream is opened. A load superseded by a newer generation (or a stop)
    /// dies as an aborted error instead of reaching the sink.
    pub async fn load(&self, url: String, generation: u64) {
        self.latest_generation.store(generation, Ordering::SeqCst);
        let _ = self.event_tx.send(PlayerEvent::LoadStarted { generation });

        let event_tx = self.event_tx.clone();
        let cmd_tx = self.cmd_tx.clone();
        let latest = self.latest_generation.clone();

        tokio::spawn(async move {
            let parsed = match url.parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "unusable audio URL");
                    let _ = event_tx.send(PlayerEvent::Error {
                        generation,
                        kind: MediaErrorKind::Unsupported,
                    });
                    return;
                }
            };

            tracing::debug!(url = %url, generation, "opening audio stream");
            match StreamDownload::new_http(parsed, TempStorageProvider::new(), Settings::default())
                .await
            {
                Ok(reader) => {
                    if latest.load(Ordering::SeqCst) != generation {
                        tracing::debug!(generation, "audio load superseded, dropping stream");
                        let _ = event_tx.send(PlayerEvent::Error {
                            generation,
                            kind: MediaErrorKind::Aborted,
                        });
                        return;
                    }
                    let _ = cmd_tx.send(AudioCommand::Source { reader, generation });
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "audio stream open failed");
                    let _ = event_tx.send(PlayerEvent::Error {
                        generation,
                        kind: MediaErrorKind::Network,
                    });
                }
            }
        });
    }

    pub async fn play(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Play);
    }

    pub async fn pause(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Pause);
    }

    /// Stop playback and drop the current source; in-flight loads abort.
    pub async fn stop(&self) {
        self.latest_generation.fetch_add(1, Ordering::SeqCst);
        let _ = self.cmd_tx.send(AudioCommand::Stop);
    }
}

impl Drop for AudioBackend {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
    }
}

/// Per-source state on the audio thread.
struct TrackState {
    generation: u64,
    last_position: Duration,
    stall_ticks: u8,
    stalled: bool,
}

impl TrackState {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            last_position: Duration::ZERO,
            stall_ticks: 0,
            stalled: false,
        }
    }
}

fn run(
    cmd_rx: Receiver<AudioCommand>,
    event_tx: UnboundedSender<PlayerEvent>,
    init_tx: tokio::sync::oneshot::Sender<Result<(), String>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = init_tx.send(Err(e.to_string()));
            return;
        }
    };
    let sink = match Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = init_tx.send(Err(e.to_string()));
            return;
        }
    };
    sink.pause();
    if init_tx.send(Ok(())).is_err() {
        return;
    }

    let mut current: Option<TrackState> = None;

    loop {
        match cmd_rx.recv_timeout(MONITOR_TICK) {
            Ok(AudioCommand::Source { reader, generation }) => {
                // clear() empties the queue and leaves the sink paused; the
                // new source sits ready until a Play command arrives.
                sink.clear();
                match Decoder::new(reader) {
                    Ok(source) => {
                        let duration = source.total_duration();
                        sink.append(source);
                        current = Some(TrackState::new(generation));
                        let _ = event_tx.send(PlayerEvent::Ready {
                            generation,
                            duration,
                        });
                    }
                    Err(e) => {
                        current = None;
                        let kind = classify_decoder_error(&e);
                        tracing::warn!(error = %e, generation, "failed to open audio source");
                        let _ = event_tx.send(PlayerEvent::Error { generation, kind });
                    }
                }
            }
            Ok(AudioCommand::Play) => {
                if let Some(track) = &mut current {
                    sink.play();
                    track.stalled = false;
                    track.stall_ticks = 0;
                    let _ = event_tx.send(PlayerEvent::Playing {
                        generation: track.generation,
                    });
                }
            }
            Ok(AudioCommand::Pause) => {
                if let Some(track) = &current {
                    sink.pause();
                    let _ = event_tx.send(PlayerEvent::Paused {
                        generation: track.generation,
                    });
                }
            }
            Ok(AudioCommand::Stop) => {
                sink.clear();
                current = None;
            }
            Ok(AudioCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        // Monitor: natural end, position reporting, stall detection.
        if let Some(track) = &mut current {
            if !sink.is_paused() {
                if sink.empty() {
                    let generation = track.generation;
                    current = None;
                    tracing::debug!(generation, "sink drained, track ended");
                    let _ = event_tx.send(PlayerEvent::Ended { generation });
                } else {
                    let position = sink.get_pos();
                    let _ = event_tx.send(PlayerEvent::Position {
                        generation: track.generation,
                        position,
                    });
                    if position == track.last_position {
                        track.stall_ticks = track.stall_ticks.saturating_add(1);
                        if track.stall_ticks >= STALL_TICKS && !track.stalled {
                            track.stalled = true;
                            let _ = event_tx.send(PlayerEvent::Stalled {
                                generation: track.generation,
                            });
                        }
                    } else {
                        if track.stalled {
                            track.stalled = false;
                            let _ = event_tx.send(PlayerEvent::Playing {
                                generation: track.generation,
                            });
                        }
                        track.stall_ticks = 0;
                        track.last_position = position;
                    }
                }
            }
        }
    }
    // Dropping the sink and output stream here releases the device.
}

fn classify_decoder_error(e: &rodio::decoder::DecoderError) -> MediaErrorKind {
    use rodio::decoder::DecoderError;
    match e {
        DecoderError::UnrecognizedFormat => MediaErrorKind::Unsupported,
        DecoderError::IoError(_) => MediaErrorKind::Network,
        DecoderError::DecodeError(_) => MediaErrorKind::Decode,
        _ => MediaErrorKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_format_classifies_as_unsupported() {
        let e = rodio::decoder::DecoderError::UnrecognizedFormat;
        assert_eq!(classify_decoder_error(&e), MediaErrorKind::Unsupported);
    }
}
