// src/app/playback.rs
// Inline preview playback for the focused tile.
//
// Idle → Armed on a selection with a video URL; Armed → Playing once the
// selection has been held for STABLE_THRESHOLD; Playing pulls one frame
// per due tick, paced at FRAME_INTERVAL. Every exit from Armed/Playing
// goes through Closing, which releases the stream before anything else opens.

use std::time::Duration;

use tracing::{debug, warn};

use crate::app::error::VideoError;
use crate::app::types::{TileId, VideoFrame};

/// How long a selection must be held before its preview starts.
pub const STABLE_THRESHOLD: Duration = Duration::from_secs(3);
/// Source material is 24 fps.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 24);
/// Wait before retrying a stream that failed to open.
pub const REOPEN_BACKOFF: Duration = Duration::from_secs(1);

/// Result of one non-blocking pull.
#[derive(Debug, PartialEq, Eq)]
pub enum FramePull {
    NoFrameYet,
    Frame(VideoFrame),
    EndOrError,
}

/// An open decode session. `pull_frame` must return immediately.
pub trait FrameStream {
    fn pull_frame(&mut self) -> FramePull;
    fn close(&mut self);
}

pub trait VideoSource {
    type Stream: FrameStream;
    fn open(&self, url: &str) -> Result<Self::Stream, VideoError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Armed,
    Playing,
    Closing,
}

struct Target {
    tile: TileId,
    url: String,
}

struct Session<S> {
    stream: S,
    opened_at: Duration,
    /// Frames pulled since `opened_at`; the next one is due at `opened_at + n * FRAME_INTERVAL`.
    frames: u32,
}

impl<S> Session<S> {
    fn next_frame_due(&self) -> Duration {
        self.opened_at + FRAME_INTERVAL * self.frames
    }
}

pub struct PlaybackController<V: VideoSource> {
    source: V,
    state: PlaybackState,
    target: Option<Target>,
    open_at: Duration,
    /// Consecutive failed opens for the current target.
    open_failures: u32,
    session: Option<Session<V::Stream>>,
    frame: Option<VideoFrame>,
    frame_serial: u64,
}

impl<V: VideoSource> PlaybackController<V> {
    pub fn new(source: V) -> Self {
        Self {
            source,
            state: PlaybackState::Idle,
            target: None,
            open_at: Duration::ZERO,
            open_failures: 0,
            session: None,
            frame: None,
            frame_serial: 0,
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    pub const fn open_failures(&self) -> u32 {
        self.open_failures
    }

    /// Bumped every time a new frame replaces the displayed one.
    pub const fn frame_serial(&self) -> u64 {
        self.frame_serial
    }

    pub fn current_frame(&self) -> Option<&VideoFrame> {
        self.frame.as_ref()
    }

    pub fn next_frame_due(&self) -> Option<Duration> {
        self.session.as_ref().map(Session::next_frame_due)
    }

    /// Frame to draw for `tile`, only while that tile is playing.
    pub fn frame_for(&self, tile: TileId) -> Option<&VideoFrame> {
        match (&self.target, self.state) {
            (Some(t), PlaybackState::Playing) if t.tile == tile => self.frame.as_ref(),
            _ => None,
        }
    }

    /// Selection moved to `tile`. Always drops the current session.
    pub fn on_selection_changed(&mut self, tile: TileId, video_url: Option<&str>, now: Duration) {
        self.close_session();
        self.frame = None;
        self.open_failures = 0;

        match video_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => {
                self.target = Some(Target {
                    tile,
                    url: url.to_string(),
                });
                self.open_at = now + STABLE_THRESHOLD;
                self.set_state(PlaybackState::Armed);
            }
            None => {
                self.target = None;
                self.set_state(PlaybackState::Idle);
            }
        }
    }

    /// Drive the state machine once per rendered frame.
    pub fn tick(&mut self, now: Duration) {
        if self.state == PlaybackState::Armed && now >= self.open_at {
            self.open_session(now);
        }
        if self.state == PlaybackState::Playing {
            self.pull_if_due(now);
        }
    }

    /// Release everything; used at shutdown.
    pub fn stop(&mut self) {
        self.close_session();
        self.target = None;
        self.frame = None;
        self.set_state(PlaybackState::Idle);
    }

    fn pull_if_due(&mut self, now: Duration) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if now < session.next_frame_due() {
            return;
        }

        match session.stream.pull_frame() {
            FramePull::Frame(frame) => {
                session.frames += 1;
                self.frame = Some(frame);
                self.frame_serial += 1;
            }
            FramePull::NoFrameYet => {}
            FramePull::EndOrError => {
                debug!("preview stream ended; looping");
                // keep the last frame on screen while the stream restarts
                self.close_session();
                self.open_session(now);
            }
        }
    }

    fn open_session(&mut self, now: Duration) {
        let Some(target) = self.target.as_ref() else {
            self.set_state(PlaybackState::Idle);
            return;
        };
        debug_assert!(self.session.is_none(), "previous session not closed");

        match self.source.open(&target.url) {
            Ok(stream) => {
                self.session = Some(Session {
                    stream,
                    opened_at: now,
                    frames: 0,
                });
                self.open_failures = 0;
                self.set_state(PlaybackState::Playing);
            }
            Err(e) => {
                self.open_failures += 1;
                if self.open_failures == 1 {
                    warn!("preview open failed for {}: {e}", target.url);
                } else {
                    debug!("preview open failed again ({}x) for {}: {e}", self.open_failures, target.url);
                }
                self.open_at = now + REOPEN_BACKOFF;
                self.set_state(PlaybackState::Armed);
            }
        }
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            self.set_state(PlaybackState::Closing);
            session.stream.close();
        }
    }

    fn set_state(&mut self, next: PlaybackState) {
        if self.state != next {
            debug!("playback {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

impl<V: VideoSource> Drop for PlaybackController<V> {
    fn drop(&mut self) {
        self.close_session();
    }
}
