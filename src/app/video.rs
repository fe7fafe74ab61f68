// src/app/video.rs
// Preview decoding through an `ffmpeg` child process.
//
// ffmpeg writes fixed-size raw RGBA frames to stdout; a reader thread per
// session slices them into frames and hands them over a small bounded channel,
// so pulling from the render thread never blocks.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::app::error::VideoError;
use crate::app::playback::{FramePull, FrameStream, VideoSource};
use crate::app::types::VideoFrame;
use crate::config::AppConfig;

/// Decoded frames buffered ahead of the render thread.
const FRAME_BUFFER: usize = 4;

pub struct FfmpegSource {
    cmd: String,
    width: u32,
    height: u32,
}

impl FfmpegSource {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            cmd: cfg.ffmpeg_cmd.clone(),
            width: cfg.preview_width,
            height: cfg.preview_height,
        }
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.cmd);
        cmd.args(["-nostdin", "-loglevel", "error", "-i", url, "-an"])
            .arg("-vf")
            .arg(format!("scale={}:{}", self.width, self.height))
            .args(["-r", "24", "-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}

impl VideoSource for FfmpegSource {
    type Stream = FfmpegStream;

    fn open(&self, url: &str) -> Result<FfmpegStream, VideoError> {
        if url.trim().is_empty() {
            return Err(VideoError::EmptyUrl);
        }

        let mut child = self.command(url).spawn().map_err(|source| VideoError::Spawn {
            cmd: self.cmd.clone(),
            source,
        })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(VideoError::NoStdout);
        };

        match FfmpegStream::from_reader(stdout, self.width, self.height) {
            Ok(mut stream) => {
                debug!("opened preview {url}");
                stream.child = Some(child);
                Ok(stream)
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        }
    }
}

pub struct FfmpegStream {
    child: Option<Child>,
    rx: Option<Receiver<VideoFrame>>,
    reader: Option<JoinHandle<()>>,
}

impl FfmpegStream {
    /// Frame a raw RGBA byte stream of `width`×`height` frames.
    pub fn from_reader<R>(src: R, width: u32, height: u32) -> Result<Self, VideoError>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(FRAME_BUFFER);
        let reader = thread::Builder::new()
            .name("preview-reader".into())
            .spawn(move || read_frames(src, width, height, tx))
            .map_err(VideoError::Reader)?;

        Ok(Self {
            child: None,
            rx: Some(rx),
            reader: Some(reader),
        })
    }
}

impl FrameStream for FfmpegStream {
    fn pull_frame(&mut self) -> FramePull {
        let Some(rx) = &self.rx else {
            return FramePull::EndOrError;
        };
        match rx.try_recv() {
            Ok(frame) => FramePull::Frame(frame),
            Err(TryRecvError::Empty) => FramePull::NoFrameYet,
            Err(TryRecvError::Disconnected) => FramePull::EndOrError,
        }
    }

    fn close(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
        }
        // unblocks a reader parked on a full channel
        self.rx = None;
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("preview reader thread panicked");
            }
        }
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_frames<R: Read>(mut src: R, width: u32, height: u32, tx: SyncSender<VideoFrame>) {
    let frame_len = width as usize * height as usize * 4;
    if frame_len == 0 {
        return;
    }
    loop {
        let mut rgba = vec![0u8; frame_len];
        match src.read_exact(&mut rgba) {
            Ok(()) => {
                if tx.send(VideoFrame { width, height, rgba }).is_err() {
                    break; // stream closed
                }
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    debug!("preview read ended: {e}");
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn pull_blocking(stream: &mut FfmpegStream) -> FramePull {
        for _ in 0..2_000 {
            match stream.pull_frame() {
                FramePull::NoFrameYet => thread::sleep(Duration::from_millis(1)),
                other => return other,
            }
        }
        FramePull::NoFrameYet
    }

    #[test]
    fn slices_raw_bytes_into_frames_then_ends() {
        // two 2×1 frames plus a trailing partial frame
        let mut bytes: Vec<u8> = (0..16).collect();
        bytes.extend_from_slice(&[1, 2, 3]);
        let mut stream = FfmpegStream::from_reader(Cursor::new(bytes), 2, 1).unwrap();

        match pull_blocking(&mut stream) {
            FramePull::Frame(f) => assert_eq!(f.rgba, (0..8).collect::<Vec<u8>>()),
            other => panic!("expected frame, got {other:?}"),
        }
        match pull_blocking(&mut stream) {
            FramePull::Frame(f) => assert_eq!(f.rgba, (8..16).collect::<Vec<u8>>()),
            other => panic!("expected frame, got {other:?}"),
        }
        assert_eq!(pull_blocking(&mut stream), FramePull::EndOrError);
    }

    #[test]
    fn close_unblocks_a_reader_with_a_full_buffer() {
        let bytes = vec![0u8; 4 * 64];
        let mut stream = FfmpegStream::from_reader(Cursor::new(bytes), 1, 1).unwrap();
        thread::sleep(Duration::from_millis(20));
        stream.close();
        assert_eq!(stream.pull_frame(), FramePull::EndOrError);
        // closing twice is harmless
        stream.close();
    }

    #[test]
    fn missing_binary_is_an_open_error() {
        let cfg = AppConfig {
            ffmpeg_cmd: "/nonexistent/definitely-not-ffmpeg".into(),
            ..AppConfig::default()
        };
        let src = FfmpegSource::new(&cfg);
        assert!(matches!(
            src.open("http://v/1"),
            Err(VideoError::Spawn { .. })
        ));
        assert!(matches!(src.open(""), Err(VideoError::EmptyUrl)));
    }
}
