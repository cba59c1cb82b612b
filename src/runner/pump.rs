use std::io::{self, BufRead, BufReader, PipeReader, PipeWriter, Write};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

/// Streams a running target's output while buffering it.
///
/// Owns one end-to-end pipe per target: the write end goes to the
/// launcher as the subprocess's output sink, and a background drain
/// thread loops over the read end, echoing each line to stdout as it
/// arrives and shipping it over a channel to be collected later.
///
/// The pump keeps its own clone of the write end. The drain thread only
/// sees end-of-stream once every write end is closed, so [`finish`]
/// dropping that clone is what unblocks the thread after the subprocess
/// has exited (or been killed, which closes the subprocess's copy).
///
/// [`finish`]: OutputPump::finish
pub struct OutputPump {
    write_end: Option<PipeWriter>,
    drain: Option<JoinHandle<()>>,
    lines: mpsc::Receiver<String>,
}

impl OutputPump {
    /// Create the pipe and start the drain thread.
    ///
    /// Returns the pump and the write end to hand to the launcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipe cannot be created or cloned.
    pub fn new() -> io::Result<(Self, PipeWriter)> {
        let (read_end, write_end) = io::pipe()?;
        let held_write_end = write_end.try_clone()?;
        let (sender, lines) = mpsc::channel();
        let drain = thread::spawn(move || drain_lines(read_end, &sender));
        Ok((
            Self {
                write_end: Some(held_write_end),
                drain: Some(drain),
                lines,
            },
            write_end,
        ))
    }

    /// Tear the pump down and return everything that was buffered.
    ///
    /// Closes the held write end so the drain thread observes
    /// end-of-stream instead of blocking forever, joins the thread, then
    /// collects the buffered lines. The read end closes when the joined
    /// thread drops it. Idempotent: a second call finds nothing left to
    /// close and returns an empty string.
    pub fn finish(&mut self) -> String {
        drop(self.write_end.take());
        if let Some(drain) = self.drain.take() {
            let _ = drain.join();
        }
        let mut text = String::new();
        while let Ok(line) = self.lines.try_recv() {
            text.push_str(&line);
        }
        text
    }
}

impl Drop for OutputPump {
    fn drop(&mut self) {
        // Never leave the drain thread blocked on a live pipe.
        if self.drain.is_some() {
            let _ = self.finish();
        }
    }
}

/// Drain loop: one line at a time until end-of-stream.
fn drain_lines(read_end: PipeReader, sender: &mpsc::Sender<String>) {
    let mut reader = BufReader::new(read_end);
    let mut stdout = io::stdout();
    let mut raw = Vec::new();
    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&raw).into_owned();
                // Echo live, in arrival order, before buffering.
                let _ = stdout.write_all(line.as_bytes());
                let _ = stdout.flush();
                if sender.send(line).is_err() {
                    break;
                }
            }
        }
    }
}
