//! Background dumps. A [`DumpTask`] runs a [`StreamDumper`] on its own thread and
//! reports back over a channel: zero or more [`DumpEvent::Progress`] messages followed
//! by exactly one [`DumpEvent::Finished`].

use crate::dumper::{DumpOptions, DumpOutput, StreamDumper};
use crate::error::DumpError;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

#[derive(Debug)]
pub enum DumpEvent {
    /// Share of the dump window consumed so far, in percent
    Progress(u8),
    /// Terminal result of the dump
    Finished(Result<DumpOutput, DumpError>),
}

/// Handle to a dump running on a background thread.
#[derive(Debug)]
pub struct DumpTask {
    receiver: mpsc::Receiver<DumpEvent>,
    handle: Option<JoinHandle<()>>,
}

impl DumpTask {
    /// Starts dumping `source` on a new thread. The task takes ownership of the source.
    ///
    /// # Example
    /// ```
    /// use romdumplib::{DumpOptions, DumpTask};
    /// use std::io::Cursor;
    ///
    /// let task = DumpTask::spawn(Cursor::new(vec![0u8; 64]), DumpOptions::default());
    /// let output = task.wait().unwrap();
    ///
    /// assert_eq!(output.bytes.len(), 64);
    /// ```
    pub fn spawn<R>(source: R, options: DumpOptions) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        Self::spawn_with(move || Ok(source), options)
    }

    /// Starts dumping the file at `filepath` on a new thread.
    /// Failing to open the file is reported as the terminal event.
    pub fn spawn_file<P: Into<PathBuf>>(filepath: P, options: DumpOptions) -> Self {
        let path = filepath.into();
        Self::spawn_with(move || File::open(path), options)
    }

    fn spawn_with<R, F>(open: F, options: DumpOptions) -> Self
    where
        R: Read + Seek + 'static,
        F: FnOnce() -> io::Result<R> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            let progress_sender = sender.clone();
            let result = open()
                .map_err(DumpError::from)
                .and_then(|source| StreamDumper::new(source, options))
                .and_then(|dumper| {
                    dumper
                        .with_progress(move |percent| {
                            // Receiver gone means nobody listens anymore
                            let _ = progress_sender.send(DumpEvent::Progress(percent));
                        })
                        .into_output()
                });

            if let Err(err) = &result {
                log::debug!("Background dump failed: {err}");
            }
            let _ = sender.send(DumpEvent::Finished(result));
        });

        Self {
            receiver,
            handle: Some(handle),
        }
    }

    /// Blocking iterator over the task's events; ends after [`DumpEvent::Finished`].
    pub fn events(&self) -> impl Iterator<Item = DumpEvent> + '_ {
        self.receiver.iter()
    }

    /// Returns the next event if one is already queued.
    #[must_use]
    pub fn try_event(&self) -> Option<DumpEvent> {
        self.receiver.try_recv().ok()
    }

    /// Blocks until the dump is finished, discarding progress events.
    ///
    /// # Errors
    /// Returns the dump's error, or an I/O error if the worker thread died
    /// without reporting a result.
    pub fn wait(mut self) -> Result<DumpOutput, DumpError> {
        let mut result = None;
        for event in self.receiver.iter() {
            if let DumpEvent::Finished(res) = event {
                result = Some(res);
                break;
            }
        }

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        result.unwrap_or_else(|| {
            Err(DumpError::IoError(io::Error::other(
                "dump worker stopped without a result",
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_events_end_with_single_finished() {
        // Arrange
        let options = DumpOptions::default().with_chunk_size(300);
        let task = DumpTask::spawn(Cursor::new(vec![0x55u8; 1000]), options);

        // Act
        let events: Vec<DumpEvent> = task.events().collect();

        // Assert
        let progress: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                DumpEvent::Progress(p) => Some(*p),
                DumpEvent::Finished(_) => None,
            })
            .collect();
        assert_eq!(progress, vec![30, 60, 90, 100]);

        let finished: Vec<&DumpEvent> = events
            .iter()
            .filter(|e| matches!(e, DumpEvent::Finished(_)))
            .collect();
        assert_eq!(finished.len(), 1);
        assert!(matches!(
            events.last(),
            Some(DumpEvent::Finished(Ok(out))) if out.bytes.len() == 1000
        ));
    }

    #[test]
    fn test_missing_file_reports_io_error() {
        // Arrange
        let task = DumpTask::spawn_file("does/not/exist.bin", DumpOptions::default());

        // Act
        let res = task.wait();

        // Assert
        assert!(matches!(res, Err(DumpError::IoError(_))));
    }
}
