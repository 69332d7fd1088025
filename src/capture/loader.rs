use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::{CaptureSession, Point};
use crate::errors::InkReplayError;

/// One line of a capture file. Replaying the events in order rebuilds the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CaptureEvent {
    Down(Point),
    Move(Point),
    Up,
    Reset,
}

impl CaptureSession {
    /// Feed a recorded pointer event into the session
    pub fn apply(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Down(point) => self.pointer_down(point),
            CaptureEvent::Move(point) => self.pointer_move(point),
            CaptureEvent::Up => self.pointer_up(),
            CaptureEvent::Reset => self.reset(),
        }
    }

    /// Events that rebuild the sealed strokes of this session
    pub fn events(&self) -> Vec<CaptureEvent> {
        let mut events = Vec::with_capacity(self.point_count() + self.strokes().len());
        for stroke in self.strokes() {
            events.push(CaptureEvent::Down(*stroke.first()));
            events.extend(stroke.points()[1..].iter().copied().map(CaptureEvent::Move));
            events.push(CaptureEvent::Up);
        }
        events
    }
}

pub fn load_capture(source_file: &Path) -> Result<CaptureSession, InkReplayError> {
    if !source_file.exists() {
        return Err(InkReplayError::InvalidCaptureFile {
            path: format!("{:?}", source_file),
        });
    }

    let events = serde_jsonlines::json_lines(source_file)
        .map_err(|e| InkReplayError::CaptureFileError { source: e })?
        .collect::<Result<Vec<CaptureEvent>, std::io::Error>>()
        .map_err(|e| InkReplayError::CaptureFileError { source: e })?;

    let event_count = events.len();
    let mut session = CaptureSession::new();
    for event in events {
        session.apply(event);
    }
    // a capture that ends mid-stroke still keeps what was drawn
    session.pointer_up();

    info!(
        "Loaded {:?}, replayed {} events into {} strokes with {} points",
        source_file,
        event_count,
        session.strokes().len(),
        session.point_count()
    );
    Ok(session)
}

pub fn save_capture(target_file: &Path, session: &CaptureSession) -> Result<(), InkReplayError> {
    serde_jsonlines::write_json_lines(target_file, session.events())
        .map_err(|e| InkReplayError::WriterError { source: e })
}
