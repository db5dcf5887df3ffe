//! Journal of mood shifts and trainer failures, kept in memory and appended to disk.
use std::{
    collections::VecDeque,
    fs::{create_dir_all, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use bevy::{log::warn, prelude::*};
use serde::Serialize;

use super::{
    errors::TrainerError,
    events::{MoodCause, MoodChangedEvent, TrainerFailureEvent, TrainerResponseEvent},
    state::{MoodShift, TrainerId},
};

/// Rolling window of the most recent journal records.
#[derive(Resource, Debug)]
pub struct TrainerJournal {
    capacity: usize,
    records: VecDeque<TrainerJournalRecord>,
}

impl TrainerJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: TrainerJournalRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    #[allow(dead_code)]
    pub fn records(&self) -> impl Iterator<Item = &TrainerJournalRecord> {
        self.records.iter()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone)]
pub struct TrainerJournalRecord {
    pub occurred_at_seconds: f64,
    pub trainer_id: TrainerId,
    pub event: JournalEvent,
}

#[derive(Debug, Clone)]
pub enum JournalEvent {
    MoodShift { cause: MoodCause, shift: MoodShift },
    Failure(TrainerError),
}

/// Records mood changes and failed operations into the journal and its log.
pub fn record_trainer_journal(
    time: Res<Time>,
    mut journal: ResMut<TrainerJournal>,
    mut log: ResMut<TrainerJournalLog>,
    mut shifts: MessageReader<MoodChangedEvent>,
    mut responses: MessageReader<TrainerResponseEvent>,
    mut failures: MessageReader<TrainerFailureEvent>,
) {
    let now = time.elapsed_secs_f64();
    let mut record = |trainer_id: &TrainerId, event: JournalEvent| {
        let record = TrainerJournalRecord {
            occurred_at_seconds: now,
            trainer_id: trainer_id.clone(),
            event,
        };
        log.push(&record);
        journal.push(record);
    };

    for event in shifts.read() {
        record(
            &event.trainer_id,
            JournalEvent::MoodShift {
                cause: event.cause.clone(),
                shift: event.shift,
            },
        );
    }

    for event in responses.read() {
        if let Err(error) = &event.outcome {
            record(&event.trainer_id, JournalEvent::Failure(error.clone()));
        }
    }

    for event in failures.read() {
        record(&event.trainer_id, JournalEvent::Failure(event.error.clone()));
    }
}

/// Pending journal records waiting to be appended as JSON lines.
#[derive(Resource, Debug)]
pub struct TrainerJournalLog {
    output_path: PathBuf,
    pending: Vec<TrainerJournalRecord>,
}

impl TrainerJournalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: path.into(),
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, record: &TrainerJournalRecord) {
        self.pending.push(record.clone());
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.output_path.parent() {
            create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_path)?;

        for record in std::mem::take(&mut self.pending) {
            let serialisable: SerializableJournalRecord = record.into();
            serde_json::to_writer(&mut file, &serialisable)?;
            file.write_all(b"\n")?;
        }

        file.flush()?;
        Ok(())
    }
}

pub fn flush_trainer_journal_log(mut log: ResMut<TrainerJournalLog>) {
    if let Err(err) = log.flush() {
        warn!(
            "Failed to persist trainer journal to {:?}: {}",
            log.path(),
            err
        );
    }
}

#[derive(Serialize)]
struct SerializableJournalRecord {
    occurred_at_seconds: f64,
    trainer: String,
    event: SerializableJournalEvent,
}

#[derive(Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
enum SerializableJournalEvent {
    MoodShift {
        cause: &'static str,
        record_id: String,
        before: f64,
        after: f64,
    },
    Failure {
        error_kind: &'static str,
        message: String,
    },
}

impl From<TrainerJournalRecord> for SerializableJournalRecord {
    fn from(value: TrainerJournalRecord) -> Self {
        let event = match value.event {
            JournalEvent::MoodShift { cause, shift } => SerializableJournalEvent::MoodShift {
                cause: cause.label(),
                record_id: cause.record_id().to_string(),
                before: shift.before,
                after: shift.after,
            },
            JournalEvent::Failure(error) => SerializableJournalEvent::Failure {
                error_kind: error.label(),
                message: error.to_string(),
            },
        };

        Self {
            occurred_at_seconds: value.occurred_at_seconds,
            trainer: value.trainer_id.to_string(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::{env, fs, time::SystemTime};

    fn shift_record(at: f64, after: f64) -> TrainerJournalRecord {
        TrainerJournalRecord {
            occurred_at_seconds: at,
            trainer_id: TrainerId::new("coach"),
            event: JournalEvent::MoodShift {
                cause: MoodCause::Reward("praise".to_string()),
                shift: MoodShift {
                    before: 0.0,
                    after,
                },
            },
        }
    }

    #[test]
    fn journal_drops_oldest_when_full() {
        let mut journal = TrainerJournal::new(2);
        journal.push(shift_record(1.0, 1.0));
        journal.push(shift_record(2.0, 2.0));
        journal.push(shift_record(3.0, 3.0));

        assert_eq!(journal.len(), 2);
        assert!(journal
            .records()
            .all(|record| record.occurred_at_seconds >= 2.0));
    }

    #[test]
    fn journal_log_writes_json_lines() {
        let unique_suffix = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = env::temp_dir()
            .join(format!("trainer_journal_test_{}", unique_suffix))
            .join("history.jsonl");

        let mut log = TrainerJournalLog::new(&path);
        log.push(&shift_record(4.5, 2.0));
        log.push(&TrainerJournalRecord {
            occurred_at_seconds: 5.0,
            trainer_id: TrainerId::new("coach"),
            event: JournalEvent::Failure(TrainerError::NoRewardsAvailable),
        });
        log.flush().expect("journal log should flush");
        log.flush().expect("empty flush is a no-op");

        let raw = fs::read_to_string(&path).expect("log file should exist");
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 2);

        let shift: Value = serde_json::from_str(lines[0]).expect("json line should parse");
        assert_eq!(shift["trainer"], "coach");
        assert_eq!(shift["event"]["event_type"], "mood_shift");
        assert_eq!(shift["event"]["cause"], "reward");
        assert_eq!(shift["event"]["record_id"], "praise");
        assert_eq!(shift["event"]["after"], 2.0);

        let failure: Value = serde_json::from_str(lines[1]).expect("json line should parse");
        assert_eq!(failure["event"]["event_type"], "failure");
        assert_eq!(failure["event"]["error_kind"], "no_rewards_available");

        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn serialised_mood_keeps_full_precision() {
        let record: SerializableJournalRecord = shift_record(1.0, 0.1).into();
        let value = serde_json::to_value(&record).expect("record should serialise");
        assert_eq!(value["event"]["after"], 0.1);
    }
}
