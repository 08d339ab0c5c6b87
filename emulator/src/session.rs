use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;

use monitor_core::boot::{SleepPhase, WakeCause, initial_total};
use monitor_core::config::{MonitorConfig, SAMPLE_QUEUE_DEPTH};
use monitor_core::energy::{CycleOutcome, CycleReport, integrate_cycle};
use monitor_core::sampling::{AcquisitionError, Sample, SampleSource, SimulatedSampleSource};
use monitor_core::store::{
    DurableAccumulator, MemoryStore, STORAGE_NAMESPACE, StoreBackend, StoreError, TOTAL_ENERGY_KEY,
};

/// Completed-cycle reports retained for `status`.
const REPORT_HISTORY: usize = 16;

/// Seed for the simulated source, fixed so sessions replay identically.
const DEFAULT_SEED: u64 = 7;

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("boot", "boot [cold|timer]  - run one wake/cycle/standby sequence"),
    ("run", "run <count>        - run <count> consecutive boots"),
    (
        "status",
        "status             - show boot count, stored total, last report",
    ),
    ("help", "help               - show this summary"),
];

/// Simulated sensor variant driving the session.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SimProfile {
    /// 0.05–15 A, 127–221 V.
    #[default]
    Wide,
    /// 0.05–10 A, 210–230 V.
    Narrow,
}

impl SimProfile {
    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("wide") {
            Ok(Self::Wide)
        } else if tag.eq_ignore_ascii_case("narrow") {
            Ok(Self::Narrow)
        } else {
            Err(format!("Unknown profile `{tag}`"))
        }
    }

    fn source(self, seed: u64) -> SimulatedSampleSource {
        match self {
            Self::Wide => SimulatedSampleSource::wide(seed),
            Self::Narrow => SimulatedSampleSource::narrow(seed),
        }
    }
}

/// Startup options parsed from the command line.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub profile: SimProfile,
    pub store_path: Option<PathBuf>,
}

/// File-backed store: one record file holding the encoded total, surviving
/// emulator restarts the way NVS survives power loss on the node.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    fn new(path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }
}

impl StoreBackend for FileStore {
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        out: &mut [u8],
    ) -> Result<Option<usize>, StoreError> {
        if namespace != STORAGE_NAMESPACE || key != TOTAL_ENERGY_KEY {
            return Ok(None);
        }
        match fs::read(&self.path) {
            Ok(bytes) => {
                if bytes.len() > out.len() {
                    return Err(StoreError::Read);
                }
                out[..bytes.len()].copy_from_slice(&bytes);
                Ok(Some(bytes.len()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(_) => Err(StoreError::Open),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if namespace != STORAGE_NAMESPACE || key != TOTAL_ENERGY_KEY {
            return Err(StoreError::Write);
        }
        fs::write(&self.path, value).map_err(|_| StoreError::Write)
    }
}

/// Store variants the session can run against.
pub enum SessionStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl StoreBackend for SessionStore {
    fn read(
        &mut self,
        namespace: &str,
        key: &str,
        out: &mut [u8],
    ) -> Result<Option<usize>, StoreError> {
        match self {
            SessionStore::Memory(store) => store.read(namespace, key, out),
            SessionStore::File(store) => store.read(namespace, key, out),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), StoreError> {
        match self {
            SessionStore::Memory(store) => store.write(namespace, key, value),
            SessionStore::File(store) => store.write(namespace, key, value),
        }
    }
}

/// One emulated node, with the sleep/wake restart modeled as an explicit
/// outer loop: every `boot` runs a full load → cycle → suspend sequence and
/// only the store carries state into the next one.
pub struct Session {
    accumulator: DurableAccumulator<SessionStore>,
    source: Arc<Mutex<Box<dyn SampleSource + Send>>>,
    config: MonitorConfig,
    phase: SleepPhase,
    boots: u32,
    next_wake: WakeCause,
    history: VecDeque<CycleReport>,
}

impl Session {
    pub fn new(options: &SessionOptions) -> io::Result<Self> {
        let store = match &options.store_path {
            Some(path) => SessionStore::File(FileStore::new(path.clone())?),
            None => SessionStore::Memory(MemoryStore::new()),
        };
        Ok(Self::with_source(
            store,
            Box::new(options.profile.source(DEFAULT_SEED)),
        ))
    }

    fn with_source(store: SessionStore, source: Box<dyn SampleSource + Send>) -> Self {
        Self {
            accumulator: DurableAccumulator::new(store),
            source: Arc::new(Mutex::new(source)),
            config: MonitorConfig::default(),
            phase: SleepPhase::Running,
            boots: 0,
            next_wake: WakeCause::Cold,
            history: VecDeque::with_capacity(REPORT_HISTORY),
        }
    }

    pub fn handle_command(&mut self, input: &str) -> Vec<String> {
        let mut parts = input.split_whitespace();
        let Some(command) = parts.next() else {
            return Vec::new();
        };

        match command.to_ascii_lowercase().as_str() {
            "boot" => match parts.next() {
                None => self.boot(self.next_wake),
                Some(tag) if tag.eq_ignore_ascii_case("cold") => self.boot(WakeCause::Cold),
                Some(tag) if tag.eq_ignore_ascii_case("timer") => self.boot(WakeCause::Timer),
                Some(other) => vec![format!(
                    "Unknown wake cause `{other}`; expected `cold` or `timer`."
                )],
            },
            "run" => match parts.next().map(str::parse::<u32>) {
                Some(Ok(count)) if count > 0 => {
                    let mut lines = Vec::new();
                    for _ in 0..count {
                        lines.extend(self.boot(self.next_wake));
                    }
                    lines
                }
                _ => vec!["Usage: run <count>".to_string()],
            },
            "status" => self.status(),
            "help" => match parts.next() {
                Some(topic) => HELP_TOPICS
                    .iter()
                    .find(|(name, _)| topic.eq_ignore_ascii_case(name))
                    .map_or_else(
                        || vec![format!("No help for `{topic}`.")],
                        |(_, text)| vec![(*text).to_string()],
                    ),
                None => HELP_TOPICS
                    .iter()
                    .map(|(_, text)| (*text).to_string())
                    .collect(),
            },
            other => vec![format!("Unknown command `{other}`; type `help` for commands.")],
        }
    }

    /// One full boot: classify the wake, run the pipeline once, suspend.
    fn boot(&mut self, cause: WakeCause) -> Vec<String> {
        let mut lines = Vec::new();
        self.phase = SleepPhase::Running;

        // Load always runs; the cold branch overrides its result.
        let stored = self.accumulator.load();
        let total = initial_total(cause, stored);
        lines.push(if cause.is_timer_wake() {
            format!("woke from standby, resuming at {total:.4} kWh")
        } else {
            "first boot, accumulator reset".to_string()
        });

        let (reading, outcome) = self.run_cycle(total);
        match reading {
            Ok(sample) => lines.push(format!(
                "sample enqueued: {:.2} A, {:.2} V",
                sample.current_a, sample.voltage_v
            )),
            Err(err) => lines.push(format!("sample acquisition failed ({err}), skipping cycle")),
        }

        if let CycleOutcome::Completed(report) = outcome {
            if let Err(err) = self.accumulator.save(report.total_kwh) {
                lines.push(format!("warning: energy total not persisted ({err})"));
            }
            lines.push(format!(
                "power: {:.2} W | total energy: {:.4} kWh | cost: R$ {:.2}",
                report.power_w, report.total_kwh, report.cost
            ));
            if self.history.len() == REPORT_HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(report);
        }

        lines.push(format!(
            "entering standby for {} s (timer wake armed)",
            self.config.sleep_duration().as_secs()
        ));
        self.phase = SleepPhase::Suspended;
        self.boots += 1;
        self.next_wake = WakeCause::Timer;
        lines
    }

    /// One pipeline run: the producer thread does the guarded read and the
    /// enqueue, this thread performs the bounded dequeue and integration.
    fn run_cycle(&mut self, total: f32) -> (Result<Sample, AcquisitionError>, CycleOutcome) {
        let (tx, rx) = mpsc::sync_channel::<Sample>(SAMPLE_QUEUE_DEPTH);
        let source = Arc::clone(&self.source);
        let producer = thread::spawn(move || {
            // The lock spans only the read; the enqueue happens after release.
            let reading = {
                let mut source = source.lock().expect("sample source lock poisoned");
                source.acquire()
            };
            if let Ok(sample) = reading {
                let _ = tx.send(sample);
            }
            reading
        });

        let outcome = match rx.recv_timeout(self.config.receive_timeout()) {
            Ok(sample) => CycleOutcome::Completed(integrate_cycle(total, sample, &self.config)),
            // A failed acquisition enqueues nothing, so it surfaces here as
            // the same silent timeout as a slow sensor.
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => CycleOutcome::TimedOut,
        };
        let reading = producer.join().expect("acquisition thread panicked");
        (reading, outcome)
    }

    fn status(&mut self) -> Vec<String> {
        let phase = match self.phase {
            SleepPhase::Running => "running",
            SleepPhase::Suspended => "suspended",
        };
        let mut lines = vec![
            format!("boots completed: {}", self.boots),
            format!("phase: {phase}"),
            format!("stored total: {:.4} kWh", self.accumulator.load()),
            format!("next wake cause: {}", self.next_wake),
        ];
        match self.history.back() {
            Some(report) => lines.push(format!(
                "last report: {:.2} W, {:.4} kWh, R$ {:.2}",
                report.power_w, report.total_kwh, report.cost
            )),
            None => lines.push("last report: none".to_string()),
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::sampling::{FaultySampleSource, FixedSampleSource};
    use std::env;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn fixed_session() -> Session {
        Session::with_source(
            SessionStore::Memory(MemoryStore::new()),
            Box::new(FixedSampleSource::new(Sample::new(10.0, 220.0))),
        )
    }

    #[test]
    fn consecutive_timer_boots_accumulate_and_persist() {
        let mut session = fixed_session();

        // First boot is cold and starts from zero.
        session.handle_command("boot");
        assert!(close(session.accumulator.load(), 0.003_056));

        // The second boot resumes from the persisted total.
        session.handle_command("boot");
        assert!(close(session.accumulator.load(), 0.006_111));
        assert_eq!(session.boots, 2);
        assert_eq!(session.phase, SleepPhase::Suspended);
    }

    #[test]
    fn a_cold_boot_resets_the_resumed_total() {
        let mut session = fixed_session();
        session.handle_command("run 3");
        assert!(session.accumulator.load() > 0.005);

        session.handle_command("boot cold");
        assert!(close(session.accumulator.load(), 0.003_056));
    }

    #[test]
    fn a_failed_acquisition_times_out_silently_without_persisting() {
        let mut session = Session::with_source(
            SessionStore::Memory(MemoryStore::new()),
            Box::new(FaultySampleSource::new()),
        );
        session.accumulator.save(0.5).expect("seed stored total");

        let lines = session.handle_command("boot timer");
        assert!(lines.iter().any(|line| line.contains("acquisition failed")));
        assert!(!lines.iter().any(|line| line.contains("power:")));
        assert!(close(session.accumulator.load(), 0.5));
    }

    #[test]
    fn run_executes_the_requested_number_of_boots() {
        let mut session = fixed_session();
        session.handle_command("run 4");
        assert_eq!(session.boots, 4);
    }

    #[test]
    fn status_reports_the_stored_total_and_last_report() {
        let mut session = fixed_session();
        session.handle_command("boot");
        let lines = session.handle_command("status");
        assert!(lines.iter().any(|line| line.contains("boots completed: 1")));
        assert!(lines.iter().any(|line| line.contains("0.0031 kWh")));
    }

    #[test]
    fn a_file_store_survives_a_new_session() {
        let path = env::temp_dir().join(format!("monitor-emulator-test-{}.bin", std::process::id()));
        let _ = fs::remove_file(&path);

        let options = SessionOptions {
            profile: SimProfile::Wide,
            store_path: Some(path.clone()),
        };
        {
            let mut session = Session::new(&options).expect("create session");
            session.accumulator.save(2.503_056).expect("persist total");
        }

        let mut resumed = Session::new(&options).expect("reopen session");
        assert!(close(resumed.accumulator.load(), 2.503_056));

        let _ = fs::remove_file(&path);
    }
}
