use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// Writer handed to the fmt layer: always stderr, plus a log file once one is
/// configured.
#[derive(Clone, Default)]
struct TeeSink {
    file: Arc<RwLock<Option<File>>>,
}

struct TeeWriter {
    file: Arc<RwLock<Option<File>>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for TeeSink {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            file: self.file.clone(),
        }
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().write(buf)?;
        if let Some(file) = &mut *self.file.write().unwrap_or_else(PoisonError::into_inner) {
            let _ = file.write_all(&buf[..written]);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = &mut *self.file.write().unwrap_or_else(PoisonError::into_inner) {
            let _ = file.flush();
        }
        Ok(())
    }
}

static SINK: OnceLock<TeeSink> = OnceLock::new();

/// Installs the global subscriber and bridges `log` records into it. Safe to
/// call more than once; only the first call has an effect.
pub fn init() {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    let sink = SINK.get_or_init(TeeSink::default).clone();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(sink)
        .try_init();
}

/// Starts (or stops, with `None`) copying log output to `log_file`. Called
/// after CLI parsing, so early startup lines only reach stderr.
pub fn set_log_file(log_file: Option<&Path>) {
    let Some(sink) = SINK.get() else {
        return;
    };
    let mut guard = sink.file.write().unwrap_or_else(PoisonError::into_inner);
    *guard = log_file.and_then(open_log_file);
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("cannot open log file {}: {}", path.display(), err);
            None
        }
    }
}
