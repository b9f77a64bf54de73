//! Reads tagged payloads from files or stdin and stores the valid ones.
//!
//! Usage: `intake [PATH...]`. Each path is one payload, `-` or no paths at
//! all reads a single payload from stdin.

mod audit;
mod config;
mod intake;
mod inventory;
mod logging;
mod store;

fn main() -> anyhow::Result<std::process::ExitCode> {
    use std::ffi::OsString;
    use std::io::{self, Read as _, Write as _};
    use std::path::Path;
    use std::process::ExitCode;
    use std::{env, fs, panic};

    use anyhow::{Context as _, Result};

    use crate::config::IntakeConfig;
    use crate::intake::{Intake, IntakeError};
    use crate::store::{JsonLinesSink, MemorySink, RecordSink};

    /// Location that stands for stdin.
    const STDIN: &str = "-";

    #[derive(Debug, Default)]
    struct Summary {
        accepted: usize,
        rejected: usize,
    }

    let res = run();
    if let Err(why) = &res {
        log::error!("Exiting due to error: {why:?}");
    }

    log::logger().flush();
    return res.map(|summary| {
        if summary.rejected > 0 {
            ExitCode::from(2)
        } else {
            ExitCode::SUCCESS
        }
    });

    // actual main logic
    fn run() -> Result<Summary> {
        let config = build_config()?;
        init_logging(config.log)?;

        // register the custom panic handler after logging is set up
        panic::set_hook(Box::new(on_panic));

        log::info!(target: "intake::version", "intake v{}", env!("CARGO_PKG_VERSION"));

        let sink: Box<dyn RecordSink> = if config.store.dry_run {
            log::warn!("Dry run: accepted records are not stored");
            Box::new(MemorySink::new())
        } else {
            let sink = JsonLinesSink::open(&config.store.path)
                .with_context(|| format!("cannot open record store {:?}", config.store.path))?;
            log::debug!("Appending records to {:?}", sink.path());
            Box::new(sink)
        };

        let max_input_len = config.limits.max_input_len;
        let intake = Intake::new(config.limits.into(), config.schema, config.audit, sink);

        let mut locations: Vec<OsString> = env::args_os().skip(1).collect();
        if locations.is_empty() {
            locations.push(STDIN.into());
        }

        let mut summary = Summary::default();
        let mut stdout = io::stdout().lock();

        for path in &locations {
            let path = Path::new(path);
            let location = path.display().to_string();
            let source = intake.source(&location);

            let accepted = match read_payload(path, max_input_len) {
                Ok(input) => handle(&intake, &source, &input)?,
                Err(why) => {
                    log::error!("Cannot read payload {source}: {why:?}");
                    false
                },
            };

            if accepted {
                summary.accepted += 1;
                writeln!(stdout, "{location}: accepted")?;
            } else {
                summary.rejected += 1;
                writeln!(stdout, "{location}: {}", crate::intake::INVALID_DATA)?;
            }
        }

        log::info!(
            "Processed {} payloads, {} accepted, {} rejected",
            locations.len(),
            summary.accepted,
            summary.rejected,
        );

        Ok(summary)
    }

    /// Returns whether the payload was accepted. Only sink failures are
    /// errors, those end the run.
    fn handle<S: RecordSink>(intake: &Intake<S>, source: &str, input: &[u8]) -> Result<bool> {
        match intake.handle(source, input) {
            Ok(_) => Ok(true),
            Err(IntakeError::Rejected) => Ok(false),
            Err(err @ IntakeError::Store(_)) => Err(err).context(format!("payload {source}")),
        }
    }

    /// Reads at most one byte more than `max_len`, so oversized payloads are
    /// still rejected by the decoder without being loaded whole.
    fn read_payload(path: &Path, max_len: usize) -> Result<Vec<u8>> {
        let limit = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1);
        let mut buf = Vec::new();

        if path == Path::new(STDIN) {
            io::stdin()
                .lock()
                .take(limit)
                .read_to_end(&mut buf)
                .context("cannot read stdin")?;
        } else {
            fs::File::open(path)
                .and_then(|f| f.take(limit).read_to_end(&mut buf))
                .with_context(|| format!("cannot read {}", path.display()))?;
        }

        Ok(buf)
    }

    /// Custom panic handler that writes the panic to the logger and flushes it.
    fn on_panic(info: &panic::PanicHookInfo<'_>) {
        use std::backtrace::Backtrace;

        let backtrace = Backtrace::force_capture();
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");

        // in case the loggers fail or are empty
        _ = writeln!(io::stderr(), "thread '{name}' {info}");
        log::error!("thread '{name}' {info}\n{backtrace}");
        log::logger().flush();
    }

    fn profile() -> Result<String> {
        use std::env::VarError::NotPresent;

        match env::var("INTAKE_PROFILE") {
            Ok(value) => Ok(value),
            Err(NotPresent) => Ok("release".to_owned()),
            Err(err) => Err(err).context("cannot load INTAKE_PROFILE env variable"),
        }
    }

    fn build_config() -> Result<IntakeConfig> {
        use crate::config::setup::{Builder, Env, File, TomlText};

        let profile = profile()?;
        let profile_config = format!("intake.{profile}.toml");
        let default_config = include_str!("../assets/default_config.toml");

        Builder::new()
            .add_layer(TomlText::new(default_config))
            .add_layer(File::new("intake.toml").required(false))
            .add_layer(File::new(&profile_config).required(false))
            .add_layer(Env::new("INTAKE"))
            .build()
    }

    fn init_logging(config: log4rs::config::RawConfig) -> Result<()> {
        let deserializers = crate::logging::deserializers();
        let (appenders, errors) = config.appenders_lossy(&deserializers);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let config = log4rs::Config::builder()
            .appenders(appenders)
            .loggers(config.loggers())
            .build(config.root())?;

        log4rs::init_config(config)?;
        Ok(())
    }
}
