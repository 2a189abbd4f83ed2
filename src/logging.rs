use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Where log lines go
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

/// Install the global subscriber. `RUST_LOG` is honored; each `-v` raises the base level.
pub fn setup(verbosity: u8, target: LogTarget) -> anyhow::Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = env_filter(verbosity, directives.as_deref());

    let (writer, ansi) = match target {
        LogTarget::File(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("failed to create log file '{}': {e}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let subscriber = tracing_subscriber::registry::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(ansi).with_filter(env_filter));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Warnings and up unless `directives` say otherwise. `-v` only overrides the level when given.
fn env_filter(verbosity: u8, directives: Option<&str>) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives.unwrap_or_default());
    let level = match verbosity {
        0 => return filter,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    filter.add_directive(level.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, None, LevelFilter::WARN)]
    #[case(0, Some(""), LevelFilter::WARN)]
    #[case(0, Some("debug"), LevelFilter::DEBUG)]
    #[case(0, Some("neko=trace"), LevelFilter::TRACE)]
    #[case(1, None, LevelFilter::INFO)]
    #[case(2, Some("warn"), LevelFilter::DEBUG)]
    #[case(5, None, LevelFilter::TRACE)]
    fn test_env_filter_level(#[case] verbosity: u8, #[case] directives: Option<&str>, #[case] expected: LevelFilter) {
        assert_eq!(env_filter(verbosity, directives).max_level_hint(), Some(expected));
    }
}
