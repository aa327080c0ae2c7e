use stderrlog::{LogLevelNum, Timestamp};

/// The module prefix shared by the library and this binary.
const LOG_MODULE: &str = "nettrans";

/// How much a command logs before any `-v` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseVerbosity {
    /// Warnings and errors only; for commands whose stdout is the product.
    Warnings,

    /// Progress at `info`; for batch jobs writing files.
    Progress,
}

impl BaseVerbosity {
    fn level(self) -> u8 {
        match self {
            BaseVerbosity::Warnings => 2,
            BaseVerbosity::Progress => 3,
        }
    }
}

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[clap(short, long)]
    pub quiet: bool,

    /// Log more than the command's default (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Enable timestamped logging.
    #[clap(short, long)]
    pub ts: bool,
}

impl LogArgs {
    /// The effective level: `0` (off) through `5` (trace).
    fn level(
        &self,
        base: BaseVerbosity,
    ) -> u8 {
        if self.quiet {
            0
        } else {
            base.level().saturating_add(self.verbose).min(5)
        }
    }

    /// Install the stderr logger for the `nettrans` modules.
    pub fn init(
        &self,
        base: BaseVerbosity,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let verbosity = match self.level(base) {
            0 => LogLevelNum::Off,
            1 => LogLevelNum::Error,
            2 => LogLevelNum::Warn,
            3 => LogLevelNum::Info,
            4 => LogLevelNum::Debug,
            _ => LogLevelNum::Trace,
        };

        stderrlog::new()
            .module(LOG_MODULE)
            .quiet(self.quiet)
            .verbosity(verbosity)
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }
}
