//! Command dispatch: turns parsed arguments into a conversion

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::application::services::ConversionSummary;
use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::sink::OutputTarget;

/// Run the conversion described by `cli` with the real service stack.
#[instrument(level = "debug", skip_all)]
pub fn execute(cli: &Cli) -> CliResult<ConversionSummary> {
    let input = cli
        .file
        .as_deref()
        .ok_or_else(|| CliError::Usage("missing input FILE".into()))?;
    let target = OutputTarget::from_path(cli.output.clone());
    check_target(input, &target)?;

    let settings = load_settings(cli)?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    let summary = container.conversion_service().convert(input, &target)?;
    if let OutputTarget::File(path) = &summary.output {
        output::success(&format!(
            "Wrote {} rows to {}",
            summary.rows,
            path.display()
        ));
    }
    Ok(summary)
}

/// Layered settings with the command line flags applied last.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(settings.with_flags(cli.numbers, cli.ids, cli.leaf))
}

fn check_target(input: &Path, target: &OutputTarget) -> CliResult<()> {
    if let OutputTarget::File(path) = target {
        if same_file(path, input) {
            return Err(CliError::InvalidArgs(format!(
                "output would overwrite the input archive: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Literal match, or both paths exist and resolve to the same location.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
