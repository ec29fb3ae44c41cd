pub mod formats;

use flexi_logger::Logger;

use crate::Error;

/// Start the logger. `RUST_LOG` wins; otherwise `info`, or `debug` when verbose.
pub fn init(verbose: bool) -> Result<(), Error> {
    let default = if verbose { "debug" } else { "info" };

    Logger::try_with_env_or_str(default)?
        .format(formats::cli_format)
        .log_to_stderr()
        .start()?;

    Ok(())
}
