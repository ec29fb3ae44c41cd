use flexi_logger::{DeferredNow, style};
use log::Record;

/// Compact single-line format: time, colored level, target, message.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    write!(
        w,
        "{} {} [{}] {}",
        now.now().format("%H:%M:%S%.3f"),
        style(level).paint(format!("{level:<5}")),
        record.target(),
        record.args()
    )
}
