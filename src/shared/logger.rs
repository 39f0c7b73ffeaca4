use std::io::Write;

use chrono::Local;
use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};

pub fn init(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => record.level().to_string().red(),
                Level::Warn => record.level().to_string().yellow(),
                Level::Info => record.level().to_string().blue(),
                Level::Debug | Level::Trace => record.level().to_string().normal(),
            };
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                record.args()
            )
        })
        .filter(None, level)
        .init();
}
