mod commands;
mod profile;
mod result;
mod runner;

use clap::Parser;
use log::LevelFilter;
use nirust::ParcError;
use simple_logger::SimpleLogger;

use commands::Cli;

fn main() {
    let args = Cli::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("Cannot initialize logger: {e}");
    }

    if let Err(e) = runner::run(&args) {
        eprintln!("{}", error_line(&e));
        std::process::exit(1);
    }
}

/// 错误在标准错误上的输出格式: `种类: 信息`.
fn error_line(e: &ParcError) -> String {
    format!("{}: {e}", e.kind())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line() {
        let e = ParcError::GridMismatch {
            feature: [4, 4, 4],
            label: [4, 4, 5],
        };
        assert_eq!(
            error_line(&e),
            "GridMismatchError: feature grid [4, 4, 4] and label grid [4, 4, 5] are not grid-identical"
        );
        assert_eq!(
            error_line(&ParcError::EmptyLabelSet),
            "EmptyLabelSetError: label volume contains no foreground labels"
        );
    }
}
