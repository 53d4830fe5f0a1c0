mod repl;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use log::info;
use std::io;

/// Evaluates arithmetic expressions, interactively or once
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Arguments {
    /// The expression to evaluate. Starts an interactive session when omitted
    expression: Option<String>,

    /// Print the tree of every parsed expression
    #[clap(long)]
    tree: bool,

    #[clap(flatten)]
    verbose: Verbosity,
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let stdout = io::stdout();
    let mut output = stdout.lock();

    match args.expression {
        Some(expression) => {
            if !repl::run_once(&expression, args.tree, &mut output)? {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            info!("Starting interactive session");
            let stdin = io::stdin();
            repl::run(stdin.lock(), &mut output, args.tree)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn expression_is_optional() {
        let args = Arguments::try_parse_from(["calculator"]).unwrap();

        assert_eq!(args.expression, None);
        assert!(!args.tree);
    }

    #[test]
    fn quiet_flag_turns_logging_off() {
        let args = Arguments::try_parse_from(["calculator", "-q", "1+"]).unwrap();

        assert_eq!(args.expression.as_deref(), Some("1+"));
        assert_eq!(args.verbose.log_level_filter(), LevelFilter::Off);
    }

    #[test]
    fn verbose_flag_raises_log_level() {
        let args = Arguments::try_parse_from(["calculator", "--tree", "-v", "2^3"]).unwrap();

        assert!(args.tree);
        assert_eq!(args.verbose.log_level_filter(), LevelFilter::Warn);
    }
}
