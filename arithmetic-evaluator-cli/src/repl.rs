use anyhow::Result;
use arithmetic_evaluator::interpreter::calculate;
use arithmetic_evaluator::interpreter::parser::parse;
use log::debug;
use std::io::{BufRead, Write};

const EXIT_COMMAND: &str = "exit";

/// Reads expressions line by line until `exit` or the end of input,
/// answering each with its value or the reason it has none.
pub fn run(input: impl BufRead, output: &mut impl Write, show_tree: bool) -> Result<()> {
    writeln!(output, "Welcome to the calculator!")?;
    writeln!(
        output,
        "Please enter a mathematical expression to calculate, allowed operators are +, -, *, /, ^ and sqrt. You can also use parentheses ( )."
    )?;
    writeln!(output, "Type '{}' to quit the calculator.", EXIT_COMMAND)?;
    writeln!(output)?;
    writeln!(output, "Example: 2 + 3 * (4 - 1)")?;
    writeln!(output)?;

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if line == EXIT_COMMAND {
            writeln!(output, "Goodbye!")?;
            break;
        }
        respond(&line, show_tree, output)?;
    }
    Ok(())
}

/// Answers a single expression given up front.
///
/// returns: Whether the expression had a value, the process fails otherwise.
pub fn run_once(expression: &str, show_tree: bool, output: &mut impl Write) -> Result<bool> {
    let succeeded = respond(expression, show_tree, output)?;
    output.flush()?;
    Ok(succeeded)
}

/// Evaluates a single expression and prints the outcome.
///
/// returns: Whether the expression had a value.
pub fn respond(expression: &str, show_tree: bool, output: &mut impl Write) -> Result<bool> {
    if show_tree {
        print_tree(expression, output)?;
    }
    match calculate(expression) {
        Ok(value) => {
            writeln!(output, "Result: {}", value)?;
            Ok(true)
        }
        Err(error) => {
            debug!("{:?} has no value: {:?}", expression, error);
            writeln!(output, "Error: {}", error)?;
            Ok(false)
        }
    }
}

/// Prints the tree of the expression, if it can be parsed.
fn print_tree(expression: &str, output: &mut impl Write) -> Result<()> {
    if let Ok(tree) = parse(expression) {
        write!(output, "{}", tree.render("", false)?)?;
    }
    Ok(())
}
