//! Command-line mode selection.

use std::path::PathBuf;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Open the preview window.
    Interactive,

    /// Render `input` through the shaders once and write `output`.
    Batch { input: PathBuf, output: PathBuf },
}

/// Picks the mode from the arguments after the program name.
///
/// Two or more arguments select batch mode with the first two; extra
/// arguments are ignored. Anything less is interactive.
pub fn parse_mode<I, S>(args: I) -> Mode
where
    I: IntoIterator<Item = S>,
    S: Into<PathBuf>,
{
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(input), Some(output)) => Mode::Batch {
            input: input.into(),
            output: output.into(),
        },
        _ => Mode::Interactive,
    }
}
