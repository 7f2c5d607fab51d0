use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use string_queue::{handle, Queue};

/// Runs a queue command script, one command per line.
///
/// Commands: `new`, `free`, `ih VALUE [N]`, `it VALUE [N]`, `rh [EXPECTED]`, `size [EXPECTED]`,
/// `reverse`, `sort`, `show`. Blank lines and lines starting with `#` are skipped.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script to run. Reads standard input if omitted.
    script: Option<PathBuf>,
    /// Stop at the first failing command
    #[clap(short, long)]
    strict: bool,
    /// Echo each command and dump the queue after it
    #[clap(short, long)]
    verbose: bool,
    /// Capacity of the buffer removed values are copied into, terminator included
    #[clap(short, long, default_value_t = 1024)]
    buffer_size: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    New,
    Free,
    InsertHead { value: String, count: usize },
    InsertTail { value: String, count: usize },
    RemoveHead { expected: Option<String> },
    Size { expected: Option<usize> },
    Reverse,
    Sort,
    Show,
}

impl Command {
    /// `None` for lines without a command.
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("new", []) => Self::New,
            ("free", []) => Self::Free,
            ("ih", [value, rest @ ..]) => Self::InsertHead {
                value: value.to_string(),
                count: repeat_count(rest)?,
            },
            ("it", [value, rest @ ..]) => Self::InsertTail {
                value: value.to_string(),
                count: repeat_count(rest)?,
            },
            ("rh", []) => Self::RemoveHead { expected: None },
            ("rh", [expected]) => Self::RemoveHead {
                expected: Some(expected.to_string()),
            },
            ("size", []) => Self::Size { expected: None },
            ("size", [expected]) => Self::Size {
                expected: Some(
                    expected
                        .parse()
                        .with_context(|| format!("invalid size `{expected}`"))?,
                ),
            },
            ("reverse", []) => Self::Reverse,
            ("sort", []) => Self::Sort,
            ("show", []) => Self::Show,
            _ => bail!("unknown command or wrong arguments: `{line}`"),
        };
        Ok(Some(command))
    }
}

fn repeat_count(args: &[&str]) -> Result<usize> {
    match args {
        [] => Ok(1),
        [count] => count
            .parse()
            .with_context(|| format!("invalid repeat count `{count}`")),
        _ => bail!("too many arguments"),
    }
}

/// Owns the current queue, which is absent until the first `new`.
struct Harness {
    queue: Option<Box<Queue>>,
    buffer: Vec<u8>,
}

impl Harness {
    fn new(buffer_size: usize) -> Result<Self> {
        ensure!(buffer_size > 0, "the buffer needs room for at least the terminator");
        Ok(Self {
            queue: None,
            buffer: vec![0; buffer_size],
        })
    }

    /// Applies `command` and describes what happened.
    fn run(&mut self, command: &Command) -> Result<String> {
        match command {
            Command::New => {
                handle::destroy(self.queue.take());
                self.queue = Some(handle::create()?);
                Ok(self.describe())
            }
            Command::Free => {
                handle::destroy(self.queue.take());
                Ok(self.describe())
            }
            Command::InsertHead { value, count } => {
                for _ in 0..*count {
                    handle::insert_head(self.queue.as_deref_mut(), value)?;
                }
                Ok(self.describe())
            }
            Command::InsertTail { value, count } => {
                for _ in 0..*count {
                    handle::insert_tail(self.queue.as_deref_mut(), value)?;
                }
                Ok(self.describe())
            }
            Command::RemoveHead { expected } => {
                let copied =
                    handle::remove_head(self.queue.as_deref_mut(), Some(&mut self.buffer))?;
                let removed = String::from_utf8_lossy(&self.buffer[..copied]).into_owned();
                if let Some(expected) = expected {
                    ensure!(
                        removed == *expected,
                        "removed `{removed}`, expected `{expected}`"
                    );
                }
                Ok(format!("removed {removed:?}, {}", self.describe()))
            }
            Command::Size { expected } => {
                let size = handle::size(self.queue.as_deref());
                if let Some(expected) = expected {
                    ensure!(size == *expected, "size is {size}, expected {expected}");
                }
                Ok(format!("size = {size}"))
            }
            Command::Reverse => {
                handle::reverse(self.queue.as_deref_mut());
                Ok(self.describe())
            }
            Command::Sort => {
                handle::sort(self.queue.as_deref_mut());
                if let Some(queue) = self.queue.as_deref() {
                    let values: Vec<&str> = queue.iter().collect();
                    ensure!(
                        values.windows(2).all(|pair| pair[0] <= pair[1]),
                        "not sorted: {queue:?}"
                    );
                }
                Ok(self.describe())
            }
            Command::Show => Ok(self.describe()),
        }
    }

    fn describe(&self) -> String {
        match self.queue.as_deref() {
            Some(queue) => format!("q = {queue:?}"),
            None => "q = none".to_string(),
        }
    }
}

/// Runs every line of `script` through `harness`, writing each command's report to `out` and
/// each failure to stderr. Returns the number of failed commands, unless `strict` turns the first
/// failure into an error.
fn execute(
    script: impl BufRead,
    harness: &mut Harness,
    out: &mut impl Write,
    strict: bool,
    verbose: bool,
) -> Result<usize> {
    let mut failures = 0;

    for (index, line) in script.lines().enumerate() {
        let line = line.context("cannot read script")?;
        let line_number = index + 1;

        let outcome = Command::parse(&line).and_then(|command| match command {
            Some(command) => {
                if verbose {
                    writeln!(out, "cmd> {}", line.trim())?;
                }
                harness.run(&command).map(Some)
            }
            None => Ok(None),
        });

        match outcome {
            Ok(Some(report)) => {
                writeln!(out, "{report}")?;
                if verbose {
                    dbg!(&harness.queue);
                }
            }
            Ok(None) => {}
            Err(err) => {
                eprintln!("line {line_number}: {err:#}");
                failures += 1;
                if strict {
                    bail!("stopped at line {line_number}");
                }
            }
        }
    }

    Ok(failures)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let script: Box<dyn BufRead> = match &cli.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut harness = Harness::new(cli.buffer_size)?;
    let failures = execute(
        script,
        &mut harness,
        &mut io::stdout().lock(),
        cli.strict,
        cli.verbose,
    );
    handle::destroy(harness.queue.take());

    let failures = failures?;
    ensure!(failures == 0, "{failures} command(s) failed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use string_queue::Error;

    fn run_script(harness: &mut Harness, script: &str) -> Vec<String> {
        script
            .lines()
            .filter_map(|line| Command::parse(line).unwrap())
            .map(|command| harness.run(&command).unwrap())
            .collect()
    }

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("  # comment").unwrap(), None);
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(
            Command::parse("ih dolphin 3").unwrap(),
            Some(Command::InsertHead {
                value: "dolphin".into(),
                count: 3
            })
        );
        assert_eq!(
            Command::parse("it gerbil").unwrap(),
            Some(Command::InsertTail {
                value: "gerbil".into(),
                count: 1
            })
        );
        assert_eq!(
            Command::parse("size 2").unwrap(),
            Some(Command::Size { expected: Some(2) })
        );
        assert!(Command::parse("ih").is_err());
        assert!(Command::parse("size many").is_err());
        assert!(Command::parse("sort now").is_err());
        assert!(Command::parse("pop").is_err());
    }

    #[test]
    fn scripted_session() {
        let mut harness = Harness::new(16).unwrap();
        let reports = run_script(
            &mut harness,
            "new
             it banana
             ih apple
             it cherry
             size 3
             sort
             reverse
             rh cherry
             free
             size 0",
        );

        assert_eq!(reports[0], "q = []");
        assert_eq!(reports[3], r#"q = ["apple", "banana", "cherry"]"#);
        assert_eq!(reports[6], r#"q = ["cherry", "banana", "apple"]"#);
        assert_eq!(reports[7], r#"removed "cherry", q = ["banana", "apple"]"#);
        assert_eq!(reports[8], "q = none");
    }

    #[test]
    fn failures_are_reported() {
        let mut harness = Harness::new(4).unwrap();

        let err = harness.run(&Command::parse("ih x").unwrap().unwrap()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::InvalidArgument("queue"))
        );

        run_script(&mut harness, "new\nit longer");
        // truncated to fit the four byte buffer
        let err = harness
            .run(&Command::RemoveHead {
                expected: Some("longer".into()),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "removed `lon`, expected `longer`");

        let err = harness.run(&Command::RemoveHead { expected: None }).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Empty));

        assert!(Harness::new(0).is_err());
    }

    const FLAKY_SCRIPT: &str = "new
        it apple
        rh pear
        it banana
        pop
        size 0
        show";

    #[test]
    fn execute_counts_failures() {
        let mut harness = Harness::new(16).unwrap();
        let mut out = Vec::new();

        let failures = execute(FLAKY_SCRIPT.as_bytes(), &mut harness, &mut out, false, false);
        assert_eq!(failures.unwrap(), 3);

        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out.lines().collect::<Vec<_>>(),
            vec!["q = []", r#"q = ["apple"]"#, r#"q = ["banana"]"#, r#"q = ["banana"]"#]
        );
    }

    #[test]
    fn execute_strict_stops_at_first_failure() {
        let mut harness = Harness::new(16).unwrap();
        let mut out = Vec::new();

        let err = execute(FLAKY_SCRIPT.as_bytes(), &mut harness, &mut out, true, false).unwrap_err();
        assert_eq!(err.to_string(), "stopped at line 3");

        // `rh pear` already removed `apple`, nothing after it ran
        assert_eq!(String::from_utf8(out).unwrap(), "q = []\nq = [\"apple\"]\n");
        assert_eq!(handle::size(harness.queue.as_deref()), 0);
    }

    #[test]
    fn removed_values_keep_interior_nul() {
        let mut harness = Harness::new(16).unwrap();
        run_script(&mut harness, "new");
        harness
            .run(&Command::InsertTail {
                value: "nul\0byte".into(),
                count: 1,
            })
            .unwrap();

        let report = harness
            .run(&Command::RemoveHead {
                expected: Some("nul\0byte".into()),
            })
            .unwrap();
        assert_eq!(report, r#"removed "nul\0byte", q = []"#);
    }
}
