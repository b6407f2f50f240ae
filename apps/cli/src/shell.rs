//! Interactive prompt loop.

use std::io::Write;

use color_eyre::eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use replidocs_core::{Command, CurationPipeline, Session};
use replidocs_shared::AppConfig;

use crate::commands::{build_pipeline, lookup, print_outcome};

/// One read from the shell's input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Line(String),
    /// A line that was not valid UTF-8.
    Garbled,
    End,
}

/// Line reader that survives bytes which are not UTF-8.
struct ShellInput<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> ShellInput<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    async fn next(&mut self) -> Result<Input> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(Input::End);
        }
        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }

        match String::from_utf8(std::mem::take(&mut self.buf)) {
            Ok(line) => Ok(Input::Line(line)),
            Err(e) => {
                warn!(bytes = e.as_bytes().len(), "discarding input that is not UTF-8");
                Ok(Input::Garbled)
            }
        }
    }
}

/// Run the shell until `exit` or end of input.
pub(crate) async fn run_shell(config: AppConfig) -> Result<()> {
    let pipeline = build_pipeline(&config)?;
    println!("{}", banner(&config.defaults.output_path));

    let mut input = ShellInput::new(BufReader::new(tokio::io::stdin()));

    let language = match config.defaults.language.clone() {
        Some(language) => language,
        None => match prompt_language(&mut input).await? {
            Some(language) => language,
            None => return Ok(()),
        },
    };
    println!();

    run_loop(&pipeline, Session::new(&language), &mut input).await?;
    Ok(())
}

/// Read and handle commands; returns the session as it was when the loop ended.
async fn run_loop<R: AsyncBufRead + Unpin>(
    pipeline: &CurationPipeline,
    mut session: Session,
    input: &mut ShellInput<R>,
) -> Result<Session> {
    loop {
        prompt(&format!("[{}] Search RepliDocs: ", session.language()))?;
        let line = match input.next().await? {
            Input::Line(line) => line,
            Input::Garbled => {
                println!("Input was not valid UTF-8. Please type it again.\n");
                continue;
            }
            Input::End => {
                println!();
                break;
            }
        };

        let command = Command::parse(&line);
        debug!(?command, "shell input");

        match &command {
            Command::Empty => continue,
            Command::Exit => {
                println!("Exiting the program. Goodbye!\n");
                break;
            }
            Command::Lang(Some(_)) => {
                session = session.apply(&command);
                println!("Programming language set to: {}\n", session.language());
            }
            Command::Lang(None) => println!("Usage: lang <name>\n"),
            Command::Buff(_) => println!("buff not yet implemented...\n"),
            Command::Clear => clear(pipeline),
            Command::Help => println!("{}", help_text(pipeline.artifact().max_chars())),
            Command::Ask(question) => {
                match lookup(pipeline, &session.query(question)).await {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(e) => println!("{e}"),
                }
                println!();
            }
        }
    }

    Ok(session)
}

/// Ask for the session language until a non-blank line arrives.
/// `None` on end of input.
async fn prompt_language<R: AsyncBufRead + Unpin>(
    input: &mut ShellInput<R>,
) -> Result<Option<String>> {
    loop {
        prompt("Set your programming language: ")?;
        match input.next().await? {
            Input::Line(line) if !line.trim().is_empty() => return Ok(Some(line)),
            Input::Line(_) | Input::Garbled => continue,
            Input::End => return Ok(None),
        }
    }
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

fn clear(pipeline: &CurationPipeline) {
    match pipeline.artifact().clear() {
        Ok(()) => println!(
            "Cleared '{}' to free AI context space.\n",
            pipeline.artifact().path().display()
        ),
        Err(e) => println!("{e}\n"),
    }
}

fn banner(output_path: &str) -> String {
    format!(
        "\n       _ _ _ _ _ _ _ _ _ _ _ _ _\n  \
         -=≡|| RepliDocs ||≡=-\n       \
         ¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯¯\n   \
         Type 'exit' to quit, 'help' for explanation.\n\n\
         Add '{output_path}' file to your IDE's AI context to start!\n"
    )
}

fn help_text(max_chars: usize) -> String {
    format!(
        "\nAvailable commands:\n\
         'lang <name>':  Change your programming language\n\
         'buff <int>':   Set the document count in the buffer (not yet implemented)\n\
         'clear':        Clear the documentation file to free AI context space\n\
         'exit':         Quit the program\n\
         'help':         Show this help message\n\
         Anything else is searched as a documentation question.\n\n\
         Note: the documentation file is limited to the last {max_chars} characters of \
         the page (21k by default, roughly 5,200 tokens) so it fits small AI context \
         windows. It holds only the most recent search result, so keep that in mind \
         when talking to the AI.\n"
    )
}
