//! Line-oriented editing of the form before it is submitted.

use std::io::Write;

use anyhow::Context;
use listing_client::AddItemPage;
use listing_client::ListingTransport;
use listing_client::Navigator;
use listing_client::PreviewStore;
use listing_client::SubmitOutcome;
use listing_client::SubmitStatus;
use listing_client::load_image_attachment;
use listing_protocol::ListingField;
use listing_protocol::catalog;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use crate::render::render_error;
use crate::render::render_form;

const HELP: &str = "\
Commands:
  set <field> <value>   set a field (title, description, size, category, gender, age-category, tags)
  add <path>...         attach one or more images
  remove <n>            remove the n-th image
  list                  show the form
  submit                send the listing
  quit                  leave without submitting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: ListingField, value: String },
    Add(Vec<String>),
    /// Zero-based position; the prompt counts from one.
    Remove(usize),
    List,
    Submit,
    Help,
    Quit,
}

/// How an interactive session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Submitted,
    Quit,
}

pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let Some(words) = shlex::split(line) else {
        anyhow::bail!("unbalanced quotes");
    };
    let Some((verb, args)) = words.split_first() else {
        anyhow::bail!("empty command; type `help`");
    };

    match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let Some((field, rest)) = args.split_first() else {
                anyhow::bail!("usage: set <field> <value>");
            };
            let field = field.parse::<ListingField>()?;
            let value = rest.join(" ");
            if let Some(choices) = catalog::choices(field)
                && !value.is_empty()
                && !choices.contains(&value.as_str())
            {
                anyhow::bail!("{} must be one of: {}", field.wire_name(), choices.join(", "));
            }
            Ok(Command::Set { field, value })
        }
        "add" => {
            if args.is_empty() {
                anyhow::bail!("usage: add <path>...");
            }
            Ok(Command::Add(args.to_vec()))
        }
        "remove" | "rm" => {
            let [position] = args else {
                anyhow::bail!("usage: remove <n>");
            };
            let position: usize = position
                .parse()
                .with_context(|| format!("`{position}` is not a position"))?;
            let Some(index) = position.checked_sub(1) else {
                anyhow::bail!("positions start at 1");
            };
            Ok(Command::Remove(index))
        }
        "list" | "ls" => Ok(Command::List),
        "submit" => Ok(Command::Submit),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => anyhow::bail!("unknown command `{other}`; type `help`"),
    }
}

/// Read commands from stdin until the listing is created or the user quits.
pub async fn run<S, T, N>(
    page: &mut AddItemPage<S>,
    transport: &T,
    navigator: &mut N,
) -> anyhow::Result<SessionEnd>
where
    S: PreviewStore,
    T: ListingTransport,
    N: Navigator,
{
    let input = BufReader::new(tokio::io::stdin());
    drive(page, transport, navigator, input, &mut std::io::stdout()).await
}

/// Run the prompt over `input`, writing everything shown to the user to `out`.
///
/// End of input counts as quitting.
async fn drive<S, T, N, R, W>(
    page: &mut AddItemPage<S>,
    transport: &T,
    navigator: &mut N,
    input: R,
    out: &mut W,
) -> anyhow::Result<SessionEnd>
where
    S: PreviewStore,
    T: ListingTransport,
    N: Navigator,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{}", render_form(page))?;
    writeln!(out, "Type `help` for commands.")?;

    loop {
        write!(out, "> ")?;
        out.flush().context("flush prompt")?;

        let Some(line) = lines.next_line().await.context("read command")? else {
            return Ok(SessionEnd::Quit);
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(out, "{}", render_error(&err.to_string()))?;
                continue;
            }
        };

        match command {
            Command::Set { field, value } => page.set_field(field, value),
            Command::Add(paths) => {
                // One unreadable image drops the whole batch, like a failed file picker.
                let batch = match paths
                    .iter()
                    .map(String::as_str)
                    .map(load_image_attachment)
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(batch) => batch,
                    Err(err) => {
                        writeln!(out, "{}", render_error(&err.to_string()))?;
                        continue;
                    }
                };
                if let Err(err) = page.add_images(batch) {
                    writeln!(out, "{}", render_error(&err.to_string()))?;
                    continue;
                }
                writeln!(out, "{}", render_form(page))?;
            }
            Command::Remove(index) => match page.remove_image(index) {
                Ok(removed) => writeln!(out, "Removed {}.", removed.file_name())?,
                Err(err) => writeln!(out, "{}", render_error(&err.to_string()))?,
            },
            Command::List => writeln!(out, "{}", render_form(page))?,
            Command::Submit => {
                writeln!(out, "{}", SubmitStatus::Submitting.button_label())?;
                match page.submit(transport, navigator).await {
                    SubmitOutcome::NavigateToDashboard => return Ok(SessionEnd::Submitted),
                    SubmitOutcome::Rejected(_) | SubmitOutcome::Failed(_) => {
                        if let Some(message) = page.message() {
                            writeln!(out, "{}", render_error(message))?;
                        }
                    }
                    SubmitOutcome::Ignored => {}
                }
            }
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(SessionEnd::Quit),
        }
    }
}
