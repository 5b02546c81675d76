//! Interactive editing session over a line-oriented input.
//!
//! The session is the presentation layer for the terminal: it mounts the
//! table (initial load), turns typed commands into edits, sorts and saves,
//! and prints the view plus any pending notices after each command. Load
//! and save failures are only logged by the controller; the session keeps
//! showing whatever state the controller holds.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::models::{ItemId, Price, PriceParseError};
use crate::sync::{SaveError, TableController};
use crate::view::{self, Column, SortBy, UnknownColumn};

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  show                      print the table
  set <id> <price>          change an item's price locally
  sort <column> [asc|desc]  sort by id, name, image, category, label, price or description
  save                      send all items to the server and reload
  reload                    discard local edits and reload from the server
  help                      show this help
  quit                      leave the session
";

/// One price edit, written `ID=PRICE` on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEdit {
    pub id: ItemId,
    pub price: Price,
}

impl FromStr for PriceEdit {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, price) = s
            .split_once('=')
            .ok_or(CommandError::Usage("ID=PRICE"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(CommandError::Usage("ID=PRICE"));
        }
        Ok(Self {
            id: ItemId::parse(id),
            price: price.parse()?,
        })
    }
}

impl fmt::Display for PriceEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command {0:?} (type `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Price(#[from] PriceParseError),

    #[error(transparent)]
    Column(#[from] UnknownColumn),
}

/// A parsed session command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Set(PriceEdit),
    Sort(SortBy),
    Save,
    Reload,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Show);
        };
        let args: Vec<&str> = words.collect();

        match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("show" | "ls", []) => Ok(Self::Show),
            ("set", [id, price]) => Ok(Self::Set(PriceEdit {
                id: ItemId::parse(id),
                price: price.parse()?,
            })),
            ("set", _) => Err(CommandError::Usage("set <id> <price>")),
            ("sort", [column]) => Ok(Self::Sort(SortBy::ascending(column.parse::<Column>()?))),
            ("sort", [column, order]) => {
                let column = column.parse::<Column>()?;
                match order.to_ascii_lowercase().as_str() {
                    "asc" => Ok(Self::Sort(SortBy::ascending(column))),
                    "desc" => Ok(Self::Sort(SortBy::descending(column))),
                    _ => Err(CommandError::Usage("sort <column> [asc|desc]")),
                }
            }
            ("sort", _) => Err(CommandError::Usage("sort <column> [asc|desc]")),
            ("save", []) => Ok(Self::Save),
            ("reload", []) => Ok(Self::Reload),
            ("help" | "?", _) => Ok(Self::Help),
            ("quit" | "exit" | "q", []) => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}

/// A terminal editing session bound to one controller.
pub struct Session<W> {
    controller: TableController,
    sort: SortBy,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(controller: TableController, sort: SortBy, out: W) -> Self {
        Self {
            controller,
            sort,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Mount the table, then run commands from `input` until `quit` or EOF.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> anyhow::Result<()> {
        // Failure is already logged; the view shows what state there is.
        let _ = self.controller.load().await;
        self.show()?;

        let mut lines = input.lines();
        loop {
            write!(self.out, "{}", PROMPT)?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await?,
                Err(e) => writeln!(self.out, "{}", e)?,
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Show => self.show()?,
            Command::Set(edit) => {
                let known = self.controller.items().iter().any(|item| item.id == edit.id);
                self.controller.set_price(&edit.id, edit.price);
                if !known {
                    writeln!(self.out, "No item with id {}", edit.id)?;
                }
            }
            Command::Sort(sort) => {
                self.sort = sort;
                self.show()?;
            }
            Command::Save => {
                if let Err(SaveError::Busy) = self.controller.save().await {
                    writeln!(self.out, "{}", SaveError::Busy)?;
                }
                self.show()?;
            }
            Command::Reload => {
                let _ = self.controller.load().await;
                self.show()?;
            }
            Command::Help => write!(self.out, "{}", HELP)?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn show(&mut self) -> std::io::Result<()> {
        let state = self.controller.snapshot();
        write!(self.out, "{}", view::render_view(&state, self.sort))?;
        for notice in self.controller.take_notices() {
            if !notice.is_expired() {
                writeln!(self.out, "{}", notice.message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ItemsClient;
    use crate::models::Item;
    use crate::sync::{Notice, TableState};
    use std::time::Duration;

    #[test]
    fn show_skips_expired_notices() {
        let mut state = TableState::with_items(vec![Item::new(1, 10)]);
        state.notices.push(Notice {
            auto_close: Duration::ZERO,
            ..Notice::success("stale")
        });
        state.notices.push(Notice::success("fresh"));
        let controller =
            TableController::with_state(ItemsClient::new("http://127.0.0.1:9", None), state);

        let mut session = Session::new(controller.clone(), SortBy::default(), Vec::new());
        session.show().unwrap();
        let out = String::from_utf8(session.into_output()).unwrap();

        assert!(out.contains("fresh"));
        assert!(!out.contains("stale"));
        assert!(controller.take_notices().is_empty());
    }

    #[test]
    fn parses_price_edit_pairs() {
        let edit: PriceEdit = "2=25".parse().unwrap();
        assert_eq!(edit.id, ItemId::from(2));
        assert_eq!(edit.price, Price::from(25));
        assert_eq!(edit.to_string(), "2=25");

        let edit: PriceEdit = "sku-1 = 9.5".parse().unwrap();
        assert_eq!(edit.id, ItemId::from("sku-1"));

        let edit: PriceEdit = "007=25".parse().unwrap();
        assert_eq!(edit.id, ItemId::from("007"));
        assert_eq!(edit.to_string(), "007=25");
    }

    #[test]
    fn rejects_malformed_price_edits() {
        assert_eq!(
            "2".parse::<PriceEdit>().unwrap_err(),
            CommandError::Usage("ID=PRICE")
        );
        assert_eq!(
            "=5".parse::<PriceEdit>().unwrap_err(),
            CommandError::Usage("ID=PRICE")
        );
        assert!(matches!(
            "2=cheap".parse::<PriceEdit>(),
            Err(CommandError::Price(_))
        ));
    }

    #[test]
    fn parses_commands() {
        assert_eq!("".parse::<Command>().unwrap(), Command::Show);
        assert_eq!("show".parse::<Command>().unwrap(), Command::Show);
        assert_eq!("SAVE".parse::<Command>().unwrap(), Command::Save);
        assert_eq!("reload".parse::<Command>().unwrap(), Command::Reload);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "set 3 12.75".parse::<Command>().unwrap(),
            Command::Set(PriceEdit {
                id: ItemId::from(3),
                price: "12.75".parse().unwrap(),
            })
        );
        assert_eq!(
            "sort name desc".parse::<Command>().unwrap(),
            Command::Sort(SortBy::descending(Column::Name))
        );
        assert_eq!(
            "sort id".parse::<Command>().unwrap(),
            Command::Sort(SortBy::ascending(Column::Id))
        );
    }

    #[test]
    fn reports_command_errors() {
        assert!(matches!(
            "set 3".parse::<Command>(),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            "set 3 lots".parse::<Command>(),
            Err(CommandError::Price(_))
        ));
        assert!(matches!(
            "sort cost".parse::<Command>(),
            Err(CommandError::Column(_))
        ));
        assert!(matches!(
            "sort price sideways".parse::<Command>(),
            Err(CommandError::Usage(_))
        ));
        assert_eq!(
            "dance".parse::<Command>().unwrap_err(),
            CommandError::Unknown("dance".to_string())
        );
    }
}
