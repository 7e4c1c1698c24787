//! One command per input line.

use catalog::{CategorySelector, FilterEdit};

pub const HELP: &str = "\
commands:
  category <id|all>   pick a category
  keyword [text]      set the keyword (rest of the line, may be empty)
  min <price>         lower price bound
  max <price>         upper price bound
  soldout <on|off>    include sold out items
  submit              search with the current filter
  categories          reload the category list
  filter              show the current filter
  help                show this text
  quit                leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(FilterEdit),
    Submit,
    Categories,
    Filter,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Ok(None);
    }

    let (name, rest) = match trimmed.split_once(' ') {
        Some((name, rest)) => (name, rest),
        None => (trimmed, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "category" | "c" => Command::Edit(FilterEdit::Category(CategorySelector::parse(rest)?)),
        // The keyword goes out verbatim, surrounding spaces included.
        "keyword" | "k" => Command::Edit(FilterEdit::Keyword(rest.to_string())),
        "min" => Command::Edit(FilterEdit::PriceMin(parse_price(rest)?)),
        "max" => Command::Edit(FilterEdit::PriceMax(parse_price(rest)?)),
        "soldout" => Command::Edit(FilterEdit::IncludeSoldOut(parse_switch(rest)?)),
        "submit" | "s" | "search" => Command::Submit,
        "categories" => Command::Categories,
        "filter" | "f" => Command::Filter,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(command))
}

fn parse_price(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("missing price".to_string());
    }
    raw.parse::<i64>().map_err(|_| format!("invalid price: {raw}"))
}

fn parse_switch(raw: &str) -> Result<bool, String> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got: {other}")),
    }
}
