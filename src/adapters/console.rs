//! Line-oriented replay session over any reader/writer pair.
//!
//! Each input line is one command; the session answers on the writer with
//! the account status after every state change.

use std::io::{BufRead, Write};

use chrono::NaiveDateTime;

use crate::domain::error::VtradeError;
use crate::domain::simulator::{Relocation, ReplaySimulator, StepOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Step(usize),
    Buy(Option<f64>),
    Sell(Option<f64>),
    Goto(i64),
    Interval(u32),
    Length(usize),
    Fee(f64),
    Print,
    Reset,
    Help,
    Quit,
}

const HELP: &str = "commands: step [n] | buy [qty] | sell [qty] | goto <YYYY-MM-DD HH:MM|unix> \
| interval <minutes> | length <bars> | fee <pct> | print | reset | help | quit";

fn parse_arg<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, String> {
    let raw = arg.ok_or_else(|| format!("missing {what}"))?;
    raw.parse::<T>().map_err(|_| format!("invalid {what}: {raw}"))
}

fn parse_opt_arg<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<Option<T>, String> {
    match arg {
        None => Ok(None),
        some => parse_arg(some, what).map(Some),
    }
}

fn parse_finite(arg: Option<&str>, what: &str) -> Result<Option<f64>, String> {
    match parse_opt_arg::<f64>(arg, what)? {
        Some(v) if !v.is_finite() => Err(format!("invalid {what}: {v}")),
        other => Ok(other),
    }
}

/// Accepts `YYYY-MM-DD HH:MM` (UTC) or a raw unix timestamp.
pub fn parse_timestamp(text: &str) -> Result<i64, String> {
    let text = text.trim();
    if let Ok(ts) = text.parse::<i64>() {
        return Ok(ts);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| format!("invalid date: {text}"))
}

pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, Some(r.trim()).filter(|r| !r.is_empty())),
        None => (line, None),
    };

    match word.to_lowercase().as_str() {
        "step" | "s" => Ok(SessionCommand::Step(
            parse_opt_arg(rest, "step count")?.unwrap_or(1),
        )),
        "buy" | "b" => Ok(SessionCommand::Buy(parse_finite(rest, "quantity")?)),
        "sell" => Ok(SessionCommand::Sell(parse_finite(rest, "quantity")?)),
        "goto" => {
            let text = rest.ok_or_else(|| "missing date".to_string())?;
            Ok(SessionCommand::Goto(parse_timestamp(text)?))
        }
        "interval" => Ok(SessionCommand::Interval(parse_arg(rest, "interval")?)),
        "length" => Ok(SessionCommand::Length(parse_arg(rest, "display length")?)),
        "fee" => {
            let pct = parse_finite(rest, "fee")?.ok_or_else(|| "missing fee".to_string())?;
            Ok(SessionCommand::Fee(pct))
        }
        "print" | "p" => Ok(SessionCommand::Print),
        "reset" => Ok(SessionCommand::Reset),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

fn write_status<W: Write>(sim: &ReplaySimulator, out: &mut W) -> std::io::Result<()> {
    let s = sim.state();
    writeln!(
        out,
        "Equity: {:.5} $ | Bought: {:.2} | Sold: {:.2}",
        s.equity, s.bought, s.sold
    )
}

fn write_report<W: Write>(sim: &ReplaySimulator, out: &mut W) -> std::io::Result<()> {
    let snap = sim.report();
    let when = snap
        .datetime
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    writeln!(out, "DateTime: {when}")?;
    writeln!(out, "Price: {} $", snap.price)?;
    writeln!(out, "My profit: {} %", snap.profit_pct)
}

fn describe(relocation: Relocation) -> String {
    match relocation {
        Relocation::Located(i) => format!("moved to bar {i}"),
        Relocation::LookupFallback => "timestamp not found, session restarted".to_string(),
    }
}

/// Apply one command. Returns `false` when the session should end.
pub fn apply<W: Write>(
    sim: &mut ReplaySimulator,
    command: SessionCommand,
    out: &mut W,
) -> Result<bool, VtradeError> {
    let quantity = sim.config().quantity;
    let fee_pct = sim.config().fee_pct;

    match command {
        SessionCommand::Step(n) => {
            for _ in 0..n {
                if sim.step()? == StepOutcome::Wrapped {
                    writeln!(out, "end of data, session restarted")?;
                    break;
                }
            }
            write_status(sim, out)?;
        }
        SessionCommand::Buy(qty) => {
            sim.buy(qty.unwrap_or(quantity), fee_pct);
            write_status(sim, out)?;
        }
        SessionCommand::Sell(qty) => {
            sim.sell(qty.unwrap_or(quantity), fee_pct);
            write_status(sim, out)?;
        }
        SessionCommand::Goto(ts) => {
            let relocation = sim.jump_to_timestamp(ts)?;
            writeln!(out, "{}", describe(relocation))?;
            write_report(sim, out)?;
        }
        SessionCommand::Interval(minutes) => {
            let length = sim.config().display_length;
            let relocation = sim.resample(minutes, length)?;
            writeln!(out, "interval {minutes}m: {}", describe(relocation))?;
            write_report(sim, out)?;
        }
        SessionCommand::Length(n) => {
            sim.set_display_length(n)?;
            writeln!(out, "display length {n}")?;
        }
        SessionCommand::Fee(pct) => {
            sim.set_fee_pct(pct)?;
            writeln!(out, "fee {pct} %")?;
        }
        SessionCommand::Print => write_report(sim, out)?,
        SessionCommand::Reset => {
            sim.initialize()?;
            write_report(sim, out)?;
        }
        SessionCommand::Help => writeln!(out, "{HELP}")?,
        SessionCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Drive a session until `quit` or end of input.
///
/// Bad commands and recoverable simulator errors are reported on `out` and
/// the session continues.
pub fn run_session<R: BufRead, W: Write>(
    sim: &mut ReplaySimulator,
    input: R,
    mut out: W,
) -> Result<(), VtradeError> {
    write_report(sim, &mut out)?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                writeln!(out, "error: {msg}")?;
                continue;
            }
        };
        match apply(sim, command, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(VtradeError::Io(e)) => return Err(VtradeError::Io(e)),
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }
    Ok(())
}
