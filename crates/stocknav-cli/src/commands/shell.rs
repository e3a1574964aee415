//! Interactive session.
//!
//! One [`Session`] lives for the whole loop, so the Real-Time search state
//! and the selected date range carry over between commands.

use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use stocknav_core::views::{Session, ViewContext};
use stocknav_core::{DateRange, TradingDate};
use tracing::debug;

use super::{about, companies, compare, predict, realtime, CommandResult};
use crate::cli::{
    Cli, CompareArgs, CompareChartArg, OutputFormat, PredictArgs, RealtimeArgs, RealtimeChartArg,
};
use crate::error::CliError;
use crate::output;

const PROMPT: &str = "stocknav> ";

const HELP: &str = "\
Commands:
  /compare [--chart line|area|bar] <company>; <company>...
  /search [--chart candlestick|line] [company]   press Search and chart
  /realtime [--chart candlestick|line] [company] chart (after /search)
  /predict [company]
  /range <start> [end]                           dates as YYYY-MM-DD
  /companies
  /about
  /help
  /exit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Compare(Vec<String>, CompareChartArg),
    Realtime {
        company: Option<String>,
        search: bool,
        chart: RealtimeChartArg,
    },
    Predict(Option<String>),
    Range(TradingDate, Option<TradingDate>),
    Companies,
    About,
    Help,
    Exit,
}

impl ShellCommand {
    fn parse(line: &str) -> Result<Self, String> {
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(head, rest)| (head, rest.trim()));

        match head.to_ascii_lowercase().as_str() {
            "/compare" => {
                let (chart, rest) = take_chart(rest)?;
                let companies = rest
                    .split(';')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect();
                Ok(Self::Compare(companies, chart.unwrap_or(CompareChartArg::Line)))
            }
            "/realtime" | "/search" => {
                let (chart, rest) = take_chart(rest)?;
                Ok(Self::Realtime {
                    company: non_empty(rest),
                    search: head.eq_ignore_ascii_case("/search"),
                    chart: chart.unwrap_or(RealtimeChartArg::Candlestick),
                })
            }
            "/predict" => Ok(Self::Predict(non_empty(rest))),
            "/range" => {
                let mut dates = rest.split_whitespace();
                let start = dates
                    .next()
                    .ok_or_else(|| String::from("usage: /range <start> [end]"))
                    .and_then(parse_date)?;
                let end = dates.next().map(parse_date).transpose()?;
                Ok(Self::Range(start, end))
            }
            "/companies" => Ok(Self::Companies),
            "/about" => Ok(Self::About),
            "/help" | "/?" => Ok(Self::Help),
            "/exit" | "/quit" => Ok(Self::Exit),
            other => Err(format!("unknown command '{other}', type /help")),
        }
    }
}

fn take_chart<T: ValueEnum>(rest: &str) -> Result<(Option<T>, &str), String> {
    let Some(after) = rest
        .strip_prefix("--chart")
        .filter(|after| after.is_empty() || after.starts_with(char::is_whitespace))
    else {
        return Ok((None, rest));
    };
    let after = after.trim_start();
    let (value, remainder) = after
        .split_once(char::is_whitespace)
        .map_or((after, ""), |(value, remainder)| (value, remainder.trim()));
    let chart = T::from_str(value, true).map_err(|_| format!("unknown chart type '{value}'"))?;
    Ok((Some(chart), remainder))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn parse_date(value: &str) -> Result<TradingDate, String> {
    TradingDate::parse(value).map_err(|error| error.to_string())
}

pub struct Shell<'a> {
    ctx: &'a ViewContext,
    session: Session,
    last_company: Option<String>,
    format: OutputFormat,
    pretty: bool,
}

impl<'a> Shell<'a> {
    pub fn new(ctx: &'a ViewContext, session: Session, format: OutputFormat, pretty: bool) -> Self {
        Self {
            ctx,
            session,
            last_company: None,
            format,
            pretty,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reads commands until `/exit` or end of input.
    pub async fn run_loop<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        out: &mut W,
    ) -> Result<(), CliError> {
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => {
                    writeln!(out)?;
                    break;
                }
                Ok(_) => {}
                Err(error) if error.kind() == io::ErrorKind::InvalidData => {
                    writeln!(out, "error reading input: {error}")?;
                    continue;
                }
                Err(error) => return Err(error.into()),
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match ShellCommand::parse(line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "{message}")?;
                    continue;
                }
            };
            debug!(?command, "shell command");
            if command == ShellCommand::Exit {
                break;
            }
            if let Err(error) = self.execute(command, out).await {
                writeln!(out, "error: {error}")?;
            }
        }
        Ok(())
    }

    async fn execute<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<(), CliError> {
        let result = match command {
            ShellCommand::Compare(companies, chart) => {
                compare::run(&CompareArgs { companies, chart }, self.ctx, &self.session).await?
            }
            ShellCommand::Realtime {
                company,
                search,
                chart,
            } => {
                let company = company.or_else(|| self.last_company.clone());
                let args = RealtimeArgs {
                    company: company.clone(),
                    search,
                    chart,
                };
                let result = realtime::run(&args, self.ctx, &mut self.session).await?;
                if company.is_some() {
                    self.last_company = company;
                }
                result
            }
            ShellCommand::Predict(company) => {
                let company = company.or_else(|| self.last_company.clone());
                predict::run(&PredictArgs { company }, self.ctx, &self.session).await?
            }
            ShellCommand::Range(start, end) => {
                let end = end.unwrap_or_else(|| TradingDate::today().max(start));
                let range = DateRange::new(start, end)?;
                self.session.set_range(range);
                writeln!(out, "range set to {start} .. {end}")?;
                return Ok(());
            }
            ShellCommand::Companies => companies::run(self.ctx)?,
            ShellCommand::About => about::run(self.ctx)?,
            ShellCommand::Help => {
                writeln!(out, "{HELP}")?;
                return Ok(());
            }
            ShellCommand::Exit => return Ok(()),
        };
        self.render(result, out)
    }

    fn render<W: Write>(&self, result: CommandResult, out: &mut W) -> Result<(), CliError> {
        let envelope = result.into_envelope()?;
        output::render_to(out, &envelope, self.format, self.pretty)
    }
}

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = super::navigator_config(cli)?;
    let ctx = config.load_context()?;
    let session = Session::new(config.range(cli.start, cli.end)?);

    let mut shell = Shell::new(&ctx, session, cli.format, cli.pretty);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "StockNavigator shell. Type /help for commands.")?;
    shell.run_loop(stdin.lock(), &mut out).await
}
