//! Terminal rendering for the research CLI
//!
//! Plain mode (`--no-color`) swaps glyphs for bracketed tags. Errors go to
//! stderr; everything else goes to stdout.

use crate::research::AgentCapabilities;
use crate::types::FollowUpQuestions;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

const ART: [&str; 5] = [
    "    _    ____  _____ ____  ",
    "   / \\  |  _ \\| ____/ ___| ",
    "  / _ \\ | |_) |  _| \\___ \\ ",
    " / ___ \\|  _ <| |___ ___) |",
    "/_/   \\_\\_| \\_\\_____|____/ ",
];

/// The stages of a `run`, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clarify,
    Research,
    Save,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Clarify, Stage::Research, Stage::Save];

    /// 1-based position among [`Stage::ALL`].
    pub fn position(self) -> usize {
        self as usize + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Clarify => "Clarifying the research scope",
            Stage::Research => "Researching",
            Stage::Save => "Saving the report",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Ok,
    Note,
    Warn,
    Fail,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Ok => "[OK]",
            Level::Note => "[INFO]",
            Level::Warn => "[WARN]",
            Level::Fail => "[ERROR]",
        }
    }
}

pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        println!();
        for (i, line) in ART.iter().enumerate() {
            if !self.colored {
                println!("   {}", line.trim_end());
            } else if i < 2 {
                println!("   {}", line.bright_cyan().bold());
            } else {
                println!("   {}", line.blue().bold());
            }
        }
        let title = format!("Multi-Agent Deep Research v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n   {}\n", title.bright_white().bold());
        } else {
            println!("\n   {}\n", title);
        }
    }

    fn status(&self, level: Level, message: &str) {
        let line = if self.colored {
            match level {
                Level::Ok => format!("{} {}", "✓".green().bold(), message.green()),
                Level::Note => format!("{} {}", "•".blue(), message),
                Level::Warn => format!("{} {}", "⚠".yellow().bold(), message.yellow()),
                Level::Fail => format!("{} {}", "✗".red().bold(), message.red()),
            }
        } else {
            format!("{} {}", level.tag(), message)
        };
        match level {
            Level::Fail => eprintln!("  {}", line),
            _ => println!("  {}", line),
        }
    }

    pub fn success(&self, message: &str) {
        self.status(Level::Ok, message);
    }

    pub fn info(&self, message: &str) {
        self.status(Level::Note, message);
    }

    pub fn warning(&self, message: &str) {
        self.status(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.status(Level::Fail, message);
    }

    /// Announce a run stage, e.g. `[2/3] Researching 'fusion power'`.
    pub fn stage(&self, stage: Stage, subject: Option<&str>) {
        let counter = format!("[{}/{}]", stage.position(), Stage::ALL.len());
        let text = match subject {
            Some(subject) => format!("{} '{}'", stage.label(), subject),
            None => stage.label().to_string(),
        };
        if self.colored {
            println!("  {} {}", counter.dimmed(), text.bright_white());
        } else {
            println!("  {} {}", counter, text);
        }
    }

    pub fn section(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn group(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    pub fn field(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// A file this command wrote: a report, a podcast folder, a config file.
    pub fn wrote(&self, kind: &str, path: &str) {
        if self.colored {
            println!("  {} {} {}", "✓".green().bold(), kind.dimmed(), path.bright_white());
        } else {
            println!("  [CREATED] {} {}", kind, path);
        }
    }

    pub fn left_alone(&self, path: &str, reason: &str) {
        if self.colored {
            println!("  {} {} {}", "○".yellow(), path.dimmed(), format!("({})", reason).yellow());
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// One numbered instruction, optionally followed by the shell command to run.
    pub fn next_step(&self, number: usize, text: &str, command: Option<&str>) {
        self.info(&format!("{}. {}", number, text));
        if let Some(command) = command {
            let command = format!("$ {}", command);
            if self.colored {
                println!("     {}", command.bright_cyan());
            } else {
                println!("     {}", command);
            }
        }
    }

    pub fn done(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Show the clarifying questions, then read one answer per question.
    pub fn follow_ups<R: BufRead>(
        &self,
        follow_ups: &FollowUpQuestions,
        input: &mut R,
    ) -> io::Result<Vec<String>> {
        println!();
        self.indented(&follow_ups.message);
        println!();

        (1..=follow_ups.questions.len())
            .map(|i| self.read_answer(&format!("Answer {}", i), input))
            .collect()
    }

    /// Ask for a line on stdin. End of input yields an empty answer.
    pub fn ask(&self, question: &str) -> io::Result<String> {
        self.read_answer(question, &mut io::stdin().lock())
    }

    pub fn ask_yes_no(&self, question: &str) -> bool {
        let question = format!("{} [y/N]", question);
        match self.read_answer(&question, &mut io::stdin().lock()) {
            Ok(answer) => matches!(answer.to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn read_answer<R: BufRead>(&self, question: &str, input: &mut R) -> io::Result<String> {
        if self.colored {
            print!("  {} {}: ", "?".bright_yellow().bold(), question.bright_white());
        } else {
            print!("  [?] {}: ", question);
        }
        io::stdout().flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn report(&self, report: &str) {
        self.section("Research Report");
        println!();
        self.indented(report);
    }

    pub fn config_dump(&self, rendered: &str) {
        self.section("Full Configuration");
        println!();
        self.indented(rendered);
    }

    pub fn agent_table(&self, agents: &[AgentCapabilities]) {
        let mut lines = agent_rows(agents).into_iter();
        let Some(heading) = lines.next() else {
            return;
        };
        let rule = "-".repeat(heading.chars().count());
        if self.colored {
            println!("    {}", heading.bright_white().bold());
            println!("    {}", rule.dimmed());
        } else {
            println!("    {}", heading);
            println!("    {}", rule);
        }
        for line in lines {
            println!("    {}", line);
        }
    }

    fn indented(&self, text: &str) {
        for line in text.lines() {
            println!("    {}", line);
        }
    }
}

/// Heading plus one line per agent, with the id column sized to the longest id.
fn agent_rows(agents: &[AgentCapabilities]) -> Vec<String> {
    let width = agents
        .iter()
        .map(|a| a.agent_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Agent".len())
        + 2;

    std::iter::once(format!("{:<width$}{}", "Agent", "Capabilities"))
        .chain(
            agents
                .iter()
                .map(|a| format!("{:<width$}{}", a.agent_id, a.capabilities.join(", "))),
        )
        .collect()
}
