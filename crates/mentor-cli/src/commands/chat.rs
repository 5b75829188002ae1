//! Interactive mentor chat REPL.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use mentor_application::{MessageDispatcher, SessionService, TurnOutcome};
use mentor_core::conversation::{AffordanceSet, QuickReply, QuizLetter, Sender};
use mentor_core::MentorError;
use mentor_interaction::WebhookAnswerService;

use super::open_stores;

/// CLI helper for rustyline that provides completion, highlighting, and
/// hints for the slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/quit".to_string(),
                "/override".to_string(),
                "/sessions".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

pub async fn run(session: Option<String>) -> Result<()> {
    let (store, state) = open_stores()?;
    let service = SessionService::new(store.clone(), state.clone());
    let answer_service = Arc::new(WebhookAnswerService::try_from_env()?);
    let dispatcher = MessageDispatcher::new(answer_service, store, state);

    let session = match session {
        Some(id) => service.switch_session(&id).await?,
        None => match service.restore_last_session().await? {
            Some(session) => session,
            None => {
                println!("No active session. Start one with `mentor sessions new <topic>`.");
                return Ok(());
            }
        },
    };
    let session_id = session.id.clone();

    println!("{}", "=== Mentor ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Session {} ({})", session_id, session.topic).bright_black()
    );
    println!(
        "{}",
        "Type '/override' to force-enable free text, '/quit' to exit.".bright_black()
    );
    println!();

    for message in &session.messages {
        print_message(&message.sender, &message.text);
    }

    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    let mut override_enabled = session.mode.manual_override_enabled;
    let mut opened = !session.messages.is_empty();

    loop {
        let affordances = dispatcher.affordances(&session_id).await?;
        let labels = affordances.set.labels();

        if !labels.is_empty() {
            for (index, label) in labels.iter().enumerate() {
                println!("{}", format!("  [{}] {}", index + 1, label).bright_black());
            }
        }

        let prompt = if affordances.text_input || !opened {
            ">> "
        } else {
            "?> "
        };

        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "/quit" {
            println!("{}", "Goodbye!".bright_green());
            break;
        }
        if trimmed == "/override" {
            override_enabled = !override_enabled;
            dispatcher
                .set_manual_override(Some(&session_id), override_enabled)
                .await?;
            let state = if override_enabled { "on" } else { "off" };
            println!("{}", format!("Manual override {}", state).yellow());
            continue;
        }
        if trimmed == "/sessions" {
            for session in service.list_sessions().await? {
                println!("  {}  {}", session.id.dimmed(), session.topic);
            }
            continue;
        }

        let _ = rl.add_history_entry(&line);

        // A number picks a button; a bare letter answers a quiz question.
        let picked = trimmed
            .parse::<usize>()
            .ok()
            .and_then(|n| labels.get(n.wrapping_sub(1)));
        let quiz_letter = if affordances.set == AffordanceSet::QuizLetters {
            QuizLetter::from_str(&trimmed.to_uppercase()).ok()
        } else {
            None
        };

        let result = if let Some(label) = picked {
            dispatch_label(&dispatcher, &session_id, affordances.set, label).await
        } else if let Some(letter) = quiz_letter {
            dispatcher.answer_quiz(Some(&session_id), letter).await
        } else if !opened {
            dispatcher.open_topic(Some(&session_id), trimmed).await
        } else {
            dispatcher.submit_text(Some(&session_id), trimmed).await
        };

        match result {
            Ok(outcome) => {
                opened = true;
                print_outcome(&outcome);
            }
            Err(MentorError::InputDisabled) => {
                println!(
                    "{}",
                    "Free text is disabled here; pick an option or use /override.".yellow()
                );
            }
            Err(e) => {
                println!("{}", format!("Error: {}", e).red());
            }
        }
    }

    Ok(())
}

async fn dispatch_label(
    dispatcher: &MessageDispatcher,
    session_id: &str,
    set: AffordanceSet,
    label: &str,
) -> mentor_core::Result<TurnOutcome> {
    if set == AffordanceSet::QuizLetters {
        let letter = QuizLetter::from_str(label)
            .map_err(|_| MentorError::internal(format!("Bad quiz label: {}", label)))?;
        dispatcher.answer_quiz(Some(session_id), letter).await
    } else {
        let reply = QuickReply::from_str(label)
            .map_err(|_| MentorError::internal(format!("Bad quick-reply label: {}", label)))?;
        dispatcher.choose(Some(session_id), reply).await
    }
}

fn print_outcome(outcome: &TurnOutcome) {
    for message in &outcome.appended {
        if message.sender == Sender::Assistant {
            print_message(&message.sender, &message.text);
        }
    }
    if let Some(error) = &outcome.service_error {
        println!("{}", format!("(transient) {}", error).yellow());
    }
    if outcome.reply_discarded && outcome.service_error.is_none() {
        println!("{}", "(mentor sent a structured payload; ignored)".bright_black());
    }
}

fn print_message(sender: &Sender, text: &str) {
    match sender {
        Sender::User => println!("{}", format!("> {}", text).green()),
        Sender::Assistant => {
            for line in text.lines() {
                println!("{}", line.bright_blue());
            }
        }
    }
}
