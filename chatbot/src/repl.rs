//! Line-oriented conversation loop.
//!
//! Each turn reads one line. The line is either a command (exit, edit an
//! intent, list intents, help) or chat text that goes through the matcher.
//! Unmatched text offers to teach a new intent. Leaving the loop, by command
//! or end of input, saves the store one last time.

use chatbot_core::{ChatSession, Durability, Reply, SessionError, StoreError};
use std::io::{self, BufRead, Write};

/// A recognised top-level command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Edit,
    List,
    Help,
    /// Anything else is conversation.
    Chat,
}

impl Command {
    /// Classify one input line. Spanish spellings are accepted for
    /// users coming from older data files.
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "exit" | "quit" | "salir" => Command::Exit,
            "edit intent" | "modificar intencion" | "modificar intención" => Command::Edit,
            "list" | "intents" => Command::List,
            "help" => Command::Help,
            _ => Command::Chat,
        }
    }
}

/// Which part of an intent an edit appends to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditField {
    Keyword,
    Response,
}

impl EditField {
    fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "keyword" | "k" | "palabra" => Some(EditField::Keyword),
            "response" | "r" | "respuesta" => Some(EditField::Response),
            _ => None,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "yes" | "y" | "sí" | "si" | "s"
    )
}

/// Whether the loop keeps going after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Drives a [`ChatSession`] from a line reader.
pub struct Controller<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Controller<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Run until an exit command or end of input, then save.
    pub fn run(&mut self, session: &mut ChatSession) -> io::Result<()> {
        self.banner()?;

        loop {
            let Some(line) = self.prompt("You: ")? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            let flow = match Command::parse(&line) {
                Command::Exit => {
                    self.say("Goodbye, see you soon!")?;
                    Flow::Exit
                }
                Command::Edit => self.edit(session)?,
                Command::List => {
                    self.list(session)?;
                    Flow::Continue
                }
                Command::Help => {
                    self.help()?;
                    Flow::Continue
                }
                Command::Chat => self.chat(session, &line)?,
            };

            if flow == Flow::Exit {
                break;
            }
        }

        let durability = session.save();
        self.report(&durability)
    }

    /// One conversational turn: answer, or offer to learn.
    fn chat(&mut self, session: &mut ChatSession, line: &str) -> io::Result<Flow> {
        match session.respond(line) {
            Reply::Matched { response, .. } => {
                self.say(&response)?;
                Ok(Flow::Continue)
            }
            Reply::NoResponse { intent } => {
                self.say(&format!(
                    "That sounds like '{intent}', but I haven't learned what to say to it yet."
                ))?;
                self.teach(session)
            }
            Reply::NotUnderstood => self.teach(session),
        }
    }

    /// The teaching sub-flow; ends in a `learn` call or a refusal.
    fn teach(&mut self, session: &mut ChatSession) -> io::Result<Flow> {
        self.say("I don't understand. Do you want to teach me a new intent?")?;
        let Some(answer) = self.prompt("You (yes/no): ")? else {
            return Ok(Flow::Exit);
        };
        if !is_yes(&answer) {
            self.say("All right, let me know if you want to create one.")?;
            return Ok(Flow::Continue);
        }

        let Some(name) = self.prompt_required("What is this intent called?: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(keyword) = self.prompt_required("Type a keyword that should trigger it: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(response) = self.prompt_required("Type a response I should give: ")? else {
            return Ok(Flow::Exit);
        };

        let durability = session.learn(&name, &keyword, &response);
        self.say("Thanks! Now I know how to respond to that intent.")?;
        self.report(&durability)?;
        Ok(Flow::Continue)
    }

    /// The editing sub-flow; ends in `add_keyword`, `add_response` or nothing.
    fn edit(&mut self, session: &mut ChatSession) -> io::Result<Flow> {
        self.say("These are the intents I know right now:")?;
        self.list(session)?;

        let Some(name) = self.prompt("Which one do you want to change?: ")? else {
            return Ok(Flow::Exit);
        };
        let name = name.to_lowercase();
        if !session.has(&name) {
            return self.unknown_intent(&name);
        }

        self.say("Do you want to add a keyword or a response? (keyword/response)")?;
        let Some(answer) = self.prompt("You: ")? else {
            return Ok(Flow::Exit);
        };

        let Some(field) = EditField::parse(&answer) else {
            self.say("Nothing changed.")?;
            return Ok(Flow::Continue);
        };

        let current = session
            .store()
            .get(&name)
            .map(|intent| match field {
                EditField::Keyword => intent.keywords().to_vec(),
                EditField::Response => intent.responses().to_vec(),
            })
            .unwrap_or_default();

        let (label, ask) = match field {
            EditField::Keyword => ("keywords", "Type the new keyword: "),
            EditField::Response => ("responses", "Type the new response: "),
        };
        self.say(&format!("The current {label} for '{name}' are: {current:?}"))?;

        let Some(value) = self.prompt_required(ask)? else {
            return Ok(Flow::Exit);
        };

        let result = match field {
            EditField::Keyword => session.add_keyword(&name, &value),
            EditField::Response => session.add_response(&name, &value),
        };

        match result {
            Ok(durability) => {
                let done = match field {
                    EditField::Keyword => format!(
                        "Done! '{}' will now also trigger '{name}'.",
                        value.to_lowercase()
                    ),
                    EditField::Response => format!("Great! Now I can also answer: '{value}'."),
                };
                self.say(&done)?;
                self.report(&durability)?;
                Ok(Flow::Continue)
            }
            Err(SessionError::Store(StoreError::UnknownIntent(name))) => self.unknown_intent(&name),
            Err(e) => {
                self.say(&format!("Something went wrong: {e}"))?;
                Ok(Flow::Continue)
            }
        }
    }

    fn unknown_intent(&mut self, name: &str) -> io::Result<Flow> {
        self.say(&format!("The intent '{name}' doesn't exist yet."))?;
        Ok(Flow::Continue)
    }

    fn list(&mut self, session: &ChatSession) -> io::Result<()> {
        for name in session.store().names() {
            writeln!(self.out, " - {name}")?;
        }
        Ok(())
    }

    fn banner(&mut self) -> io::Result<()> {
        self.say("Hi, I'm a chatbot that learns. Type 'exit' to finish.")?;
        self.say("You can also type 'edit intent' to add keywords or responses to an intent I know.")
    }

    fn help(&mut self) -> io::Result<()> {
        self.say("Commands:")?;
        writeln!(self.out, "  exit         - Save and leave")?;
        writeln!(self.out, "  edit intent  - Add a keyword or response to an intent")?;
        writeln!(self.out, "  list         - Show the intents I know")?;
        writeln!(self.out, "  help         - Show this help")?;
        writeln!(self.out, "  (anything else is conversation)")
    }

    /// Tell the user when something learned did not reach disk.
    fn report(&mut self, durability: &Durability) -> io::Result<()> {
        if let Some(e) = durability.error() {
            self.say(&format!(
                "Warning: I couldn't save what I learned ({e}). It will only last until I close."
            ))?;
        }
        Ok(())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "Bot: {text}")
    }

    /// Print `label` and read one trimmed line. `None` means end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Self::prompt`], but repeats until the answer is non-blank.
    fn prompt_required(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            match self.prompt(label)? {
                Some(answer) if answer.is_empty() => self.say("That can't be empty.")?,
                other => return Ok(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_core::{IntentStore, MatchMode, SessionConfig};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run_script(session: &mut ChatSession, script: &str) -> String {
        let mut out = Vec::new();
        Controller::new(Cursor::new(script.to_string()), &mut out)
            .run(session)
            .expect("loop should not fail on in-memory I/O");
        String::from_utf8(out).unwrap()
    }

    fn in_memory() -> ChatSession {
        ChatSession::in_memory(IntentStore::with_defaults(), MatchMode::Substring)
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("exit"), Command::Exit);
        assert_eq!(Command::parse("  Salir "), Command::Exit);
        assert_eq!(Command::parse("Edit Intent"), Command::Edit);
        assert_eq!(Command::parse("modificar intencion"), Command::Edit);
        assert_eq!(Command::parse("list"), Command::List);
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("hello there"), Command::Chat);
    }

    #[test]
    fn test_yes_answers() {
        for answer in ["yes", "Y", "sí", "si"] {
            assert!(is_yes(answer), "{answer}");
        }
        assert!(!is_yes("no"));
        assert!(!is_yes(""));
    }

    #[test]
    fn test_matched_turn_prints_response() {
        let mut session = in_memory();
        let out = run_script(&mut session, "hello there\nexit\n");

        let greeting = session.store().get("greeting").unwrap();
        assert!(greeting
            .responses()
            .iter()
            .any(|r| out.contains(&format!("Bot: {r}"))));
        assert!(out.contains("Goodbye, see you soon!"));
    }

    #[test]
    fn test_unmatched_turn_teaches_new_intent() {
        let mut session = in_memory();
        let script = "xyz\nyes\nThanks\nThank You\nYou're welcome!\nthank you so much\nexit\n";
        let out = run_script(&mut session, script);

        assert!(out.contains("I don't understand"));
        assert!(out.contains("Now I know how to respond"));
        assert!(out.contains("Bot: You're welcome!"));

        let thanks = session.store().get("thanks").unwrap();
        assert_eq!(thanks.keywords(), ["thank you"]);
        assert_eq!(thanks.responses(), ["You're welcome!"]);
    }

    #[test]
    fn test_declined_teaching_leaves_store_alone() {
        let mut session = in_memory();
        let before = session.store().clone();
        let out = run_script(&mut session, "xyz\nno\nexit\n");

        assert!(out.contains("let me know if you want to create one"));
        assert_eq!(session.store(), &before);
    }

    #[test]
    fn test_blank_answers_are_asked_again() {
        let mut session = in_memory();
        let out = run_script(&mut session, "xyz\nyes\n\nweather\n  \nrain\nBring an umbrella\nexit\n");

        assert_eq!(out.matches("That can't be empty.").count(), 2);
        assert_eq!(session.match_intent("rain again"), Some("weather"));
    }

    #[test]
    fn test_edit_adds_keyword() {
        let mut session = in_memory();
        let out = run_script(&mut session, "edit intent\nGreeting\nkeyword\nHowdy\nhowdy partner\nexit\n");

        assert!(out.contains(" - greeting\n - farewell\n"));
        assert!(out.contains("The current keywords for 'greeting' are: [\"hello\""));
        assert!(out.contains("'howdy' will now also trigger 'greeting'"));
        assert_eq!(session.match_intent("howdy"), Some("greeting"));
    }

    #[test]
    fn test_edit_adds_response() {
        let mut session = in_memory();
        run_script(&mut session, "modificar intencion\nfarewell\nrespuesta\nHasta Luego!\nexit\n");

        let farewell = session.store().get("farewell").unwrap();
        assert_eq!(farewell.responses().last().unwrap(), "Hasta Luego!");
    }

    #[test]
    fn test_edit_unknown_intent() {
        let mut session = in_memory();
        let before = session.store().clone();
        let out = run_script(&mut session, "edit intent\nnonexistent\nexit\n");

        assert!(out.contains("The intent 'nonexistent' doesn't exist yet."));
        assert_eq!(session.store(), &before);
    }

    #[test]
    fn test_edit_with_unknown_field_changes_nothing() {
        let mut session = in_memory();
        let before = session.store().clone();
        let out = run_script(&mut session, "edit intent\ngreeting\nboth\nexit\n");

        assert!(out.contains("Nothing changed."));
        assert_eq!(session.store(), &before);
    }

    #[test]
    fn test_intent_without_responses_offers_teaching() {
        let mut session = in_memory();
        session.create_intent("weather").unwrap();
        session.add_keyword("weather", "rain").unwrap();

        let out = run_script(&mut session, "rain?\nyes\nweather\nrain\nTake a coat.\nrain?\nexit\n");

        assert!(out.contains("That sounds like 'weather'"));
        assert!(out.contains("Bot: Take a coat."));
    }

    #[test]
    fn test_end_of_input_exits_and_saves() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("intents.json");
        let mut session = ChatSession::open(SessionConfig::new(&path)).unwrap();

        run_script(&mut session, "hello\n");

        assert!(path.exists());
    }

    #[test]
    fn test_end_of_input_mid_teaching() {
        let mut session = in_memory();
        let before = session.store().clone();
        run_script(&mut session, "xyz\nyes\nweather\n");

        assert_eq!(session.store(), &before);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("intents.json");
        let mut session = ChatSession::open(SessionConfig::new(&path)).unwrap();
        // A directory appearing at the path after open makes every save fail.
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        let out = run_script(&mut session, "xyz\nyes\nthanks\nthank you\nWelcome!\nthank you\nexit\n");

        assert!(out.contains("Warning: I couldn't save what I learned"));
        // The session keeps working in memory
        assert!(out.contains("Bot: Welcome!"));
    }

    #[test]
    fn test_list_and_help() {
        let mut session = in_memory();
        let out = run_script(&mut session, "list\nhelp\nexit\n");

        assert!(out.contains(" - greeting"));
        assert!(out.contains("edit intent  - Add a keyword or response"));
    }
}
