use log::{ debug, error };
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io;
use thiserror::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt };

use super::client::ProxyClient;
use super::render::Renderer;
use super::session::{ ChatSession, SubmitError, SUGGESTED_PROMPTS };

const PROMPT: &str = ">>> ";

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Line editor error: {0}")]
    Readline(#[from] ReadlineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented chat front end: each line typed is sent to the proxy,
/// `/N` stages a suggested prompt, an empty line sends whatever is staged.
/// A leading `//` sends the line with one slash removed.
pub struct ChatRepl<R: Renderer> {
    session: ChatSession,
    client: ProxyClient,
    renderer: R,
}

impl<R: Renderer> ChatRepl<R> {
    pub fn new(client: ProxyClient, renderer: R) -> Self {
        Self {
            session: ChatSession::new(),
            client,
            renderer,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Terminal session with line editing and in-memory history. A staged
    /// suggestion is pre-filled on the next prompt so it can be edited
    /// before Enter sends it. Needs the multi-threaded runtime.
    pub async fn run_interactive(&mut self) -> Result<(), ReplError> {
        let mut editor = DefaultEditor::new()?;
        self.print_welcome()?;

        loop {
            let draft = self.session.input().to_string();
            let readline = tokio::task::block_in_place(|| {
                editor.readline_with_initial(PROMPT, (draft.as_str(), ""))
            });

            if let Ok(line) = &readline {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
            }
            if self.handle_readline(readline).await? == Flow::Quit {
                break;
            }
        }

        self.renderer.render_hint("Slán go fóill!")?;
        Ok(())
    }

    /// Applies one result from the line editor. The editor showed the staged
    /// draft already, so whatever came back replaces it; ctrl-c drops it.
    pub async fn handle_readline(
        &mut self,
        readline: Result<String, ReadlineError>
    ) -> Result<Flow, ReplError> {
        match readline {
            Ok(line) => {
                self.session.set_input("");
                Ok(self.handle_line(&line).await?)
            }
            Err(ReadlineError::Interrupted) => {
                self.session.set_input("");
                self.renderer.render_hint("^C")?;
                Ok(Flow::Continue)
            }
            Err(ReadlineError::Eof) => Ok(Flow::Quit),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads commands and questions from any line source until EOF or `/quit`.
    pub async fn run_script<I>(&mut self, input: I) -> io::Result<()>
        where I: AsyncBufRead + Unpin
    {
        self.print_welcome()?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if self.handle_line(&line).await? == Flow::Quit {
                break;
            }
        }

        self.renderer.render_hint("Slán go fóill!")
    }

    pub async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let trimmed = line.trim();

        if trimmed.starts_with("//") {
            self.session.set_input(line.replacen("//", "/", 1));
            self.submit().await?;
            return Ok(Flow::Continue);
        }

        if let Some(command) = trimmed.strip_prefix('/') {
            match command {
                "quit" | "exit" => return Ok(Flow::Quit),
                "help" => self.print_help()?,
                "suggest" => self.print_suggestions()?,
                other => match other.parse::<usize>() {
                    Ok(n) => self.stage_suggestion(n)?,
                    Err(_) => self.renderer.render_hint(&format!("Unknown command '/{}'. Try /help.", other))?,
                },
            }
            return Ok(Flow::Continue);
        }

        if !trimmed.is_empty() {
            self.session.set_input(line);
        }
        self.submit().await?;
        Ok(Flow::Continue)
    }

    fn stage_suggestion(&mut self, number: usize) -> io::Result<()> {
        match number.checked_sub(1).and_then(|i| self.session.apply_suggestion(i)) {
            Some(prompt) => self.renderer.render_hint(
                &format!("Draft: {} (press Enter to send, or type something else)", prompt)
            ),
            None => self.renderer.render_hint(&format!("There is no suggestion {}.", number)),
        }
    }

    async fn submit(&mut self) -> io::Result<()> {
        let pending = match self.session.submit() {
            Ok(pending) => pending,
            Err(SubmitError::EmptyInput) => return Ok(()),
            Err(e) => return self.renderer.render_hint(&e.to_string()),
        };

        let entries = self.session.entries();
        for entry in &entries[entries.len().saturating_sub(2)..] {
            self.renderer.render_entry(entry)?;
        }

        debug!("Sending {} messages to {}", pending.messages.len(), self.client.endpoint());
        let result = self.client.send(&pending.messages).await;
        if let Err(e) = &result {
            error!("Error sending message: {}", e);
        }

        if let Some(index) = self.session.complete(pending.token, result) {
            self.renderer.render_entry(&self.session.entries()[index])?;
        }
        Ok(())
    }

    fn print_welcome(&mut self) -> io::Result<()> {
        self.renderer.render_hint("Tour Guide Chat  (/help for commands)\n")?;
        for entry in self.session.entries() {
            self.renderer.render_entry(entry)?;
        }
        self.print_suggestions()
    }

    fn print_suggestions(&mut self) -> io::Result<()> {
        for (i, prompt) in SUGGESTED_PROMPTS.iter().enumerate() {
            self.renderer.render_hint(&format!("  /{}  {}", i + 1, prompt))?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> io::Result<()> {
        self.renderer.render_hint(
            "Type a question and press Enter.\n  /1../3   stage a suggested question\n  /suggest list suggestions\n  //text   send a line that starts with '/'\n  /quit    leave"
        )
    }
}
