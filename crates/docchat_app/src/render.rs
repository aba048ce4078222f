use std::io::{self, Write};

use docchat_core::{AppViewModel, IngestionView, Notification, Severity, Turn, UploadStatus};

use crate::input::HELP_TEXT;

const WELCOME: &str = "Welcome to chat with your document!";

/// Writes view-model snapshots to a terminal, printing only what changed.
pub struct Renderer<W: Write> {
    out: W,
    shown_turns: usize,
    last_ingestion: Option<IngestionView>,
    last_pending: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown_turns: 0,
            last_ingestion: None,
            last_pending: false,
        }
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn render(&mut self, view: &AppViewModel) -> io::Result<()> {
        if self.last_ingestion.as_ref() != Some(&view.ingestion) {
            writeln!(self.out, "{}", ingestion_line(&view.ingestion))?;
            self.last_ingestion = Some(view.ingestion.clone());
        }

        let conversation = &view.conversation;
        for turn in conversation.turns.iter().skip(self.shown_turns) {
            write_turn(&mut self.out, turn)?;
        }
        self.shown_turns = self.shown_turns.max(conversation.turns.len());

        if conversation.pending && !self.last_pending {
            if let Some(question) = &conversation.pending_question {
                writeln!(self.out, "you> {question}")?;
            }
            writeln!(self.out, "... sending")?;
        }
        self.last_pending = conversation.pending;
        self.out.flush()
    }

    /// Prints the whole session regardless of what was shown before.
    pub fn render_full(&mut self, view: &AppViewModel) -> io::Result<()> {
        writeln!(self.out, "{}", ingestion_line(&view.ingestion))?;
        let conversation = &view.conversation;
        if conversation.turns.is_empty() {
            writeln!(self.out, "{WELCOME}")?;
        }
        for turn in &conversation.turns {
            write_turn(&mut self.out, turn)?;
        }
        if conversation.pending {
            writeln!(self.out, "... waiting for an answer")?;
        } else if !conversation.draft.is_empty() {
            writeln!(self.out, "draft: {}", conversation.draft)?;
        }

        self.last_ingestion = Some(view.ingestion.clone());
        self.shown_turns = conversation.turns.len();
        self.last_pending = conversation.pending;
        self.out.flush()
    }

    pub fn alert(&mut self, notification: &Notification) -> io::Result<()> {
        let marker = match notification.severity {
            Severity::Info => "[i]",
            Severity::Error => "[!]",
        };
        writeln!(self.out, "{marker} {}", notification.text)?;
        self.out.flush()
    }

    pub fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn help(&mut self) -> io::Result<()> {
        self.message(HELP_TEXT)
    }
}

fn write_turn(out: &mut impl Write, turn: &Turn) -> io::Result<()> {
    writeln!(out, "you> {}", turn.request)?;
    writeln!(out, "bot> {}", turn.response)
}

fn ingestion_line(view: &IngestionView) -> String {
    let selected = match &view.selected_file {
        Some(file) => format!("{} ({} bytes)", file.name, file.byte_len),
        None => "no file selected".to_string(),
    };
    let status = match view.status {
        UploadStatus::Idle => "not uploaded",
        UploadStatus::Uploading => "uploading...",
        UploadStatus::Succeeded => "uploaded",
        UploadStatus::Failed => "upload failed",
    };
    match &view.ingested {
        Some(doc) => match &doc.fingerprint {
            Some(fingerprint) => format!(
                "document: {selected} [{status}] | ready: {} (sha256 {})",
                doc.file_name,
                fingerprint.chars().take(12).collect::<String>()
            ),
            None => format!("document: {selected} [{status}] | ready: {}", doc.file_name),
        },
        None => format!("document: {selected} [{status}]"),
    }
}
