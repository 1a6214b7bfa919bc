//! Text commands: argument parsing and the catalog/reading actions behind them.

use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    catalog::port::CatalogPort,
    formatting::{chapter_list_html, escape_html, help_html, manga_list_html},
    messaging::types::Command,
    reading::{PageArg, ReaderContext, ReadingSession, StartReading},
    Result,
};

/// Words that mark a reading as shared when given instead of, or after, a page.
pub const SHARED_KEYWORDS: [&str; 4] = ["partage", "partagé", "p", "oui"];

/// Split `/cmd@botname arg1 ...` into a lowercase command name and the rest.
pub fn parse_command(text: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn is_shared_keyword(word: Option<&str>) -> bool {
    word.map(|w| SHARED_KEYWORDS.contains(&w.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Arguments of `/lire <manga> <numéro> [page|partage] [partage]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadArgs {
    pub slug: String,
    /// Chapter number as typed, for error replies.
    pub number_text: String,
    pub number: Option<f64>,
    /// Zero-based page.
    pub page: PageArg,
    pub shared: bool,
}

/// `None` when the manga or the chapter number is missing.
pub fn parse_read_args(args: &str) -> Option<ReadArgs> {
    let mut words = args.split_whitespace();
    let slug = words.next()?.to_string();
    let number_text = words.next()?.to_string();
    let page_word = words.next();
    let shared_word = words.next();

    let number = number_text
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite());

    // A sharing keyword in the page slot means "first page, shared".
    let keyword_as_page = is_shared_keyword(page_word);
    let page = match page_word {
        None => PageArg::Number(0),
        Some(_) if keyword_as_page => PageArg::Number(0),
        Some(w) => match w.parse::<i64>() {
            Ok(n) => PageArg::Number(n.saturating_sub(1)),
            Err(_) => PageArg::NotANumber,
        },
    };

    Some(ReadArgs {
        slug,
        number_text,
        number,
        page,
        shared: keyword_as_page || is_shared_keyword(shared_word),
    })
}

/// `/chapitres <manga> [page]`: slug and zero-based listing offset.
pub fn parse_chapters_args(args: &str) -> Option<(String, u32)> {
    let mut words = args.split_whitespace();
    let slug = words.next()?.to_string();
    let offset = words
        .next()
        .and_then(|w| w.parse::<u32>().ok())
        .map(|p| p.saturating_sub(1))
        .unwrap_or(0);
    Some((slug, offset))
}

/// Runs bot commands against the catalog and the reading engine.
pub struct CommandService {
    catalog: Arc<dyn CatalogPort>,
    reader: Arc<ReaderContext>,
    cleanup_delay: Duration,
}

impl CommandService {
    pub fn new(
        catalog: Arc<dyn CatalogPort>,
        reader: Arc<ReaderContext>,
        cleanup_delay: Duration,
    ) -> Self {
        Self {
            catalog,
            reader,
            cleanup_delay,
        }
    }

    /// Returns `false` for commands this service does not know.
    pub async fn handle(&self, cmd: &Command) -> Result<bool> {
        debug!(command = %cmd.name, user = %cmd.from.id, "command received");
        match cmd.name.as_str() {
            "start" | "help" => self.reply(cmd, &help_html()).await?,
            "mangas" => self.mangas(cmd).await?,
            "chapitres" => self.chapters(cmd).await?,
            "lire" => self.read(cmd).await?,
            "stop" => self.stop(cmd).await,
            _ => return Ok(false),
        }
        Ok(true)
    }

    async fn reply(&self, cmd: &Command, html: &str) -> Result<()> {
        self.reader.messenger.send_html(cmd.chat_id, html).await?;
        Ok(())
    }

    async fn mangas(&self, cmd: &Command) -> Result<()> {
        let mangas = self.catalog.list_mangas().await?;
        if mangas.is_empty() {
            return self.reply(cmd, "Aucuns mangas disponibles 😢").await;
        }
        self.reply(cmd, &manga_list_html(&mangas, &self.reader.links))
            .await
    }

    async fn chapters(&self, cmd: &Command) -> Result<()> {
        let Some((slug, offset)) = parse_chapters_args(&cmd.args) else {
            return self.reply(cmd, "Tu dois fournir un nom de manga").await;
        };

        let chapters = self.catalog.list_chapters(&slug, offset).await?;
        if chapters.is_empty() {
            let msg = format!(
                "Aucun chapitre disponible pour: <b>{}</b>",
                escape_html(&slug)
            );
            return self.reply(cmd, &msg).await;
        }
        self.reply(cmd, &chapter_list_html(&slug, &chapters, &self.reader.links))
            .await
    }

    async fn read(&self, cmd: &Command) -> Result<()> {
        let Some(args) = parse_read_args(&cmd.args) else {
            return self
                .reply(
                    cmd,
                    "Tu dois fournir un nom de manga et un numéro de chapitre",
                )
                .await;
        };

        let chapter = match args.number {
            Some(n) => self.catalog.get_chapter(&args.slug, n).await?,
            None => None,
        };
        let Some(chapter) = chapter.filter(|c| !c.pages.is_empty()) else {
            let msg = format!(
                "Le chapitre {} {} n'existe pas 😢",
                escape_html(&args.slug),
                escape_html(&args.number_text)
            );
            return self.reply(cmd, &msg).await;
        };

        self.schedule_cleanup(cmd);

        let started = ReadingSession::create(
            &self.reader,
            StartReading {
                owner: cmd.from.clone(),
                chat_id: cmd.chat_id,
                chapter: Arc::new(chapter),
                page: args.page,
                shared: args.shared,
            },
        )
        .await?;

        if started.is_none() {
            info!(user = %cmd.from.id, "reading request with an invalid page ended the session");
        }
        Ok(())
    }

    /// Silent, like a stop reaction.
    async fn stop(&self, cmd: &Command) {
        if let Some(session) = self.reader.registry.get_by_owner(cmd.from.id).await {
            session.stop().await;
        }
    }

    /// Delete the triggering command message after a while; off the critical path.
    fn schedule_cleanup(&self, cmd: &Command) {
        let messenger = self.reader.messenger.clone();
        let message = cmd.message;
        let delay = self.cleanup_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match messenger.delete_message(message).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => warn!("failed to delete command message: {e}"),
            }
        });
    }
}
