//! Telegram-HTML formatting for catalog listings and reading cards.

use crate::{
    catalog::{
        links::CatalogLinks,
        types::{Chapter, MangaRef},
    },
    messaging::types::RichMessage,
};

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn link(url: &str, label: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape_html(url), label)
}

/// Caption for a card rendered as a photo: linked bold title, fields, footer.
pub fn rich_caption_html(msg: &RichMessage) -> String {
    let title = format!("<b>{}</b>", escape_html(&msg.title));
    let mut lines = vec![match &msg.url {
        Some(url) => link(url, &title),
        None => title,
    }];

    for f in &msg.fields {
        lines.push(format!(
            "<b>{}</b>: {}",
            escape_html(&f.name),
            escape_html(&f.value)
        ));
    }

    if let Some(footer) = &msg.footer {
        lines.push(format!("<i>{}</i>", escape_html(&footer.text)));
    }

    lines.join("\n")
}

pub fn manga_list_html(mangas: &[MangaRef], links: &CatalogLinks) -> String {
    let mut lines = vec![link(&links.join(&["/"]), "<b>Les mangas disponibles</b>")];
    lines.push(String::new());
    for m in mangas {
        lines.push(format!(
            "• <b>{}</b> — <code>{}</code>",
            escape_html(&m.name),
            escape_html(&m.slug)
        ));
    }
    lines.push(String::new());
    lines.push(format!("<i>{}</i>", crate::reading::render::SIGNATURE));
    lines.join("\n")
}

/// Listing of the latest chapters. All entries belong to the same manga.
pub fn chapter_list_html(slug: &str, chapters: &[Chapter], links: &CatalogLinks) -> String {
    let name = chapters
        .first()
        .map(|c| c.manga.name.as_str())
        .unwrap_or(slug);
    let header = format!("<b>Les derniers chapitres de {}</b>", escape_html(name));

    let mut lines = vec![link(&links.join(&[slug]), &header), String::new()];
    for c in chapters {
        let mut line = format!("• {} <b>{}</b>", escape_html(&c.manga.name), c.number_label());
        if let Some(title) = c.name.as_deref().filter(|t| !t.trim().is_empty()) {
            line.push_str(&format!(" — {}", escape_html(title)));
        }
        lines.push(line);
    }
    lines.push(String::new());
    lines.push(format!("<i>{}</i>", crate::reading::render::SIGNATURE));
    lines.join("\n")
}

pub fn help_html() -> String {
    "📚 <b>Little Garden</b>\n\n\
<b>Commandes :</b>\n\
/mangas - Les mangas disponibles\n\
/chapitres &lt;manga&gt; [page] - Les derniers chapitres d'un manga\n\
/lire &lt;manga&gt; &lt;numéro&gt; [page] [partage] - Lire un chapitre\n\
/stop - Arrêter ta lecture\n\n\
<b>Pendant la lecture :</b>\n\
👈 👉 pour tourner les pages, ❌ pour arrêter,\n\
👨‍👨‍👦 pour partager la lecture, 🙍‍♂️ pour la rendre privée."
        .to_string()
}
