use crate::{
    catalog::{links::CatalogLinks, types::Chapter},
    domain::Reader,
    messaging::types::{RichField, RichFooter, RichMessage},
};

pub const READER_FIELD: &str = "Lecteur";
pub const SHARED_LABEL: &str = " - Lecture partagée";
pub const SIGNATURE: &str = "Par Little Garden";

/// Everything the display depends on.
#[derive(Clone, Copy, Debug)]
pub struct DisplayState<'a> {
    pub chapter: &'a Chapter,
    pub page: usize,
    pub shared: bool,
    pub owner: &'a Reader,
}

/// `{manga} {number} - {page+1}`
pub fn title(chapter: &Chapter, page: usize) -> String {
    format!(
        "{} {} - {}",
        chapter.manga.name,
        chapter.number_label(),
        page + 1
    )
}

pub fn reader_label(owner: &Reader, shared: bool) -> String {
    if shared {
        format!("{}{SHARED_LABEL}", owner.name)
    } else {
        owner.name.clone()
    }
}

/// Brand footer used on every card the bot sends.
pub fn signature(links: &CatalogLinks) -> RichFooter {
    RichFooter {
        text: SIGNATURE.to_string(),
        icon_url: Some(links.logo()),
    }
}

/// Build the reading card. Same inputs, same output.
pub fn render(state: &DisplayState<'_>, links: &CatalogLinks) -> RichMessage {
    let chapter = state.chapter;
    let page = state.page.min(chapter.last_page());

    let image_url = chapter.pages.get(page).map(|p| links.image(p.image()));
    let thumbnail_url = chapter
        .thumb
        .as_deref()
        .or(chapter.manga.thumb.as_deref())
        .map(|t| links.image(t));

    RichMessage {
        title: title(chapter, page),
        url: Some(links.chapter_page(&chapter.manga.slug, chapter.number, page + 1)),
        fields: vec![RichField {
            name: READER_FIELD.to_string(),
            value: reader_label(state.owner, state.shared),
        }],
        image_url,
        thumbnail_url,
        footer: Some(signature(links)),
    }
}
