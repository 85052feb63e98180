use scraper::{ElementRef, Html, Selector};

use crate::astronaut::{AstronautProfile, OccupationOrRank};
use crate::error::{Result, WhosInSpaceError};

const BIRTHDATE_UNKNOWN: &str = "Birthdate Unknown";
/// Length of the label in front of the birth date, e.g. "b. ".
const BIRTHDAY_LABEL_LEN: usize = 3;
/// Length of the link label that closes every excerpt.
const EXCERPT_SUFFIX_LEN: usize = 7;

const GENDER_CAPTION: &str = "Gender";
const MISSIONS_CAPTION: &str = "MISSIONS";
const TIME_IN_SPACE_CAPTION: &str = "TIME IN SPACE";

/// CSS queries for the fixed structure of a Supercluster astronaut page.
#[derive(Debug, Clone)]
pub(super) struct Selectors {
    profile_image_block: Selector,
    image_fill: Selector,
    img: Selector,
    name_block: Selector,
    birthday: Selector,
    flag_block: Selector,
    info_column: Selector,
    caption: Selector,
    anchor: Selector,
    occupation_block: Selector,
    headline: Selector,
    stat_block: Selector,
    stat_caption: Selector,
    big_stat: Selector,
    stat_value: Selector,
    excerpt_block: Selector,
}

impl Selectors {
    pub(super) fn new() -> Result<Self> {
        Ok(Self {
            profile_image_block: parse_selector("div.astronaut_page__image.bcb.f1.rel")?,
            image_fill: parse_selector("div.fill.image__block.abs.x.y.top.left")?,
            img: parse_selector("img")?,
            name_block: parse_selector("div.astronaut_page__name_desktop.fa.mt025.mr05")?,
            birthday: parse_selector("div.x.h4.mt075")?,
            flag_block: parse_selector("div.astronaut_page__flags_tablet.abs.right.pr2.pt05.f.fc")?,
            info_column: parse_selector("div.f.fc.f1")?,
            caption: parse_selector("div.mt1.akkura.small.caps")?,
            anchor: parse_selector("a")?,
            occupation_block: parse_selector("div.f.fc.f2")?,
            headline: parse_selector("div.h4")?,
            stat_block: parse_selector("div.f.fc.f1.jcc")?,
            stat_caption: parse_selector("div.akkura.small.caps:not(.mt1)")?,
            big_stat: parse_selector("div.astronaut_page__big_stats")?,
            stat_value: parse_selector("span.pr015:not(.pl025)")?,
            excerpt_block: parse_selector("div.px1.py2.container--xl.mxa")?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| WhosInSpaceError::Config(format!("Bad selector '{css}': {e}")))
}

/// Runs the eight field extractions concurrently over one parsed page and
/// assembles the profile once all of them have settled.
///
/// The extractions are concurrent, not parallel: `Html` is not `Sync`, and
/// none of them suspends, so all eight complete within a single poll on the
/// calling task.
///
/// The first failed field (in field order) fails the whole profile.
pub(super) async fn extract_profile(
    document: &Html,
    selectors: &Selectors,
    name: &str,
    craft: &str,
) -> Result<AstronautProfile> {
    let (
        profile_image_url,
        birthday,
        flag_image_url,
        gender,
        occupation_or_rank,
        number_of_missions,
        days_in_space,
        profile_excerpt,
    ) = futures::join!(
        async { profile_image_url(document, selectors) },
        async { birthday(document, selectors) },
        async { flag_image_url(document, selectors) },
        async { gender(document, selectors) },
        async { occupation_or_rank(document, selectors) },
        async { number_of_missions(document, selectors) },
        async { days_in_space(document, selectors) },
        async { profile_excerpt(document, selectors) },
    );

    Ok(AstronautProfile {
        name: name.to_string(),
        craft: craft.to_string(),
        profile_image_url: profile_image_url?,
        birthday: birthday?,
        flag_image_url: flag_image_url?,
        gender: gender?,
        occupation_or_rank: occupation_or_rank?,
        number_of_missions: number_of_missions?,
        days_in_space: days_in_space?,
        profile_excerpt: profile_excerpt?,
    })
}

fn profile_image_url(document: &Html, s: &Selectors) -> Result<String> {
    let block = document
        .select(&s.profile_image_block)
        .next()
        .ok_or_else(|| missing("profile image", "image block"))?;

    block
        .select(&s.image_fill)
        .flat_map(|fill| fill.select(&s.img))
        .find_map(|img| img.value().attr("src"))
        .map(ToString::to_string)
        .ok_or_else(|| missing("profile image", "img[src]"))
}

fn birthday(document: &Html, s: &Selectors) -> Result<Option<String>> {
    let name_block = document
        .select(&s.name_block)
        .next()
        .ok_or_else(|| missing("birthday", "name block"))?;

    let mut dates = name_block.select(&s.birthday).peekable();
    if dates.peek().is_none() {
        return Err(missing("birthday", "birth date"));
    }

    parse_birthday(&joined_text(dates))
}

/// "Birthdate Unknown" means no birthday; anything else is a fixed-width
/// label followed by the date.
pub(super) fn parse_birthday(text: &str) -> Result<Option<String>> {
    if text == BIRTHDATE_UNKNOWN {
        return Ok(None);
    }
    if text.chars().count() <= BIRTHDAY_LABEL_LEN {
        return Err(WhosInSpaceError::parse(
            "birthday",
            format!("'{text}' is too short to hold a date"),
        ));
    }

    let date: String = text.chars().skip(BIRTHDAY_LABEL_LEN).collect();
    Ok(Some(date.trim().to_string()))
}

fn flag_image_url(document: &Html, s: &Selectors) -> Result<String> {
    document
        .select(&s.flag_block)
        .flat_map(|block| block.select(&s.image_fill))
        .flat_map(|fill| fill.select(&s.img))
        .find_map(|img| img.value().attr("src"))
        .map(ToString::to_string)
        .ok_or_else(|| missing("flag image", "img[src]"))
}

fn gender(document: &Html, s: &Selectors) -> Result<String> {
    document
        .select(&s.info_column)
        .find(|column| joined_text(column.select(&s.caption)) == GENDER_CAPTION)
        .map(|column| joined_text(column.select(&s.anchor)))
        .ok_or_else(|| missing("gender", "Gender column"))
}

fn occupation_or_rank(document: &Html, s: &Selectors) -> Result<OccupationOrRank> {
    let block = document
        .select(&s.occupation_block)
        .next()
        .ok_or_else(|| missing("occupation", "info block"))?;

    Ok(OccupationOrRank {
        type_: joined_text(block.select(&s.caption)),
        title: joined_text(block.select(&s.headline)),
    })
}

fn number_of_missions(document: &Html, s: &Selectors) -> Result<u32> {
    let block = document
        .select(&s.stat_block)
        .find(|block| joined_text(block.select(&s.stat_caption)) == MISSIONS_CAPTION)
        .ok_or_else(|| missing("missions", "MISSIONS stat"))?;

    parse_count("missions", &joined_text(block.select(&s.big_stat)))
}

fn days_in_space(document: &Html, s: &Selectors) -> Result<u32> {
    let block = document
        .select(&s.stat_block)
        .find(|block| joined_text(block.select(&s.caption)) == TIME_IN_SPACE_CAPTION)
        .ok_or_else(|| missing("days in space", "TIME IN SPACE stat"))?;

    parse_count("days in space", &joined_text(block.select(&s.stat_value)))
}

fn profile_excerpt(document: &Html, s: &Selectors) -> Result<String> {
    let block = document
        .select(&s.excerpt_block)
        .next()
        .ok_or_else(|| missing("excerpt", "excerpt block"))?;

    strip_excerpt_suffix(&joined_text(block.select(&s.headline)))
}

pub(super) fn strip_excerpt_suffix(text: &str) -> Result<String> {
    let len = text.chars().count();
    if len < EXCERPT_SUFFIX_LEN {
        return Err(WhosInSpaceError::parse(
            "excerpt",
            format!("'{text}' is shorter than its trailing link"),
        ));
    }

    let body: String = text.chars().take(len - EXCERPT_SUFFIX_LEN).collect();
    Ok(body.trim_end().to_string())
}

/// Parses a non-negative count. Malformed text is an error, never zero.
pub(super) fn parse_count(field: &'static str, text: &str) -> Result<u32> {
    text.parse()
        .map_err(|e| WhosInSpaceError::parse(field, format!("'{text}' is not a count: {e}")))
}

/// Text of all matched elements, whitespace-collapsed and space-joined.
fn joined_text<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> String {
    elements
        .flat_map(|element| element.text())
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn missing(field: &'static str, what: &str) -> WhosInSpaceError {
    WhosInSpaceError::parse(field, format!("{what} not found"))
}
