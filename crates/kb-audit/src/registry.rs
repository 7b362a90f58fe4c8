//! Built-in registries for the Nizhny Novgorod park corpus
//!
//! These are the values used when no checklist overrides them. They are
//! plain data handed to the checkers at construction time.

use crate::config::{ContentRules, FactPatternSpec};

/// Documents every park corpus must contain
pub fn required_documents() -> Vec<String> {
    [
        "kb/nn/prices.md",
        "kb/nn/discounts.md",
        "kb/nn/birthday.md",
        "kb/nn/graduation.md",
        "kb/nn/hours.md",
        "kb/nn/location.md",
        "kb/nn/rules.md",
        "kb/nn/vr.md",
        "kb/nn/phygital.md",
        "kb/nn/contacts.md",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Structural rules applied to every required document
pub fn content_rules() -> ContentRules {
    ContentRules {
        min_chars: 400,
        required_headings: ["## Суть", "## Факты", "## Нюансы", "## Скрипт ответа"]
            .into_iter()
            .map(String::from)
            .collect(),
        forbidden_phrases: [
            "уточните на сайте",
            "информация скоро появится",
            "точно не знаю",
            "lorem ipsum",
            "TODO",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    }
}

/// Critical facts that must be stated somewhere in the corpus
///
/// `\w` and `\W` are written as placeholders and widened to every script
/// when compiled, see [`crate::engine::facts::unicode_word_classes`].
pub fn fact_patterns() -> Vec<FactPatternSpec> {
    const FACTS: &[(&str, &str, &str)] = &[
        (
            "price_monday",
            r"понедельник\w*[^\n]{0,30}?990\s*₽",
            "kb/nn/prices.md",
        ),
        (
            "price_weekdays",
            r"вторник\w*\s*[–-]\s*пятниц\w*[^\n]{0,30}?1\s?190\s*₽",
            "kb/nn/prices.md",
        ),
        (
            "price_weekend",
            r"суббот\w*\s*[–-]\s*воскресень\w*[^\n]{0,30}?1\s?590\s*₽",
            "kb/nn/prices.md",
        ),
        (
            "no_time_limit",
            r"(?:без|нет)\s+ограничени\w*\s+по\s+времени",
            "kb/nn/prices.md",
        ),
        (
            "adults_free",
            r"взрослы\w*[^\n]{0,30}?бесплатно",
            "kb/nn/prices.md",
        ),
        (
            "birthday_discount",
            r"именинник\w*[^\n]{0,20}?50\s*%",
            "kb/nn/discounts.md",
        ),
        (
            "large_family_discount",
            r"многодетн\w*[^\n]{0,20}?30\s*%",
            "kb/nn/discounts.md",
        ),
        (
            "cake_fee",
            r"сладк\w*\W{1,3}сбор\w*[^\n]{0,40}?1\s?000\s*₽",
            "kb/nn/birthday.md",
        ),
        (
            "magic_room_slots",
            r"10:30[^\n]{0,20}14:30[^\n]{0,20}18:30",
            "kb/nn/birthday.md",
        ),
        (
            "opening_hours",
            r"пн\w*\s*12:00\s*[–-]\s*22:00",
            "kb/nn/hours.md",
        ),
        (
            "new_year_eve_hours",
            r"31\.12[^\n]{0,20}?18:00",
            "kb/nn/hours.md",
        ),
        (
            "address",
            r"коминтерна\W{0,2}\s*11",
            "kb/nn/location.md",
        ),
        (
            "socks_only",
            r"только\s+в\s+носках",
            "kb/nn/rules.md",
        ),
        (
            "vr_not_included",
            r"VR[^\n]{0,40}?не\s+входит",
            "kb/nn/vr.md",
        ),
        (
            "party_phone",
            r"\+7\s*\(?962\)?[\s-]*509[\s-]*74[\s-]*93",
            "kb/nn/contacts.md",
        ),
        (
            "hotline_phone",
            r"\+7\s*\(?831\)?[\s-]*213[\s-]*50[\s-]*50",
            "kb/nn/contacts.md",
        ),
        (
            "party_email",
            r"prazdnik52@jucity\.ru",
            "kb/nn/contacts.md",
        ),
    ];

    FACTS
        .iter()
        .map(|(id, pattern, recommended)| FactPatternSpec {
            id: (*id).to_string(),
            pattern: (*pattern).to_string(),
            recommended: (*recommended).to_string(),
        })
        .collect()
}
