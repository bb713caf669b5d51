//! Date templates for the languages archives are exported in.
//!
//! Each [`DateParser`] pairs a language's month and weekday vocabulary with
//! one or more chrono format strings. Month names are replaced by their
//! numbers and weekday names by [`WEEKDAY`] before parsing
//! (`"Sunday, December 4"` becomes `"@, 12 4"`), so the formats only ever
//! see digits. The weekday is not checked against the date.
//!
//! The hand-written vocabularies cover the forms exports actually use. When
//! they miss, the same formats are retried with the names glibc's locale
//! data gives for the language, abbreviations included.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use pure_rust_locales::{Locale, locale_match};
use regex::{Captures, Regex};

/// Stand-in for a weekday name in translated text and in formats.
const WEEKDAY: &str = "@";

/// Month and weekday names of one language.
///
/// `extra_months` lists inflected forms that `months` misses, mapped to
/// their month number.
struct Vocabulary {
    months: [&'static str; 12],
    days: [&'static str; 7],
    extra_months: &'static [(&'static str, u32)],
}

const EN: Vocabulary = Vocabulary {
    months: [
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december",
    ],
    days: ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"],
    extra_months: &[],
};

const FR: Vocabulary = Vocabulary {
    months: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    days: ["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"],
    extra_months: &[],
};

const DE: Vocabulary = Vocabulary {
    months: [
        "januar", "februar", "märz", "april", "mai", "juni", "juli", "august", "september",
        "oktober", "november", "dezember",
    ],
    days: ["montag", "dienstag", "mittwoch", "donnerstag", "freitag", "samstag", "sonntag"],
    extra_months: &[],
};

const NB: Vocabulary = Vocabulary {
    months: [
        "januar", "februar", "mars", "april", "mai", "juni", "juli", "august", "september",
        "oktober", "november", "desember",
    ],
    days: ["mandag", "tirsdag", "onsdag", "torsdag", "fredag", "lørdag", "søndag"],
    extra_months: &[],
};

const ES: Vocabulary = Vocabulary {
    months: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    days: ["lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo"],
    extra_months: &[("setiembre", 9)],
};

const HU: Vocabulary = Vocabulary {
    months: [
        "január", "február", "március", "április", "május", "június", "július", "augusztus",
        "szeptember", "október", "november", "december",
    ],
    days: ["hétfő", "kedd", "szerda", "csütörtök", "péntek", "szombat", "vasárnap"],
    extra_months: &[],
};

const IT: Vocabulary = Vocabulary {
    months: [
        "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
        "settembre", "ottobre", "novembre", "dicembre",
    ],
    days: ["lunedì", "martedì", "mercoledì", "giovedì", "venerdì", "sabato", "domenica"],
    extra_months: &[],
};

const SV: Vocabulary = Vocabulary {
    months: [
        "januari", "februari", "mars", "april", "maj", "juni", "juli", "augusti", "september",
        "oktober", "november", "december",
    ],
    days: ["måndag", "tisdag", "onsdag", "torsdag", "fredag", "lördag", "söndag"],
    extra_months: &[],
};

const NL: Vocabulary = Vocabulary {
    months: [
        "januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september",
        "oktober", "november", "december",
    ],
    days: ["maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag", "zondag"],
    extra_months: &[],
};

const DA: Vocabulary = Vocabulary {
    months: [
        "januar", "februar", "marts", "april", "maj", "juni", "juli", "august", "september",
        "oktober", "november", "december",
    ],
    days: ["mandag", "tirsdag", "onsdag", "torsdag", "fredag", "lørdag", "søndag"],
    extra_months: &[],
};

const RO: Vocabulary = Vocabulary {
    months: [
        "ianuarie", "februarie", "martie", "aprilie", "mai", "iunie", "iulie", "august",
        "septembrie", "octombrie", "noiembrie", "decembrie",
    ],
    days: ["luni", "marți", "miercuri", "joi", "vineri", "sâmbătă", "duminică"],
    extra_months: &[],
};

const SL: Vocabulary = Vocabulary {
    months: [
        "januar", "februar", "marec", "april", "maj", "junij", "julij", "avgust", "september",
        "oktober", "november", "december",
    ],
    days: ["ponedeljek", "torek", "sreda", "četrtek", "petek", "sobota", "nedelja"],
    extra_months: &[],
};

const CS: Vocabulary = Vocabulary {
    months: [
        "ledna", "února", "března", "dubna", "května", "června", "července", "srpna", "září",
        "října", "listopadu", "prosince",
    ],
    days: ["pondělí", "úterý", "středa", "čtvrtek", "pátek", "sobota", "neděle"],
    extra_months: &[
        ("leden", 1),
        ("únor", 2),
        ("březen", 3),
        ("duben", 4),
        ("květen", 5),
        ("červen", 6),
        ("červenec", 7),
        ("srpen", 8),
        ("říjen", 10),
        ("listopad", 11),
        ("prosinec", 12),
    ],
};

const PT: Vocabulary = Vocabulary {
    months: [
        "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
        "outubro", "novembro", "dezembro",
    ],
    days: [
        "segunda-feira",
        "terça-feira",
        "quarta-feira",
        "quinta-feira",
        "sexta-feira",
        "sábado",
        "domingo",
    ],
    extra_months: &[],
};

const PL: Vocabulary = Vocabulary {
    months: [
        "stycznia", "lutego", "marca", "kwietnia", "maja", "czerwca", "lipca", "sierpnia",
        "września", "października", "listopada", "grudnia",
    ],
    days: ["poniedziałek", "wtorek", "środa", "czwartek", "piątek", "sobota", "niedziela"],
    extra_months: &[
        ("styczeń", 1),
        ("luty", 2),
        ("marzec", 3),
        ("kwiecień", 4),
        ("maj", 5),
        ("czerwiec", 6),
        ("lipiec", 7),
        ("sierpień", 8),
        ("wrzesień", 9),
        ("październik", 10),
        ("listopad", 11),
        ("grudzień", 12),
    ],
};

const HR: Vocabulary = Vocabulary {
    months: [
        "siječnja", "veljače", "ožujka", "travnja", "svibnja", "lipnja", "srpnja", "kolovoza",
        "rujna", "listopada", "studenoga", "prosinca",
    ],
    days: ["ponedjeljak", "utorak", "srijeda", "četvrtak", "petak", "subota", "nedjelja"],
    extra_months: &[
        ("siječanj", 1),
        ("veljača", 2),
        ("ožujak", 3),
        ("travanj", 4),
        ("svibanj", 5),
        ("lipanj", 6),
        ("srpanj", 7),
        ("kolovoz", 8),
        ("rujan", 9),
        ("listopad", 10),
        ("studeni", 11),
        ("studenog", 11),
        ("prosinac", 12),
    ],
};

const SR: Vocabulary = Vocabulary {
    months: [
        "јануар", "фебруар", "март", "април", "мај", "јун", "јул", "август", "септембар",
        "октобар", "новембар", "децембар",
    ],
    days: ["понедељак", "уторак", "среда", "четвртак", "петак", "субота", "недеља"],
    extra_months: &[],
};

const FI: Vocabulary = Vocabulary {
    months: [
        "tammikuuta", "helmikuuta", "maaliskuuta", "huhtikuuta", "toukokuuta", "kesäkuuta",
        "heinäkuuta", "elokuuta", "syyskuuta", "lokakuuta", "marraskuuta", "joulukuuta",
    ],
    days: ["maanantai", "tiistai", "keskiviikko", "torstai", "perjantai", "lauantai", "sunnuntai"],
    extra_months: &[
        ("tammikuu", 1),
        ("helmikuu", 2),
        ("maaliskuu", 3),
        ("huhtikuu", 4),
        ("toukokuu", 5),
        ("kesäkuu", 6),
        ("heinäkuu", 7),
        ("elokuu", 8),
        ("syyskuu", 9),
        ("lokakuu", 10),
        ("marraskuu", 11),
        ("joulukuu", 12),
    ],
};

const RU: Vocabulary = Vocabulary {
    months: [
        "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
        "октября", "ноября", "декабря",
    ],
    days: [
        "понедельник",
        "вторник",
        "среда",
        "четверг",
        "пятница",
        "суббота",
        "воскресенье",
    ],
    extra_months: &[
        ("январь", 1),
        ("февраль", 2),
        ("март", 3),
        ("апрель", 4),
        ("май", 5),
        ("июнь", 6),
        ("июль", 7),
        ("август", 8),
        ("сентябрь", 9),
        ("октябрь", 10),
        ("ноябрь", 11),
        ("декабрь", 12),
    ],
};

/// One language/format family, tried as a unit.
struct Template {
    id: &'static str,
    vocabulary: &'static Vocabulary,
    /// Locale whose month and weekday names back up the vocabulary.
    locale: Locale,
    /// Formats applied after names are replaced.
    formats: &'static [&'static str],
}

const TEMPLATES: &[Template] = &[
    Template {
        id: "en_US-12h",
        vocabulary: &EN,
        locale: Locale::en_US,
        formats: &["@, %m %d, %Y at %I:%M%p"],
    },
    Template {
        id: "en_US-24h",
        vocabulary: &EN,
        locale: Locale::en_US,
        formats: &["@, %m %d, %Y at %H:%M"],
    },
    Template {
        id: "en_GB",
        vocabulary: &EN,
        locale: Locale::en_GB,
        formats: &["@, %d %m %Y at %H:%M"],
    },
    Template {
        id: "fr_FR",
        vocabulary: &FR,
        locale: Locale::fr_FR,
        formats: &["@ %d %m %Y, %H:%M"],
    },
    Template {
        id: "de_DE",
        vocabulary: &DE,
        locale: Locale::de_DE,
        formats: &["@, %d. %m %Y um %H:%M"],
    },
    Template {
        id: "nb_NO",
        vocabulary: &NB,
        locale: Locale::nb_NO,
        formats: &["%d. %m %Y kl. %H:%M"],
    },
    Template {
        id: "es_ES",
        vocabulary: &ES,
        locale: Locale::es_ES,
        formats: &[
            "@, %d de %m de %Y a las %H:%M",
            "@, %d de %m de %Y a la %H:%M",
        ],
    },
    Template {
        id: "hu_HU",
        vocabulary: &HU,
        locale: Locale::hu_HU,
        formats: &["%Y. %m %d., %H:%M"],
    },
    Template {
        id: "it_IT",
        vocabulary: &IT,
        locale: Locale::it_IT,
        formats: &["@ %d %m %Y alle ore %H:%M"],
    },
    Template {
        id: "sv_SE",
        vocabulary: &SV,
        locale: Locale::sv_SE,
        formats: &[
            "den %d %m %Y kl %H:%M",
            "den %d %m %Y kl. %H:%M",
            "%d %m %Y kl. %H:%M",
            "%d %m %Y kl %H:%M",
        ],
    },
    Template {
        id: "nl_NL",
        vocabulary: &NL,
        locale: Locale::nl_NL,
        formats: &["@ %d %m %Y om %H:%M"],
    },
    Template {
        id: "da_DK",
        vocabulary: &DA,
        locale: Locale::da_DK,
        formats: &["%d. %m %Y kl. %H:%M"],
    },
    Template {
        id: "ro_RO",
        vocabulary: &RO,
        locale: Locale::ro_RO,
        formats: &["%d %m %Y la %H:%M"],
    },
    Template {
        id: "sl_SI",
        vocabulary: &SL,
        locale: Locale::sl_SI,
        formats: &["%d. %m %Y ob %H:%M"],
    },
    Template {
        id: "cs_CZ",
        vocabulary: &CS,
        locale: Locale::cs_CZ,
        formats: &["%d. %m %Y v %H:%M"],
    },
    Template {
        id: "pt_BR",
        vocabulary: &PT,
        locale: Locale::pt_BR,
        formats: &["%d de %m de %Y às %H:%M"],
    },
    Template {
        id: "pt_PT",
        vocabulary: &PT,
        locale: Locale::pt_PT,
        formats: &["@, %d de %m de %Y às %H:%M"],
    },
    Template {
        id: "pl_PL",
        vocabulary: &PL,
        locale: Locale::pl_PL,
        formats: &["%d %m %Y o %H:%M"],
    },
    Template {
        id: "hr_HR",
        vocabulary: &HR,
        locale: Locale::hr_HR,
        formats: &["%d. %m %Y u %H:%M"],
    },
    Template {
        id: "sr_RS",
        vocabulary: &SR,
        locale: Locale::sr_RS,
        formats: &["%d. %m %Y. у %H:%M"],
    },
    Template {
        id: "fi_FI",
        vocabulary: &FI,
        locale: Locale::fi_FI,
        formats: &["%d. %m %Y kello %H:%M"],
    },
    Template {
        id: "ru_RU",
        vocabulary: &RU,
        locale: Locale::ru_RU,
        formats: &["%d %m %Y г. в %H:%M"],
    },
];

/// What a name in a date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Name {
    Month(u32),
    Weekday,
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Replaces month and weekday names in a date string.
struct Translator {
    names: HashMap<String, Name>,
    matcher: Regex,
}

impl Translator {
    /// Builds a translator. Where a word is both a weekday and a month, the
    /// month wins.
    fn new<'a>(
        months: impl IntoIterator<Item = (u32, &'a str)>,
        weekdays: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let weekdays = weekdays.into_iter().map(|word| (Name::Weekday, word));
        let months = months.into_iter().map(|(n, word)| (Name::Month(n), word));

        let mut names = HashMap::new();
        for (name, word) in weekdays.chain(months) {
            let word = word.trim().to_lowercase();
            if word.is_empty() {
                continue;
            }
            names.insert(title_case(&word), name);
            names.insert(word, name);
        }

        let mut words: Vec<&str> = names.keys().map(String::as_str).collect();
        // Longest first, so that "červenec" wins over "červen".
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let alternation = words
            .iter()
            .map(|w| word_pattern(w))
            .collect::<Vec<_>>()
            .join("|");
        let matcher =
            Regex::new(&format!("(?:{alternation})")).expect("valid locale vocabulary regex");

        Self { names, matcher }
    }

    fn translate(&self, text: &str) -> String {
        self.matcher
            .replace_all(text, |caps: &Captures<'_>| match self.names.get(&caps[0]) {
                Some(Name::Month(n)) => n.to_string(),
                Some(Name::Weekday) => WEEKDAY.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Escapes `word`, anchored on word boundaries where it starts or ends with
/// a letter. Abbreviations such as `déc.` end in punctuation.
fn word_pattern(word: &str) -> String {
    let edge = |c: Option<char>| if c.is_some_and(char::is_alphanumeric) { r"\b" } else { "" };
    format!(
        "{}{}{}",
        edge(word.chars().next()),
        regex::escape(word),
        edge(word.chars().last())
    )
}

/// A compiled [`Template`].
pub(crate) struct DateParser {
    template: &'static Template,
    vocabulary: Translator,
    locale_names: Translator,
}

impl DateParser {
    fn compile(template: &'static Template) -> Self {
        let vocabulary = template.vocabulary;
        let hand_months = (1..)
            .zip(vocabulary.months)
            .chain(vocabulary.extra_months.iter().map(|&(word, n)| (n, word)));

        let locale = template.locale;
        let long_months: &[&str] = locale_match!(locale => LC_TIME::MON);
        let short_months: &[&str] = locale_match!(locale => LC_TIME::ABMON);
        let long_days: &[&str] = locale_match!(locale => LC_TIME::DAY);
        let short_days: &[&str] = locale_match!(locale => LC_TIME::ABDAY);

        Self {
            template,
            vocabulary: Translator::new(hand_months, vocabulary.days),
            locale_names: Translator::new(
                (1..)
                    .zip(long_months.iter().copied())
                    .chain((1..).zip(short_months.iter().copied())),
                long_days.iter().chain(short_days).copied(),
            ),
        }
    }

    /// Identifier of the template, e.g. `de_DE`.
    pub(crate) fn id(&self) -> &'static str {
        self.template.id
    }

    fn parse_translated(&self, translator: &Translator, text: &str) -> Option<NaiveDateTime> {
        let translated = translator.translate(text);
        self.template
            .formats
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&translated, fmt).ok())
    }

    /// Parses a local date and time, or returns `None` if the text is not in
    /// this template's shape.
    pub(crate) fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        self.parse_translated(&self.vocabulary, text)
            .or_else(|| self.parse_translated(&self.locale_names, text))
    }
}

/// All date parsers in their default order.
pub(crate) fn date_parsers() -> &'static [DateParser] {
    static PARSERS: OnceLock<Vec<DateParser>> = OnceLock::new();
    PARSERS.get_or_init(|| TEMPLATES.iter().map(DateParser::compile).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 12, 4)
            .unwrap()
            .and_hms_opt(13, 54, 0)
            .unwrap()
    }

    fn parse_any(text: &str) -> Option<(&'static str, NaiveDateTime)> {
        date_parsers()
            .iter()
            .find_map(|p| p.parse(text).map(|dt| (p.id(), dt)))
    }

    fn parser(id: &str) -> &'static DateParser {
        date_parsers().iter().find(|p| p.id() == id).unwrap()
    }

    #[test]
    fn test_english_translation() {
        assert_eq!(
            parser("en_US-12h")
                .vocabulary
                .translate("Sunday, December 4, 2016 at 1:54pm"),
            "@, 12 4, 2016 at 1:54pm"
        );
    }

    #[test]
    fn test_translation_respects_word_boundaries() {
        // "Mayday" is not "May".
        assert_eq!(parser("en_US-12h").vocabulary.translate("Mayday"), "Mayday");
    }

    #[test]
    fn test_longest_name_wins() {
        let cs = &parser("cs_CZ").vocabulary;
        assert_eq!(cs.translate("4. červenec 2016"), "4. 7 2016");
        assert_eq!(cs.translate("4. červen 2016"), "4. 6 2016");
    }

    #[test]
    fn test_every_language_parses() {
        let cases = [
            ("Sunday, December 4, 2016 at 1:54pm", "en_US-12h"),
            ("Sunday, December 4, 2016 at 13:54", "en_US-24h"),
            ("Sunday, 4 December 2016 at 13:54", "en_GB"),
            ("dimanche 4 décembre 2016, 13:54", "fr_FR"),
            ("Sonntag, 4. Dezember 2016 um 13:54", "de_DE"),
            ("4. desember 2016 kl. 13:54", "nb_NO"),
            ("domingo, 4 de diciembre de 2016 a las 13:54", "es_ES"),
            ("2016. december 4., 13:54", "hu_HU"),
            ("Domenica 4 dicembre 2016 alle ore 13:54", "it_IT"),
            ("den 4 december 2016 kl 13:54", "sv_SE"),
            ("zondag 4 december 2016 om 13:54", "nl_NL"),
            ("4. december 2016 kl. 13:54", "da_DK"),
            ("4 decembrie 2016 la 13:54", "ro_RO"),
            ("4. december 2016 ob 13:54", "sl_SI"),
            ("4. prosinec 2016 v 13:54", "cs_CZ"),
            ("4 de dezembro de 2016 às 13:54", "pt_BR"),
            ("domingo, 4 de dezembro de 2016 às 13:54", "pt_PT"),
            ("4 grudnia 2016 o 13:54", "pl_PL"),
            ("4. prosinca 2016 u 13:54", "hr_HR"),
            ("4. децембар 2016. у 13:54", "sr_RS"),
            ("4. joulukuuta 2016 kello 13:54", "fi_FI"),
            ("4 декабря 2016 г. в 13:54", "ru_RU"),
        ];
        for (text, id) in cases {
            let (found, dt) = parse_any(text).unwrap_or_else(|| panic!("no parser for {text}"));
            assert_eq!(found, id, "{text}");
            assert_eq!(dt, expected(), "{text}");
        }
    }

    #[test]
    fn test_locale_names_cover_abbreviations() {
        // Neither abbreviation is in the hand-written vocabularies.
        assert_eq!(parser("en_US-12h").vocabulary.translate("Dec"), "Dec");
        assert_eq!(
            parse_any("Sun, Dec 4, 2016 at 1:54pm"),
            Some(("en_US-12h", expected()))
        );

        assert_eq!(parser("de_DE").vocabulary.translate("Dez"), "Dez");
        assert_eq!(
            parse_any("Sonntag, 4. Dez 2016 um 13:54"),
            Some(("de_DE", expected()))
        );
    }

    #[test]
    fn test_weekday_is_not_checked() {
        // 4 December 2016 was a Sunday.
        assert_eq!(
            parse_any("Monday, December 4, 2016 at 1:54pm"),
            Some(("en_US-12h", expected()))
        );
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_any("not a real").is_none());
        assert!(parse_any("").is_none());
    }
}
