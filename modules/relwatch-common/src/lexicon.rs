//! Fixed keyword and entity tables, compiled once at startup.
//!
//! Two matching modes live here and they are deliberately different:
//! scoring and people counts use whole-word regexes, while key events and
//! connections use plain folded substring containment.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use crate::error::{RelwatchError, Result};

/// Case-fold for matching: Unicode lower-case with the combining dot above
/// dropped and dotless `ı` mapped to `i`, so "TOKİ" and "toki" agree, as do
/// "KALKINMA" and "kalkınma".
pub fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|&c| c != '\u{307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

/// Split text into word tokens (letters, digits, underscore).
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
}

/// Compile a whole-word, case-folded pattern for `term`.
pub fn whole_word(term: &str) -> Result<Regex> {
    Regex::new(&format!(r"\b{}\b", regex::escape(&fold(term))))
        .map_err(|e| RelwatchError::Config(format!("bad keyword '{term}': {e}")))
}

/// A keyword with its precompiled whole-word matcher.
#[derive(Debug, Clone)]
pub struct Keyword {
    /// Folded spelling, used for matching.
    pub term: String,
    /// Lower-cased spelling as configured; shown in tallies and sent to providers.
    pub label: String,
    pattern: Regex,
}

impl Keyword {
    pub fn new(term: &str) -> Result<Self> {
        Ok(Self {
            term: fold(term),
            label: term.to_lowercase(),
            pattern: whole_word(term)?,
        })
    }

    /// Whole-word occurrences in already-folded text.
    pub fn count_in(&self, folded_text: &str) -> usize {
        self.pattern.find_iter(folded_text).count()
    }

    /// Plain substring containment in already-folded text.
    pub fn appears_in(&self, folded_text: &str) -> bool {
        folded_text.contains(&self.term)
    }
}

/// Optional `[lexicon]` overrides from the TOML config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconConfig {
    pub institution_keywords: Option<Vec<String>>,
    pub party_keywords: Option<Vec<String>>,
    pub stopwords: Option<Vec<String>>,
    pub politicians: Option<Vec<String>>,
    pub institution_entities: Option<Vec<String>>,
    pub party_entities: Option<Vec<String>>,
}

/// Immutable lookup tables shared by scoring and extraction.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub institution_keywords: Vec<Keyword>,
    pub party_keywords: Vec<Keyword>,
    pub stopwords: HashSet<String>,
    /// Prominent political figures counted as key people.
    pub politicians: Vec<Keyword>,
    /// Display names of institutions tracked as connections.
    pub institution_entities: Vec<String>,
    /// Display names of party bodies and figures tracked as connections.
    pub party_entities: Vec<String>,
}

static DEFAULT_LEXICON: LazyLock<Arc<Lexicon>> = LazyLock::new(|| {
    Arc::new(Lexicon::from_config(&LexiconConfig::default()).expect("default lexicon compiles"))
});

impl Lexicon {
    /// The built-in tables, compiled once per process.
    pub fn shared_default() -> Arc<Lexicon> {
        DEFAULT_LEXICON.clone()
    }

    pub fn from_config(config: &LexiconConfig) -> Result<Self> {
        let pick = |over: &Option<Vec<String>>, default: &[&str]| -> Vec<String> {
            over.clone()
                .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
        };

        let compile = |terms: Vec<String>| -> Result<Vec<Keyword>> {
            terms.iter().map(|t| Keyword::new(t)).collect()
        };

        Ok(Self {
            institution_keywords: compile(pick(&config.institution_keywords, INSTITUTION_KEYWORDS))?,
            party_keywords: compile(pick(&config.party_keywords, PARTY_KEYWORDS))?,
            stopwords: pick(&config.stopwords, STOPWORDS)
                .iter()
                .map(|s| fold(s))
                .collect(),
            politicians: compile(pick(&config.politicians, POLITICIANS))?,
            institution_entities: pick(&config.institution_entities, INSTITUTION_ENTITIES),
            party_entities: pick(&config.party_entities, PARTY_ENTITIES),
        })
    }

    /// True if the folded text contains any institution or party keyword as a
    /// substring (looser than the whole-word scoring match).
    pub fn mentions_any_keyword(&self, folded_text: &str) -> bool {
        self.institution_keywords
            .iter()
            .chain(self.party_keywords.iter())
            .any(|k| k.appears_in(folded_text))
    }

    /// Number of tokens in folded text that are not stopwords.
    pub fn content_word_count(&self, folded_text: &str) -> usize {
        tokenize(folded_text)
            .filter(|t| !self.stopwords.contains(*t))
            .count()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        (*Self::shared_default()).clone()
    }
}

// --- Built-in tables ---

pub const INSTITUTION_KEYWORDS: &[&str] = &[
    "hükümet", "bakanlık", "bakan", "cumhurbaşkanı", "başbakan", "meclis", "milletvekil",
    "kamu", "devlet", "ihale", "teşvik", "destek", "fon", "kredi", "vergi", "muafiyet",
    "imtiyaz", "protokol", "anlaşma", "sözleşme", "izin", "ruhsat", "yetki", "karar",
    "kanun", "yönetmelik", "tebliğ", "genelge", "düzenleme", "komisyon", "kurul", "müdürlük",
    "bakanlığı", "başkanlığı", "müsteşarlık", "genel müdürlük", "toki", "kik", "hazine",
];

pub const PARTY_KEYWORDS: &[&str] = &[
    "akp", "ak parti", "adalet ve kalkınma partisi", "erdoğan", "recep tayyip erdoğan",
    "rte", "binali yıldırım", "ahmet davutoğlu", "partili", "iktidar partisi",
    "cumhur ittifakı", "soylu", "albayrak", "berat albayrak", "süleyman soylu",
];

pub const POLITICIANS: &[&str] = &[
    "erdoğan", "recep tayyip erdoğan", "binali yıldırım", "ahmet davutoğlu",
    "berat albayrak", "süleyman soylu", "mehmet şimşek", "mevlüt çavuşoğlu",
    "hulusi akar", "fahrettin koca", "abdulhamit gül", "bekir bozdağ",
];

pub const INSTITUTION_ENTITIES: &[&str] = &[
    "Cumhurbaşkanlığı", "Başbakanlık", "Hazine ve Maliye Bakanlığı",
    "Sanayi ve Teknoloji Bakanlığı", "Ticaret Bakanlığı", "Ulaştırma ve Altyapı Bakanlığı",
    "Enerji ve Tabii Kaynaklar Bakanlığı", "TOKİ", "KİK", "Varlık Fonu", "TMSF",
    "Merkez Bankası", "TÜBİTAK",
];

pub const PARTY_ENTITIES: &[&str] = &[
    "AKP", "AK Parti", "Adalet ve Kalkınma Partisi", "Erdoğan", "Recep Tayyip Erdoğan",
    "Binali Yıldırım", "Ahmet Davutoğlu", "Berat Albayrak", "Süleyman Soylu",
    "AKP Genel Merkezi", "Cumhur İttifakı",
];

pub const STOPWORDS: &[&str] = &[
    "acaba", "altı", "altmış", "ama", "ancak", "arada", "artık", "asla", "aslında", "aşağı",
    "ayrıca", "bana", "bazen", "bazı", "bazıları", "belki", "ben", "benden", "beni", "benim",
    "beş", "bile", "bilhassa", "bin", "bir", "biraz", "birçoğu", "birçok", "biri", "birisi",
    "birkaç", "birşey", "biz", "bizden", "bize", "bizi", "bizim", "böyle", "böylece", "bu",
    "buna", "bunda", "bundan", "bunlar", "bunları", "bunların", "bunu", "bunun", "burada",
    "bütün", "çoğu", "çoğunu", "çok", "çünkü", "da", "daha", "dahi", "dan", "de", "defa",
    "değil", "diğer", "diğeri", "diğerleri", "diye", "doksan", "dokuz", "dolayı", "dolayısıyla",
    "dört", "e", "elbette", "elli", "en", "fakat", "falan", "felan", "filan", "gene", "gibi",
    "görece", "göre", "hala", "halde", "halen", "hangi", "hangisi", "hani", "hatta", "hem",
    "henüz", "hep", "hepsi", "her", "herhangi", "herkes", "herkese", "herkesi", "herkesin",
    "hiç", "hiçbir", "hiçbiri", "i", "için", "içinde", "iki", "ile", "ilgili", "ise", "işte",
    "kaç", "kadar", "kendi", "kendine", "kendini", "kendisi", "kendisine", "kendisini",
    "kez", "ki", "kim", "kime", "kimi", "kimin", "kimisi", "kırk", "madem", "mi", "mı", "mu",
    "mü", "nasıl", "ne", "neden", "nedenle", "nerde", "nerede", "nereye", "nesi", "neyse",
    "niçin", "nin", "nın", "niye", "nun", "nün", "o", "öbür", "olan", "olarak", "oldu",
    "olduğu", "olduğunu", "olduklarını", "olmadı", "olmadığı", "olmak", "olması", "olmayan",
    "olmaz", "olsa", "olsun", "olup", "olur", "olursa", "oluyor", "on", "ön", "ona",
    "önce", "ondan", "onlar", "onlara", "onlardan", "onları", "onların", "onu", "onun",
    "orada", "öte", "ötürü", "otuz", "öyle", "oysa", "pek", "rağmen", "sana", "sanki",
    "şayet", "şekilde", "sekiz", "seksen", "sen", "senden", "seni", "senin",
    "şey", "şeyden", "şeye", "şeyi", "şeyler", "şimdi", "siz", "sizden", "size", "sizi",
    "sizin", "son", "sonra", "şöyle", "şu", "şuna", "şunda", "şundan", "şunlar", "şunu",
    "şunun", "ta", "tabii", "tam", "tamam", "tamamen", "tarafından", "tüm", "tümü", "u",
    "ü", "üç", "un", "ün", "up", "üzere", "var", "vardı", "ve", "veya", "ya", "ya da",
    "yani", "yapacak", "yapılan", "yapılması", "yapıyor", "yapmak", "yaptı", "yaptığı",
    "yaptığını", "yaptıkları", "ye", "yedi", "yerine", "yetmiş", "yi", "yı", "yine",
    "yirmi", "yoksa", "yu", "yüz", "zaten", "zira",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_handles_turkish_dotted_capital_i() {
        assert_eq!(fold("TOKİ"), "toki");
        assert_eq!(fold("Cumhur İttifakı"), "cumhur ittifaki");
        assert_eq!(fold("CUMHUR İTTİFAKI"), fold("cumhur ittifakı"));
        assert_eq!(fold("YAPI"), fold("yapı"));
        assert_eq!(fold("HÜKÜMET"), "hükümet");
    }

    #[test]
    fn whole_word_ignores_longer_words() {
        let k = Keyword::new("bakan").unwrap();
        assert_eq!(k.count_in("bakan geldi, bakanlık açıklama yaptı, bakan"), 2);
        assert!(k.appears_in("bakanlık"));
    }

    #[test]
    fn whole_word_respects_non_ascii_letters() {
        let k = Keyword::new("erdoğan").unwrap();
        assert_eq!(k.count_in("erdoğan ile görüştü"), 1);
        assert_eq!(k.count_in("erdoğanın açıklaması"), 0);
    }

    #[test]
    fn multi_word_keywords_match() {
        let k = Keyword::new("AK Parti").unwrap();
        assert_eq!(k.term, "ak parti");
        assert_eq!(k.count_in(&fold("AK Parti ve ak parti il başkanlığı")), 2);
    }

    #[test]
    fn content_words_skip_stopwords() {
        let lex = Lexicon::shared_default();
        assert_eq!(lex.content_word_count("bu şirket ve hükümet, bir ihale kazandı."), 4);
        assert_eq!(lex.content_word_count(""), 0);
    }

    #[test]
    fn substring_match_is_loose() {
        let lex = Lexicon::shared_default();
        assert!(lex.mentions_any_keyword("hükümetin kararı"));
        assert!(!lex.mentions_any_keyword("hava durumu güneşli"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let lex = Lexicon::from_config(&LexiconConfig {
            party_keywords: Some(vec!["Party X".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(lex.party_keywords.len(), 1);
        assert_eq!(lex.party_keywords[0].term, "party x");
        assert_eq!(lex.institution_keywords.len(), INSTITUTION_KEYWORDS.len());
    }
}
