/// Grammatical feature system: categories, closed value enums, wildcards,
/// and the token table shared by the resolver and the morphological index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature categories understood by the engine.
///
/// `Mood` never appears in templates; it exists as a forms-level category
/// for verb inflection tables (indicative/imperative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Case,
    Gender,
    Number,
    Tense,
    Voice,
    Mood,
    Person,
    #[serde(rename = "type")]
    PronounType,
}

impl Category {
    /// Template-facing name of the category. Pronoun type is written `type`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Gender => "gender",
            Self::Number => "number",
            Self::Tense => "tense",
            Self::Voice => "voice",
            Self::Mood => "mood",
            Self::Person => "person",
            Self::PronounType => "type",
        }
    }

    /// Resolve an exact template category name. `mood` is deliberately
    /// absent: it is not a template category.
    pub fn from_name(name: &str) -> Option<Category> {
        match name {
            "case" => Some(Self::Case),
            "gender" => Some(Self::Gender),
            "number" => Some(Self::Number),
            "tense" => Some(Self::Tense),
            "voice" => Some(Self::Voice),
            "person" => Some(Self::Person),
            "type" => Some(Self::PronounType),
            _ => None,
        }
    }

    /// Categories whose value may be left to a generation-time random draw.
    pub fn supports_wildcard(self) -> bool {
        self.wildcard().is_some()
    }

    /// The wildcard value for categories that support one.
    pub fn wildcard(self) -> Option<FeatureValue> {
        match self {
            Self::Gender => Some(FeatureValue::Gender(Wild::Wildcard)),
            Self::Number => Some(FeatureValue::Number(Wild::Wildcard)),
            Self::Person => Some(FeatureValue::Person(Wild::Wildcard)),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Nominative,
    Genitive,
    Accusative,
    Vocative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Number {
    Singular,
    Plural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tense {
    Present,
    Past,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Active,
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Indicative,
    Imperative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Person {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PronounType {
    PersonalStrong,
    PersonalWeak,
    Demonstrative,
    Interrogative,
    Possessive,
    Relative,
    Definite,
    Indefinite,
}

macro_rules! value_enum_impl {
    ($ty:ident, [$(($variant:ident, $token:literal)),+ $(,)?]) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Canonical token, as written in templates and forms keys.
            pub fn token(self) -> &'static str {
                match self {
                    $($ty::$variant => $token),+
                }
            }

            /// Exact token lookup, used for forms keys.
            pub fn from_token(token: &str) -> Option<$ty> {
                match token {
                    $($token => Some($ty::$variant),)+
                    _ => None,
                }
            }

            /// Bit for this value in a feature-availability mask. Bit
            /// positions follow declaration order and are fixed across
            /// the whole system.
            pub fn bit(self) -> u16 {
                1 << (self as u16)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.token())
            }
        }
    };
}

value_enum_impl!(Case, [
    (Nominative, "nominative"),
    (Genitive, "genitive"),
    (Accusative, "accusative"),
    (Vocative, "vocative"),
]);
value_enum_impl!(Gender, [
    (Masculine, "masculine"),
    (Feminine, "feminine"),
    (Neuter, "neuter"),
]);
value_enum_impl!(Number, [(Singular, "singular"), (Plural, "plural")]);
value_enum_impl!(Tense, [
    (Present, "present"),
    (Past, "past"),
    (Future, "future"),
]);
value_enum_impl!(Voice, [(Active, "active"), (Passive, "passive")]);
value_enum_impl!(Mood, [(Indicative, "indicative"), (Imperative, "imperative")]);
value_enum_impl!(Person, [(First, "first"), (Second, "second"), (Third, "third")]);
value_enum_impl!(PronounType, [
    (PersonalStrong, "personal_strong"),
    (PersonalWeak, "personal_weak"),
    (Demonstrative, "demonstrative"),
    (Interrogative, "interrogative"),
    (Possessive, "possessive"),
    (Relative, "relative"),
    (Definite, "definite"),
    (Indefinite, "indefinite"),
]);

/// A feature value that may be left to a generation-time random draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wild<T> {
    Concrete(T),
    Wildcard,
}

impl<T> Wild<T> {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Wild::Wildcard)
    }
}

/// A single classified feature value, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureValue {
    Case(Case),
    Gender(Wild<Gender>),
    Number(Wild<Number>),
    Tense(Tense),
    Voice(Voice),
    Person(Wild<Person>),
    PronounType(PronounType),
}

impl FeatureValue {
    pub fn category(self) -> Category {
        match self {
            Self::Case(_) => Category::Case,
            Self::Gender(_) => Category::Gender,
            Self::Number(_) => Category::Number,
            Self::Tense(_) => Category::Tense,
            Self::Voice(_) => Category::Voice,
            Self::Person(_) => Category::Person,
            Self::PronounType(_) => Category::PronounType,
        }
    }

    pub fn is_wildcard(self) -> bool {
        matches!(
            self,
            Self::Gender(Wild::Wildcard)
                | Self::Number(Wild::Wildcard)
                | Self::Person(Wild::Wildcard)
        )
    }

    /// Canonical token for this value. Wildcards render as `*category*`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Case(v) => v.token(),
            Self::Gender(Wild::Concrete(v)) => v.token(),
            Self::Gender(Wild::Wildcard) => "*gender*",
            Self::Number(Wild::Concrete(v)) => v.token(),
            Self::Number(Wild::Wildcard) => "*number*",
            Self::Tense(v) => v.token(),
            Self::Voice(v) => v.token(),
            Self::Person(Wild::Concrete(v)) => v.token(),
            Self::Person(Wild::Wildcard) => "*person*",
            Self::PronounType(v) => v.token(),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Canonical feature value tokens. Wildcards use the starred spelling;
/// the bare category name is an equivalent spelling handled by the
/// resolver's category-name branch.
const VALUE_TOKENS: &[(&str, FeatureValue)] = &[
    ("nominative", FeatureValue::Case(Case::Nominative)),
    ("genitive", FeatureValue::Case(Case::Genitive)),
    ("accusative", FeatureValue::Case(Case::Accusative)),
    ("vocative", FeatureValue::Case(Case::Vocative)),
    ("masculine", FeatureValue::Gender(Wild::Concrete(Gender::Masculine))),
    ("feminine", FeatureValue::Gender(Wild::Concrete(Gender::Feminine))),
    ("neuter", FeatureValue::Gender(Wild::Concrete(Gender::Neuter))),
    ("*gender*", FeatureValue::Gender(Wild::Wildcard)),
    ("singular", FeatureValue::Number(Wild::Concrete(Number::Singular))),
    ("plural", FeatureValue::Number(Wild::Concrete(Number::Plural))),
    ("*number*", FeatureValue::Number(Wild::Wildcard)),
    ("present", FeatureValue::Tense(Tense::Present)),
    ("past", FeatureValue::Tense(Tense::Past)),
    ("future", FeatureValue::Tense(Tense::Future)),
    ("active", FeatureValue::Voice(Voice::Active)),
    ("passive", FeatureValue::Voice(Voice::Passive)),
    ("first", FeatureValue::Person(Wild::Concrete(Person::First))),
    ("second", FeatureValue::Person(Wild::Concrete(Person::Second))),
    ("third", FeatureValue::Person(Wild::Concrete(Person::Third))),
    ("*person*", FeatureValue::Person(Wild::Wildcard)),
    ("personal_strong", FeatureValue::PronounType(PronounType::PersonalStrong)),
    ("personal_weak", FeatureValue::PronounType(PronounType::PersonalWeak)),
    ("demonstrative", FeatureValue::PronounType(PronounType::Demonstrative)),
    ("interrogative", FeatureValue::PronounType(PronounType::Interrogative)),
    ("possessive", FeatureValue::PronounType(PronounType::Possessive)),
    ("relative", FeatureValue::PronounType(PronounType::Relative)),
    ("definite", FeatureValue::PronounType(PronounType::Definite)),
    ("indefinite", FeatureValue::PronounType(PronounType::Indefinite)),
];

/// Failure modes of token lookup. An ambiguous prefix names every
/// candidate so callers can build a useful message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Unknown,
    Ambiguous(Vec<&'static str>),
}

/// Resolve a feature value token: exact match first, then unique prefix.
pub fn lookup_value(token: &str) -> Result<FeatureValue, TokenError> {
    if let Some((_, value)) = VALUE_TOKENS.iter().find(|(t, _)| *t == token) {
        return Ok(*value);
    }
    let hits: Vec<&(&str, FeatureValue)> = VALUE_TOKENS
        .iter()
        .filter(|(t, _)| t.starts_with(token))
        .collect();
    match hits.as_slice() {
        [] => Err(TokenError::Unknown),
        [(_, value)] => Ok(*value),
        many => Err(TokenError::Ambiguous(many.iter().map(|(t, _)| *t).collect())),
    }
}

/// Resolve a token that must belong to the given category.
pub fn value_in_category(category: Category, token: &str) -> Option<FeatureValue> {
    match lookup_value(token) {
        Ok(value) if value.category() == category => Some(value),
        _ => None,
    }
}

/// Bit for a forms-level key of the given category, if the key is a
/// canonical value token of that category. Unknown keys carry no bit.
pub fn forms_key_bit(category: Category, key: &str) -> Option<u16> {
    match category {
        Category::Case => Case::from_token(key).map(Case::bit),
        Category::Gender => Gender::from_token(key).map(Gender::bit),
        Category::Number => Number::from_token(key).map(Number::bit),
        Category::Tense => Tense::from_token(key).map(Tense::bit),
        Category::Voice => Voice::from_token(key).map(Voice::bit),
        Category::Mood => Mood::from_token(key).map(Mood::bit),
        Category::Person => Person::from_token(key).map(Person::bit),
        Category::PronounType => PronounType::from_token(key).map(PronounType::bit),
    }
}

/// A per-slot feature assignment: at most one value per category.
///
/// Wildcards are representable only for gender, number, and person;
/// the remaining categories hold concrete values or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub case: Option<Case>,
    pub gender: Option<Wild<Gender>>,
    pub number: Option<Wild<Number>>,
    pub tense: Option<Tense>,
    pub voice: Option<Voice>,
    pub person: Option<Wild<Person>>,
    pub pronoun_type: Option<PronounType>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> Option<FeatureValue> {
        match category {
            Category::Case => self.case.map(FeatureValue::Case),
            Category::Gender => self.gender.map(FeatureValue::Gender),
            Category::Number => self.number.map(FeatureValue::Number),
            Category::Tense => self.tense.map(FeatureValue::Tense),
            Category::Voice => self.voice.map(FeatureValue::Voice),
            Category::Mood => None,
            Category::Person => self.person.map(FeatureValue::Person),
            Category::PronounType => self.pronoun_type.map(FeatureValue::PronounType),
        }
    }

    /// Set a value, replacing any previous value of the same category.
    pub fn insert(&mut self, value: FeatureValue) {
        match value {
            FeatureValue::Case(v) => self.case = Some(v),
            FeatureValue::Gender(v) => self.gender = Some(v),
            FeatureValue::Number(v) => self.number = Some(v),
            FeatureValue::Tense(v) => self.tense = Some(v),
            FeatureValue::Voice(v) => self.voice = Some(v),
            FeatureValue::Person(v) => self.person = Some(v),
            FeatureValue::PronounType(v) => self.pronoun_type = Some(v),
        }
    }

    /// Set values, in stable category order.
    pub fn values(&self) -> Vec<FeatureValue> {
        const ORDER: [Category; 7] = [
            Category::Case,
            Category::Gender,
            Category::Number,
            Category::Tense,
            Category::Voice,
            Category::Person,
            Category::PronounType,
        ];
        ORDER.iter().filter_map(|&c| self.get(c)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn has_wildcards(&self) -> bool {
        self.values().iter().any(|v| v.is_wildcard())
    }

    /// Drop every category the predicate rejects.
    pub fn retain<F: Fn(Category) -> bool>(&mut self, keep: F) {
        if !keep(Category::Case) {
            self.case = None;
        }
        if !keep(Category::Gender) {
            self.gender = None;
        }
        if !keep(Category::Number) {
            self.number = None;
        }
        if !keep(Category::Tense) {
            self.tense = None;
        }
        if !keep(Category::Voice) {
            self.voice = None;
        }
        if !keep(Category::Person) {
            self.person = None;
        }
        if !keep(Category::PronounType) {
            self.pronoun_type = None;
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values();
        if values.is_empty() {
            return f.write_str("(unconstrained)");
        }
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", value.category(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_exact_token() {
        assert_eq!(
            lookup_value("nominative"),
            Ok(FeatureValue::Case(Case::Nominative))
        );
        assert_eq!(
            lookup_value("*gender*"),
            Ok(FeatureValue::Gender(Wild::Wildcard))
        );
    }

    #[test]
    fn lookup_unique_prefix() {
        assert_eq!(
            lookup_value("nom"),
            Ok(FeatureValue::Case(Case::Nominative))
        );
        assert_eq!(
            lookup_value("fem"),
            Ok(FeatureValue::Gender(Wild::Concrete(Gender::Feminine)))
        );
        assert_eq!(
            lookup_value("sing"),
            Ok(FeatureValue::Number(Wild::Concrete(Number::Singular)))
        );
        assert_eq!(lookup_value("voc"), Ok(FeatureValue::Case(Case::Vocative)));
    }

    #[test]
    fn lookup_ambiguous_prefix() {
        // "pa" matches both "past" and "passive"
        match lookup_value("pa") {
            Err(TokenError::Ambiguous(candidates)) => {
                assert!(candidates.contains(&"past"));
                assert!(candidates.contains(&"passive"));
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn lookup_unknown_token() {
        assert_eq!(lookup_value("dative"), Err(TokenError::Unknown));
    }

    #[test]
    fn value_in_category_rejects_mismatch() {
        assert!(value_in_category(Category::Gender, "feminine").is_some());
        assert!(value_in_category(Category::Gender, "nominative").is_none());
    }

    #[test]
    fn feature_set_insert_and_get() {
        let mut fs = FeatureSet::new();
        fs.insert(FeatureValue::Case(Case::Genitive));
        fs.insert(FeatureValue::Gender(Wild::Concrete(Gender::Neuter)));
        assert_eq!(
            fs.get(Category::Case),
            Some(FeatureValue::Case(Case::Genitive))
        );
        assert_eq!(fs.get(Category::Tense), None);
        assert_eq!(fs.values().len(), 2);
    }

    #[test]
    fn feature_set_insert_replaces() {
        let mut fs = FeatureSet::new();
        fs.insert(FeatureValue::Case(Case::Genitive));
        fs.insert(FeatureValue::Case(Case::Accusative));
        assert_eq!(fs.case, Some(Case::Accusative));
    }

    #[test]
    fn feature_set_retain_filters_categories() {
        let mut fs = FeatureSet::new();
        fs.insert(FeatureValue::Case(Case::Nominative));
        fs.insert(FeatureValue::Tense(Tense::Present));
        fs.retain(|c| c != Category::Tense);
        assert!(fs.tense.is_none());
        assert!(fs.case.is_some());
    }

    #[test]
    fn feature_set_wildcard_detection() {
        let mut fs = FeatureSet::new();
        fs.insert(FeatureValue::Gender(Wild::Wildcard));
        assert!(fs.has_wildcards());
        fs.insert(FeatureValue::Gender(Wild::Concrete(Gender::Masculine)));
        assert!(!fs.has_wildcards());
    }

    #[test]
    fn feature_set_display() {
        let mut fs = FeatureSet::new();
        fs.insert(FeatureValue::Case(Case::Nominative));
        fs.insert(FeatureValue::Gender(Wild::Concrete(Gender::Masculine)));
        fs.insert(FeatureValue::Number(Wild::Concrete(Number::Singular)));
        assert_eq!(
            fs.to_string(),
            "case=nominative, gender=masculine, number=singular"
        );
        assert_eq!(FeatureSet::new().to_string(), "(unconstrained)");
    }

    #[test]
    fn bits_follow_declaration_order() {
        assert_eq!(Case::Nominative.bit(), 1);
        assert_eq!(Case::Genitive.bit(), 2);
        assert_eq!(Case::Accusative.bit(), 4);
        assert_eq!(Case::Vocative.bit(), 8);
        assert_eq!(Person::Third.bit(), 4);
    }

    #[test]
    fn forms_key_bit_rejects_foreign_tokens() {
        assert_eq!(
            forms_key_bit(Category::Gender, "masculine"),
            Some(Gender::Masculine.bit())
        );
        assert_eq!(forms_key_bit(Category::Gender, "nominative"), None);
        assert_eq!(forms_key_bit(Category::Mood, "participle"), None);
    }
}
