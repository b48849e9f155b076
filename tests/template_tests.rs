/// Template parsing and resolution integration tests.

use syntagma::core::parser::{ParseError, Template};
use syntagma::core::resolver::{resolve, ResolveError, ResolvedTemplate};
use syntagma::schema::feature::{Case, Category, FeatureSet, Gender, Number, Wild};
use syntagma::schema::pos::PartOfSpeech;

fn resolve_str(template: &str) -> Result<ResolvedTemplate, ResolveError> {
    resolve(&Template::parse(template).expect("template should parse"))
}

fn lexical_features(resolved: &ResolvedTemplate) -> Vec<(PartOfSpeech, FeatureSet)> {
    resolved
        .groups
        .iter()
        .flat_map(|g| g.lexicals.iter().map(|l| (l.pos, l.features.clone())))
        .collect()
}

#[test]
fn article_noun_group_resolves_shared_features() {
    let resolved = resolve_str("(article noun)@{nominative:masculine:singular}").unwrap();
    assert_eq!(resolved.groups.len(), 1);
    assert_eq!(resolved.lexical_count(), 2);
    for (_, features) in lexical_features(&resolved) {
        assert_eq!(features.case, Some(Case::Nominative));
        assert_eq!(features.gender, Some(Wild::Concrete(Gender::Masculine)));
        assert_eq!(features.number, Some(Wild::Concrete(Number::Singular)));
    }
}

#[test]
fn adjective_reference_inherits_noun_group_features() {
    let resolved =
        resolve_str("(article noun)@{nominative:masculine:singular} (adjective)@$1").unwrap();
    let adjective = &resolved.groups[1].lexicals[0];
    assert_eq!(adjective.pos, PartOfSpeech::Adjective);
    assert_eq!(adjective.features.case, Some(Case::Nominative));
    assert_eq!(
        adjective.features.gender,
        Some(Wild::Concrete(Gender::Masculine))
    );
    assert_eq!(
        adjective.features.number,
        Some(Wild::Concrete(Number::Singular))
    );
}

#[test]
fn adjective_override_wins_with_single_warning() {
    let resolved =
        resolve_str("(article noun adjective{feminine})@{nominative:masculine:singular}").unwrap();
    let lexicals = &resolved.groups[0].lexicals;
    assert_eq!(
        lexicals[0].features.gender,
        Some(Wild::Concrete(Gender::Masculine))
    );
    assert_eq!(
        lexicals[1].features.gender,
        Some(Wild::Concrete(Gender::Masculine))
    );
    assert_eq!(
        lexicals[2].features.gender,
        Some(Wild::Concrete(Gender::Feminine))
    );
    assert_eq!(resolved.warnings.len(), 1);
    let warning = &resolved.warnings[0];
    assert_eq!(
        (warning.group, warning.lexical, warning.category),
        (1, 3, Category::Gender)
    );
}

#[test]
fn v1_and_v2_single_lexical_resolve_identically() {
    let v1 = resolve_str("[article:nominative:masculine:singular]").unwrap();
    let v2 = resolve_str("(article)@{nominative:masculine:singular}").unwrap();
    assert_eq!(lexical_features(&v1), lexical_features(&v2));
}

#[test]
fn forward_reference_in_first_group_fails() {
    assert_eq!(
        resolve_str("(article)@$2 (noun)@{nominative:masculine:singular}"),
        Err(ResolveError::ReferenceForward {
            group: 1,
            target: 2
        })
    );
}

#[test]
fn dangling_reference_fails_distinctly() {
    assert_eq!(
        resolve_str("(noun)@{nominative:masculine:singular} (adjective)@$9"),
        Err(ResolveError::ReferenceNotFound {
            group: 2,
            target: 9
        })
    );
}

#[test]
fn unclosed_group_reports_offset() {
    assert_eq!(
        Template::parse("(article noun"),
        Err(ParseError::UnclosedGroup { offset: 0 })
    );
    assert_eq!(
        Template::parse("[noun:nominative"),
        Err(ParseError::UnclosedGroup { offset: 0 })
    );
}

#[test]
fn unclosed_brace_reports_offset() {
    assert_eq!(
        Template::parse("(noun)@{nominative"),
        Err(ParseError::UnclosedBrace { offset: 7 })
    );
}

#[test]
fn unknown_feature_value_is_fatal() {
    assert!(matches!(
        resolve_str("(noun)@{dative:masculine:singular}"),
        Err(ResolveError::UnknownFeatureValue { .. })
    ));
}

#[test]
fn missing_required_feature_names_the_category() {
    assert_eq!(
        resolve_str("(verb)@{present:active:third}"),
        Err(ResolveError::MissingRequiredFeature {
            group: 1,
            lexical: 1,
            pos: PartOfSpeech::Verb,
            category: Category::Number,
        })
    );
}

#[test]
fn abbreviated_tokens_resolve_by_unique_prefix() {
    let abbreviated = resolve_str("(art no adj)@{nom:masc:sing}").unwrap();
    let full =
        resolve_str("(article noun adjective)@{nominative:masculine:singular}").unwrap();
    assert_eq!(lexical_features(&abbreviated), lexical_features(&full));
}

#[test]
fn resolving_twice_yields_identical_output() {
    let template = Template::parse(
        "(article noun)@{genitive:feminine:plural} (adjective{neuter})@$1",
    )
    .unwrap();
    let first = resolve(&template).unwrap();
    let second = resolve(&template).unwrap();
    assert_eq!(first, second);
}

#[test]
fn v1_round_trip_is_stable() {
    let source = "[article:nominative:masculine:singular] [noun:accusative:feminine:plural]";
    let resolved = resolve_str(source).unwrap();
    let serialized = resolved.to_v1();
    assert_eq!(serialized, source);
    let round_tripped = resolve_str(&serialized).unwrap();
    assert_eq!(lexical_features(&resolved), lexical_features(&round_tripped));
}

#[test]
fn resolved_wildcards_survive_v1_round_trip() {
    let resolved = resolve_str("(noun)@{nominative:*gender*:singular}").unwrap();
    let serialized = resolved.to_v1();
    assert_eq!(serialized, "[noun:nominative:*gender*:singular]");
    let round_tripped = resolve_str(&serialized).unwrap();
    assert_eq!(lexical_features(&resolved), lexical_features(&round_tripped));
}

#[test]
fn multi_group_indices_follow_appearance_order() {
    let resolved = resolve_str(
        "(article)@{nominative:masculine:singular} \
         (noun)@$1 \
         (verb)@{present:active:third:singular} \
         (adjective)@$2",
    )
    .unwrap();
    assert_eq!(resolved.groups.len(), 4);
    assert_eq!(resolved.groups[1].reference, Some(1));
    assert_eq!(resolved.groups[3].reference, Some(2));
    let adjective = &resolved.groups[3].lexicals[0];
    // group 2 inherited group 1's base, so group 4 sees it transitively
    assert_eq!(adjective.features.case, Some(Case::Nominative));
}
