/// Feature resolution: layering references, group features, and direct
/// overrides into an effective feature set per lexical slot.
///
/// Resolution is a pure function of the parsed template. Groups are
/// processed in appearance order so a back-reference always finds its
/// target already resolved; overrides win over inherited values per
/// category, emitting a non-fatal conflict warning when they differ.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::core::parser::{Notation, RawToken, Template};
use crate::schema::feature::{
    lookup_value, value_in_category, Category, FeatureSet, FeatureValue, TokenError,
};
use crate::schema::pos::PartOfSpeech;

/// Fatal resolution failures. Lexical indices are 1-based within their
/// group; 0 marks a group's own feature list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("group {group}, lexical {lexical}: unknown part of speech '{name}'")]
    UnknownPartOfSpeech {
        group: usize,
        lexical: usize,
        name: String,
    },
    #[error("group {group}, lexical {lexical}: unknown feature category '{name}'")]
    UnknownFeatureCategory {
        group: usize,
        lexical: usize,
        name: String,
    },
    #[error("group {group}, lexical {lexical}: unknown feature value '{name}'")]
    UnknownFeatureValue {
        group: usize,
        lexical: usize,
        name: String,
    },
    #[error("group {group}, lexical {lexical}: {pos} is missing required feature '{category}'")]
    MissingRequiredFeature {
        group: usize,
        lexical: usize,
        pos: PartOfSpeech,
        category: Category,
    },
    #[error("group {group}: reference ${target} does not exist")]
    ReferenceNotFound { group: usize, target: usize },
    #[error("group {group}: reference ${target} points forward")]
    ReferenceForward { group: usize, target: usize },
}

/// Non-fatal diagnostic: a direct override displaced an inherited value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictWarning {
    pub group: usize,
    pub lexical: usize,
    pub category: Category,
    pub inherited: FeatureValue,
    pub direct: FeatureValue,
}

impl fmt::Display for ConflictWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "group {}, lexical {}: {} override '{}' replaces inherited '{}'",
            self.group, self.lexical, self.category, self.direct, self.inherited
        )
    }
}

/// One resolved lexical slot. `features` is the effective set (possibly
/// holding wildcards until generation); `overrides` keeps the slot's
/// direct layer so generation can draw override wildcards per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLexical {
    pub pos: PartOfSpeech,
    pub features: FeatureSet,
    pub overrides: FeatureSet,
}

/// A resolved group: its shared base set, the back-reference it was
/// derived from (if any), and its resolved lexicals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGroup {
    pub base: FeatureSet,
    pub reference: Option<usize>,
    pub lexicals: Vec<ResolvedLexical>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTemplate {
    pub groups: Vec<ResolvedGroup>,
    pub warnings: Vec<ConflictWarning>,
}

impl ResolvedTemplate {
    pub fn lexical_count(&self) -> usize {
        self.groups.iter().map(|g| g.lexicals.len()).sum()
    }

    pub fn has_wildcards(&self) -> bool {
        self.groups
            .iter()
            .flat_map(|g| &g.lexicals)
            .any(|l| l.features.has_wildcards())
    }

    /// Serialize the resolved feature sets back into V1 bracket
    /// notation, one bracket per lexical slot, features in each part
    /// of speech's declared order.
    pub fn to_v1(&self) -> String {
        let mut brackets = Vec::new();
        for group in &self.groups {
            for lexical in &group.lexicals {
                let mut parts = vec![lexical.pos.token().to_string()];
                for &category in lexical
                    .pos
                    .required()
                    .iter()
                    .chain(lexical.pos.optional().iter())
                {
                    if let Some(value) = lexical.features.get(category) {
                        parts.push(value.token().to_string());
                    }
                }
                brackets.push(format!("[{}]", parts.join(":")));
            }
        }
        brackets.join(" ")
    }
}

/// Resolve every lexical slot of a parsed template.
pub fn resolve(template: &Template) -> Result<ResolvedTemplate, ResolveError> {
    let total = template.groups.len();
    let v1 = template.notation == Notation::V1;
    let mut groups: Vec<ResolvedGroup> = Vec::with_capacity(total);
    let mut warnings = Vec::new();

    for (index, group) in template.groups.iter().enumerate() {
        let gid = index + 1;

        let base = match group.reference {
            Some(target) => {
                if target == 0 || target > total {
                    return Err(ResolveError::ReferenceNotFound { group: gid, target });
                }
                if target >= gid {
                    return Err(ResolveError::ReferenceForward { group: gid, target });
                }
                groups[target - 1].base.clone()
            }
            None => match (v1, group.lexicals.first()) {
                // V1 brackets declare the lexical's own features, so the
                // bracket's part of speech constrains them directly.
                (true, Some(first)) => {
                    let pos = resolve_pos(&first.pos, gid, 1)?;
                    classify_features(&group.features, gid, 1, Some(pos))?
                }
                _ => classify_features(&group.features, gid, 0, None)?,
            },
        };

        let mut lexicals = Vec::with_capacity(group.lexicals.len());
        for (lindex, spec) in group.lexicals.iter().enumerate() {
            let lid = lindex + 1;
            let pos = resolve_pos(&spec.pos, gid, lid)?;
            let overrides = classify_features(&spec.overrides, gid, lid, Some(pos))?;

            let mut features = base.clone();
            features.retain(|category| pos.allows(category));
            for value in overrides.values() {
                if let Some(inherited) = features.get(value.category()) {
                    if inherited != value {
                        warnings.push(ConflictWarning {
                            group: gid,
                            lexical: lid,
                            category: value.category(),
                            inherited,
                            direct: value,
                        });
                    }
                }
                features.insert(value);
            }

            for &category in pos.required() {
                if features.get(category).is_none() {
                    return Err(ResolveError::MissingRequiredFeature {
                        group: gid,
                        lexical: lid,
                        pos,
                        category,
                    });
                }
            }

            lexicals.push(ResolvedLexical {
                pos,
                features,
                overrides,
            });
        }

        groups.push(ResolvedGroup {
            base,
            reference: group.reference,
            lexicals,
        });
    }

    Ok(ResolvedTemplate { groups, warnings })
}

fn resolve_pos(token: &RawToken, group: usize, lexical: usize) -> Result<PartOfSpeech, ResolveError> {
    match PartOfSpeech::from_token(&token.text) {
        Ok(pos) if pos.is_active() => Ok(pos),
        Ok(pos) => Err(ResolveError::UnknownPartOfSpeech {
            group,
            lexical,
            name: format!("{} (reserved)", pos.token()),
        }),
        Err(TokenError::Unknown) => Err(ResolveError::UnknownPartOfSpeech {
            group,
            lexical,
            name: token.text.clone(),
        }),
        Err(TokenError::Ambiguous(candidates)) => Err(ResolveError::UnknownPartOfSpeech {
            group,
            lexical,
            name: format!("{} (ambiguous: {})", token.text, candidates.join(", ")),
        }),
    }
}

/// Map raw tokens to classified feature values.
///
/// A token naming a category either starts a `category:value` pair or,
/// for gender/number/person, stands alone as a wildcard. Any other
/// token self-identifies its category by value. With `schema` set
/// (direct overrides and V1 brackets) every classified category must
/// be one the part of speech accepts.
fn classify_features(
    tokens: &[RawToken],
    group: usize,
    lexical: usize,
    schema: Option<PartOfSpeech>,
) -> Result<FeatureSet, ResolveError> {
    let mut set = FeatureSet::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let value = if let Some(category) = Category::from_name(&token.text) {
            if let Some(value) = tokens
                .get(i + 1)
                .and_then(|next| value_in_category(category, &next.text))
            {
                i += 1;
                value
            } else if let Some(wildcard) = category.wildcard() {
                wildcard
            } else {
                return Err(ResolveError::UnknownFeatureValue {
                    group,
                    lexical,
                    name: token.text.clone(),
                });
            }
        } else {
            match lookup_value(&token.text) {
                Ok(value) => value,
                Err(TokenError::Unknown) => {
                    return Err(ResolveError::UnknownFeatureValue {
                        group,
                        lexical,
                        name: token.text.clone(),
                    })
                }
                Err(TokenError::Ambiguous(candidates)) => {
                    return Err(ResolveError::UnknownFeatureValue {
                        group,
                        lexical,
                        name: format!("{} (ambiguous: {})", token.text, candidates.join(", ")),
                    })
                }
            }
        };
        if let Some(pos) = schema {
            if !pos.allows(value.category()) {
                return Err(ResolveError::UnknownFeatureCategory {
                    group,
                    lexical,
                    name: format!("{} (not accepted by {})", value.category(), pos),
                });
            }
        }
        set.insert(value);
        i += 1;
    }
    Ok(set)
}
