//! Classification request builder.
//!
//! Pure data transformation: groups augmented records by label (optionally
//! label + vocabulary class), and renders the natural-language prompt the
//! oracle answers. The oracle echoes back label and class, so the grouping
//! key carries only those two; descriptions are attached to their group for
//! prompt rendering alone.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use synodex_common::CandidateRecord;

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

/// How much context each candidate group carries into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    /// Labels only.
    Label,
    /// Labels with their vocabulary class (Gene, Disease, …).
    Class,
    /// Labels, classes, and entity descriptions.
    ClassDescription,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationMethod::Label => "label",
            ClassificationMethod::Class => "class",
            ClassificationMethod::ClassDescription => "class_description",
        }
    }

    pub fn uses_class(&self) -> bool {
        !matches!(self, ClassificationMethod::Label)
    }

    pub fn uses_descriptions(&self) -> bool {
        matches!(self, ClassificationMethod::ClassDescription)
    }
}

// ---------------------------------------------------------------------------
// Grouping key and index
// ---------------------------------------------------------------------------

/// Value-equality key under which candidates are classified together.
/// Curies sharing a key receive the same verdict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub label: String,
    pub class: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CandidateGroup {
    pub key: GroupKey,
    pub curies: Vec<String>,
    pub descriptions: Vec<String>,
}

/// Insertion-ordered multimap from grouping key to the curies sharing it.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    groups: Vec<CandidateGroup>,
}

impl CandidateIndex {
    fn insert(&mut self, key: GroupKey, curie: String, description: String) {
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => {
                group.curies.push(curie);
                group.descriptions.push(description);
            }
            None => self.groups.push(CandidateGroup {
                key,
                curies: vec![curie],
                descriptions: vec![description],
            }),
        }
    }

    pub fn get(&self, key: &GroupKey) -> Option<&CandidateGroup> {
        self.groups.iter().find(|g| g.key == *key)
    }

    pub fn groups(&self) -> &[CandidateGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

pub struct ClassificationRequest {
    pub prompt: String,
    pub index: CandidateIndex,
}

pub fn build_request(
    abstract_text: &str,
    term: &str,
    records: &HashMap<String, CandidateRecord>,
    method: ClassificationMethod,
) -> ClassificationRequest {
    let mut index = CandidateIndex::default();
    for record in records.values() {
        let key = GroupKey {
            label: record.label.clone(),
            class: method
                .uses_class()
                .then(|| record.biolink_type.clone().unwrap_or_default()),
        };
        index.insert(key, record.curie.clone(), record.description.clone());
    }

    let prompt = render_prompt(abstract_text, term, &index, method);
    ClassificationRequest { prompt, index }
}

fn synonym_list_json(index: &CandidateIndex, method: ClassificationMethod) -> String {
    let items: Vec<serde_json::Value> = index
        .groups()
        .iter()
        .map(|g| match method {
            ClassificationMethod::Label => serde_json::json!(g.key.label),
            ClassificationMethod::Class => serde_json::json!([g.key.label, g.key.class]),
            ClassificationMethod::ClassDescription => {
                serde_json::json!([g.key.label, g.key.class, g.descriptions])
            }
        })
        .collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

fn render_prompt(
    abstract_text: &str,
    term: &str,
    index: &CandidateIndex,
    method: ClassificationMethod,
) -> String {
    let class_intro = if method.uses_class() {
        "  I will also provide you a list of possible synonyms for the query term, along \
         with their class as defined within their vocabulary, such as Gene or Disease. \
         This will help you distinguish between entities with the same name such as HIV, \
         which could refer to either a particular virus (class OrganismTaxon) or a disease \
         (class Disease). It can also help distinguish between a disease hyperlipidemia \
         (class Disease) versus hyperlipidemia as a symptom of another disease \
         (class PhenotypicFeature)."
    } else {
        "  I will also provide you a list of possible synonyms for the query term."
    };

    let description_intro = if method.uses_descriptions() {
        "\nFor some entities, I will also provide a description of the entity along with \
         the name and class."
    } else {
        ""
    };

    let answer_shape = if method.uses_class() {
        r#"[
    {
        "synonym": ...,
        "vocabulary class": ...,
        "synonymType": ...
    }
]
where the value for synonym is the element from the synonym list, vocabulary class is the
class that I input associated with that synonym, and synonymType is one of "exact",
"narrow", "broad", or "related"."#
    } else {
        r#"[
    {
        "synonym": ...,
        "synonymType": ...
    }
]
where the value for synonym is the element from the synonym list, and synonymType is one
of "exact", "narrow", "broad", or "related"."#
    };

    let payload_key = match method {
        ClassificationMethod::Label => "possible_synonyms",
        ClassificationMethod::Class => "possible_synonyms_and_classes",
        ClassificationMethod::ClassDescription => "possible_synonyms_classes_and_descriptions",
    };

    format!(
        "You are an expert in biomedical vocabularies and ontologies. I will provide you \
         with the abstract to a scientific paper, as well as a query term: a biomedical \
         entity that occurs in that abstract.{class_intro}{description_intro}\n\
         Please determine whether the query term, as it is used in the abstract, is an \
         exact synonym of any of the terms in the list. There should be at most one exact \
         synonym of the query term. If there are no exact synonyms for the query term in \
         the list, please look for narrow, broad, or related synonyms.\n\
         The synonym is narrow if the query term is a more specific form of one of the \
         list terms. For example, the query term \"Type 2 Diabetes\" would be a narrow \
         synonym of \"Diabetes\" because it is not an exact synonym, but a more specific \
         form.\n\
         The synonym is broad if the query term is a more general form of the list term. \
         For instance, the query term \"brain injury\" would be a broad synonym of \
         \"Cerebellar Injury\" because it is more generic.\n\
         The synonym is related if it is neither exact, narrow, nor broad, but is still a \
         similar enough term. For instance the query term \"Pain\" would be a related \
         synonym of \"Pain Disorder\".\n\
         It is also possible that there are no synonyms of the query term in the list; \
         omit any candidate with no relation.\n\
         Provide your answers in the following JSON structure:\n{answer_shape}\n\n\
         abstract: {abstract_text}\n\
         query_term: {term}\n\
         {payload_key}: {synonym_list}\n",
        synonym_list = synonym_list_json(index, method),
    )
}
