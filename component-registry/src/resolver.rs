//! Base-type resolution.
//!
//! A component's classification tag comes from the framework base classes in
//! its lineage. Only types marked as base classes are considered, and among
//! those only the ones carrying a tag. Exactly one such base must remain.
//! Lineage order never changes the outcome.

use crate::error::{RegistryError, RegistryResult};
use crate::types::TypeInfo;
use std::sync::Arc;

/// Resolve the single classification tag of `component` from its lineage.
///
/// Every tagged base class is its own candidate, so two bases carrying the
/// same tag (a specialised base deriving from a generic one) are ambiguous.
pub fn resolve_classification(
    component: &str,
    lineage: &[Arc<TypeInfo>],
) -> RegistryResult<String> {
    let mut candidates: Vec<String> = lineage
        .iter()
        .filter(|ty| ty.is_base())
        .filter_map(|ty| ty.classification())
        .map(str::to_string)
        .collect();

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(RegistryError::NoClassification {
            component: component.to_string(),
            ancestry: lineage_names(lineage),
        }),
        _ => {
            // Stable message regardless of declaration order
            candidates.sort();
            Err(RegistryError::AmbiguousClassification {
                component: component.to_string(),
                candidates,
                ancestry: lineage_names(lineage),
            })
        }
    }
}

/// Classify a declared type using its full lineage
pub fn classify(ty: &Arc<TypeInfo>) -> RegistryResult<String> {
    resolve_classification(ty.name(), &TypeInfo::lineage(ty))
}

fn lineage_names(lineage: &[Arc<TypeInfo>]) -> Vec<String> {
    lineage.iter().map(|ty| ty.name().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(name: &str, tag: &str) -> Arc<TypeInfo> {
        TypeInfo::builder(name).base(tag).build().unwrap()
    }

    #[test]
    fn test_single_tagged_base_resolves() {
        let base_model = base("BaseModel", "Model");
        let svc = TypeInfo::builder("SVC").parent(&base_model).build().unwrap();
        assert_eq!(classify(&svc).unwrap(), "Model");
    }

    #[test]
    fn test_synthetic_lineage_without_bases_fails() {
        let plain = TypeInfo::builder("Helper").build().unwrap();
        let lineage = vec![plain];
        let err = resolve_classification("Orphan", &lineage).unwrap_err();
        assert_eq!(
            err,
            RegistryError::NoClassification {
                component: "Orphan".to_string(),
                ancestry: vec!["Helper".to_string()],
            }
        );
    }

    #[test]
    fn test_untagged_base_is_filtered_out() {
        let untagged = TypeInfo::builder("BaseMixin")
            .base_without_tag()
            .build()
            .unwrap();
        let ty = TypeInfo::builder("Thing").parent(&untagged).build().unwrap();
        assert!(matches!(
            classify(&ty),
            Err(RegistryError::NoClassification { .. })
        ));
    }

    #[test]
    fn test_two_unrelated_bases_are_ambiguous() {
        let model = base("BaseModel", "Model");
        let task = base("BaseTask", "Task");
        let hybrid = TypeInfo::builder("Hybrid")
            .parent(&task)
            .parent(&model)
            .build()
            .unwrap();

        match classify(&hybrid).unwrap_err() {
            RegistryError::AmbiguousClassification {
                component,
                candidates,
                ancestry,
            } => {
                assert_eq!(component, "Hybrid");
                assert_eq!(candidates, vec!["Model", "Task"]);
                assert_eq!(ancestry, vec!["Hybrid", "BaseTask", "BaseModel"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_stacked_bases_with_same_tag_are_ambiguous() {
        let model = base("BaseModel", "Model");
        let tabular = TypeInfo::builder("BaseTabularModel")
            .base("Model")
            .parent(&model)
            .build()
            .unwrap();
        let rf = TypeInfo::builder("RandomForest")
            .parent(&tabular)
            .build()
            .unwrap();

        match classify(&rf).unwrap_err() {
            RegistryError::AmbiguousClassification {
                candidates,
                ancestry,
                ..
            } => {
                assert_eq!(candidates, vec!["Model", "Model"]);
                assert_eq!(ancestry, vec!["RandomForest", "BaseTabularModel", "BaseModel"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_order_does_not_matter() {
        let model = base("BaseModel", "Model");
        let helper = TypeInfo::builder("Helper").build().unwrap();
        let forward = vec![Arc::clone(&model), Arc::clone(&helper)];
        let backward = vec![helper, model];
        assert_eq!(
            resolve_classification("X", &forward).unwrap(),
            resolve_classification("X", &backward).unwrap()
        );
    }
}
