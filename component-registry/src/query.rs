//! Classification filters for listing registered components.

use crate::error::{RegistryError, RegistryResult};
use std::collections::HashSet;

/// Conversion from "a tag or a sequence of tags" into a tag list
pub trait IntoTags {
    fn into_tags(self) -> Vec<String>;
}

impl IntoTags for &str {
    fn into_tags(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoTags for String {
    fn into_tags(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoTags for &String {
    fn into_tags(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoTags for Vec<String> {
    fn into_tags(self) -> Vec<String> {
        self
    }
}

impl IntoTags for Vec<&str> {
    fn into_tags(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoTags for &[&str] {
    fn into_tags(self) -> Vec<String> {
        self.iter().map(|t| t.to_string()).collect()
    }
}

impl IntoTags for &[String] {
    fn into_tags(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoTags for [&str; N] {
    fn into_tags(self) -> Vec<String> {
        self.iter().map(|t| t.to_string()).collect()
    }
}

/// Filter for `get_components_by_type`.
///
/// `select` keeps only the given tags (in the given order); `ignore` drops
/// them. The two options are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentQuery {
    pub select: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
}

impl ComponentQuery {
    /// Query matching every registered component
    pub fn all() -> Self {
        Self::default()
    }

    pub fn select(tags: impl IntoTags) -> Self {
        Self::default().with_select(tags)
    }

    pub fn ignore(tags: impl IntoTags) -> Self {
        Self::default().with_ignore(tags)
    }

    pub fn with_select(mut self, tags: impl IntoTags) -> Self {
        self.select = Some(tags.into_tags());
        self
    }

    pub fn with_ignore(mut self, tags: impl IntoTags) -> Self {
        self.ignore = Some(tags.into_tags());
        self
    }

    /// Validate the options against the known classification tags
    pub(crate) fn plan<F>(&self, is_known: F) -> RegistryResult<QueryPlan>
    where
        F: Fn(&str) -> bool,
    {
        match (&self.select, &self.ignore) {
            (Some(_), Some(_)) => Err(RegistryError::ConflictingFilters),
            (None, None) => Ok(QueryPlan::All),
            (Some(select), None) => {
                validate_tags("select", select, &is_known)?;
                Ok(QueryPlan::Select(select.clone()))
            }
            (None, Some(ignore)) => {
                validate_tags("ignore", ignore, &is_known)?;
                Ok(QueryPlan::Ignore(ignore.iter().cloned().collect()))
            }
        }
    }
}

/// Validated form of a [`ComponentQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryPlan {
    All,
    Select(Vec<String>),
    Ignore(HashSet<String>),
}

fn validate_tags<F>(option: &'static str, tags: &[String], is_known: &F) -> RegistryResult<()>
where
    F: Fn(&str) -> bool,
{
    if tags.is_empty() {
        return Err(RegistryError::EmptyFilter { option });
    }
    for (position, tag) in tags.iter().enumerate() {
        if !is_known(tag) {
            return Err(RegistryError::UnknownType {
                option,
                position,
                tag: tag.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(tag: &str) -> bool {
        matches!(tag, "Model" | "Task")
    }

    #[test]
    fn test_single_tag_and_sequences_convert() {
        assert_eq!(ComponentQuery::select("Model").select, Some(vec!["Model".to_string()]));
        assert_eq!(
            ComponentQuery::ignore(["Model", "Task"]).ignore,
            Some(vec!["Model".to_string(), "Task".to_string()])
        );
    }

    #[test]
    fn test_select_and_ignore_conflict() {
        let query = ComponentQuery::select("Model").with_ignore("Task");
        assert_eq!(query.plan(known), Err(RegistryError::ConflictingFilters));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let query = ComponentQuery::select(Vec::<String>::new());
        assert_eq!(
            query.plan(known),
            Err(RegistryError::EmptyFilter { option: "select" })
        );
    }

    #[test]
    fn test_unknown_tag_reports_position() {
        let query = ComponentQuery::ignore(vec!["Task", "Explainer"]);
        assert_eq!(
            query.plan(known),
            Err(RegistryError::UnknownType {
                option: "ignore",
                position: 1,
                tag: "Explainer".to_string(),
            })
        );
    }

    #[test]
    fn test_no_options_plans_everything() {
        assert_eq!(ComponentQuery::all().plan(known), Ok(QueryPlan::All));
    }
}
