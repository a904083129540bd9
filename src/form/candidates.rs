use super::template::ResourceTypeTemplate;
use crate::remote::{CandidateEntry, CandidateRegistry, FetchFault, FilterProperty};
use crate::shared::ids::RepositoryId;
use std::collections::HashMap;

pub const FORMAT_PROPERTY: &str = "format";
/// Wire name of the include-managed predicate understood by `readReferences`.
pub const INCLUDE_MANAGED_PROPERTY: &str = "includeNexusManaged";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Send filter constraints to the server instead of filtering locally.
    pub remote_filter: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Unfiltered,
    Stale,
    Loading,
    Loaded,
    LoadError(FetchFault),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: Vec<FilterProperty>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCompletion {
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("candidate source has no filter applied")]
    Unfiltered,
}

/// Candidate filter for a group of the given template: same format, manageable
/// repositories included.
pub fn candidate_filter(template: &ResourceTypeTemplate) -> Vec<FilterProperty> {
    vec![
        FilterProperty::new(FORMAT_PROPERTY, template.format().as_str()),
        FilterProperty::new(INCLUDE_MANAGED_PROPERTY, "true"),
    ]
}

/// Per-form cache of member candidates. Entries keep server order and are only
/// replaced wholesale by a successful fetch of the latest generation.
#[derive(Debug, Clone)]
pub struct MemberCandidateSource {
    template: ResourceTypeTemplate,
    options: SourceOptions,
    filter: Option<Vec<FilterProperty>>,
    entries: Vec<CandidateEntry>,
    index: HashMap<RepositoryId, usize>,
    status: SourceStatus,
    generation: u64,
}

impl MemberCandidateSource {
    pub fn new(template: ResourceTypeTemplate, options: SourceOptions) -> Self {
        Self {
            template,
            options,
            filter: None,
            entries: Vec::new(),
            index: HashMap::new(),
            status: SourceStatus::Unfiltered,
            generation: 0,
        }
    }

    pub fn template(&self) -> &ResourceTypeTemplate {
        &self.template
    }

    pub fn filter(&self) -> Option<&[FilterProperty]> {
        self.filter.as_deref()
    }

    pub fn status(&self) -> &SourceStatus {
        &self.status
    }

    pub fn is_loaded(&self) -> bool {
        self.status == SourceStatus::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.status == SourceStatus::Loading
    }

    pub fn needs_fetch(&self) -> bool {
        self.status == SourceStatus::Stale
    }

    /// Returns `true` when the predicates changed and a fetch is now due.
    pub fn apply_filter(&mut self, predicates: Vec<FilterProperty>) -> bool {
        if self.filter.as_ref() == Some(&predicates) {
            return false;
        }
        self.filter = Some(predicates);
        self.status = SourceStatus::Stale;
        // an in-flight reply was computed for the old predicates
        self.generation += 1;
        true
    }

    /// Marks the current filter for refetching; the retry path after a fault.
    pub fn refresh(&mut self) -> bool {
        if self.filter.is_none() || self.is_loading() {
            return false;
        }
        self.status = SourceStatus::Stale;
        true
    }

    pub fn begin_fetch(&mut self) -> Result<FetchTicket, SourceError> {
        let filter = self.filter.as_ref().ok_or(SourceError::Unfiltered)?;
        let query = if self.options.remote_filter {
            filter.clone()
        } else {
            Vec::new()
        };
        self.generation += 1;
        self.status = SourceStatus::Loading;
        Ok(FetchTicket {
            generation: self.generation,
            query,
        })
    }

    pub fn complete_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<CandidateEntry>, FetchFault>,
    ) -> FetchCompletion {
        if generation != self.generation || !self.is_loading() {
            return FetchCompletion::Stale;
        }
        match result {
            Ok(fetched) => {
                let mut entries = Vec::with_capacity(fetched.len());
                let mut index = HashMap::with_capacity(fetched.len());
                for entry in fetched {
                    if !self.options.remote_filter && !self.matches_local_filter(&entry) {
                        continue;
                    }
                    if index.contains_key(&entry.id) {
                        continue;
                    }
                    index.insert(entry.id.clone(), entries.len());
                    entries.push(entry);
                }
                self.entries = entries;
                self.index = index;
                self.status = SourceStatus::Loaded;
            }
            Err(fault) => {
                self.status = SourceStatus::LoadError(fault);
            }
        }
        FetchCompletion::Applied
    }

    /// Blocking fetch against `registry`.
    pub fn fetch(&mut self, registry: &dyn CandidateRegistry) -> Result<(), FetchFault> {
        let ticket = self.begin_fetch().map_err(|err| FetchFault {
            message: err.to_string(),
        })?;
        let result = registry.query(&ticket.query);
        self.complete_fetch(ticket.generation, result);
        match &self.status {
            SourceStatus::LoadError(fault) => Err(fault.clone()),
            _ => Ok(()),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &CandidateEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &RepositoryId) -> Option<&CandidateEntry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, id: &RepositoryId) -> bool {
        self.index.contains_key(id)
    }

    fn matches_local_filter(&self, entry: &CandidateEntry) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        filter.iter().all(|constraint| match constraint.property.as_str() {
            "id" => entry.id.as_str() == constraint.value,
            "name" => entry.name == constraint.value,
            FORMAT_PROPERTY => entry.format.as_str() == constraint.value,
            // manageability and other policy flags are only known server-side
            _ => true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ids::RepositoryFormat;

    fn template(format: &str) -> ResourceTypeTemplate {
        ResourceTypeTemplate::new(RepositoryFormat::parse(format).expect("format"))
    }

    fn entry(id: &str, format: &str) -> CandidateEntry {
        CandidateEntry {
            id: RepositoryId::parse(id).expect("id"),
            name: format!("{id} name"),
            format: RepositoryFormat::parse(format).expect("format"),
        }
    }

    fn ids(source: &MemberCandidateSource) -> Vec<&str> {
        source.entries().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn begin_fetch_requires_filter() {
        let mut source = MemberCandidateSource::new(
            template("maven2"),
            SourceOptions {
                remote_filter: true,
            },
        );
        assert_eq!(source.begin_fetch(), Err(SourceError::Unfiltered));
        assert_eq!(source.entries().count(), 0);
    }

    #[test]
    fn reapplying_same_filter_does_not_request_fetch() {
        let template = template("maven2");
        let mut source = MemberCandidateSource::new(
            template.clone(),
            SourceOptions {
                remote_filter: true,
            },
        );
        assert!(source.apply_filter(candidate_filter(&template)));
        let ticket = source.begin_fetch().expect("ticket");
        source.complete_fetch(ticket.generation, Ok(vec![entry("r1", "maven2")]));
        assert!(source.is_loaded());

        assert!(!source.apply_filter(candidate_filter(&template)));
        assert!(source.is_loaded());
        assert_eq!(source.filter().map(<[FilterProperty]>::len), Some(2));
        assert!(source.apply_filter(vec![FilterProperty::new(FORMAT_PROPERTY, "npm")]));
        assert!(source.needs_fetch());
    }

    #[test]
    fn remote_filter_sends_predicates_in_order() {
        let template = template("maven2");
        let mut source = MemberCandidateSource::new(
            template.clone(),
            SourceOptions {
                remote_filter: true,
            },
        );
        source.apply_filter(candidate_filter(&template));
        let ticket = source.begin_fetch().expect("ticket");
        assert_eq!(
            ticket.query,
            vec![
                FilterProperty::new("format", "maven2"),
                FilterProperty::new("includeNexusManaged", "true"),
            ]
        );
    }

    #[test]
    fn local_filter_drops_other_formats_and_duplicates() {
        let template = template("maven2");
        let mut source = MemberCandidateSource::new(
            template.clone(),
            SourceOptions {
                remote_filter: false,
            },
        );
        source.apply_filter(candidate_filter(&template));
        let ticket = source.begin_fetch().expect("ticket");
        assert!(ticket.query.is_empty());
        source.complete_fetch(
            ticket.generation,
            Ok(vec![
                entry("r1", "maven2"),
                entry("n1", "npm"),
                entry("r2", "maven2"),
                entry("r1", "maven2"),
            ]),
        );
        assert_eq!(ids(&source), vec!["r1", "r2"]);
    }

    #[test]
    fn failed_fetch_keeps_previous_entries_and_reports_fault() {
        let template = template("maven2");
        let mut source = MemberCandidateSource::new(
            template.clone(),
            SourceOptions {
                remote_filter: true,
            },
        );
        source.apply_filter(candidate_filter(&template));
        let first = source.begin_fetch().expect("ticket");
        source.complete_fetch(first.generation, Ok(vec![entry("r1", "maven2")]));

        assert!(source.refresh());
        let second = source.begin_fetch().expect("ticket");
        source.complete_fetch(
            second.generation,
            Err(FetchFault {
                message: "registry down".to_string(),
            }),
        );
        assert!(matches!(source.status(), SourceStatus::LoadError(_)));
        assert_eq!(ids(&source), vec!["r1"]);
    }

    #[test]
    fn superseded_fetch_result_is_discarded() {
        let template = template("maven2");
        let mut source = MemberCandidateSource::new(
            template.clone(),
            SourceOptions {
                remote_filter: true,
            },
        );
        source.apply_filter(candidate_filter(&template));
        let old = source.begin_fetch().expect("old ticket");
        let new = source.begin_fetch().expect("new ticket");

        assert_eq!(
            source.complete_fetch(old.generation, Ok(vec![entry("stale", "maven2")])),
            FetchCompletion::Stale
        );
        assert!(source.is_loading());
        assert_eq!(
            source.complete_fetch(new.generation, Ok(vec![entry("r1", "maven2")])),
            FetchCompletion::Applied
        );
        assert_eq!(ids(&source), vec!["r1"]);
    }
}
