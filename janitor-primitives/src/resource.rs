//! Cloud resources inspected by janitor rules.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, ResourceType, Result};

/// When and why a resource is due for cleanup.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TerminationSchedule {
    time: DateTime<Utc>,
    reason: String,
}

impl TerminationSchedule {
    /// Creates a schedule terminating at `time` for the supplied reason.
    #[must_use]
    pub fn new(time: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            time,
            reason: reason.into(),
        }
    }

    /// Returns the expected termination time.
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Returns the human-readable termination reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A cloud object reported by a crawler: identity, kind, provider state and tags,
/// plus the termination fields written by the rule that flags it.
///
/// The expected termination time and reason are stored together so that they are
/// either both present or both absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    id: String,
    resource_type: ResourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region: Option<String>,
    #[serde(default)]
    state: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    launch_time: Option<DateTime<Utc>>,
    #[serde(default)]
    opted_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mark_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    termination: Option<TerminationSchedule>,
}

impl Resource {
    /// Starts building a [`Resource`].
    #[must_use]
    pub fn builder(id: impl Into<String>, resource_type: ResourceType) -> ResourceBuilder {
        ResourceBuilder {
            id: id.into(),
            resource_type,
            region: None,
            state: String::new(),
            tags: BTreeMap::new(),
            launch_time: None,
            opted_out: false,
        }
    }

    /// Returns the provider identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the resource kind.
    #[must_use]
    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Returns the region the resource lives in, when known.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Returns the provider-reported lifecycle state, e.g. `running`.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns all tags.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Returns the raw value of a tag.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Returns the value of a tag, treating an empty value the same as a missing tag.
    #[must_use]
    pub fn non_empty_tag(&self, key: &str) -> Option<&str> {
        self.tag(key).filter(|value| !value.is_empty())
    }

    /// Returns the launch (or creation) time reported by the provider.
    #[must_use]
    pub fn launch_time(&self) -> Option<DateTime<Utc>> {
        self.launch_time
    }

    /// Returns `true` when the owner opted the resource out of cleanup.
    #[must_use]
    pub fn opted_out(&self) -> bool {
        self.opted_out
    }

    /// Returns when the resource was first marked as a cleanup candidate.
    #[must_use]
    pub fn mark_time(&self) -> Option<DateTime<Utc>> {
        self.mark_time
    }

    /// Records when the resource was marked; `None` clears it.
    pub fn set_mark_time(&mut self, mark_time: Option<DateTime<Utc>>) {
        self.mark_time = mark_time;
    }

    /// Returns the termination schedule, if a rule flagged the resource.
    #[must_use]
    pub fn termination(&self) -> Option<&TerminationSchedule> {
        self.termination.as_ref()
    }

    /// Returns the expected termination time, if scheduled.
    #[must_use]
    pub fn expected_termination_time(&self) -> Option<DateTime<Utc>> {
        self.termination.as_ref().map(TerminationSchedule::time)
    }

    /// Returns the termination reason, if scheduled.
    #[must_use]
    pub fn termination_reason(&self) -> Option<&str> {
        self.termination.as_ref().map(TerminationSchedule::reason)
    }

    /// Returns `true` when a termination schedule is present.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.termination.is_some()
    }

    /// Sets the expected termination time and reason together.
    pub fn schedule_termination(&mut self, time: DateTime<Utc>, reason: impl Into<String>) {
        self.termination = Some(TerminationSchedule::new(time, reason));
    }

    /// Replaces the termination schedule wholesale.
    pub fn set_termination(&mut self, termination: Option<TerminationSchedule>) {
        self.termination = termination;
    }

    /// Removes the termination schedule.
    pub fn clear_termination(&mut self) {
        self.termination = None;
    }
}

/// Builder for [`Resource`].
#[derive(Debug)]
pub struct ResourceBuilder {
    id: String,
    resource_type: ResourceType,
    region: Option<String>,
    state: String,
    tags: BTreeMap<String, String>,
    launch_time: Option<DateTime<Utc>>,
    opted_out: bool,
}

impl ResourceBuilder {
    /// Sets the region.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets the provider lifecycle state.
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Adds a tag. Values may be empty; keys may not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] when the key is empty or whitespace.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::InvalidResource {
                reason: "tag key cannot be empty".into(),
            });
        }
        self.tags.insert(key, value.into());
        Ok(self)
    }

    /// Adds multiple tags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] if any key is empty.
    pub fn tags<I, K, V>(mut self, tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in tags {
            self = self.tag(key, value)?;
        }
        Ok(self)
    }

    /// Sets the launch time.
    #[must_use]
    pub fn launch_time(mut self, launch_time: DateTime<Utc>) -> Self {
        self.launch_time = Some(launch_time);
        self
    }

    /// Marks the resource as opted out of cleanup.
    #[must_use]
    pub fn opted_out(mut self, opted_out: bool) -> Self {
        self.opted_out = opted_out;
        self
    }

    /// Consumes the builder and returns the resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResource`] when the identifier is empty.
    pub fn build(self) -> Result<Resource> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidResource {
                reason: "resource id cannot be empty".into(),
            });
        }

        Ok(Resource {
            id: self.id,
            resource_type: self.resource_type,
            region: self.region,
            state: self.state,
            tags: self.tags,
            launch_time: self.launch_time,
            opted_out: self.opted_out,
            mark_time: None,
            termination: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn instance() -> Resource {
        Resource::builder("i-123", ResourceType::Instance)
            .region("us-east-1")
            .state("running")
            .tag("owner", "")
            .unwrap()
            .tag("app", "web")
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn builds_resource() {
        let resource = instance();
        assert_eq!(resource.id(), "i-123");
        assert_eq!(resource.resource_type(), &ResourceType::Instance);
        assert_eq!(resource.region(), Some("us-east-1"));
        assert_eq!(resource.state(), "running");
        assert_eq!(resource.tag("app"), Some("web"));
        assert!(!resource.is_scheduled());
    }

    #[test]
    fn empty_tag_value_counts_as_unset() {
        let resource = instance();
        assert_eq!(resource.tag("owner"), Some(""));
        assert_eq!(resource.non_empty_tag("owner"), None);
        assert_eq!(resource.non_empty_tag("missing"), None);
    }

    #[test]
    fn id_and_tag_keys_are_required() {
        let err = Resource::builder(" ", ResourceType::Volume).build().unwrap_err();
        assert!(matches!(err, Error::InvalidResource { .. }));

        let err = Resource::builder("vol-1", ResourceType::Volume)
            .tags([("", "x")])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResource { .. }));
    }

    #[test]
    fn termination_fields_move_together() {
        let mut resource = instance();
        let when = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        resource.schedule_termination(when, "no owner");
        assert_eq!(resource.expected_termination_time(), Some(when));
        assert_eq!(resource.termination_reason(), Some("no owner"));

        resource.clear_termination();
        assert_eq!(resource.expected_termination_time(), None);
        assert_eq!(resource.termination_reason(), None);
    }

    #[test]
    fn deserializes_crawler_payload() {
        let resource: Resource = serde_json::from_str(
            r#"{"id":"vol-9","resource_type":"VOLUME","state":"available","tags":{"owner":"ops"}}"#,
        )
        .unwrap();
        assert_eq!(resource.resource_type(), &ResourceType::Volume);
        assert_eq!(resource.non_empty_tag("owner"), Some("ops"));
        assert!(!resource.opted_out());
        assert!(resource.termination().is_none());
    }
}
