use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use janitor::calendar::{BusinessCalendar, FixedClock};
use janitor::config::{JanitorConfig, build_calendar, build_engine, build_scheduler};
use janitor::kernel::{Janitor, JanitorResult, ResourceCrawler, ResourceTracker};
use janitor::primitives::{Resource, ResourceType};
use janitor::rules::{NoOwnerInstanceRule, Rule, RuleError};

struct TestCrawler {
    resources: Mutex<Vec<Resource>>,
}

impl TestCrawler {
    fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources: Mutex::new(resources),
        }
    }

    fn replace(&self, resources: Vec<Resource>) {
        *self.resources.lock().unwrap() = resources;
    }
}

#[async_trait]
impl ResourceCrawler for TestCrawler {
    async fn resources(&self, resource_type: &ResourceType) -> JanitorResult<Vec<Resource>> {
        let guard = self.resources.lock().unwrap();
        Ok(guard
            .iter()
            .filter(|resource| resource.resource_type() == resource_type)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct TestTracker {
    marked: Mutex<HashMap<String, Resource>>,
}

impl TestTracker {
    fn get(&self, id: &str) -> Option<Resource> {
        self.marked.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ResourceTracker for TestTracker {
    async fn marked(&self, resource_type: &ResourceType) -> JanitorResult<Vec<Resource>> {
        let guard = self.marked.lock().unwrap();
        Ok(guard
            .values()
            .filter(|resource| resource.resource_type() == resource_type)
            .cloned()
            .collect())
    }

    async fn mark(&self, resource: &Resource) -> JanitorResult<()> {
        self.marked
            .lock()
            .unwrap()
            .insert(resource.id().to_owned(), resource.clone());
        Ok(())
    }

    async fn unmark(&self, resource: &Resource) -> JanitorResult<()> {
        self.marked.lock().unwrap().remove(resource.id());
        Ok(())
    }
}

fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn instance(id: &str, state: &str, owner: Option<&str>) -> Resource {
    let builder = Resource::builder(id, ResourceType::Instance)
        .region("us-west-2")
        .state(state);
    let builder = match owner {
        Some(owner) => builder.tag("owner", owner).unwrap(),
        None => builder,
    };
    builder.build().unwrap()
}

#[test]
fn no_owner_scenario_schedules_seven_business_days_out() {
    let clock = Arc::new(FixedClock::new(monday()));
    let config = JanitorConfig::default();
    let calendar: Arc<dyn BusinessCalendar> =
        Arc::new(build_calendar(&config.calendar, clock).unwrap());
    let rule = NoOwnerInstanceRule::new(Arc::clone(&calendar), 7).unwrap();

    let mut orphan = instance("i-orphan", "running", None);
    assert!(!rule.is_valid(&mut orphan).unwrap());
    assert_eq!(
        orphan.expected_termination_time(),
        Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
    );
    assert_eq!(
        orphan.termination_reason(),
        Some("No ownerEmail tag associated with this instance")
    );

    let mut owned = instance("i-owned", "running", Some("alice@example.com"));
    let before = owned.clone();
    assert!(rule.is_valid(&mut owned).unwrap());
    assert_eq!(owned, before);

    let mut pending = instance("i-pending", "pending", None);
    assert!(rule.is_valid(&mut pending).unwrap());
    assert!(!pending.is_scheduled());

    assert!(matches!(
        NoOwnerInstanceRule::new(calendar, -1),
        Err(RuleError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn configured_janitor_marks_then_unmarks() {
    let config = JanitorConfig::from_json_str(
        r#"{
            "scheduler": { "max_concurrency": 2 },
            "resource_types": ["instance", "volume"],
            "rules": {
                "no_owner_instance": { "retention_days": 7 },
                "old_detached_volume": { "enabled": true, "detached_days": 30, "retention_days": 2 }
            },
            "exclusions": { "tag_values": [{ "key": "janitor", "value": "skip" }] }
        }"#,
    )
    .unwrap();

    let clock = Arc::new(FixedClock::new(monday()));
    let calendar: Arc<dyn BusinessCalendar> =
        Arc::new(build_calendar(&config.calendar, clock.clone()).unwrap());
    let engine = Arc::new(build_engine(&config, &calendar).unwrap());
    let scheduler = build_scheduler(&config.scheduler).unwrap();

    let skipped = Resource::builder("i-skip", ResourceType::Instance)
        .state("running")
        .tag("janitor", "skip")
        .unwrap()
        .build()
        .unwrap();
    let old_volume = Resource::builder("vol-old", ResourceType::Volume)
        .state("available")
        .launch_time(monday() - TimeDelta::days(45))
        .build()
        .unwrap();
    let opted_out = Resource::builder("i-opted", ResourceType::Instance)
        .state("running")
        .opted_out(true)
        .build()
        .unwrap();

    let crawler = Arc::new(TestCrawler::new(vec![
        instance("i-orphan", "running", None),
        instance("i-owned", "running", Some("alice@example.com")),
        instance("i-pending", "pending", None),
        skipped,
        opted_out,
        old_volume,
    ]));
    let tracker = Arc::new(TestTracker::default());
    let janitor = Janitor::new(
        Arc::clone(&crawler),
        Arc::clone(&tracker),
        engine,
        Arc::clone(&calendar),
    )
    .with_scheduler(scheduler)
    .with_resource_types(config.resource_types.clone());

    let mut report = janitor.mark_resources().await.unwrap();
    report.marked.sort();
    assert_eq!(report.checked, 6);
    assert_eq!(report.marked, ["i-orphan", "vol-old"]);
    assert_eq!(report.failed, 0);

    let orphan = tracker.get("i-orphan").unwrap();
    assert_eq!(orphan.mark_time(), Some(monday()));
    assert_eq!(
        orphan.expected_termination_time(),
        Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap())
    );
    assert_eq!(
        tracker.get("vol-old").unwrap().expected_termination_time(),
        Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
    );

    // A day later the orphan gained an owner; the first schedule of the
    // volume must survive the second pass.
    clock.advance(TimeDelta::days(1));
    crawler.replace(vec![
        instance("i-orphan", "running", Some("bob@example.com")),
        Resource::builder("vol-old", ResourceType::Volume)
            .state("available")
            .launch_time(monday() - TimeDelta::days(45))
            .build()
            .unwrap(),
    ]);

    let report = janitor.mark_resources().await.unwrap();
    assert_eq!(report.checked, 2);
    assert!(report.marked.is_empty());
    assert_eq!(report.unmarked, ["i-orphan"]);
    assert!(tracker.get("i-orphan").is_none());
    let volume = tracker.get("vol-old").unwrap();
    assert_eq!(volume.mark_time(), Some(monday()));
    assert_eq!(
        volume.expected_termination_time(),
        Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
    );
}
